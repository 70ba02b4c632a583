//! String templating helpers.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").unwrap());

/// Interpolate `{key}` placeholders in a string while leaving JSON untouched.
///
/// Only placeholders whose name starts with a letter or underscore and
/// contains alphanumerics, underscores and hyphens are considered, so a
/// literal like `{"status": "ok"}` passes through as-is.
///
/// # Errors
/// Returns the name of the first placeholder that has no entry in `inputs`.
pub fn interpolate_only(input: &str, inputs: &HashMap<String, String>) -> Result<String, String> {
    if input.is_empty() {
        return Ok(String::new());
    }

    let variables: Vec<&str> = VARIABLE_PATTERN
        .captures_iter(input)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    if variables.is_empty() {
        return Ok(input.to_string());
    }

    if let Some(missing) = variables.iter().find(|v| !inputs.contains_key(**v)) {
        return Err(format!(
            "Template variable '{}' not found in inputs dictionary",
            missing
        ));
    }

    let result = VARIABLE_PATTERN.replace_all(input, |cap: &regex::Captures<'_>| {
        // Presence checked above.
        inputs.get(&cap[1]).cloned().unwrap_or_default()
    });

    Ok(result.into_owned())
}
