//! Storage path resolution.
//!
//! Kickoff outputs and raw training data live in a per-project data
//! directory so that `replay` can find what the last `run` produced.

use std::env;
use std::path::{Path, PathBuf};

const APP_AUTHOR: &str = "CrewAI";

/// Returns the per-project data directory.
///
/// Linux: `~/.local/share/CrewAI/<project>`, macOS:
/// `~/Library/Application Support/CrewAI/<project>`, Windows:
/// `%LOCALAPPDATA%\CrewAI\<project>`. The directory is not created here.
pub fn db_storage_path() -> PathBuf {
    let project = get_project_directory_name();

    let base = if cfg!(target_os = "macos") {
        home_dir().join("Library").join("Application Support")
    } else if cfg!(target_os = "windows") {
        env::var("LOCALAPPDATA")
            .or_else(|_| env::var("APPDATA"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\tmp"))
    } else {
        env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".local").join("share"))
    };

    base.join(APP_AUTHOR).join(project)
}

/// Returns the project name used to namespace storage.
///
/// Uses `CREWAI_STORAGE_DIR` when set, otherwise the name of the current
/// working directory.
pub fn get_project_directory_name() -> String {
    env::var("CREWAI_STORAGE_DIR").unwrap_or_else(|_| {
        env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "crew_ai_sandbox".to_string())
    })
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
