//! Console printer with ANSI color support.
//!
//! Colors are skipped when `NO_COLOR` is set.

use serde::{Deserialize, Serialize};

/// Colors used for verbose crew output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    BoldGreen,
    BoldYellow,
    BoldPurple,
}

impl PrinterColor {
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldPurple => "\x1b[1;35m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Printer for colored console output.
#[derive(Debug, Clone)]
pub struct Printer {
    colored: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            colored: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Wrap `content` in the escape codes for `color`.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        if !self.colored {
            return content.to_string();
        }
        format!("{}{}{}", color.ansi_code(), content, RESET)
    }

    /// Print a message with the specified color.
    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }
}
