//! Verbose progress logger for agents and tasks.
//!
//! Prints timestamped, colored lines to stdout when verbose, and always
//! forwards the message to the `log` facade so `RUST_LOG` captures it.

use chrono::Local;

use crate::utilities::printer::{Printer, PrinterColor};

/// Logger with optional verbose console output.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Print progress lines to the console.
    pub verbose: bool,
    /// Color used when no override is given.
    pub default_color: PrinterColor,
    printer: Printer,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            default_color: PrinterColor::BoldYellow,
            printer: Printer::new(),
        }
    }

    /// Format a log line as `[timestamp][LEVEL]: message`.
    pub fn format_line(level: &str, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!("[{}][{}]: {}", timestamp, level.to_uppercase(), message)
    }

    /// Log a message, printing it to the console when verbose.
    pub fn log(&self, level: &str, message: &str, color: Option<PrinterColor>) {
        match level {
            "error" => log::error!("{}", message),
            "warning" | "warn" => log::warn!("{}", message),
            _ => log::info!("{}", message),
        }
        if self.verbose {
            let color = color.unwrap_or(match level {
                "error" => PrinterColor::Red,
                "warning" | "warn" => PrinterColor::Yellow,
                _ => self.default_color,
            });
            self.printer
                .print(&format!("\n{}", Self::format_line(level, message)), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_uppercases_level() {
        let line = Logger::format_line("info", "Task started");
        assert!(line.contains("[INFO]: Task started"));
    }

    #[test]
    fn test_default_is_quiet() {
        assert!(!Logger::default().verbose);
    }
}
