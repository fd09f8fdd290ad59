// ABOUTME: Centralized CLI output utilities for consistent user-facing messages
// ABOUTME: Provides standardized formatting for errors, warnings, and hints on stderr

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Centralized CLI output utilities for consistent formatting
pub struct CliOutput {
    use_color: bool,
}

impl CliOutput {
    /// Create new CLI output utility with TTY detection
    pub fn new() -> Self {
        Self {
            use_color: std::io::stderr().is_terminal(),
        }
    }

    /// Create CLI output utility with explicit color setting
    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Display an error message
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.format_error(message));
    }

    /// Display a warning message
    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.format_warning(message));
    }

    /// Display a hint that follows an error or warning
    pub fn hint(&self, message: &str) {
        eprintln!("{}", self.format_hint(message));
    }

    pub fn format_error(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", "error:".red().bold(), message)
        } else {
            format!("error: {}", message)
        }
    }

    pub fn format_warning(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", "warning:".yellow().bold(), message)
        } else {
            format!("warning: {}", message)
        }
    }

    pub fn format_hint(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", "hint:".blue().bold(), message.dimmed())
        } else {
            format!("hint: {}", message)
        }
    }
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new()
    }
}
