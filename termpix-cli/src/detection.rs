// ABOUTME: Terminal capability detection for Kitty graphics protocol support
// ABOUTME: Determines from the environment whether inline images will render

use std::env;

pub const FORCE_PROTOCOL_VAR: &str = "TERMPIX_FORCE_PROTOCOL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub supports_kitty_graphics: bool,
    pub terminal_name: String,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Detect using an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Check for user override first
        if let Some(forced) = lookup(FORCE_PROTOCOL_VAR) {
            if let Some(caps) = Self::from_forced_protocol(&forced) {
                return caps;
            }
            log::warn!(
                "Unknown protocol '{}' in {}. Valid values: kitty, none",
                forced,
                FORCE_PROTOCOL_VAR
            );
        }

        let term_program = lookup("TERM_PROGRAM").unwrap_or_default();
        let term = lookup("TERM").unwrap_or_default();
        let wezterm_exe = lookup("WEZTERM_EXECUTABLE");
        let kitty_window_id = lookup("KITTY_WINDOW_ID");

        Self {
            supports_kitty_graphics: detect_kitty_support(
                &term_program,
                &term,
                &wezterm_exe,
                &kitty_window_id,
            ),
            terminal_name: determine_terminal_name(&term_program, &term),
        }
    }

    /// Create capabilities from forced protocol override
    fn from_forced_protocol(protocol: &str) -> Option<Self> {
        let terminal_name = format!("forced-{}", protocol);

        match protocol.to_lowercase().as_str() {
            "kitty" => Some(Self {
                supports_kitty_graphics: true,
                terminal_name,
            }),
            "none" | "disable" | "disabled" => Some(Self {
                supports_kitty_graphics: false,
                terminal_name,
            }),
            _ => None,
        }
    }
}

fn detect_kitty_support(
    term_program: &str,
    term: &str,
    wezterm_exe: &Option<String>,
    kitty_window_id: &Option<String>,
) -> bool {
    // Direct Kitty terminal
    if term_program == "kitty" || kitty_window_id.is_some() {
        return true;
    }

    // WezTerm has good Kitty protocol support
    if term_program == "WezTerm" || wezterm_exe.is_some() {
        return true;
    }

    // Ghostty supports Kitty graphics protocol
    if term_program == "ghostty" {
        return true;
    }

    // Check TERM variable patterns
    term.contains("kitty") || term.contains("ghostty")
}

fn determine_terminal_name(term_program: &str, term: &str) -> String {
    if !term_program.is_empty() {
        term_program.to_string()
    } else if !term.is_empty() {
        term.to_string()
    } else {
        "unknown".to_string()
    }
}
