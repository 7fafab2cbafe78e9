//! Switch CLI command vocabulary.
//!
//! This module holds the exact lines intfbounce sends over an interactive
//! session and the checks that keep a value from turning into more than one
//! line on the wire.
//!
//! # Example
//!
//! ```
//! use sonic_bounce_common::cli::{self, Action};
//!
//! let lines = cli::interface_commands("Gi1/0/1", Action::NoShutDown);
//! assert_eq!(lines, ["interface Gi1/0/1", "no shutdown"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Privilege elevation command.
pub const ENABLE_CMD: &str = "enable";

/// Global configuration entry command.
pub const CONFIG_TERMINAL_CMD: &str = "config t";

/// Interface selection command prefix.
pub const INTERFACE_CMD: &str = "interface";

/// Administratively disables the selected interface.
pub const SHUTDOWN_CMD: &str = "shutdown";

/// Administratively enables the selected interface.
pub const NO_SHUTDOWN_CMD: &str = "no shutdown";

/// Line terminator appended by transports.
pub const LINE_ENDING: &str = "\n";

/// Matches characters that would break a single CLI line: ASCII control
/// characters (CR and LF included) and DEL.
static CONTROL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1f\x7f]").expect("Invalid regex pattern"));

/// Action applied to every interface of a switch during one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `shutdown`
    ShutDown,
    /// `no shutdown`
    NoShutDown,
}

impl Action {
    /// Returns the interface-mode command for this action.
    pub fn command(&self) -> &'static str {
        match self {
            Action::ShutDown => SHUTDOWN_CMD,
            Action::NoShutDown => NO_SHUTDOWN_CMD,
        }
    }

    /// Returns true if each interface must be followed by the link settle
    /// delay.
    pub fn settles_link(&self) -> bool {
        matches!(self, Action::NoShutDown)
    }

    /// Past-tense description used in completion messages.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::ShutDown => "shut down",
            Action::NoShutDown => "re-enabled",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Lines sent once per session before any interface is touched.
pub fn preamble() -> [&'static str; 2] {
    [ENABLE_CMD, CONFIG_TERMINAL_CMD]
}

/// Builds the interface selection line.
pub fn interface_cmd(name: &str) -> String {
    format!("{} {}", INTERFACE_CMD, name)
}

/// Builds the two lines issued for one interface.
pub fn interface_commands(name: &str, action: Action) -> [String; 2] {
    [interface_cmd(name), action.command().to_string()]
}

/// Returns true if `value` can be sent as (part of) one CLI line.
pub fn is_single_line(value: &str) -> bool {
    !CONTROL_CHAR_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_commands() {
        assert_eq!(Action::ShutDown.command(), "shutdown");
        assert_eq!(Action::NoShutDown.command(), "no shutdown");
        assert_eq!(Action::NoShutDown.to_string(), "no shutdown");
    }

    #[test]
    fn test_only_no_shutdown_settles() {
        assert!(!Action::ShutDown.settles_link());
        assert!(Action::NoShutDown.settles_link());
    }

    #[test]
    fn test_preamble_order() {
        assert_eq!(preamble(), ["enable", "config t"]);
    }

    #[test]
    fn test_interface_commands() {
        assert_eq!(
            interface_commands("GigabitEthernet1/0/24", Action::ShutDown),
            ["interface GigabitEthernet1/0/24", "shutdown"]
        );
        assert_eq!(
            interface_commands("TenGigabitEthernet 0/1", Action::NoShutDown),
            ["interface TenGigabitEthernet 0/1", "no shutdown"]
        );
    }

    #[test]
    fn test_is_single_line() {
        assert!(is_single_line("Gi1/0/1"));
        assert!(is_single_line("Port-channel10"));
        assert!(is_single_line("TenGigabitEthernet 0/1"));

        assert!(!is_single_line("Gi1/0/1\nreload"));
        assert!(!is_single_line("Gi1/0/1\r"));
        assert!(!is_single_line("Gi1/0/1\t"));
        assert!(!is_single_line("\u{7f}"));
    }
}
