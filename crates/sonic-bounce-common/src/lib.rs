//! Common infrastructure for the intfbounce interface maintenance tool.
//!
//! This crate provides the pieces shared by the tool and its test support
//! crate:
//!
//! - [`inventory`]: Switch→interface inventory (JSON document, CSV report)
//! - [`config`]: Credentials, pacing and SSH settings
//! - [`cli`]: The CLI lines sent to switches
//! - [`transport`]: [`SessionConnector`] / [`CliSession`] seam
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```ignore
//! use sonic_bounce_common::{BounceConfig, Inventory};
//!
//! let config = BounceConfig::load_or_default("/etc/intfbounce.toml")?;
//! let inventory = Inventory::load("switch_interfaces.json")?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod inventory;
pub mod transport;

// Re-export commonly used items at crate root
pub use cli::Action;
pub use config::{
    BounceConfig, Credentials, HostKeyPolicy, HostKeyPolicyKind, Pacing, PacingConfig, SshConfig,
};
pub use error::{BounceError, BounceResult};
pub use inventory::{Inventory, SwitchTarget};
pub use transport::{CliSession, SessionConnector};
