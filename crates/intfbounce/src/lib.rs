//! Two-stage interface bounce over switch CLI sessions.
//!
//! This crate implements `intfbounce`, which takes an inventory of switches
//! and interfaces and, across the whole fleet:
//!
//! 1. Stage 1: logs into every switch and shuts down every listed interface
//! 2. Stage 2: logs into every switch again and re-enables the same
//!    interfaces, pausing after each one so the link can settle
//!
//! Stage 2 never starts before every switch has had its Stage 1 attempt.
//! A failure on one switch is logged, recorded in the [`RunReport`], and the
//! run moves on.
//!
//! # Components
//!
//! | Type | Role |
//! |------|------|
//! | [`StageOrchestrator`] | Runs both stages over the inventory |
//! | [`SessionDriver`] | Sends the command sequence for one switch visit |
//! | [`SshConnector`] | SSH transport |
//! | [`DryRunConnector`] | Transport that only logs |
//!
//! # Example
//!
//! ```ignore
//! use sonic_intfbounce::{SshConnector, StageOrchestrator};
//! use sonic_bounce_common::{BounceConfig, Inventory};
//!
//! let config = BounceConfig::load_or_default("/etc/intfbounce.toml")?.with_password_from_env();
//! let inventory = Inventory::load("switch_interfaces.json")?;
//! let orchestrator = StageOrchestrator::new(SshConnector::new(&config)?, config.pacing.pacing());
//! let report = orchestrator.run(&inventory).await;
//! ```

mod dry_run;
mod orchestrator;
mod session;
mod ssh;

pub use dry_run::{DryRunConnector, DryRunSession};
pub use orchestrator::{RunReport, Stage, StageOrchestrator, StageReport, SwitchOutcome};
pub use session::SessionDriver;
pub use ssh::{SshConnector, SshSession};
