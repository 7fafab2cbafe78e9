//! Test infrastructure for intfbounce
//!
//! Provides:
//! - A recording transport with per-switch failure injection
//! - Inventory, report and expected-sequence fixtures
//! - Visit grouping and assertion helpers

pub mod fixtures;
mod recorder;
mod verification;

pub use fixtures::*;
pub use recorder::{RecordingConnector, SessionEvent};
pub use verification::*;
