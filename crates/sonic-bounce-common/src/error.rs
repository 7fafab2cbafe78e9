//! Error types for intfbounce operations.
//!
//! This module defines the error types used throughout the intfbounce crates.
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for intfbounce operations.
pub type BounceResult<T> = Result<T, BounceError>;

/// Errors that can occur while loading inputs or driving switch sessions.
#[derive(Debug, Error)]
pub enum BounceError {
    /// Session establishment or use failed (network, authentication,
    /// channel setup, send, remote close, host key rejected).
    #[error("Connection to switch '{switch}' failed: {message}")]
    Connection {
        /// The switch address.
        switch: String,
        /// Underlying failure description.
        message: String,
    },

    /// The inventory document or source report is malformed.
    #[error("Invalid inventory at {location}: {message}")]
    InvalidInventory {
        /// Where the problem was found (switch, row, or document).
        location: String,
        /// Error message.
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on '{path}': {source}", path = .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl BounceError {
    /// Creates a connection error for a switch.
    pub fn connection(switch: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Connection {
            switch: switch.into(),
            message: message.to_string(),
        }
    }

    /// Creates an invalid inventory error.
    pub fn invalid_inventory(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInventory {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is scoped to a single switch session.
    ///
    /// Session errors are recorded and the run continues; every other kind
    /// aborts before any session opens.
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, BounceError::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_display() {
        let err = BounceError::connection("10.0.0.1", "Authentication failed");
        assert_eq!(
            err.to_string(),
            "Connection to switch '10.0.0.1' failed: Authentication failed"
        );
    }

    #[test]
    fn test_invalid_inventory_display() {
        let err = BounceError::invalid_inventory("switch 10.0.0.1", "duplicate ip");
        assert_eq!(
            err.to_string(),
            "Invalid inventory at switch 10.0.0.1: duplicate ip"
        );
    }

    #[test]
    fn test_io_display() {
        let err = BounceError::io(
            "/tmp/missing.json",
            io::Error::new(io::ErrorKind::NotFound, "No such file"),
        );
        assert!(err.to_string().contains("/tmp/missing.json"));
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn test_is_session_scoped() {
        assert!(BounceError::connection("10.0.0.1", "timeout").is_session_scoped());
        assert!(!BounceError::invalid_config("password", "missing").is_session_scoped());
        assert!(!BounceError::internal("bug").is_session_scoped());
    }
}
