//! Interactive CLI session abstractions.
//!
//! A [`SessionConnector`] opens one [`CliSession`] per switch visit. The
//! session driver only ever writes lines and waits; it never reads device
//! output, so the trait has no receive side.
//!
//! Implementations in this workspace:
//!
//! | Implementation | Crate | Purpose |
//! |----------------|-------|---------|
//! | `SshConnector` | `sonic-intfbounce` | Real switches over SSH |
//! | `DryRunConnector` | `sonic-intfbounce` | Log lines instead of sending |
//! | `RecordingConnector` | `sonic-bounce-test` | Capture sessions in tests |

use async_trait::async_trait;
use std::time::Duration;

use crate::error::BounceResult;

/// One open interactive command session to one switch.
#[async_trait]
pub trait CliSession: Send {
    /// Sends `line` followed by a line terminator.
    ///
    /// `line` must not contain a line break; callers validate inputs before
    /// a session is opened.
    async fn send_line(&mut self, line: &str) -> BounceResult<()>;

    /// Waits out a settling pause.
    ///
    /// Transports that receive device output while waiting should consume
    /// and discard it here.
    async fn settle(&mut self, pause: Duration) -> BounceResult<()> {
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        Ok(())
    }

    /// Closes the session. Called exactly once per opened session.
    async fn close(&mut self) -> BounceResult<()>;
}

/// Opens sessions to switches.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Opens an interactive session to `switch_ip`.
    ///
    /// On error no session exists and nothing needs closing.
    async fn connect(&self, switch_ip: &str) -> BounceResult<Box<dyn CliSession>>;

    /// Short name for logs (e.g. "ssh", "dry-run").
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    #[async_trait]
    impl CliSession for Silent {
        async fn send_line(&mut self, _line: &str) -> BounceResult<()> {
            Ok(())
        }

        async fn close(&mut self) -> BounceResult<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_settle_sleeps() {
        let mut session = Silent;
        let start = tokio::time::Instant::now();

        session.settle(Duration::from_secs(10)).await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_settle_returns_immediately() {
        let mut session = Silent;
        let start = tokio::time::Instant::now();

        session.settle(Duration::ZERO).await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
