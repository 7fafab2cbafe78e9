//! Dry-run transport: logs what would be sent, touches nothing.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use sonic_bounce_common::{BounceResult, CliSession, SessionConnector};

/// Connector whose sessions only log their lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunConnector;

impl DryRunConnector {
    /// Creates a dry-run connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionConnector for DryRunConnector {
    async fn connect(&self, switch_ip: &str) -> BounceResult<Box<dyn CliSession>> {
        info!(switch = %switch_ip, "[dry-run] would open session");
        Ok(Box::new(DryRunSession {
            switch: switch_ip.to_string(),
            lines: 0,
        }))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

/// Session that counts and logs lines.
#[derive(Debug)]
pub struct DryRunSession {
    switch: String,
    lines: usize,
}

#[async_trait]
impl CliSession for DryRunSession {
    async fn send_line(&mut self, line: &str) -> BounceResult<()> {
        self.lines += 1;
        info!(switch = %self.switch, "[dry-run] {}", line);
        Ok(())
    }

    async fn settle(&mut self, pause: Duration) -> BounceResult<()> {
        debug!(switch = %self.switch, ?pause, "[dry-run] skipping pause");
        Ok(())
    }

    async fn close(&mut self) -> BounceResult<()> {
        info!(switch = %self.switch, lines = self.lines, "[dry-run] would close session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_never_waits() {
        let connector = DryRunConnector::new();
        let mut session = connector.connect("10.0.0.1").await.unwrap();
        let start = tokio::time::Instant::now();

        session.send_line("enable").await.unwrap();
        session.settle(Duration::from_secs(10)).await.unwrap();
        session.close().await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(connector.name(), "dry-run");
    }
}
