//! Recording transport.
//!
//! [`RecordingConnector`] implements [`SessionConnector`] without touching
//! the network. Every connect attempt, line, pause and close is appended to
//! a shared event log, and failures can be injected per switch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use sonic_bounce_common::{BounceError, BounceResult, CliSession, SessionConnector};

use crate::verification::SessionLog;

/// One recorded transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was opened.
    Connect { switch: String },
    /// A connect attempt was refused.
    ConnectFailed { switch: String },
    /// A line was sent.
    Send { switch: String, line: String },
    /// A settling pause was requested.
    Settle { switch: String, pause: Duration },
    /// The session was closed.
    Close { switch: String },
}

impl SessionEvent {
    /// Switch the event belongs to.
    pub fn switch(&self) -> &str {
        match self {
            SessionEvent::Connect { switch }
            | SessionEvent::ConnectFailed { switch }
            | SessionEvent::Send { switch, .. }
            | SessionEvent::Settle { switch, .. }
            | SessionEvent::Close { switch } => switch,
        }
    }
}

#[derive(Debug, Default)]
struct RecorderState {
    events: Vec<SessionEvent>,
    /// Remaining refused connects per switch.
    refusals: HashMap<String, usize>,
    /// Line that fails when sent to a switch.
    failing_lines: HashMap<String, String>,
    failing_close: HashSet<String>,
}

/// Connector that records sessions instead of opening them.
///
/// Clones share the same log, so a test can keep one handle while the
/// orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    state: Arc<Mutex<RecorderState>>,
}

impl RecordingConnector {
    /// Creates a connector where every session succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connect to `switch` is refused.
    pub fn refuse_connect(self, switch: impl Into<String>) -> Self {
        self.refuse_connect_times(switch, usize::MAX)
    }

    /// The next `times` connects to `switch` are refused.
    pub fn refuse_connect_times(self, switch: impl Into<String>, times: usize) -> Self {
        self.state.lock().refusals.insert(switch.into(), times);
        self
    }

    /// Sending `line` to `switch` fails (the line is still recorded).
    pub fn fail_on_line(self, switch: impl Into<String>, line: impl Into<String>) -> Self {
        self.state
            .lock()
            .failing_lines
            .insert(switch.into(), line.into());
        self
    }

    /// Closing a session to `switch` fails (the close is still recorded).
    pub fn fail_on_close(self, switch: impl Into<String>) -> Self {
        self.state.lock().failing_close.insert(switch.into());
        self
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.state.lock().events.clone()
    }

    /// Snapshot wrapped for verification.
    pub fn log(&self) -> SessionLog {
        SessionLog::new(self.events())
    }

    fn record(&self, event: SessionEvent) {
        debug!(?event, "Recorded session event");
        self.state.lock().events.push(event);
    }
}

#[async_trait]
impl SessionConnector for RecordingConnector {
    async fn connect(&self, switch_ip: &str) -> BounceResult<Box<dyn CliSession>> {
        let refused = {
            let mut guard = self.state.lock();
            match guard.refusals.get_mut(switch_ip) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };

        if refused {
            self.record(SessionEvent::ConnectFailed {
                switch: switch_ip.to_string(),
            });
            return Err(BounceError::connection(switch_ip, "Connection refused"));
        }

        self.record(SessionEvent::Connect {
            switch: switch_ip.to_string(),
        });

        let (failing_line, failing_close) = {
            let guard = self.state.lock();
            (
                guard.failing_lines.get(switch_ip).cloned(),
                guard.failing_close.contains(switch_ip),
            )
        };

        Ok(Box::new(RecordingSession {
            switch: switch_ip.to_string(),
            connector: self.clone(),
            failing_line,
            failing_close,
        }))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Session handed out by [`RecordingConnector`].
struct RecordingSession {
    switch: String,
    connector: RecordingConnector,
    failing_line: Option<String>,
    failing_close: bool,
}

#[async_trait]
impl CliSession for RecordingSession {
    async fn send_line(&mut self, line: &str) -> BounceResult<()> {
        self.connector.record(SessionEvent::Send {
            switch: self.switch.clone(),
            line: line.to_string(),
        });

        if self.failing_line.as_deref() == Some(line) {
            return Err(BounceError::connection(
                &self.switch,
                "Connection reset by peer",
            ));
        }
        Ok(())
    }

    async fn settle(&mut self, pause: Duration) -> BounceResult<()> {
        self.connector.record(SessionEvent::Settle {
            switch: self.switch.clone(),
            pause,
        });

        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        Ok(())
    }

    async fn close(&mut self) -> BounceResult<()> {
        self.connector.record(SessionEvent::Close {
            switch: self.switch.clone(),
        });

        if self.failing_close {
            return Err(BounceError::connection(&self.switch, "Broken pipe"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_session() {
        let connector = RecordingConnector::new();

        let mut session = connector.connect("10.0.0.1").await.unwrap();
        session.send_line("enable").await.unwrap();
        session.settle(Duration::ZERO).await.unwrap();
        session.close().await.unwrap();

        assert_eq!(
            connector.events(),
            vec![
                SessionEvent::Connect {
                    switch: "10.0.0.1".to_string()
                },
                SessionEvent::Send {
                    switch: "10.0.0.1".to_string(),
                    line: "enable".to_string()
                },
                SessionEvent::Settle {
                    switch: "10.0.0.1".to_string(),
                    pause: Duration::ZERO
                },
                SessionEvent::Close {
                    switch: "10.0.0.1".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_refuse_connect_times() {
        let connector = RecordingConnector::new().refuse_connect_times("10.0.0.2", 1);

        assert!(connector.connect("10.0.0.2").await.is_err());
        assert!(connector.connect("10.0.0.2").await.is_ok());
        assert_eq!(
            connector.events()[0],
            SessionEvent::ConnectFailed {
                switch: "10.0.0.2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let connector = RecordingConnector::new()
            .fail_on_line("10.0.0.3", "config t")
            .fail_on_close("10.0.0.3");

        let mut session = connector.connect("10.0.0.3").await.unwrap();
        assert!(session.send_line("enable").await.is_ok());
        assert!(session.send_line("config t").await.is_err());
        assert!(session.close().await.is_err());
        assert_eq!(connector.events().len(), 4);
    }

    #[test]
    fn test_event_switch() {
        let event = SessionEvent::Settle {
            switch: "10.0.0.4".to_string(),
            pause: Duration::from_secs(1),
        };
        assert_eq!(event.switch(), "10.0.0.4");
    }
}
