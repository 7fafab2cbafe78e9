//! Verification helpers for recorded sessions
//!
//! Groups the flat event log into switch visits and provides assertion
//! helpers for visit order and command sequences.

use std::time::Duration;
use thiserror::Error;

use sonic_bounce_common::Action;

use crate::recorder::SessionEvent;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected {expected} switch visits, found {actual}")]
    VisitCountMismatch { expected: usize, actual: usize },

    #[error("Visit {index} went to '{actual}', expected '{expected}'")]
    VisitOrderMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Visit to '{switch}' sent {actual:?}, expected {expected:?}")]
    LinesMismatch {
        switch: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Visit to '{switch}' was closed {count} times")]
    CloseCountMismatch { switch: String, count: usize },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Events of one switch visit, from connect attempt to close.
#[derive(Debug, Clone)]
pub struct Visit {
    /// Switch address.
    pub switch: String,
    /// Whether the connect attempt succeeded.
    pub connected: bool,
    /// Events after the connect attempt.
    pub events: Vec<SessionEvent>,
}

impl Visit {
    /// Lines sent during the visit, in order.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Send { line, .. } => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    /// Pauses requested during the visit, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Settle { pause, .. } => Some(*pause),
                _ => None,
            })
            .collect()
    }

    /// Sum of all pauses requested.
    pub fn total_pause(&self) -> Duration {
        self.pauses().into_iter().sum()
    }

    /// Number of close events.
    pub fn close_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Close { .. }))
            .count()
    }

    /// Action issued during the visit, judged from the lines sent.
    pub fn action(&self) -> Option<Action> {
        self.lines().iter().find_map(|line| match line.as_str() {
            l if l == Action::ShutDown.command() => Some(Action::ShutDown),
            l if l == Action::NoShutDown.command() => Some(Action::NoShutDown),
            _ => None,
        })
    }

    /// Checks the exact line sequence.
    pub fn assert_lines(&self, expected: &[String]) -> VerifyResult<()> {
        let actual = self.lines();
        if actual != expected {
            return Err(VerificationError::LinesMismatch {
                switch: self.switch.clone(),
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(())
    }

    /// Checks that an opened session was closed exactly once, and that a
    /// refused one was never closed.
    pub fn assert_closed_once(&self) -> VerifyResult<()> {
        let count = self.close_count();
        let expected = usize::from(self.connected);
        if count != expected {
            return Err(VerificationError::CloseCountMismatch {
                switch: self.switch.clone(),
                count,
            });
        }
        Ok(())
    }
}

/// Event log of a test run.
#[derive(Debug, Clone)]
pub struct SessionLog {
    events: Vec<SessionEvent>,
}

impl SessionLog {
    /// Wraps recorded events.
    pub fn new(events: Vec<SessionEvent>) -> Self {
        Self { events }
    }

    /// Raw events.
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Splits the log into visits. Sessions are sequential, so every
    /// connect attempt starts a new visit.
    pub fn visits(&self) -> Vec<Visit> {
        let mut visits: Vec<Visit> = Vec::new();

        for event in &self.events {
            match event {
                SessionEvent::Connect { switch } => visits.push(Visit {
                    switch: switch.clone(),
                    connected: true,
                    events: Vec::new(),
                }),
                SessionEvent::ConnectFailed { switch } => visits.push(Visit {
                    switch: switch.clone(),
                    connected: false,
                    events: Vec::new(),
                }),
                other => {
                    if let Some(current) = visits.last_mut() {
                        current.events.push(other.clone());
                    }
                }
            }
        }

        visits
    }

    /// Switch addresses in visit order.
    pub fn visit_order(&self) -> Vec<String> {
        self.visits().into_iter().map(|v| v.switch).collect()
    }

    /// Visits to one switch, in order.
    pub fn visits_to(&self, switch: &str) -> Vec<Visit> {
        self.visits()
            .into_iter()
            .filter(|v| v.switch == switch)
            .collect()
    }

    /// Checks the switch visit order.
    pub fn assert_visit_order(&self, expected: &[&str]) -> VerifyResult<()> {
        let actual = self.visit_order();
        if actual.len() != expected.len() {
            return Err(VerificationError::VisitCountMismatch {
                expected: expected.len(),
                actual: actual.len(),
            });
        }
        for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
            if a != e {
                return Err(VerificationError::VisitOrderMismatch {
                    index,
                    expected: e.to_string(),
                    actual: a.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(switch: &str, line: &str) -> SessionEvent {
        SessionEvent::Send {
            switch: switch.to_string(),
            line: line.to_string(),
        }
    }

    #[test]
    fn test_visits_grouping() {
        let log = SessionLog::new(vec![
            SessionEvent::ConnectFailed {
                switch: "10.0.0.1".to_string(),
            },
            SessionEvent::Connect {
                switch: "10.0.0.2".to_string(),
            },
            send("10.0.0.2", "enable"),
            send("10.0.0.2", "shutdown"),
            SessionEvent::Close {
                switch: "10.0.0.2".to_string(),
            },
        ]);

        let visits = log.visits();
        assert_eq!(visits.len(), 2);
        assert!(!visits[0].connected);
        assert!(visits[0].assert_closed_once().is_ok());
        assert_eq!(visits[1].lines(), vec!["enable", "shutdown"]);
        assert_eq!(visits[1].action(), Some(Action::ShutDown));
        assert!(visits[1].assert_closed_once().is_ok());
        assert!(log.assert_visit_order(&["10.0.0.1", "10.0.0.2"]).is_ok());
    }

    #[test]
    fn test_visit_order_mismatch() {
        let log = SessionLog::new(vec![SessionEvent::Connect {
            switch: "10.0.0.2".to_string(),
        }]);

        let err = log.assert_visit_order(&["10.0.0.1"]).unwrap_err();
        assert!(matches!(err, VerificationError::VisitOrderMismatch { index: 0, .. }));

        let err = log.assert_visit_order(&[]).unwrap_err();
        assert!(matches!(err, VerificationError::VisitCountMismatch { .. }));
    }

    #[test]
    fn test_unclosed_session_detected() {
        let log = SessionLog::new(vec![SessionEvent::Connect {
            switch: "10.0.0.3".to_string(),
        }]);

        assert!(log.visits()[0].assert_closed_once().is_err());
    }
}
