//! StageOrchestrator - fleet-wide two-stage rollout.
//!
//! Stage 1 shuts down every listed interface on every switch. Stage 2 only
//! starts once every switch has had its Stage 1 attempt, and re-enables the
//! same interfaces in the same order with the link settle delay between them.
//! A switch that failed in Stage 1 is still visited in Stage 2.

use std::fmt;

use tracing::{info, warn};

use sonic_bounce_common::{Action, BounceError, BounceResult, Inventory, Pacing, SessionConnector};

use crate::session::SessionDriver;

/// Rollout stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Shut down all interfaces on all switches.
    Stage1,
    /// Bring all interfaces back up, settling after each.
    Stage2,
}

impl Stage {
    /// First stage of every run.
    pub const FIRST: Stage = Stage::Stage1;

    /// Action applied by this stage.
    pub fn action(&self) -> Action {
        match self {
            Stage::Stage1 => Action::ShutDown,
            Stage::Stage2 => Action::NoShutDown,
        }
    }

    /// Stage that follows this one, if any.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Stage1 => Some(Stage::Stage2),
            Stage::Stage2 => None,
        }
    }

    /// Human readable description for progress logs.
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Stage1 => "Shutting down all interfaces on all switches",
            Stage::Stage2 => "Bringing up all interfaces with a delay",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Stage1 => f.write_str("Stage 1"),
            Stage::Stage2 => f.write_str("Stage 2"),
        }
    }
}

/// Result of one switch visit.
#[derive(Debug)]
pub struct SwitchOutcome {
    /// Switch address.
    pub ip: String,
    /// Number of interfaces the visit was asked to touch.
    pub interfaces: usize,
    /// What the session driver returned.
    pub result: BounceResult<()>,
}

impl SwitchOutcome {
    /// Returns true if the visit completed.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the captured error, if the visit failed.
    pub fn error(&self) -> Option<&BounceError> {
        self.result.as_ref().err()
    }
}

/// Outcomes of one stage, in visit order.
#[derive(Debug)]
pub struct StageReport {
    /// Which stage.
    pub stage: Stage,
    /// One entry per switch.
    pub outcomes: Vec<SwitchOutcome>,
}

impl StageReport {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            outcomes: Vec::new(),
        }
    }

    /// Number of switches visited.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of visits that completed.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Addresses of switches whose visit failed.
    pub fn failed_switches(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.ip.as_str())
            .collect()
    }
}

/// Outcomes of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Stage reports in execution order.
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Report for a given stage, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Total switch visits across stages.
    pub fn total_attempts(&self) -> usize {
        self.stages.iter().map(StageReport::attempted).sum()
    }

    /// Total failed visits across stages.
    pub fn failure_count(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.attempted() - s.succeeded())
            .sum()
    }

    /// Returns true if every visit completed.
    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Runs the two stages over an inventory.
pub struct StageOrchestrator<C> {
    driver: SessionDriver<C>,
}

impl<C: SessionConnector> StageOrchestrator<C> {
    /// Creates an orchestrator over a connector and pacing.
    pub fn new(connector: C, pacing: Pacing) -> Self {
        Self::with_driver(SessionDriver::new(connector, pacing))
    }

    /// Creates an orchestrator over an existing driver.
    pub fn with_driver(driver: SessionDriver<C>) -> Self {
        Self { driver }
    }

    /// Returns the session driver.
    pub fn driver(&self) -> &SessionDriver<C> {
        &self.driver
    }

    /// Runs Stage 1 across the whole inventory, then Stage 2.
    ///
    /// Per-switch results are recorded but never consulted: every switch is
    /// visited once per stage whatever happened before.
    pub async fn run(&self, inventory: &Inventory) -> RunReport {
        let mut report = RunReport::default();
        let mut stage = Some(Stage::FIRST);

        while let Some(current) = stage {
            report.stages.push(self.run_stage(current, inventory).await);
            stage = current.next();
        }

        if report.is_clean() {
            info!(
                "Run complete: {} switch visits, no failures",
                report.total_attempts()
            );
        } else {
            warn!(
                "Run complete: {} switch visits, {} failed",
                report.total_attempts(),
                report.failure_count()
            );
        }

        report
    }

    /// Visits every switch once with the stage's action.
    async fn run_stage(&self, stage: Stage, inventory: &Inventory) -> StageReport {
        info!("Starting {}: {}.", stage, stage.description());

        let action = stage.action();
        let mut stage_report = StageReport::new(stage);

        for target in inventory {
            let result = self
                .driver
                .configure_interfaces(&target.ip, &target.interfaces, action)
                .await;

            stage_report.outcomes.push(SwitchOutcome {
                ip: target.ip.clone(),
                interfaces: target.interfaces.len(),
                result,
            });
        }

        let failed = stage_report.failed_switches();
        if failed.is_empty() {
            info!(
                "{} finished: {}/{} switches configured",
                stage,
                stage_report.succeeded(),
                stage_report.attempted()
            );
        } else {
            warn!(
                "{} finished: {}/{} switches configured, failed: {}",
                stage,
                stage_report.succeeded(),
                stage_report.attempted(),
                failed.join(", ")
            );
        }

        stage_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_machine() {
        assert_eq!(Stage::FIRST, Stage::Stage1);
        assert_eq!(Stage::Stage1.next(), Some(Stage::Stage2));
        assert_eq!(Stage::Stage2.next(), None);
        assert_eq!(Stage::Stage1.action(), Action::ShutDown);
        assert_eq!(Stage::Stage2.action(), Action::NoShutDown);
        assert_eq!(Stage::Stage2.to_string(), "Stage 2");
    }

    #[test]
    fn test_report_counts() {
        let mut stage1 = StageReport::new(Stage::Stage1);
        stage1.outcomes.push(SwitchOutcome {
            ip: "10.0.0.1".to_string(),
            interfaces: 2,
            result: Ok(()),
        });
        stage1.outcomes.push(SwitchOutcome {
            ip: "10.0.0.2".to_string(),
            interfaces: 1,
            result: Err(BounceError::connection("10.0.0.2", "timed out")),
        });

        assert_eq!(stage1.attempted(), 2);
        assert_eq!(stage1.succeeded(), 1);
        assert_eq!(stage1.failed_switches(), vec!["10.0.0.2"]);
        assert!(stage1.outcomes[1].error().is_some());

        let report = RunReport {
            stages: vec![stage1, StageReport::new(Stage::Stage2)],
        };
        assert_eq!(report.total_attempts(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.is_clean());
        assert!(report.stage(Stage::Stage2).is_some());
    }
}
