//! Test fixtures for inventories, reports and expected command sequences

use std::time::Duration;

use sonic_bounce_common::{cli, Action, Inventory, Pacing, SwitchTarget};

/// Builds a switch target.
pub fn switch(ip: &str, interfaces: &[&str]) -> SwitchTarget {
    SwitchTarget::new(ip, interfaces.iter().copied())
}

/// Owned interface names.
pub fn interface_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Common inventory fixtures
pub mod inventory_fixtures {
    use super::*;

    /// One access switch with three uplink-facing ports.
    pub fn single_switch() -> Inventory {
        Inventory {
            switches: vec![switch("10.0.0.1", &["Gi1/0/1", "Gi1/0/2", "Gi1/0/3"])],
        }
    }

    /// Three switches of different sizes, as a wing of a campus would look.
    pub fn campus_fleet() -> Inventory {
        Inventory {
            switches: vec![
                switch("10.0.0.1", &["Gi1/0/1", "Gi1/0/2"]),
                switch("10.0.0.2", &["Gi1/0/10"]),
                switch("10.0.0.3", &["Te1/1/1", "Te1/1/2", "Te1/1/3"]),
            ],
        }
    }

    /// Fleet including a switch with nothing listed.
    pub fn fleet_with_empty_switch() -> Inventory {
        Inventory {
            switches: vec![
                switch("10.0.0.1", &["Gi1/0/1"]),
                switch("10.0.0.2", &[]),
            ],
        }
    }
}

/// Interface report fixtures (CSV)
pub mod report_fixtures {
    /// Minimal report from the grouping example.
    pub const GROUPING_REPORT: &str = "\
Switch IP,Interface
10.0.0.1,Gi1/1
10.0.0.1,Gi1/2
10.0.0.2,Gi1/1
";

    /// Access point export with extra columns and unordered rows.
    pub const AP_DETAILS_REPORT: &str = "\
AP Name,Switch IP,Interface,Model
ap-lobby-01,10.20.0.11,Gi1/0/5,C9120
ap-lobby-02,10.20.0.11,Gi1/0/6,C9120
ap-lab-01,10.20.0.12,Gi2/0/1,C9130
ap-lobby-03,10.20.0.11,Gi1/0/7,C9120
";

    /// Report missing the interface column.
    pub const MISSING_COLUMN_REPORT: &str = "\
Switch IP,Port
10.0.0.1,Gi1/1
";
}

/// Lines a visit must send for `interfaces` under `action`.
pub fn expected_session_lines(interfaces: &[String], action: Action) -> Vec<String> {
    let mut lines: Vec<String> = cli::preamble().iter().map(|s| s.to_string()).collect();
    for name in interfaces {
        lines.extend(cli::interface_commands(name, action));
    }
    lines
}

/// Pauses a visit must request for `interfaces` under `action`.
pub fn expected_pauses(interfaces: &[String], action: Action, pacing: Pacing) -> Vec<Duration> {
    let mut pauses = vec![pacing.command_delay; cli::preamble().len()];
    for _ in interfaces {
        pauses.push(pacing.command_delay);
        pauses.push(pacing.command_delay);
        if action.settles_link() {
            pauses.push(pacing.link_settle_delay);
        }
    }
    pauses
}

/// Wall-clock time a full run over `inventory` takes when every visit
/// succeeds.
pub fn expected_run_duration(inventory: &Inventory, pacing: Pacing) -> Duration {
    [Action::ShutDown, Action::NoShutDown]
        .into_iter()
        .flat_map(move |action| {
            inventory
                .iter()
                .map(move |t| expected_pauses(&t.interfaces, action, pacing))
        })
        .flatten()
        .sum()
}
