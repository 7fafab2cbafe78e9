//! Report → inventory document integration tests
//!
//! Writes interface reports to disk, converts them, and loads the written
//! document back the way a run would.

use pretty_assertions::assert_eq;
use std::fs;

use sonic_bounce_common::{BounceError, Inventory, SwitchTarget};
use sonic_bounce_test::report_fixtures;

#[test]
fn test_grouping_example() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("report.csv");
    let json_path = dir.path().join("switch_interfaces.json");
    fs::write(&csv_path, report_fixtures::GROUPING_REPORT).unwrap();

    Inventory::from_csv_path(&csv_path)
        .unwrap()
        .write(&json_path)
        .unwrap();

    let loaded = Inventory::load(&json_path).unwrap();
    assert_eq!(
        loaded.switches,
        vec![
            SwitchTarget::new("10.0.0.1", ["Gi1/1", "Gi1/2"]),
            SwitchTarget::new("10.0.0.2", ["Gi1/1"]),
        ]
    );
}

#[test]
fn test_ap_details_export() {
    let inventory = Inventory::from_csv_reader(report_fixtures::AP_DETAILS_REPORT.as_bytes()).unwrap();

    assert_eq!(inventory.len(), 2);
    assert_eq!(
        inventory.switches[0],
        SwitchTarget::new("10.20.0.11", ["Gi1/0/5", "Gi1/0/6", "Gi1/0/7"])
    );
    assert_eq!(
        inventory.switches[1],
        SwitchTarget::new("10.20.0.12", ["Gi2/0/1"])
    );
}

#[test]
fn test_written_document_shape() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("switch_interfaces.json");

    Inventory::from_csv_reader(report_fixtures::GROUPING_REPORT.as_bytes())
        .unwrap()
        .write(&json_path)
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(raw["switches"][0]["ip"], "10.0.0.1");
    assert_eq!(raw["switches"][0]["interfaces"][1], "Gi1/2");
    assert_eq!(raw["switches"][1]["interfaces"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_column_rejected() {
    let err =
        Inventory::from_csv_reader(report_fixtures::MISSING_COLUMN_REPORT.as_bytes()).unwrap_err();
    assert!(matches!(err, BounceError::InvalidInventory { .. }));
}

#[test]
fn test_missing_report_is_io_error() {
    let err = Inventory::from_csv_path("/nonexistent/report.csv").unwrap_err();
    assert!(matches!(err, BounceError::Io { .. }));
}
