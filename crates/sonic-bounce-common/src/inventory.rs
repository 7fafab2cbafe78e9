//! Switch→interface inventory.
//!
//! The inventory document drives both stages of a run:
//!
//! ```json
//! {
//!     "switches": [
//!         { "ip": "10.0.0.1", "interfaces": ["Gi1/0/1", "Gi1/0/2"] },
//!         { "ip": "10.0.0.2", "interfaces": ["Gi1/0/1"] }
//!     ]
//! }
//! ```
//!
//! It is either loaded from JSON or built from an exported interface report
//! (CSV with `Switch IP` and `Interface` columns). Both paths validate the
//! result before handing it out, so the orchestrator never sees a malformed
//! target.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cli;
use crate::error::{BounceError, BounceResult};

/// Report column holding the switch address.
pub const CSV_SWITCH_IP_COLUMN: &str = "Switch IP";

/// Report column holding the interface name.
pub const CSV_INTERFACE_COLUMN: &str = "Interface";

/// One switch and the interfaces to bounce on it, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchTarget {
    /// Management address used to open the session.
    pub ip: String,
    /// Interface names, in the order they are processed.
    pub interfaces: Vec<String>,
}

impl SwitchTarget {
    /// Creates a target from an address and interface names.
    pub fn new<I, S>(ip: impl Into<String>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ip: ip.into(),
            interfaces: interfaces.into_iter().map(Into::into).collect(),
        }
    }
}

/// Validated inventory document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Switches in processing order.
    pub switches: Vec<SwitchTarget>,
}

impl Inventory {
    /// Builds an inventory from targets and validates it.
    pub fn new(switches: Vec<SwitchTarget>) -> BounceResult<Self> {
        let inventory = Self { switches };
        inventory.validate()?;
        Ok(inventory)
    }

    /// Loads and validates an inventory document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> BounceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BounceError::io(path, e))?;
        let inventory = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            switches = inventory.len(),
            interfaces = inventory.interface_count(),
            "Loaded inventory"
        );
        Ok(inventory)
    }

    /// Parses and validates an inventory document.
    pub fn from_json_str(content: &str) -> BounceResult<Self> {
        let inventory: Inventory = serde_json::from_str(content)
            .map_err(|e| BounceError::invalid_inventory("document", e.to_string()))?;
        inventory.validate()?;
        Ok(inventory)
    }

    /// Builds an inventory from an interface report.
    ///
    /// Rows are grouped by switch address. The first appearance of a switch
    /// fixes its position; interfaces keep report order within a switch.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> BounceResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| BounceError::invalid_inventory("report header", e.to_string()))?
            .clone();
        let ip_idx = column_index(&headers, CSV_SWITCH_IP_COLUMN)?;
        let intf_idx = column_index(&headers, CSV_INTERFACE_COLUMN)?;

        let mut switches: Vec<SwitchTarget> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (row, record) in rdr.records().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let record = record
                .map_err(|e| BounceError::invalid_inventory(format!("line {}", line), e.to_string()))?;

            let ip = record_field(&record, ip_idx, CSV_SWITCH_IP_COLUMN, line)?;
            let interface = record_field(&record, intf_idx, CSV_INTERFACE_COLUMN, line)?;

            match positions.get(ip) {
                Some(&pos) => switches[pos].interfaces.push(interface.to_string()),
                None => {
                    positions.insert(ip.to_string(), switches.len());
                    switches.push(SwitchTarget::new(ip, [interface]));
                }
            }
        }

        debug!(switches = switches.len(), "Grouped interface report");
        Self::new(switches)
    }

    /// Builds an inventory from an interface report on disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> BounceResult<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| BounceError::io(path, e))?;
        Self::from_csv_reader(io::BufReader::new(file))
    }

    /// Serializes the document with four-space indentation.
    pub fn to_json_string(&self) -> BounceResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| BounceError::internal(format!("Failed to serialize inventory: {}", e)))?;
        String::from_utf8(buf)
            .map_err(|e| BounceError::internal(format!("Inventory is not UTF-8: {}", e)))
    }

    /// Writes the document to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> BounceResult<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|e| BounceError::io(path, e))?;
        info!(
            path = %path.display(),
            switches = self.len(),
            interfaces = self.interface_count(),
            "Wrote inventory"
        );
        Ok(())
    }

    /// Checks every target; the first problem found is returned.
    pub fn validate(&self) -> BounceResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (idx, target) in self.switches.iter().enumerate() {
            let ip = target.ip.trim();
            if ip.is_empty() {
                return Err(BounceError::invalid_inventory(
                    format!("switches[{}]", idx),
                    "ip is empty",
                ));
            }
            if target.ip.chars().any(char::is_whitespace) || !cli::is_single_line(&target.ip) {
                return Err(BounceError::invalid_inventory(
                    format!("switches[{}]", idx),
                    format!("ip {:?} contains whitespace or control characters", target.ip),
                ));
            }
            if !seen.insert(target.ip.as_str()) {
                return Err(BounceError::invalid_inventory(
                    format!("switch {}", target.ip),
                    "ip appears more than once",
                ));
            }

            for (pos, name) in target.interfaces.iter().enumerate() {
                if name.trim().is_empty() {
                    return Err(BounceError::invalid_inventory(
                        format!("switch {} interfaces[{}]", target.ip, pos),
                        "interface name is empty",
                    ));
                }
                if !cli::is_single_line(name) {
                    return Err(BounceError::invalid_inventory(
                        format!("switch {} interfaces[{}]", target.ip, pos),
                        format!("interface name {:?} contains control characters", name),
                    ));
                }
            }

            if target.interfaces.is_empty() {
                warn!(switch = %target.ip, "Switch has no interfaces listed");
            }
        }

        Ok(())
    }

    /// Number of switches.
    pub fn len(&self) -> usize {
        self.switches.len()
    }

    /// Returns true if no switch is listed.
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Total number of interfaces across all switches.
    pub fn interface_count(&self) -> usize {
        self.switches.iter().map(|s| s.interfaces.len()).sum()
    }

    /// Iterates targets in processing order.
    pub fn iter(&self) -> std::slice::Iter<'_, SwitchTarget> {
        self.switches.iter()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a SwitchTarget;
    type IntoIter = std::slice::Iter<'a, SwitchTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn column_index(headers: &csv::StringRecord, column: &str) -> BounceResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            BounceError::invalid_inventory(
                "report header",
                format!("missing required column '{}'", column),
            )
        })
}

fn record_field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> BounceResult<&'r str> {
    let value = record.get(idx).map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(BounceError::invalid_inventory(
            format!("line {}", line),
            format!("'{}' is empty", column),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
Switch IP,Interface,AP Name
10.0.0.1,Gi1/1,ap-lobby
10.0.0.1,Gi1/2,ap-hall
10.0.0.2,Gi1/1,ap-office
";

    #[test]
    fn test_csv_grouping_preserves_first_seen_order() {
        let inventory = Inventory::from_csv_reader(REPORT.as_bytes()).unwrap();

        assert_eq!(
            inventory.switches,
            vec![
                SwitchTarget::new("10.0.0.1", ["Gi1/1", "Gi1/2"]),
                SwitchTarget::new("10.0.0.2", ["Gi1/1"]),
            ]
        );
    }

    #[test]
    fn test_csv_grouping_interleaved_rows() {
        let report = "\
Interface,Switch IP
Gi1/3,10.0.0.2
Gi1/1,10.0.0.1
Gi1/2,10.0.0.2
Gi1/9,10.0.0.1
";
        let inventory = Inventory::from_csv_reader(report.as_bytes()).unwrap();

        assert_eq!(
            inventory.switches,
            vec![
                SwitchTarget::new("10.0.0.2", ["Gi1/3", "Gi1/2"]),
                SwitchTarget::new("10.0.0.1", ["Gi1/1", "Gi1/9"]),
            ]
        );
    }

    #[test]
    fn test_csv_missing_column() {
        let report = "Switch IP,Port\n10.0.0.1,Gi1/1\n";
        let err = Inventory::from_csv_reader(report.as_bytes()).unwrap_err();

        assert!(matches!(err, BounceError::InvalidInventory { .. }));
        assert!(err.to_string().contains("'Interface'"));
    }

    #[test]
    fn test_csv_empty_value_names_line() {
        let report = "Switch IP,Interface\n10.0.0.1,Gi1/1\n10.0.0.1,\n";
        let err = Inventory::from_csv_reader(report.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_json_round_trip_uses_four_space_indent() {
        let inventory = Inventory::from_csv_reader(REPORT.as_bytes()).unwrap();
        let json = inventory.to_json_string().unwrap();

        assert!(json.starts_with("{\n    \"switches\": ["));
        assert_eq!(Inventory::from_json_str(&json).unwrap(), inventory);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switch_interfaces.json");
        fs::write(
            &path,
            r#"{"switches": [{"ip": "10.1.1.1", "interfaces": ["Te1/0/1"], "site": "b2"}]}"#,
        )
        .unwrap();

        let inventory = Inventory::load(&path).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.interface_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Inventory::load("/nonexistent/switch_interfaces.json").unwrap_err();
        assert!(matches!(err, BounceError::Io { .. }));
    }

    #[test]
    fn test_rejects_missing_switches_key() {
        let err = Inventory::from_json_str(r#"{"devices": []}"#).unwrap_err();
        assert!(matches!(err, BounceError::InvalidInventory { .. }));
    }

    #[test]
    fn test_rejects_wrong_field_type() {
        let err =
            Inventory::from_json_str(r#"{"switches": [{"ip": "10.0.0.1", "interfaces": "Gi1/1"}]}"#)
                .unwrap_err();
        assert!(matches!(err, BounceError::InvalidInventory { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ip() {
        let err = Inventory::new(vec![
            SwitchTarget::new("10.0.0.1", ["Gi1/1"]),
            SwitchTarget::new("10.0.0.1", ["Gi1/2"]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(Inventory::new(vec![SwitchTarget::new("", ["Gi1/1"])]).is_err());
        assert!(Inventory::new(vec![SwitchTarget::new("10.0.0.1 ", ["Gi1/1"])]).is_err());
        assert!(Inventory::new(vec![SwitchTarget::new("10.0.0.1", [" "])]).is_err());
        assert!(Inventory::new(vec![SwitchTarget::new("10.0.0.1", ["Gi1/1\nreload"])]).is_err());
    }

    #[test]
    fn test_accepts_empty_interface_list() {
        let inventory =
            Inventory::new(vec![SwitchTarget::new("10.0.0.1", Vec::<String>::new())]).unwrap();
        assert_eq!(inventory.interface_count(), 0);
    }
}
