//! Formatted output helpers for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use berth_common::types::{ContainerConfig, RunningContainer};
use berth_runtime::engine::ReconcileReport;

/// Placeholder for empty columns.
const NONE: &str = "-";

fn or_none(value: &str) -> &str {
    if value.is_empty() { NONE } else { value }
}

/// Renders registry records as a table.
#[must_use]
pub fn container_table(rows: &[ContainerConfig]) -> String {
    let mut out = format!(
        "{:<6} {:<20} {:<30} {:<25} {:<20} {}\n",
        "ID", "NAME", "IMAGE", "HOST", "PORTS", "VOLUMES"
    );
    for c in rows {
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:<30} {:<25} {:<20} {}",
            c.id,
            c.name,
            c.image,
            c.domain().unwrap_or(NONE),
            or_none(&c.ports),
            or_none(&c.volumes),
        );
    }
    out
}

/// Renders a `hostPort -> containerPort` map as `80->32768, 443->32769`.
#[must_use]
pub fn format_ports(ports: &BTreeMap<u16, u16>) -> String {
    if ports.is_empty() {
        return NONE.to_string();
    }
    ports
        .iter()
        .map(|(host, container)| format!("{host}->{container}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders running containers with their published ports.
#[must_use]
pub fn running_table(rows: &[RunningContainer]) -> String {
    let mut out = format!("{:<30} {}\n", "NAME", "PORTS");
    for c in rows {
        let _ = writeln!(out, "{:<30} {}", c.name, format_ports(&c.ports));
    }
    out
}

/// Summarizes a reconcile pass, one line per failure.
#[must_use]
pub fn reconcile_summary(report: &ReconcileReport) -> String {
    let mut out = format!(
        "refreshed {} of {} stopped container(s)\n",
        report.attempted.len() - report.failed.len(),
        report.attempted.len()
    );
    for failure in &report.failed {
        let _ = writeln!(out, "  {}: {}", failure.name, failure.error);
    }
    out
}

#[cfg(test)]
mod tests {
    use berth_common::types::RecordId;
    use berth_runtime::engine::ReconcileFailure;

    use super::*;

    #[test]
    fn container_table_marks_empty_columns() {
        let rows = vec![ContainerConfig {
            id: RecordId::new(3),
            name: "web".into(),
            image: "web:latest".into(),
            host: Some(String::new()),
            ports: "80:80".into(),
            volumes: String::new(),
        }];
        let table = container_table(&rows);
        let line = table.lines().nth(1).expect("row");

        assert!(table.starts_with("ID"));
        assert!(line.starts_with("3 "));
        assert!(line.contains("80:80"));
        assert!(line.trim_end().ends_with('-'));
    }

    #[test]
    fn format_ports_lists_host_then_container() {
        let ports = BTreeMap::from([(443, 32769), (80, 32768)]);
        assert_eq!(format_ports(&ports), "80->32768, 443->32769");
        assert_eq!(format_ports(&BTreeMap::new()), "-");
    }

    #[test]
    fn running_table_has_one_row_per_container() {
        let rows = vec![
            RunningContainer {
                name: "a".into(),
                ports: BTreeMap::new(),
            },
            RunningContainer {
                name: "b".into(),
                ports: BTreeMap::from([(80, 8080)]),
            },
        ];
        let table = running_table(&rows);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("80->8080"));
    }

    #[test]
    fn reconcile_summary_lists_failures() {
        let report = ReconcileReport {
            attempted: vec!["a".into(), "b".into()],
            failed: vec![ReconcileFailure {
                name: "b".into(),
                error: "failed to pull b:latest".into(),
            }],
        };
        let summary = reconcile_summary(&report);
        assert!(summary.starts_with("refreshed 1 of 2"));
        assert!(summary.contains("  b: failed to pull b:latest"));
    }
}
