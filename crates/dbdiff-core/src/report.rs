//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use crate::finding::Finding;
use crate::version::VersionKey;
use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Findings for a single definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// File name
    pub file: String,

    /// Findings in emission order
    pub findings: Vec<Finding>,

    /// Parse failure message, when the file could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiffReport {
    /// Create a report for a file
    pub fn new(file: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            file: file.into(),
            findings,
            error: None,
        }
    }

    /// Create a report for a file that failed to parse
    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            findings: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// A definition changed if it went missing on one side or an entry changed
    pub fn is_changed(&self) -> bool {
        self.findings.iter().any(Finding::is_change)
    }
}

/// Run-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Definition files enumerated
    pub files_found: usize,

    /// Files where at least one version resolved
    pub checked: usize,

    /// Files whose definitions changed
    pub changed: usize,

    /// Files skipped because they failed to parse
    pub parse_failures: usize,
}

impl Summary {
    /// Final verbose summary line
    pub fn summary_line(&self) -> String {
        format!("{} definitions checked, {} changes.", self.checked, self.changed)
    }
}

/// Diff run report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Target client version
    pub target_version: VersionKey,

    /// Client version compared against
    pub compare_version: VersionKey,

    /// Summary counters
    pub summary: Summary,

    /// Per-file reports for every checked file
    pub files: Vec<DiffReport>,
}

impl RunReport {
    /// Create a new empty report
    pub fn new(target_version: VersionKey, compare_version: VersionKey) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            target_version,
            compare_version,
            summary: Summary::default(),
            files: Vec::new(),
        }
    }

    /// Record a checked file and update counters
    pub fn add_file(&mut self, report: DiffReport) {
        if report.error.is_some() {
            self.summary.parse_failures += 1;
        } else {
            self.summary.checked += 1;
            if report.is_changed() {
                self.summary.changed += 1;
            }
        }

        self.files.push(report);
    }

    /// Check if any file changed
    pub fn has_changes(&self) -> bool {
        self.summary.changed > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (VersionKey, VersionKey) {
        (VersionKey::new(1, 0, 0, 1), VersionKey::new(1, 0, 0, 2))
    }

    #[test]
    fn empty_report() {
        let (target, compare) = keys();
        let report = RunReport::new(target, compare);
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary, Summary::default());
        assert!(!report.has_changes());
    }

    #[test]
    fn counters_follow_file_reports() {
        let (target, compare) = keys();
        let mut report = RunReport::new(target, compare);

        report.add_file(DiffReport::new("A.dbd", vec![]));
        report.add_file(DiffReport::new("B.dbd", vec![Finding::entry_changed(3, "X", "Y")]));
        report.add_file(DiffReport::new("C.dbd", vec![Finding::count_mismatch(1, 2)]));
        report.add_file(DiffReport::failed("D.dbd", "line 1: missing COLUMNS"));

        assert_eq!(report.summary.checked, 3);
        assert_eq!(report.summary.changed, 1);
        assert_eq!(report.summary.parse_failures, 1);
        assert_eq!(report.summary.summary_line(), "3 definitions checked, 1 changes.");
    }

    #[test]
    fn report_serialization() {
        let (target, compare) = keys();
        let json = RunReport::new(target, compare).to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"target_version\""));
        assert!(json.contains("\"files\""));
    }
}
