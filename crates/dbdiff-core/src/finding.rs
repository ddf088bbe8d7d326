//! Finding codes and change reporting
//!
//! IMPORTANT: Finding codes are versioned and stable.
//! NEVER rename or remove codes - they appear in JSON reports.

use serde::{Deserialize, Serialize};

/// Rendering used for an entry that does not exist on one side
pub const MISSING_PLACEHOLDER: &str = "<missing>";

/// Finding code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    /// No definition covers the target version
    DefinitionMissingTarget,

    /// No definition covers the compare version
    DefinitionMissingCompare,

    /// The two definitions have a different number of entries
    EntryCountMismatch,

    /// The entry at an index differs
    EntryChanged,
}

impl FindingCode {
    /// Get the finding code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefinitionMissingTarget => "DEFINITION_MISSING_TARGET",
            Self::DefinitionMissingCompare => "DEFINITION_MISSING_COMPARE",
            Self::EntryCountMismatch => "ENTRY_COUNT_MISMATCH",
            Self::EntryChanged => "ENTRY_CHANGED",
        }
    }

    /// Whether findings with this code mark a definition as changed
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::EntryCountMismatch)
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reported difference or absence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable finding code
    pub code: FindingCode,

    /// Human-readable message
    pub message: String,

    /// Entry index (for entry findings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// Target-side rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Compare-side rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare: Option<String>,
}

impl Finding {
    /// Create a new finding with minimal fields
    pub fn new(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            index: None,
            target: None,
            compare: None,
        }
    }

    /// No definition for the target version
    pub fn missing_target() -> Self {
        Self::new(
            FindingCode::DefinitionMissingTarget,
            "Unable to find target version definition.",
        )
    }

    /// No definition for the compare version
    pub fn missing_compare() -> Self {
        Self::new(
            FindingCode::DefinitionMissingCompare,
            "Unable to find compare version definition.",
        )
    }

    /// Entry counts differ
    pub fn count_mismatch(target_len: usize, compare_len: usize) -> Self {
        Self::new(FindingCode::EntryCountMismatch, "Entry count different.")
            .with_comparison(target_len.to_string(), compare_len.to_string())
    }

    /// Entry at `index` differs
    pub fn entry_changed(
        index: usize,
        target: impl Into<String>,
        compare: impl Into<String>,
    ) -> Self {
        let mut finding = Self::new(FindingCode::EntryChanged, format!("- Change at row {} - ", index))
            .with_comparison(target, compare);
        finding.index = Some(index);
        finding
    }

    /// Set target/compare renderings
    pub fn with_comparison(mut self, target: impl Into<String>, compare: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self.compare = Some(compare.into());
        self
    }

    /// Whether this finding marks the definition as changed
    pub fn is_change(&self) -> bool {
        self.code.is_change()
    }

    /// Output lines for this finding.
    ///
    /// Count mismatches are only shown in verbose mode. Entry changes print
    /// the header followed by both renderings.
    pub fn lines(&self, verbose: bool) -> Vec<String> {
        match self.code {
            FindingCode::EntryCountMismatch if !verbose => Vec::new(),
            FindingCode::EntryChanged => {
                let mut lines = vec![self.message.clone()];
                lines.extend(self.target.clone());
                lines.extend(self.compare.clone());
                lines
            }
            _ => vec![self.message.clone()],
        }
    }
}
