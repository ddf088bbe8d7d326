//! Definition diff engine
//!
//! Compares the definition resolved for the target version against the one
//! resolved for the compare version. Entries are matched by position only.

use dbdiff_core::{Definition, Entry, Finding, FindingCode, MISSING_PLACEHOLDER};

/// Comparison options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Treat entry comments as significant
    pub compare_comments: bool,
}

/// An entry position on one side of the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySlot<'a> {
    /// The definition has an entry at this index
    Present(&'a Entry),

    /// The definition is shorter than this index
    Missing,
}

impl<'a> EntrySlot<'a> {
    /// Canonical rendering, `<missing>` for absent entries
    pub fn render(&self) -> String {
        match self {
            Self::Present(entry) => entry.to_string(),
            Self::Missing => MISSING_PLACEHOLDER.to_string(),
        }
    }

    /// Compare two slots. A missing slot never equals a present one.
    pub fn matches(&self, other: &EntrySlot<'_>, options: &DiffOptions) -> bool {
        match (self, other) {
            (EntrySlot::Present(a), EntrySlot::Present(b)) => {
                if options.compare_comments {
                    a == b
                } else {
                    a.same_layout(b)
                }
            }
            (EntrySlot::Missing, EntrySlot::Missing) => true,
            _ => false,
        }
    }
}

/// Entry at `index`, or `Missing` past the end
pub fn entry_at(entries: &[Entry], index: usize) -> EntrySlot<'_> {
    entries.get(index).map_or(EntrySlot::Missing, EntrySlot::Present)
}

/// Result of comparing two resolved definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionDiff {
    /// Findings in emission order
    pub findings: Vec<Finding>,
}

impl DefinitionDiff {
    /// Compare the target and compare definitions.
    ///
    /// Returns `None` when neither side resolved; such files are not
    /// reported at all.
    pub fn compare(
        target: Option<&Definition>,
        compare: Option<&Definition>,
        options: &DiffOptions,
    ) -> Option<Self> {
        let findings = match (target, compare) {
            (None, None) => return None,
            (None, Some(_)) => vec![Finding::missing_target()],
            (Some(_), None) => vec![Finding::missing_compare()],
            (Some(target), Some(compare)) => compare_entries(&target.entries, &compare.entries, options),
        };

        Some(Self { findings })
    }

    /// Whether the definition changed between the two versions
    pub fn is_changed(&self) -> bool {
        self.findings.iter().any(Finding::is_change)
    }

    /// Indices flagged as changed
    pub fn changed_indices(&self) -> Vec<usize> {
        self.findings
            .iter()
            .filter(|f| f.code == FindingCode::EntryChanged)
            .filter_map(|f| f.index)
            .collect()
    }

    /// Count of changed entries
    pub fn change_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.code == FindingCode::EntryChanged)
            .count()
    }
}

fn compare_entries(target: &[Entry], compare: &[Entry], options: &DiffOptions) -> Vec<Finding> {
    let mut findings = Vec::new();

    if target.len() != compare.len() {
        findings.push(Finding::count_mismatch(target.len(), compare.len()));
    }

    // Every index up to and including the last entry of the longer side
    let longest = target.len().max(compare.len());
    for index in 0..longest {
        let target_slot = entry_at(target, index);
        let compare_slot = entry_at(compare, index);

        if !target_slot.matches(&compare_slot, options) {
            findings.push(Finding::entry_changed(
                index,
                target_slot.render(),
                compare_slot.render(),
            ));
        }
    }

    findings
}
