//! Version to definition resolution

use dbdiff_core::{Definition, DefinitionFile, VersionKey};

/// Find the definition covering `key`.
///
/// Definitions are scanned in file order and the last match wins, so a
/// later definition claiming the same build shadows an earlier one.
pub fn resolve<'a>(file: &'a DefinitionFile, key: &VersionKey) -> Option<&'a Definition> {
    file.definitions.iter().rev().find(|definition| definition.covers(key))
}

/// Target and compare definitions resolved independently
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPair<'a> {
    pub target: Option<&'a Definition>,
    pub compare: Option<&'a Definition>,
}

impl<'a> ResolvedPair<'a> {
    /// True when neither version has a definition in the file
    pub fn is_unresolved(&self) -> bool {
        self.target.is_none() && self.compare.is_none()
    }
}

/// Resolve both versions against the same file
pub fn resolve_pair<'a>(
    file: &'a DefinitionFile,
    target: &VersionKey,
    compare: &VersionKey,
) -> ResolvedPair<'a> {
    let pair = ResolvedPair {
        target: resolve(file, target),
        compare: resolve(file, compare),
    };

    tracing::debug!(
        file = %file.name,
        target = %target,
        compare = %compare,
        target_found = pair.target.is_some(),
        compare_found = pair.compare.is_some(),
        "resolved definitions"
    );

    pair
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdiff_core::Entry;

    fn definition(builds: &[&str], column: &str) -> Definition {
        Definition::new(
            builds.iter().map(|b| b.parse().unwrap()).collect(),
            vec![Entry::new(column)],
        )
    }

    fn sample_file() -> DefinitionFile {
        let mut file = DefinitionFile::new("Sample.dbd");
        file.definitions = vec![
            definition(&["1.0.0.1", "1.0.0.2"], "First"),
            definition(&["1.0.0.3"], "Second"),
            definition(&["1.0.0.2"], "Third"),
        ];
        file
    }

    #[test]
    fn resolves_matching_definition() {
        let file = sample_file();
        let def = resolve(&file, &VersionKey::new(1, 0, 0, 1)).unwrap();
        assert_eq!(def.entries[0].column, "First");
    }

    #[test]
    fn last_match_wins() {
        let file = sample_file();
        let def = resolve(&file, &VersionKey::new(1, 0, 0, 2)).unwrap();
        assert_eq!(def.entries[0].column, "Third");
    }

    #[test]
    fn unknown_version_is_absent() {
        let file = sample_file();
        assert!(resolve(&file, &VersionKey::new(9, 0, 0, 0)).is_none());
    }

    #[test]
    fn pair_resolves_independently() {
        let file = sample_file();
        let pair = resolve_pair(&file, &VersionKey::new(1, 0, 0, 1), &VersionKey::new(1, 0, 0, 3));
        assert_eq!(pair.target.unwrap().entries[0].column, "First");
        assert_eq!(pair.compare.unwrap().entries[0].column, "Second");

        let pair = resolve_pair(&file, &VersionKey::new(5, 0, 0, 0), &VersionKey::new(6, 0, 0, 0));
        assert!(pair.is_unresolved());
    }

    #[test]
    fn same_definition_for_both_versions() {
        let file = sample_file();
        let pair = resolve_pair(&file, &VersionKey::new(1, 0, 0, 1), &VersionKey::new(1, 0, 0, 1));
        assert!(std::ptr::eq(pair.target.unwrap(), pair.compare.unwrap()));
    }
}
