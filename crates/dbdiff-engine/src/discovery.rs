//! Definition file discovery

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files selected for a diff run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSource {
    /// Files to process, in processing order
    pub files: Vec<PathBuf>,

    /// True when the source was a directory listing
    pub is_directory: bool,

    /// Extension used to select files
    pub extension: String,
}

/// Collect definition files from `src`.
///
/// A file path is used as-is. A directory contributes its direct children
/// with the given extension, sorted by file name when `sort` is set.
pub fn discover(src: &Path, extension: &str, sort: bool) -> Result<DefinitionSource, SourceError> {
    if src.is_file() {
        return Ok(DefinitionSource {
            files: vec![src.to_path_buf()],
            is_directory: false,
            extension: extension.to_string(),
        });
    }

    if !src.is_dir() {
        return Err(SourceError::InvalidSource(src.display().to_string()));
    }

    let mut walker = WalkDir::new(src).min_depth(1).max_depth(1);
    if sort {
        walker = walker.sort_by_file_name();
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == extension) {
            files.push(entry.path().to_path_buf());
        }
    }

    tracing::debug!(src = %src.display(), count = files.len(), "discovered definition files");

    Ok(DefinitionSource {
        files,
        is_directory: true,
        extension: extension.to_string(),
    })
}

/// Source path errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("src is not valid: {0}")]
    InvalidSource(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Map.dbd");
        std::fs::write(&path, "COLUMNS\n").unwrap();

        let source = discover(&path, "dbd", true).unwrap();
        assert_eq!(source.files, vec![path]);
        assert!(!source.is_directory);
    }

    #[test]
    fn directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Zone.dbd", "Area.dbd", "notes.txt", "Map.dbd"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.dbd")).unwrap();

        let source = discover(dir.path(), "dbd", true).unwrap();
        let names: Vec<_> = source
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(source.is_directory);
        assert_eq!(names, vec!["Area.dbd", "Map.dbd", "Zone.dbd"]);
    }

    #[test]
    fn missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover(&dir.path().join("missing"), "dbd", true);
        assert!(matches!(result, Err(SourceError::InvalidSource(_))));
    }
}
