//! Definition file types
//!
//! A definition file declares its columns once, then lists one or more
//! definitions. Each definition applies to a set of client builds and
//! carries an ordered layout of entries.

use crate::version::{BuildSpec, VersionKey};
use serde::{Deserialize, Serialize};

/// Foreign key reference on a column (`int<Map::ID>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table
    pub table: String,

    /// Referenced column
    pub column: String,
}

/// A column declared in the `COLUMNS` section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Declared type (int, float, string, locstring, ...)
    pub type_name: String,

    /// Optional foreign key reference
    pub foreign_key: Option<ForeignKey>,

    /// Column name
    pub name: String,

    /// False when the name is marked as a guess (`Name?`)
    pub verified: bool,

    /// Trailing `//` comment
    pub comment: Option<String>,
}

/// One positional entry of a definition layout
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Annotations between `$` markers (id, relation, noninline)
    pub annotations: Vec<String>,

    /// Column this entry stores
    pub column: String,

    /// Integer width in bits (`<32>`)
    pub int_width: Option<u8>,

    /// Unsigned integer (`<u32>`)
    pub is_unsigned: bool,

    /// Array length (`[3]`)
    pub array_size: Option<usize>,

    /// Trailing `//` comment
    pub comment: Option<String>,
}

impl Entry {
    /// Create a plain entry for a column
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            annotations: Vec::new(),
            column: column.into(),
            int_width: None,
            is_unsigned: false,
            array_size: None,
            comment: None,
        }
    }

    /// Set annotations
    pub fn with_annotations<I, S>(mut self, annotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotations = annotations.into_iter().map(Into::into).collect();
        self
    }

    /// Set integer width and signedness
    pub fn with_int_width(mut self, width: u8, unsigned: bool) -> Self {
        self.int_width = Some(width);
        self.is_unsigned = unsigned;
        self
    }

    /// Set array size
    pub fn with_array_size(mut self, size: usize) -> Self {
        self.array_size = Some(size);
        self
    }

    /// Set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check if this entry has an annotation
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }

    /// Structural comparison of everything that shapes the stored layout.
    ///
    /// Comments are ignored.
    pub fn same_layout(&self, other: &Entry) -> bool {
        self.annotations == other.annotations
            && self.column == other.column
            && self.int_width == other.int_width
            && self.is_unsigned == other.is_unsigned
            && self.array_size == other.array_size
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.annotations.is_empty() {
            write!(f, "${}$", self.annotations.join(","))?;
        }

        write!(f, "{}", self.column)?;

        if let Some(width) = self.int_width {
            let sign = if self.is_unsigned { "u" } else { "" };
            write!(f, "<{}{}>", sign, width)?;
        }

        if let Some(size) = self.array_size {
            write!(f, "[{}]", size)?;
        }

        if let Some(comment) = &self.comment {
            write!(f, " // {}", comment)?;
        }

        Ok(())
    }
}

/// A definition valid for a set of builds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Definition {
    /// Builds this definition applies to
    pub builds: Vec<BuildSpec>,

    /// Layout hashes (`LAYOUT` lines)
    pub layouts: Vec<String>,

    /// `COMMENT` header
    pub comment: Option<String>,

    /// Ordered layout entries
    pub entries: Vec<Entry>,
}

impl Definition {
    /// Create a definition from builds and entries
    pub fn new(builds: Vec<BuildSpec>, entries: Vec<Entry>) -> Self {
        Self {
            builds,
            entries,
            ..Self::default()
        }
    }

    /// Check whether a version belongs to this definition's build set
    pub fn covers(&self, key: &VersionKey) -> bool {
        self.builds.iter().any(|build| build.contains(key))
    }
}

/// A parsed definition file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefinitionFile {
    /// File name (e.g. `Map.dbd`)
    pub name: String,

    /// Declared columns
    pub columns: Vec<ColumnDefinition>,

    /// Definitions in file order
    pub definitions: Vec<Definition>,
}

impl DefinitionFile {
    /// Create an empty definition file
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find a declared column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_display() {
        assert_eq!(Entry::new("Name_lang").to_string(), "Name_lang");
        assert_eq!(
            Entry::new("ID").with_annotations(["id"]).with_int_width(32, false).to_string(),
            "$id$ID<32>"
        );
        assert_eq!(
            Entry::new("Flags")
                .with_annotations(["noninline", "relation"])
                .with_int_width(16, true)
                .with_array_size(2)
                .with_comment("unused")
                .to_string(),
            "$noninline,relation$Flags<u16>[2] // unused"
        );
    }

    #[test]
    fn annotation_lookup() {
        let entry = Entry::new("MapID").with_annotations(["noninline", "relation"]);
        assert!(entry.has_annotation("relation"));
        assert!(!entry.has_annotation("id"));
    }

    #[test]
    fn same_layout_ignores_comment() {
        let a = Entry::new("Pos").with_array_size(3);
        let b = a.clone().with_comment("x, y, z");
        assert!(a.same_layout(&b));
        assert_ne!(a, b);

        let c = Entry::new("Pos").with_array_size(2);
        assert!(!a.same_layout(&c));
    }

    #[test]
    fn signedness_is_part_of_layout() {
        let signed = Entry::new("Count").with_int_width(32, false);
        let unsigned = Entry::new("Count").with_int_width(32, true);
        assert!(!signed.same_layout(&unsigned));
    }

    #[test]
    fn definition_covers_exact_and_range() {
        let def = Definition::new(
            vec![
                "1.0.0.1".parse().unwrap(),
                "2.0.0.10-2.0.0.20".parse().unwrap(),
            ],
            vec![Entry::new("ID")],
        );

        assert!(def.covers(&VersionKey::new(1, 0, 0, 1)));
        assert!(def.covers(&VersionKey::new(2, 0, 0, 15)));
        assert!(!def.covers(&VersionKey::new(1, 0, 0, 2)));
    }
}
