//! `.dbd` definition file parsing
//!
//! A file starts with a `COLUMNS` section, followed by blank-line separated
//! definition blocks. Each block has `LAYOUT`, `BUILD` and `COMMENT` header
//! lines, then one layout entry per line.

use dbdiff_core::{BuildSpec, ColumnDefinition, Definition, DefinitionFile, Entry, ForeignKey, VersionError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `type[<Table::Column>] Name[?] [// comment]`
static COLUMN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>\w+)(?:<(?P<fk_table>\w+)::(?P<fk_column>\w+)>)?\s+(?P<name>\w+)(?P<unverified>\?)?\s*(?://\s*(?P<comment>.*))?$",
    )
    .unwrap()
});

/// `[$annotations$]Name[<[u]width>][[size]] [// comment]`
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\$(?P<annotations>[\w,]+)\$)?(?P<name>\w+)(?:<(?P<unsigned>u)?(?P<width>\d+)>)?(?:\[(?P<array>\d+)\])?\s*(?://\s*(?P<comment>.*))?$",
    )
    .unwrap()
});

const COLUMNS_HEADER: &str = "COLUMNS";
const LAYOUT_PREFIX: &str = "LAYOUT ";
const BUILD_PREFIX: &str = "BUILD ";
const COMMENT_PREFIX: &str = "COMMENT ";

/// Parse a definition file from disk
pub fn parse_file(path: &Path) -> Result<DefinitionFile, ParseError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_str(&name, &contents)
}

/// Parse definition file contents
pub fn parse_str(name: &str, contents: &str) -> Result<DefinitionFile, ParseError> {
    let mut parser = Parser::new(name);
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    for (i, raw) in contents.lines().enumerate() {
        parser.line = i + 1;
        parser.feed(raw.trim_end())?;
    }

    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before the `COLUMNS` header
    Start,
    /// Inside the `COLUMNS` section
    Columns,
    /// Between or inside definition blocks
    Definitions,
}

struct Parser {
    file: DefinitionFile,
    section: Section,
    line: usize,
    current: Option<Definition>,
}

impl Parser {
    fn new(name: &str) -> Self {
        Self {
            file: DefinitionFile::new(name),
            section: Section::Start,
            line: 0,
            current: None,
        }
    }

    fn feed(&mut self, line: &str) -> Result<(), ParseError> {
        match self.section {
            Section::Start => {
                if line.trim().is_empty() {
                    return Ok(());
                }
                if line.trim() != COLUMNS_HEADER {
                    return Err(ParseError::MissingColumnsHeader {
                        file: self.file.name.clone(),
                        line: self.line,
                    });
                }
                self.section = Section::Columns;
                Ok(())
            }
            Section::Columns => {
                if line.trim().is_empty() {
                    self.section = Section::Definitions;
                    return Ok(());
                }
                let column = self.parse_column(line.trim())?;
                self.file.columns.push(column);
                Ok(())
            }
            Section::Definitions => {
                if line.trim().is_empty() {
                    self.close_definition();
                    return Ok(());
                }
                self.feed_definition_line(line.trim())
            }
        }
    }

    fn feed_definition_line(&mut self, line: &str) -> Result<(), ParseError> {
        let is_header = line.starts_with(LAYOUT_PREFIX)
            || line.starts_with(BUILD_PREFIX)
            || line.starts_with(COMMENT_PREFIX);

        let has_entries = self.current.as_ref().is_some_and(|d| !d.entries.is_empty());
        if is_header && has_entries {
            return Err(ParseError::UnexpectedHeader {
                file: self.file.name.clone(),
                line: self.line,
                text: line.to_string(),
            });
        }

        if let Some(rest) = line.strip_prefix(BUILD_PREFIX) {
            let builds = self.parse_builds(rest)?;
            self.definition().builds.extend(builds);
        } else if let Some(rest) = line.strip_prefix(LAYOUT_PREFIX) {
            let layouts = rest
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty());
            self.definition().layouts.extend(layouts);
        } else if let Some(rest) = line.strip_prefix(COMMENT_PREFIX) {
            self.definition().comment = Some(rest.trim().to_string());
        } else {
            let entry = self.parse_entry(line)?;
            self.definition().entries.push(entry);
        }

        Ok(())
    }

    fn definition(&mut self) -> &mut Definition {
        self.current.get_or_insert_with(Definition::default)
    }

    fn close_definition(&mut self) {
        if let Some(definition) = self.current.take() {
            self.file.definitions.push(definition);
        }
    }

    fn finish(mut self) -> Result<DefinitionFile, ParseError> {
        if self.section == Section::Start {
            return Err(ParseError::MissingColumnsHeader {
                file: self.file.name.clone(),
                line: self.line.max(1),
            });
        }

        self.close_definition();
        Ok(self.file)
    }

    fn parse_column(&self, line: &str) -> Result<ColumnDefinition, ParseError> {
        let captures = COLUMN_PATTERN.captures(line).ok_or_else(|| ParseError::InvalidColumn {
            file: self.file.name.clone(),
            line: self.line,
            text: line.to_string(),
        })?;

        let foreign_key = match (captures.name("fk_table"), captures.name("fk_column")) {
            (Some(table), Some(column)) => Some(ForeignKey {
                table: table.as_str().to_string(),
                column: column.as_str().to_string(),
            }),
            _ => None,
        };

        Ok(ColumnDefinition {
            type_name: captures["type"].to_string(),
            foreign_key,
            name: captures["name"].to_string(),
            verified: captures.name("unverified").is_none(),
            comment: captures.name("comment").map(|c| c.as_str().trim().to_string()),
        })
    }

    fn parse_builds(&self, list: &str) -> Result<Vec<BuildSpec>, ParseError> {
        list.split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| {
                b.parse::<BuildSpec>().map_err(|source| ParseError::InvalidBuild {
                    file: self.file.name.clone(),
                    line: self.line,
                    text: b.to_string(),
                    source,
                })
            })
            .collect()
    }

    fn parse_entry(&self, line: &str) -> Result<Entry, ParseError> {
        let invalid = || ParseError::InvalidEntry {
            file: self.file.name.clone(),
            line: self.line,
            text: line.to_string(),
        };

        let captures = ENTRY_PATTERN.captures(line).ok_or_else(invalid)?;
        let column = &captures["name"];

        if self.file.find_column(column).is_none() {
            return Err(ParseError::UnknownColumn {
                file: self.file.name.clone(),
                line: self.line,
                column: column.to_string(),
            });
        }

        let mut entry = Entry::new(column);

        if let Some(annotations) = captures.name("annotations") {
            entry.annotations = annotations
                .as_str()
                .split(',')
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(width) = captures.name("width") {
            let width = width.as_str().parse::<u8>().map_err(|_| invalid())?;
            entry = entry.with_int_width(width, captures.name("unsigned").is_some());
        }

        if let Some(size) = captures.name("array") {
            let size = size.as_str().parse::<usize>().map_err(|_| invalid())?;
            entry = entry.with_array_size(size);
        }

        if let Some(comment) = captures.name("comment") {
            entry = entry.with_comment(comment.as_str().trim());
        }

        Ok(entry)
    }
}

/// Definition file parse errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("{file}:{line}: expected 'COLUMNS' header")]
    MissingColumnsHeader { file: String, line: usize },

    #[error("{file}:{line}: invalid column definition '{text}'")]
    InvalidColumn { file: String, line: usize, text: String },

    #[error("{file}:{line}: invalid layout entry '{text}'")]
    InvalidEntry { file: String, line: usize, text: String },

    #[error("{file}:{line}: entry references undeclared column '{column}'")]
    UnknownColumn { file: String, line: usize, column: String },

    #[error("{file}:{line}: invalid build '{text}': {source}")]
    InvalidBuild {
        file: String,
        line: usize,
        text: String,
        #[source]
        source: VersionError,
    },

    #[error("{file}:{line}: header '{text}' after layout entries")]
    UnexpectedHeader { file: String, line: usize, text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdiff_core::VersionKey;

    const SAMPLE: &str = "\
COLUMNS
int ID
int<Map::ID> MapID
locstring Name_lang // display name
float Position?

LAYOUT 0A1B2C3D, 11223344
BUILD 1.0.0.1, 1.0.0.2
BUILD 1.1.0.10-1.1.0.20
COMMENT first layout
$id$ID<32>
$relation$MapID<u16>
Name_lang
Position[3] // x, y, z

BUILD 2.0.0.1
$noninline,id$ID<32>
Name_lang
";

    #[test]
    fn parse_columns() {
        let file = parse_str("Sample.dbd", SAMPLE).unwrap();
        assert_eq!(file.name, "Sample.dbd");
        assert_eq!(file.columns.len(), 4);

        let map_id = file.find_column("MapID").unwrap();
        assert_eq!(map_id.type_name, "int");
        assert_eq!(
            map_id.foreign_key,
            Some(ForeignKey { table: "Map".to_string(), column: "ID".to_string() })
        );

        assert_eq!(file.find_column("Name_lang").unwrap().comment.as_deref(), Some("display name"));
        assert!(!file.find_column("Position").unwrap().verified);
        assert!(file.find_column("ID").unwrap().verified);
    }

    #[test]
    fn parse_definitions() {
        let file = parse_str("Sample.dbd", SAMPLE).unwrap();
        assert_eq!(file.definitions.len(), 2);

        let first = &file.definitions[0];
        assert_eq!(first.layouts, vec!["0A1B2C3D", "11223344"]);
        assert_eq!(first.builds.len(), 3);
        assert_eq!(first.comment.as_deref(), Some("first layout"));
        assert!(first.covers(&VersionKey::new(1, 1, 0, 15)));
        assert_eq!(
            first.entries.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["$id$ID<32>", "$relation$MapID<u16>", "Name_lang", "Position[3] // x, y, z"]
        );

        let second = &file.definitions[1];
        assert!(second.covers(&VersionKey::new(2, 0, 0, 1)));
        assert_eq!(second.entries[0].annotations, vec!["noninline", "id"]);
    }

    #[test]
    fn leading_blank_lines_and_crlf() {
        let text = "\r\n\r\nCOLUMNS\r\nint ID\r\n\r\nBUILD 1.0.0.1\r\nID<32>\r\n";
        let file = parse_str("Crlf.dbd", text).unwrap();
        assert_eq!(file.definitions.len(), 1);
        assert_eq!(file.definitions[0].entries[0].int_width, Some(32));
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let text = "\u{feff}COLUMNS\nint ID\n\nBUILD 1.0.0.1\nID\n";
        let file = parse_str("Bom.dbd", text).unwrap();
        assert_eq!(file.columns[0].name, "ID");
        assert_eq!(file.definitions.len(), 1);
    }

    #[test]
    fn consecutive_blank_lines_do_not_create_empty_definitions() {
        let text = "COLUMNS\nint ID\n\n\n\nBUILD 1.0.0.1\nID\n\n\n";
        let file = parse_str("Gaps.dbd", text).unwrap();
        assert_eq!(file.definitions.len(), 1);
    }

    #[test]
    fn missing_columns_header() {
        let err = parse_str("Bad.dbd", "BUILD 1.0.0.1\nID\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumnsHeader { line: 1, .. }));

        let err = parse_str("Empty.dbd", "").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumnsHeader { .. }));
    }

    #[test]
    fn unknown_column() {
        let err = parse_str("Bad.dbd", "COLUMNS\nint ID\n\nBUILD 1.0.0.1\nFlags\n").unwrap_err();
        match err {
            ParseError::UnknownColumn { line, column, .. } => {
                assert_eq!(line, 5);
                assert_eq!(column, "Flags");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn invalid_build() {
        let err = parse_str("Bad.dbd", "COLUMNS\nint ID\n\nBUILD 1.0.0\nID\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidBuild { line: 4, .. }));
        assert!(err.to_string().contains("Bad.dbd:4"));
    }

    #[test]
    fn invalid_entry_and_column() {
        let err = parse_str("Bad.dbd", "COLUMNS\nint ID\n\nBUILD 1.0.0.1\nID<999>\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidEntry { line: 5, .. }));

        let err = parse_str("Bad.dbd", "COLUMNS\nint\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidColumn { line: 2, .. }));
    }

    #[test]
    fn header_after_entries_rejected() {
        let err = parse_str("Bad.dbd", "COLUMNS\nint ID\n\nBUILD 1.0.0.1\nID\nBUILD 1.0.0.2\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedHeader { line: 6, .. }));
    }
}
