//! `.dbd` definition file parsing
//!
//! This crate turns the text definition format into the
//! `DefinitionFile` model from `dbdiff-core`.

pub mod parser;

pub use parser::{parse_file, parse_str, ParseError};
