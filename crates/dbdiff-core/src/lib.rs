//! dbdiff Core
//!
//! Core domain model with stable, versioned types.
//! Never rename finding codes - they are part of the report format.

pub mod version;
pub mod definition;
pub mod finding;
pub mod report;
pub mod config;

pub use version::{VersionKey, BuildSpec, VersionError};
pub use definition::{Entry, Definition, DefinitionFile, ColumnDefinition, ForeignKey};
pub use finding::{Finding, FindingCode, MISSING_PLACEHOLDER};
pub use report::{DiffReport, RunReport, ReportVersion, Summary};
pub use config::{Config, ConfigError};
