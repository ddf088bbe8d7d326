//! dbdiff engine - Core business logic
//!
//! This crate implements the main business logic for dbdiff:
//! - Version to definition resolution
//! - Definition diff engine
//! - Per-file report state
//! - Batch driver and file discovery

pub mod resolver;
pub mod definition_diff;
pub mod report_state;
pub mod discovery;
pub mod batch;

pub use resolver::{resolve, resolve_pair, ResolvedPair};
pub use definition_diff::{entry_at, DefinitionDiff, DiffOptions, EntrySlot};
pub use report_state::{OutputLine, OutputSink, ReportState};
pub use discovery::{discover, DefinitionSource, SourceError};
pub use batch::{BatchDriver, BatchError, BatchOptions, FileOutcome};
