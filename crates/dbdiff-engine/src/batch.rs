//! Batch driver
//!
//! Runs resolution and diffing over every definition file of a source,
//! keeps the run-wide counters and writes each file's output as soon as the
//! file is done.

use crate::definition_diff::{DefinitionDiff, DiffOptions};
use crate::discovery::DefinitionSource;
use crate::report_state::{OutputLine, OutputSink, ReportState};
use crate::resolver::resolve_pair;

use dbdiff_core::{Config, DefinitionFile, DiffReport, RunReport, VersionKey};
use dbdiff_dbd::ParseError;
use std::path::{Path, PathBuf};

/// Batch run options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Show count mismatches, file count and the final summary
    pub verbose: bool,

    /// Record parse failures and continue instead of aborting
    pub keep_going: bool,

    /// Entry comparison options
    pub diff: DiffOptions,
}

impl BatchOptions {
    /// Build options from config
    pub fn from_config(config: &Config, verbose: bool) -> Self {
        Self {
            verbose,
            keep_going: config.keep_going,
            diff: DiffOptions {
                compare_comments: config.compare_comments,
            },
        }
    }
}

/// Outcome of checking one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Findings for the report
    pub report: DiffReport,

    /// Output lines for the file
    pub state: ReportState,
}

/// Diff run over a set of definition files
#[derive(Debug, Clone)]
pub struct BatchDriver {
    target: VersionKey,
    compare: VersionKey,
    options: BatchOptions,
}

impl BatchDriver {
    /// Create a driver comparing `target` against `compare`
    pub fn new(target: VersionKey, compare: VersionKey, options: BatchOptions) -> Self {
        Self { target, compare, options }
    }

    /// Check a single parsed file.
    ///
    /// Returns `None` when neither version resolves in the file. The
    /// "No changes" confirmation is only emitted for single-file runs.
    pub fn check_file(&self, file: &DefinitionFile, single_file: bool) -> Option<FileOutcome> {
        let pair = resolve_pair(file, &self.target, &self.compare);
        if pair.is_unresolved() {
            tracing::debug!(file = %file.name, "no definition for either version, skipping");
            return None;
        }

        let diff = DefinitionDiff::compare(pair.target, pair.compare, &self.options.diff)?;

        let mut state = ReportState::new(file.name.clone());
        for finding in &diff.findings {
            state.emit_finding(finding, self.options.verbose);
        }

        if !diff.is_changed() && single_file {
            state.emit("No changes");
        }

        tracing::debug!(
            file = %file.name,
            changed = diff.is_changed(),
            entry_changes = diff.change_count(),
            "compared definitions"
        );

        Some(FileOutcome {
            report: DiffReport::new(file.name.clone(), diff.findings),
            state,
        })
    }

    /// Run over a discovered source, parsing each file from disk
    pub fn run_source(
        &self,
        source: &DefinitionSource,
        sink: &mut dyn OutputSink,
    ) -> Result<RunReport, BatchError> {
        if source.is_directory && self.options.verbose {
            sink.emit(&OutputLine::Message(format!(
                "Found {} .{} files.",
                source.files.len(),
                source.extension
            )))?;
        }

        self.run_files(&source.files, sink)
    }

    /// Run over a list of file paths, parsing each in turn
    pub fn run_files(&self, paths: &[PathBuf], sink: &mut dyn OutputSink) -> Result<RunReport, BatchError> {
        let mut report = self.new_report(paths.len());
        let single_file = paths.len() == 1;

        for path in paths {
            let file = match dbdiff_dbd::parse_file(path) {
                Ok(file) => file,
                Err(e) if self.options.keep_going => {
                    self.record_parse_failure(path, &e, &mut report, sink)?;
                    continue;
                }
                Err(e) => return Err(BatchError::Parse(e)),
            };

            self.process(&file, single_file, &mut report, sink)?;
        }

        self.finish(report, sink)
    }

    /// Run over files that were already parsed
    pub fn run_parsed(
        &self,
        files: &[DefinitionFile],
        sink: &mut dyn OutputSink,
    ) -> Result<RunReport, BatchError> {
        let mut report = self.new_report(files.len());
        let single_file = files.len() == 1;

        for file in files {
            self.process(file, single_file, &mut report, sink)?;
        }

        self.finish(report, sink)
    }

    fn new_report(&self, files_found: usize) -> RunReport {
        let mut report = RunReport::new(self.target, self.compare);
        report.summary.files_found = files_found;
        report
    }

    fn process(
        &self,
        file: &DefinitionFile,
        single_file: bool,
        report: &mut RunReport,
        sink: &mut dyn OutputSink,
    ) -> Result<(), BatchError> {
        if let Some(outcome) = self.check_file(file, single_file) {
            report.add_file(outcome.report);
            outcome.state.flush_to(sink)?;
        }
        Ok(())
    }

    fn record_parse_failure(
        &self,
        path: &Path,
        error: &ParseError,
        report: &mut RunReport,
        sink: &mut dyn OutputSink,
    ) -> Result<(), BatchError> {
        tracing::warn!(path = %path.display(), error = %error, "failed to parse definition file");

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut state = ReportState::new(name.clone());
        state.emit(format!("Parse error: {}", error));
        state.flush_to(sink)?;

        report.add_file(DiffReport::failed(name, error.to_string()));
        Ok(())
    }

    fn finish(&self, report: RunReport, sink: &mut dyn OutputSink) -> Result<RunReport, BatchError> {
        tracing::info!(
            checked = report.summary.checked,
            changed = report.summary.changed,
            parse_failures = report.summary.parse_failures,
            "diff run complete"
        );

        if self.options.verbose {
            sink.emit(&OutputLine::Summary(report.summary.summary_line()))?;
        }

        Ok(report)
    }
}

/// Batch run errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
