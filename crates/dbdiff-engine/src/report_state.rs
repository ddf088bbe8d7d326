//! Per-file output state
//!
//! Each file gets its own `ReportState`. The banner is emitted lazily in
//! front of the first message, so files without output print nothing.

use dbdiff_core::Finding;

/// One line of diff output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// `---- <file> ----`
    Banner(String),

    /// A finding or status message
    Message(String),

    /// Final verbose summary
    Summary(String),
}

impl std::fmt::Display for OutputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Banner(file) => write!(f, "---- {} ----", file),
            Self::Message(text) | Self::Summary(text) => write!(f, "{}", text),
        }
    }
}

/// Destination for diff output
pub trait OutputSink {
    /// Write a single line
    fn emit(&mut self, line: &OutputLine) -> std::io::Result<()>;
}

impl OutputSink for Vec<String> {
    fn emit(&mut self, line: &OutputLine) -> std::io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

impl OutputSink for Vec<OutputLine> {
    fn emit(&mut self, line: &OutputLine) -> std::io::Result<()> {
        self.push(line.clone());
        Ok(())
    }
}

/// Output accumulated for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportState {
    file_name: String,
    banner_shown: bool,
    lines: Vec<OutputLine>,
}

impl ReportState {
    /// Start a fresh state for a file
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            banner_shown: false,
            lines: Vec::new(),
        }
    }

    /// Append a message, preceded by the banner if this is the first one
    pub fn emit(&mut self, message: impl Into<String>) {
        if !self.banner_shown {
            self.lines.push(OutputLine::Banner(self.file_name.clone()));
            self.banner_shown = true;
        }

        self.lines.push(OutputLine::Message(message.into()));
    }

    /// Append the output lines of a finding
    pub fn emit_finding(&mut self, finding: &Finding, verbose: bool) {
        for line in finding.lines(verbose) {
            self.emit(line);
        }
    }

    /// Whether anything was emitted for this file
    pub fn banner_shown(&self) -> bool {
        self.banner_shown
    }

    /// Accumulated lines
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// Write accumulated lines to a sink
    pub fn flush_to(self, sink: &mut dyn OutputSink) -> std::io::Result<()> {
        for line in &self.lines {
            sink.emit(line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_output_no_banner() {
        let state = ReportState::new("Map.dbd");
        assert!(!state.banner_shown());
        assert!(state.lines().is_empty());
    }

    #[test]
    fn banner_emitted_once() {
        let mut state = ReportState::new("Map.dbd");
        state.emit("first");
        state.emit("second");

        assert!(state.banner_shown());
        assert_eq!(
            state.lines(),
            &[
                OutputLine::Banner("Map.dbd".to_string()),
                OutputLine::Message("first".to_string()),
                OutputLine::Message("second".to_string()),
            ]
        );
    }

    #[test]
    fn hidden_finding_does_not_trigger_banner() {
        let mut state = ReportState::new("Map.dbd");
        state.emit_finding(&Finding::count_mismatch(1, 2), false);
        assert!(!state.banner_shown());

        state.emit_finding(&Finding::count_mismatch(1, 2), true);
        assert!(state.banner_shown());
    }

    #[test]
    fn flush_renders_lines() {
        let mut state = ReportState::new("Map.dbd");
        state.emit("No changes");

        let mut out: Vec<String> = Vec::new();
        state.flush_to(&mut out).unwrap();
        assert_eq!(out, vec!["---- Map.dbd ----", "No changes"]);
    }
}
