use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dbdiff_core::config::DEFAULT_CONFIG_FILE;
use dbdiff_core::{Config, VersionError, VersionKey};
use dbdiff_engine::{discover, BatchDriver, BatchOptions, OutputLine, OutputSink};

/// dbdiff - Diff tool for client definition versions
#[derive(Parser)]
#[command(name = "dbdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing .dbd files, or filename of a .dbd
    src: PathBuf,

    /// Target client version (major.minor.patch.build)
    target_version: String,

    /// Client version to compare against (major.minor.patch.build)
    compare_version: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: dbdiff.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Continue with the next file when a file fails to parse
    #[arg(long)]
    keep_going: bool,

    /// Treat entry comments as significant
    #[arg(long)]
    compare_comments: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Nothing is processed unless all inputs are valid
    let (src, target, compare) = match preflight(&cli) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            std::process::exit(err.exit_code());
        }
    };

    let mut config = load_config(cli.config.as_deref(), cli.verbose)?;
    config.keep_going |= cli.keep_going;
    config.compare_comments |= cli.compare_comments;

    tracing::debug!(?config, %target, %compare, "starting diff run");

    let source = discover(&src, &config.extension, config.sort_files)?;
    let driver = BatchDriver::new(target, compare, BatchOptions::from_config(&config, cli.verbose));

    let mut sink = TerminalSink::new();
    let report = driver.run_source(&source, &mut sink)?;

    if let Some(output) = &cli.output {
        report
            .save_to_file(output)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;

        if cli.verbose {
            eprintln!("{} {}", "Report saved to:".green(), output.display());
        }
    }

    Ok(())
}

/// Invalid command line input, reported before any file is read
#[derive(Debug, thiserror::Error)]
enum PreflightError {
    #[error("src is not valid.")]
    InvalidSource,

    #[error("Target version doesn't match pattern.")]
    InvalidTargetVersion(#[source] VersionError),

    #[error("Compare version doesn't match pattern.")]
    InvalidCompareVersion(#[source] VersionError),
}

impl PreflightError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidSource | Self::InvalidTargetVersion(_) | Self::InvalidCompareVersion(_) => 1,
        }
    }
}

/// Validate the source path and both versions
fn preflight(cli: &Cli) -> Result<(PathBuf, VersionKey, VersionKey), PreflightError> {
    if !cli.src.is_file() && !cli.src.is_dir() {
        return Err(PreflightError::InvalidSource);
    }

    let target = VersionKey::parse(&cli.target_version).map_err(PreflightError::InvalidTargetVersion)?;
    let compare = VersionKey::parse(&cli.compare_version).map_err(PreflightError::InvalidCompareVersion)?;

    Ok((cli.src.clone(), target, compare))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "warn" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load config from an explicit path, `dbdiff.toml`, or defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return Config::from_file(default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()));
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Writes diff output to stdout, highlighting banners on a terminal
struct TerminalSink {
    stdout: std::io::Stdout,
}

impl TerminalSink {
    fn new() -> Self {
        let stdout = std::io::stdout();
        if !stdout.is_terminal() {
            colored::control::set_override(false);
        }
        Self { stdout }
    }
}

impl OutputSink for TerminalSink {
    fn emit(&mut self, line: &OutputLine) -> std::io::Result<()> {
        let mut out = self.stdout.lock();
        match line {
            OutputLine::Banner(_) => writeln!(out, "{}", line.to_string().bold().bright_blue()),
            OutputLine::Message(_) => writeln!(out, "{}", line),
            OutputLine::Summary(_) => writeln!(out, "{}", line.to_string().bold()),
        }
    }
}
