//! wazbean-check - Check ledger files for syntax errors.
//!
//! Exit codes: 0 when the file is clean, 1 when errors were found, 2 when
//! the file could not be read.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use wazbean_loader::{check_syntax, SyntaxIssue};

use crate::report;

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
}

/// JSON output structure for a checked file.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Source file path
    pub file: String,
    /// Whether no errors were found
    pub valid: bool,
    /// Errors in line order
    pub errors: &'a [SyntaxIssue],
    /// Total error count
    pub error_count: usize,
}

/// Check ledger files for syntax errors.
#[derive(Parser, Debug)]
#[command(name = "wazbean-check")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The ledger file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check the file and report; returns whether it was clean.
fn run(args: &Args) -> Result<bool> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let result = check_syntax(&source);
    debug!(
        file = %args.file.display(),
        errors = result.errors.len(),
        "checked file"
    );

    if !args.quiet {
        let mut stdout = io::stdout().lock();
        match args.format {
            OutputFormat::Text => {
                let path = args.file.display().to_string();
                let count =
                    report::report_syntax_issues(&result.errors, &path, &source, &mut stdout)?;
                report::print_summary(count, &mut stdout)?;
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    file: args.file.display().to_string(),
                    valid: result.valid,
                    errors: &result.errors,
                    error_count: result.errors.len(),
                };
                writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
            }
        }
    }

    Ok(result.valid)
}

/// Main entry point for the check command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    super::init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
