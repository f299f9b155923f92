//! wazbean-query - Query ledger files with BQL.
//!
//! # Usage
//!
//! ```bash
//! wazbean-query ledger.beancount "SELECT account, SUM(amount) GROUP BY account"
//! wazbean-query ledger.beancount -F query.bql -f csv
//! wazbean-query ledger.beancount --ast "SELECT account WHERE payee = 'Cafe'"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info_span};
use wazbean_query::{parse as parse_query, Executor, QueryResult};

use crate::report;

/// Query ledger files with BQL.
#[derive(Parser, Debug)]
#[command(name = "wazbean-query")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The ledger file to query
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// BQL query to execute
    #[arg(value_name = "QUERY", trailing_var_arg = true, num_args = 0..)]
    query: Vec<String>,

    /// Read query from file
    #[arg(short = 'F', long = "query-file", value_name = "QUERY_FILE")]
    query_file: Option<PathBuf>,

    /// Output format (text, csv, json)
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Print the parsed query as JSON instead of running it
    #[arg(long)]
    ast: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

/// Main entry point for the query command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    super::init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let query_str = if !args.query.is_empty() {
        args.query.join(" ")
    } else if let Some(ref query_file) = args.query_file {
        fs::read_to_string(query_file)
            .with_context(|| format!("failed to read query file {}", query_file.display()))?
    } else {
        anyhow::bail!("no query given: pass QUERY or --query-file");
    };

    let query = match parse_query(&query_str) {
        Ok(query) => query,
        Err(e) => {
            report::report_query_error(&e, "query", &query_str, &mut io::stderr())?;
            return Err(e).context("failed to parse query");
        }
    };

    let mut stdout = io::stdout().lock();

    if args.ast {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&query)?)?;
        return Ok(());
    }

    let ledger = {
        let _span = info_span!("load", file = %args.file.display()).entered();
        wazbean_loader::load_file(&args.file)
            .with_context(|| format!("failed to load {}", args.file.display()))?
    };
    debug!(transactions = ledger.len(), "loaded ledger");

    let result = {
        let _span = info_span!("execute").entered();
        Executor::new(&ledger)
            .execute(&query)
            .context("failed to execute query")?
    };

    match args.format {
        OutputFormat::Text => write_text(&result, &mut stdout)?,
        OutputFormat::Csv => write_csv(&result, &mut stdout)?,
        OutputFormat::Json => write_json(&result, &mut stdout)?,
    }
    Ok(())
}

fn write_text<W: Write>(result: &QueryResult, writer: &mut W) -> Result<()> {
    if result.columns.is_empty() {
        return Ok(());
    }

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(String::len).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    write_text_line(writer, &result.columns, &widths)?;
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_text_line(writer, &separator, &widths)?;
    for row in &cells {
        write_text_line(writer, row, &widths)?;
    }

    writeln!(writer)?;
    writeln!(writer, "{} row(s)", result.rows.len())?;
    Ok(())
}

fn write_text_line<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:width$}"))
        .collect();
    writeln!(writer, "{}", line.join("  ").trim_end())?;
    Ok(())
}

fn write_csv<W: Write>(result: &QueryResult, writer: &mut W) -> Result<()> {
    let header: Vec<String> = result.columns.iter().map(|c| escape_csv(c)).collect();
    writeln!(writer, "{}", header.join(","))?;

    for row in &result.rows {
        let values: Vec<String> = row.iter().map(|v| escape_csv(&v.to_string())).collect();
        writeln!(writer, "{}", values.join(","))?;
    }
    Ok(())
}

fn write_json<W: Write>(result: &QueryResult, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(result)?)?;
    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
