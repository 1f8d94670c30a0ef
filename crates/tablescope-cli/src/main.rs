//! tablescope CLI - resolve fuzzy table and procedure names

use tablescope_cli::catalog;
use tablescope_cli::cli;
use tablescope_cli::output;
use tablescope_cli::report;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Args, OutputFormat};
use output::{format_json, format_table};

/// Some names did not resolve.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (e.g. no catalog, unreadable catalog, connection failure).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        init_tracing();
    }

    match run(args) {
        Ok(has_unresolved) => {
            if has_unresolved {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("tablescope: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `debug` for tablescope).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tablescope_core=debug,tablescope_cli=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<bool> {
    if args.names.is_empty() && args.relation.is_none() {
        anyhow::bail!("nothing to resolve (give one or more names, or --relation FROM TO)");
    }

    let snapshot = catalog::load_snapshot(&args)?;
    tracing::debug!(
        tables = snapshot.tables().len(),
        procedures = snapshot.procedures().len(),
        "catalog ready"
    );

    let report = report::build_report(
        &snapshot,
        &args.names,
        args.procedure,
        args.relation_pair(),
    );

    let output_str = match args.format {
        OutputFormat::Json => format_json(&report, args.compact),
        OutputFormat::Table => format_table(&report, args.quiet, !args.quiet),
    };

    write_output(&output_str)?;

    if !args.quiet && args.format == OutputFormat::Json {
        print_errors_to_stderr(&report);
    }

    Ok(report.has_unresolved())
}

fn write_output(content: &str) -> Result<()> {
    io::stdout()
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure newline at end for terminal output
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn print_errors_to_stderr(report: &report::Report) {
    for resolution in &report.resolutions {
        if let Some(error) = &resolution.error {
            eprintln!("tablescope: unresolved: {error}");
        }
    }
    if let Some(error) = report.relation.as_ref().and_then(|r| r.error.as_ref()) {
        eprintln!("tablescope: unresolved: {error}");
    }
}
