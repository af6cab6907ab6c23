//! # speckit CLI entry point
//!
//! Parses command-line arguments, initializes tracing and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use speckit_cli::probe::{run_probe, ProbeArgs};
use speckit_cli::schemas::{run_schemas, SchemasArgs};
use speckit_cli::validate::{run_validate, ValidateArgs};
use speckit_cli::{resolve_schema_dir, EXIT_ERROR};

/// Schema-driven validation of JSON records and API responses.
#[derive(Parser, Debug)]
#[command(name = "speckit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding `*.schema.json` / `*.schema.yaml` files.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate record files against a schema.
    Validate(ValidateArgs),

    /// Load, check and list the schemas in the schema directory.
    Schemas(SchemasArgs),

    /// Fetch an API endpoint and validate its response body.
    Probe(ProbeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let schema_dir = resolve_schema_dir(cli.schema_dir.as_deref());
    tracing::debug!(schema_dir = %schema_dir.display(), "resolved schema directory");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &schema_dir),
        Commands::Schemas(args) => run_schemas(&args, &schema_dir),
        Commands::Probe(args) => run_probe(&args, &schema_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
