//! # Validate Subcommand
//!
//! Validates JSON/YAML record files against one named schema from the
//! schema directory.
//!
//! ## Output
//!
//! Text (default):
//!
//! ```text
//! OK: test-data/sample-user.json
//! FAIL: test-data/invalid-user.yaml
//!   /email: expected format email, found "invalid-email"
//! Records: 1/2 passed
//! ```
//!
//! `--format json` prints one array of per-file reports instead.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use speckit_schema::{load_document, RecordValidator, SchemaStore, Violation};

use crate::EXIT_ERROR;

/// Arguments for the `speckit validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file name inside the schema directory (e.g. `user.schema.json`).
    #[arg(long, short)]
    pub schema: String,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Record files to validate (`.json`, `.yaml`, `.yml`).
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Verdict for a single record file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    /// Set when the file could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every file conforms, 1 on validation failure,
/// 2 when a record file cannot be loaded.
pub fn run_validate(args: &ValidateArgs, schema_dir: &Path) -> Result<u8> {
    let store = SchemaStore::new(schema_dir)
        .with_context(|| format!("failed to load schemas from {}", schema_dir.display()))?;

    tracing::info!(schema_count = store.schema_count(), "loaded schema store");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    validate_files(&store, args, &mut out)
}

/// Validate `args.files` against `store` and write the report to `out`.
pub fn validate_files<W: Write>(store: &SchemaStore, args: &ValidateArgs, out: &mut W) -> Result<u8> {
    let validator = store.validator(&args.schema)?;

    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(validator, path))
        .collect();

    match args.format {
        OutputFormat::Text => write_text(&reports, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports)
                .context("failed to serialize report")?;
            writeln!(out)?;
        }
    }

    Ok(exit_code(&reports))
}

fn check_file(validator: &RecordValidator, path: &Path) -> FileReport {
    let file = path.display().to_string();
    match load_document(path) {
        Ok(document) => {
            let result = validator.validate(&document);
            tracing::debug!(%file, valid = result.is_valid(), "validated record");
            FileReport {
                file,
                valid: result.is_valid(),
                violations: result.into_violations(),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(%file, error = %e, "failed to load record");
            FileReport {
                file,
                valid: false,
                violations: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

fn write_text<W: Write>(reports: &[FileReport], out: &mut W) -> Result<()> {
    for report in reports {
        if let Some(error) = &report.error {
            writeln!(out, "ERROR: {}: {error}", report.file)?;
        } else if report.valid {
            writeln!(out, "OK: {}", report.file)?;
        } else {
            writeln!(out, "FAIL: {}", report.file)?;
            for violation in &report.violations {
                writeln!(out, "{violation}")?;
            }
        }
    }
    let passed = reports.iter().filter(|r| r.valid).count();
    writeln!(out, "Records: {passed}/{} passed", reports.len())?;
    Ok(())
}

fn exit_code(reports: &[FileReport]) -> u8 {
    if reports.iter().any(|r| r.error.is_some()) {
        EXIT_ERROR
    } else if reports.iter().all(|r| r.valid) {
        0
    } else {
        1
    }
}
