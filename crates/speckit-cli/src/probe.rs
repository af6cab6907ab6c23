//! # Probe Subcommand
//!
//! `GET`s one endpoint of a running API and validates the response body
//! against a named schema. Connection settings come from `SPECKIT_*`
//! environment variables; `--base-url` overrides `SPECKIT_BASE_URL`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use speckit_client::{config::parse_base_url, ApiClient, ApiConfig};
use speckit_schema::SchemaStore;

/// Arguments for the `speckit probe` subcommand.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Schema the response body must satisfy.
    #[arg(long, short)]
    pub schema: String,

    /// API base URL, e.g. `http://localhost:8080/api/v1`.
    #[arg(long)]
    pub base_url: Option<String>,

    /// HTTP status the endpoint must return.
    #[arg(long, default_value_t = 200)]
    pub expect_status: u16,

    /// Endpoint path relative to the base URL, e.g. `/users/1`.
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Execute the probe subcommand on a current-thread runtime.
///
/// Returns exit code: 0 if status and body conform, 1 otherwise.
pub fn run_probe(args: &ProbeArgs, schema_dir: &Path) -> Result<u8> {
    let store = SchemaStore::new(schema_dir)
        .with_context(|| format!("failed to load schemas from {}", schema_dir.display()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let config = client_config(args)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(probe(&store, args, config, &mut out))
}

/// Client configuration from `SPECKIT_*` with `args` applied on top.
pub fn client_config(args: &ProbeArgs) -> Result<ApiConfig> {
    let config = ApiConfig::from_env().context("invalid SPECKIT_* environment")?;
    with_overrides(config, args)
}

/// Apply command-line overrides to `config`.
pub fn with_overrides(mut config: ApiConfig, args: &ProbeArgs) -> Result<ApiConfig> {
    if let Some(raw) = &args.base_url {
        config.base_url = parse_base_url(raw)?;
    }
    Ok(config)
}

/// Run one contract check and write its verdict to `out`.
pub async fn probe<W: Write>(
    store: &SchemaStore,
    args: &ProbeArgs,
    config: ApiConfig,
    out: &mut W,
) -> Result<u8> {
    let validator = store.validator(&args.schema)?;
    tracing::debug!(?config, "probing endpoint");

    let client = ApiClient::new(config)?;
    let check = client
        .check(&args.path, args.expect_status, validator)
        .await
        .with_context(|| format!("request to {} failed", args.path))?;

    writeln!(out, "{check}")?;
    Ok(if check.passed() { 0 } else { 1 })
}
