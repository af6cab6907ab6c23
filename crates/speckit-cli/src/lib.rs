//! # speckit-cli — Command-Line Front End
//!
//! ## Subcommands
//!
//! - `speckit validate`: Validate JSON/YAML record files against a schema.
//! - `speckit schemas`: Load, compile and list every schema in the schema
//!   directory (a malformed schema fails the command).
//! - `speckit probe`: `GET` a live endpoint and validate its body.
//!
//! ```bash
//! speckit validate --schema user.schema.json test-data/sample-user.json
//! speckit probe --schema user-list.schema.json --base-url http://localhost:8080/api/v1 /users
//! ```
//!
//! ## Exit Codes
//!
//! `0` everything conforms, `1` at least one record or endpoint does not,
//! `2` operational error (unreadable schema directory, unknown schema,
//! unreadable record file, transport failure).
//!
//! ## Crate Policy
//!
//! Argument parsing and output formatting live here; validation and HTTP
//! live in `speckit-schema` and `speckit-client`.

pub mod probe;
pub mod schemas;
pub mod validate;

use std::path::{Path, PathBuf};

/// Environment variable overriding the schema directory.
pub const SCHEMA_DIR_ENV: &str = "SPECKIT_SCHEMA_DIR";

/// Exit code for operational errors.
pub const EXIT_ERROR: u8 = 2;

/// Pick the schema directory.
///
/// Order: the explicit `--schema-dir`, then `SPECKIT_SCHEMA_DIR`, then the
/// nearest ancestor of the current directory containing `schemas/`, then
/// `./schemas`.
pub fn resolve_schema_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(SCHEMA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::current_dir()
        .ok()
        .and_then(|cwd| find_schema_dir(&cwd))
        .unwrap_or_else(|| PathBuf::from("schemas"))
}

/// Walk up from `start` looking for a `schemas/` directory.
pub fn find_schema_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("schemas"))
        .find(|candidate| candidate.is_dir())
}
