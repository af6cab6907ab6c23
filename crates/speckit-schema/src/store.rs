//! # Schema Store
//!
//! Loads schema documents from a directory and validates JSON or YAML
//! documents against them by name.
//!
//! Every `*.schema.json`, `*.schema.yaml` and `*.schema.yml` file in the
//! directory is parsed and compiled at construction. A single malformed
//! schema fails the whole load: a store never holds a schema it cannot
//! enforce.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::schema::SchemaError;
use crate::validate::{RecordValidator, ValidationResult};

const SCHEMA_SUFFIXES: &[&str] = &[".schema.json", ".schema.yaml", ".schema.yml"];

/// Error loading schemas or documents.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The schema file could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad { schema_name: String, reason: String },

    /// The schema file parsed but is not a valid schema.
    #[error("invalid schema '{schema_name}': {source}")]
    InvalidSchema {
        schema_name: String,
        #[source]
        source: SchemaError,
    },

    /// No schema with this name was loaded.
    #[error("schema '{schema_name}' not found in {schema_dir}")]
    SchemaNotFound {
        schema_name: String,
        schema_dir: String,
    },

    /// The document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad { path: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compiled schemas indexed by file name (e.g. `user.schema.json`).
#[derive(Debug)]
pub struct SchemaStore {
    schema_dir: PathBuf,
    schemas: BTreeMap<String, RecordValidator>,
}

impl SchemaStore {
    /// Load and compile every schema file in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaLoad` if the directory or a schema file
    /// cannot be read or parsed, and `StoreError::InvalidSchema` if a file
    /// parses but does not compile.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = BTreeMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| StoreError::SchemaLoad {
            schema_name: schema_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !SCHEMA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                continue;
            }

            let document = parse_file(&path).map_err(|reason| StoreError::SchemaLoad {
                schema_name: name.to_string(),
                reason,
            })?;
            let validator =
                RecordValidator::from_value(&document).map_err(|source| StoreError::InvalidSchema {
                    schema_name: name.to_string(),
                    source,
                })?;

            tracing::debug!(schema = name, "compiled schema");
            schemas.insert(name.to_string(), validator);
        }

        tracing::debug!(
            schema_dir = %schema_dir.display(),
            count = schemas.len(),
            "loaded schema store"
        );

        Ok(Self {
            schema_dir,
            schemas,
        })
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Names of all loaded schemas, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn get(&self, schema_name: &str) -> Option<&RecordValidator> {
        self.schemas.get(schema_name)
    }

    /// Like [`get`](Self::get), but a missing schema is an error.
    pub fn validator(&self, schema_name: &str) -> Result<&RecordValidator, StoreError> {
        self.get(schema_name)
            .ok_or_else(|| StoreError::SchemaNotFound {
                schema_name: schema_name.to_string(),
                schema_dir: self.schema_dir.display().to_string(),
            })
    }

    /// Validate an in-memory document against a named schema.
    pub fn validate_document(
        &self,
        document: &Value,
        schema_name: &str,
    ) -> Result<ValidationResult, StoreError> {
        Ok(self.validator(schema_name)?.validate(document))
    }

    /// Load a JSON or YAML document from disk and validate it against a
    /// named schema.
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<ValidationResult, StoreError> {
        let validator = self.validator(schema_name)?;
        let document = load_document(document_path)?;
        Ok(validator.validate(&document))
    }
}

/// Read a document from disk.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value, StoreError> {
    parse_file(path).map_err(|reason| StoreError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_file(path: &Path) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}")),
        _ => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    }
}
