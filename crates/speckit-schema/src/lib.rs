//! # speckit-schema — Record Validation for API Contract Tests
//!
//! Checks structured records (decoded response bodies, request payloads,
//! literal fixtures) against declarative schema documents and reports
//! every violation with the path of the offending node.
//!
//! ## Schema Model (`schema`)
//!
//! [`Schema::from_value`] compiles a JSON-compatible schema document into
//! an immutable, typed tree. Malformed documents (unknown `type` token,
//! `object` without `properties`, unknown `format`, unsupported keywords)
//! fail with [`SchemaError`] up front instead of being silently ignored.
//!
//! ## Validation (`validate`)
//!
//! [`RecordValidator::validate`] walks a record against a compiled schema
//! and returns a [`ValidationResult`]. Violations are accumulated, not
//! short-circuited, so one call surfaces every problem with a record.
//!
//! ## Schema Store (`store`)
//!
//! [`SchemaStore`] loads every `*.schema.json` / `*.schema.yaml` document
//! from a directory, compiles it, and validates JSON or YAML documents
//! against a named schema.
//!
//! ## Crate Policy
//!
//! - Validation is a pure function of (record, schema): no I/O, no state.
//! - A broken schema is an error; a broken record is a result value.
//! - Objects are non-strict unless the schema says
//!   `"additionalProperties": false`.

pub mod format;
pub mod schema;
pub mod store;
pub mod validate;

pub use format::StringFormat;
pub use schema::{Schema, SchemaError, SchemaKind, SchemaType};
pub use store::{load_document, SchemaStore, StoreError};
pub use validate::{
    validate, Constraint, PathSegment, RecordValidator, ValidationResult, ValidationViolations,
    Violation,
};
