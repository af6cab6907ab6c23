//! # Schemas Subcommand
//!
//! Loads every schema in the schema directory and lists it with its root
//! type. Loading compiles each schema, so a malformed schema fails the
//! command with its JSON-pointer location.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use speckit_schema::{SchemaKind, SchemaStore};

/// Arguments for the `speckit schemas` subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Print names only.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Execute the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, schema_dir: &Path) -> Result<u8> {
    let store = SchemaStore::new(schema_dir)
        .with_context(|| format!("failed to load schemas from {}", schema_dir.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    list_schemas(&store, args, &mut out)?;
    Ok(0)
}

/// Write one line per schema to `out`.
pub fn list_schemas<W: Write>(store: &SchemaStore, args: &SchemasArgs, out: &mut W) -> Result<()> {
    for name in store.schema_names() {
        if args.quiet {
            writeln!(out, "{name}")?;
            continue;
        }
        let Some(validator) = store.get(name) else {
            continue;
        };
        let schema = validator.schema();
        let detail = match schema.kind() {
            SchemaKind::Object(object) => format!(
                "{} properties, {} required{}",
                object.properties.len(),
                object.required.len(),
                if object.additional_properties { "" } else { ", strict" }
            ),
            SchemaKind::Array(array) => match &array.items {
                Some(items) => format!("items: {}", items.schema_type()),
                None => "items: any".to_string(),
            },
            _ => String::new(),
        };
        if detail.is_empty() {
            writeln!(out, "{name}  {}", schema.schema_type())?;
        } else {
            writeln!(out, "{name}  {} ({detail})", schema.schema_type())?;
        }
    }
    writeln!(
        out,
        "Schemas: {} loaded from {}",
        store.schema_count(),
        store.schema_dir().display()
    )?;
    Ok(())
}
