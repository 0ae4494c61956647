//! Extract command: write a schema snapshot document.

use super::{extract_schema, ConnectionArgs};
use crate::model::SchemaSnapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(connection: ConnectionArgs, output: Option<PathBuf>, progress: bool) -> Result<()> {
    let catalog = connection.open_catalog()?;
    let schema = extract_schema(catalog.as_ref(), progress)?;

    let snapshot = SchemaSnapshot::capture(&schema, catalog.kind(), catalog.database());
    let json = snapshot.to_json()?;

    match output {
        Some(path) => {
            fs::write(&path, json.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Snapshot written to: {} ({} tables, {} relationships)",
                path.display(),
                schema.table_count(),
                schema.relationship_count()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
