//! Schema command: print or write JSON Schemas for the JSON documents.

use crate::json_schema::{all_schemas, get_schema, schema_names};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(name: Option<String>, output_dir: Option<PathBuf>) -> Result<()> {
    let schemas = match name {
        Some(name) => match get_schema(&name) {
            Some(schema) => vec![(name, schema)],
            None => bail!(
                "unknown schema '{}' (available: {})",
                name,
                schema_names().join(", ")
            ),
        },
        None => all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                let json = serde_json::to_string_pretty(schema)?;
                fs::write(&path, json + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let combined: serde_json::Map<String, serde_json::Value> = schemas
                .into_iter()
                .map(|(name, schema)| -> Result<(String, serde_json::Value)> {
                    Ok((name, serde_json::to_value(schema)?))
                })
                .collect::<Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
    }

    Ok(())
}
