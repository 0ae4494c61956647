//! JSON Schema generation for the JSON documents the CLI writes.
//!
//! Schemas are generated with schemars and printed by the `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// All JSON schemas, keyed by the command that writes the document.
/// BTreeMap keeps the output order stable.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // extract command (snapshot document)
    schemas.insert("extract", schema_for!(crate::model::SchemaSnapshot));

    // graph --format json
    schemas.insert("graph", schema_for!(crate::graph::format::json::ErdJson));

    schemas
}

/// Generate a single schema by command name.
pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
