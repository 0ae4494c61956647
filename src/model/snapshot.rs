//! Serializable export document for an extracted schema.

use super::{Relationship, Schema, Table};
use anyhow::{bail, Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Current snapshot document version
pub const SNAPSHOT_VERSION: u32 = 1;

/// A schema extraction written out as a standalone JSON document.
///
/// Renderers can consume a snapshot instead of a live catalog connection,
/// so a diagram can be regenerated without database access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaSnapshot {
    pub version: u32,
    /// Catalog backend the snapshot was extracted from (e.g. `mssql`, `duckdb`)
    pub source: String,
    /// Database name, when the backend knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// RFC 3339 extraction timestamp
    pub extracted_at: String,
    /// Tables sorted by name
    pub tables: Vec<Table>,
    /// Relationships in extraction order
    pub relationships: Vec<Relationship>,
}

impl SchemaSnapshot {
    /// Capture a schema, stamping it with the current time
    pub fn capture(schema: &Schema, source: &str, database: Option<String>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            source: source.to_string(),
            database,
            extracted_at: chrono::Utc::now().to_rfc3339(),
            tables: schema.tables.values().cloned().collect(),
            relationships: schema.relationships.clone(),
        }
    }

    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("invalid snapshot: {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: SchemaSnapshot = serde_json::from_str(content)?;
        if snapshot.version > SNAPSHOT_VERSION {
            bail!(
                "unsupported snapshot version {} (newest supported: {})",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild the in-memory schema, rejecting documents that break the model's invariants
    pub fn into_schema(self) -> Result<Schema> {
        let mut tables = BTreeMap::new();
        for table in self.tables {
            let name = table.name.clone();
            if tables.insert(name.clone(), table).is_some() {
                bail!("duplicate table in snapshot: {}", name);
            }
        }

        let mut seen_pairs = Vec::with_capacity(self.relationships.len());
        for rel in &self.relationships {
            for endpoint in [&rel.from_table, &rel.to_table] {
                if !tables.contains_key(endpoint) {
                    bail!(
                        "relationship {} references unknown table: {}",
                        rel.description(),
                        endpoint
                    );
                }
            }
            let pair = (rel.from_table.as_str(), rel.to_table.as_str());
            if seen_pairs.contains(&pair) {
                bail!(
                    "duplicate relationship in snapshot: {} -> {}",
                    rel.from_table,
                    rel.to_table
                );
            }
            seen_pairs.push(pair);
        }

        Ok(Schema::new(tables, self.relationships))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        let mut customer = Table::new("Customer");
        customer.push_primary_key("id");
        let mut order = Table::new("Order");
        order.push_primary_key("id");
        order.push_foreign_key_column("customer_id");

        let mut tables = BTreeMap::new();
        tables.insert(customer.name.clone(), customer);
        tables.insert(order.name.clone(), order);

        Schema::new(
            tables,
            vec![Relationship {
                from_table: "Order".to_string(),
                from_column: "customer_id".to_string(),
                to_table: "Customer".to_string(),
                to_column: "id".to_string(),
                is_unique: false,
                collapsed_links: 0,
            }],
        )
    }

    #[test]
    fn test_snapshot_back_to_schema() {
        let schema = sample_schema();
        let snapshot = SchemaSnapshot::capture(&schema, "mssql", Some("Sales".to_string()));
        let json = snapshot.to_json().unwrap();

        let loaded = SchemaSnapshot::from_json(&json).unwrap();
        assert_eq!(loaded.database.as_deref(), Some("Sales"));
        assert_eq!(loaded.into_schema().unwrap(), schema);
    }

    #[test]
    fn test_tables_sorted_by_name() {
        let snapshot = SchemaSnapshot::capture(&sample_schema(), "mssql", None);
        let names: Vec<_> = snapshot.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Customer", "Order"]);
    }

    #[test]
    fn test_rejects_unknown_table() {
        let mut snapshot = SchemaSnapshot::capture(&sample_schema(), "mssql", None);
        snapshot.tables.retain(|t| t.name != "Customer");

        let err = snapshot.into_schema().unwrap_err();
        assert!(err.to_string().contains("unknown table: Customer"));
    }

    #[test]
    fn test_rejects_duplicate_pair() {
        let mut snapshot = SchemaSnapshot::capture(&sample_schema(), "mssql", None);
        let dup = snapshot.relationships[0].clone();
        snapshot.relationships.push(dup);

        assert!(snapshot.into_schema().is_err());
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut snapshot = SchemaSnapshot::capture(&sample_schema(), "mssql", None);
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = snapshot.to_json().unwrap();

        assert!(SchemaSnapshot::from_json(&json).is_err());
    }
}
