//! Schema model produced by one catalog extraction.
//!
//! This module provides:
//! - `Table`: a table name with its primary-key and foreign-key columns
//! - `Relationship`: one deduplicated foreign-key link between two tables
//! - `Schema`: the table map plus relationship list for a single extraction
//! - `SchemaSnapshot`: the serializable export document

mod snapshot;

pub use snapshot::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A table and the key columns found for it in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    /// Table name (unique within a schema)
    pub name: String,
    /// Primary-key columns, in catalog order
    pub primary_keys: Vec<String>,
    /// Columns that take part in a foreign key, in catalog order
    pub foreign_key_columns: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_keys: Vec::new(),
            foreign_key_columns: Vec::new(),
        }
    }

    /// Append a primary-key column, skipping duplicates. Returns true if added.
    pub fn push_primary_key(&mut self, column: &str) -> bool {
        push_distinct(&mut self.primary_keys, column)
    }

    /// Append a foreign-key column, skipping duplicates. Returns true if added.
    pub fn push_foreign_key_column(&mut self, column: &str) -> bool {
        push_distinct(&mut self.foreign_key_columns, column)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|c| c == column)
    }

    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_key_columns.iter().any(|c| c == column)
    }

    /// Primary keys followed by foreign-key-only columns, without duplicates
    pub fn all_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(
            self.primary_keys.len() + self.foreign_key_columns.len(),
        );
        for column in self.primary_keys.iter().chain(&self.foreign_key_columns) {
            if !keys.contains(&column.as_str()) {
                keys.push(column);
            }
        }
        keys
    }

    /// True when the catalog reported no key columns at all for this table
    pub fn is_keyless(&self) -> bool {
        self.primary_keys.is_empty() && self.foreign_key_columns.is_empty()
    }
}

fn push_distinct(list: &mut Vec<String>, column: &str) -> bool {
    if list.iter().any(|c| c == column) {
        false
    } else {
        list.push(column.to_string());
        true
    }
}

/// A foreign-key link between two tables, at most one per ordered table pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    /// Referencing (child) table
    pub from_table: String,
    /// Referencing column of the row that was kept
    pub from_column: String,
    /// Referenced (parent) table
    pub to_table: String,
    /// Referenced column of the row that was kept
    pub to_column: String,
    /// One-to-one link: the referencing column is a primary key of `from_table`
    pub is_unique: bool,
    /// Further catalog rows for the same table pair that were folded into this one
    #[serde(default)]
    pub collapsed_links: usize,
}

impl Relationship {
    /// Human-readable link description, e.g. `Order.customer_id ➝ Customer.id`
    pub fn description(&self) -> String {
        format!(
            "{}.{} ➝ {}.{}",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }

    pub fn is_self_reference(&self) -> bool {
        self.from_table == self.to_table
    }
}

/// Tables and relationships from a single extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
    pub relationships: Vec<Relationship>,
}

impl Schema {
    pub fn new(tables: BTreeMap<String, Table>, relationships: Vec<Relationship>) -> Self {
        Self {
            tables,
            relationships,
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Total catalog FK rows that deduplication folded away
    pub fn collapsed_link_count(&self) -> usize {
        self.relationships.iter().map(|r| r.collapsed_links).sum()
    }

    /// Relationships whose endpoints are missing from the table map
    pub fn dangling_relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter().filter(|r| {
            !self.tables.contains_key(&r.from_table) || !self.tables.contains_key(&r.to_table)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keys_primary_first() {
        let mut table = Table::new("OrderLine");
        table.push_primary_key("order_id");
        table.push_primary_key("line_no");
        table.push_foreign_key_column("product_id");
        table.push_foreign_key_column("order_id");

        assert_eq!(table.all_keys(), vec!["order_id", "line_no", "product_id"]);
    }

    #[test]
    fn test_push_skips_duplicates() {
        let mut table = Table::new("Customer");
        assert!(table.push_primary_key("id"));
        assert!(!table.push_primary_key("id"));
        assert!(table.push_foreign_key_column("region_id"));
        assert!(!table.push_foreign_key_column("region_id"));

        assert_eq!(table.primary_keys, vec!["id"]);
        assert_eq!(table.foreign_key_columns, vec!["region_id"]);
    }

    #[test]
    fn test_keyless_table() {
        let table = Table::new("AuditLog");
        assert!(table.is_keyless());
        assert!(table.all_keys().is_empty());
    }

    #[test]
    fn test_relationship_description() {
        let rel = Relationship {
            from_table: "Order".to_string(),
            from_column: "customer_id".to_string(),
            to_table: "Customer".to_string(),
            to_column: "id".to_string(),
            is_unique: false,
            collapsed_links: 0,
        };
        assert_eq!(rel.description(), "Order.customer_id ➝ Customer.id");
        assert!(!rel.is_self_reference());
    }

    #[test]
    fn test_dangling_relationships() {
        let mut tables = BTreeMap::new();
        tables.insert("Order".to_string(), Table::new("Order"));
        let schema = Schema::new(
            tables,
            vec![Relationship {
                from_table: "Order".to_string(),
                from_column: "customer_id".to_string(),
                to_table: "Customer".to_string(),
                to_column: "id".to_string(),
                is_unique: false,
                collapsed_links: 0,
            }],
        );

        assert_eq!(schema.dangling_relationships().count(), 1);
    }
}
