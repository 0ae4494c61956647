//! JSON format output for diagram data.

use crate::graph::view::{Cardinality, GraphView};
use schemars::JsonSchema;
use serde::Serialize;

/// JSON representation of the diagram
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdJson {
    pub tables: Vec<TableJson>,
    pub relationships: Vec<RelationshipJson>,
    pub stats: ErdStats,
}

/// A table node with its key columns
#[derive(Debug, Serialize, JsonSchema)]
pub struct TableJson {
    pub name: String,
    pub columns: Vec<ColumnJson>,
}

/// A key column
#[derive(Debug, Serialize, JsonSchema)]
pub struct ColumnJson {
    pub name: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_column: Option<String>,
}

/// A relationship edge
#[derive(Debug, Serialize, JsonSchema)]
pub struct RelationshipJson {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    /// `one_to_one` or `many_to_one`
    pub cardinality: String,
    pub is_unique: bool,
    /// Hover text, e.g. `Order.customer_id ➝ Customer.id`
    pub description: String,
    /// Foreign-key rows for the same table pair folded into this edge
    pub collapsed_links: usize,
}

/// Diagram statistics
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdStats {
    pub table_count: usize,
    pub column_count: usize,
    pub relationship_count: usize,
    pub collapsed_link_count: usize,
}

/// Generate JSON output from a graph view
pub fn to_json(view: &GraphView) -> String {
    let erd = build_erd_json(view);
    serde_json::to_string_pretty(&erd).unwrap_or_else(|_| "{}".to_string())
}

/// Build the JSON structure
pub fn build_erd_json(view: &GraphView) -> ErdJson {
    let tables: Vec<TableJson> = view
        .sorted_tables()
        .iter()
        .map(|table| TableJson {
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|col| ColumnJson {
                    name: col.name.clone(),
                    is_primary_key: col.is_primary_key,
                    is_foreign_key: col.is_foreign_key,
                    references_table: col.references_table.clone(),
                    references_column: col.references_column.clone(),
                })
                .collect(),
        })
        .collect();

    let relationships: Vec<RelationshipJson> = view
        .edges
        .iter()
        .map(|e| RelationshipJson {
            from_table: e.from_table.clone(),
            from_column: e.from_column.clone(),
            to_table: e.to_table.clone(),
            to_column: e.to_column.clone(),
            cardinality: match e.cardinality {
                Cardinality::OneToOne => "one_to_one",
                Cardinality::ManyToOne => "many_to_one",
            }
            .to_string(),
            is_unique: e.cardinality == Cardinality::OneToOne,
            description: e.description(),
            collapsed_links: e.collapsed_links,
        })
        .collect();

    ErdJson {
        stats: ErdStats {
            table_count: view.table_count(),
            column_count: view.column_count(),
            relationship_count: view.edge_count(),
            collapsed_link_count: relationships.iter().map(|r| r.collapsed_links).sum(),
        },
        tables,
        relationships,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::sample_view;

    #[test]
    fn test_json_structure() {
        let erd = build_erd_json(&sample_view());

        assert_eq!(erd.tables.len(), 3);
        assert_eq!(erd.relationships.len(), 2);
        assert_eq!(erd.stats.table_count, 3);
        assert_eq!(erd.stats.column_count, 4);
        assert_eq!(erd.stats.collapsed_link_count, 0);
    }

    #[test]
    fn test_json_tables_sorted() {
        let erd = build_erd_json(&sample_view());
        let names: Vec<_> = erd.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Customer", "CustomerProfile", "Order"]);
    }

    #[test]
    fn test_json_fk_references() {
        let erd = build_erd_json(&sample_view());

        let order = erd.tables.iter().find(|t| t.name == "Order").unwrap();
        let fk = order.columns.iter().find(|c| c.name == "customer_id").unwrap();
        assert!(fk.is_foreign_key);
        assert_eq!(fk.references_table.as_deref(), Some("Customer"));
        assert_eq!(fk.references_column.as_deref(), Some("id"));
    }

    #[test]
    fn test_json_output() {
        let output = to_json(&sample_view());

        assert!(output.contains("\"cardinality\": \"one_to_one\""));
        assert!(output.contains("\"cardinality\": \"many_to_one\""));
        assert!(output.contains("\"description\": \"Order.customer_id ➝ Customer.id\""));
        assert!(!output.contains("\"references_table\": null"));
    }
}
