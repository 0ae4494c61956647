//! Extraction against real DuckDB database files.

use schema_graph::catalog::{Catalog, CatalogError, DuckDbCatalog};
use schema_graph::extractor::SchemaExtractor;
use schema_graph::graph::{to_dot, GraphView, Layout};
use std::path::PathBuf;
use tempfile::TempDir;

fn create_database(dir: &TempDir, ddl: &str) -> PathBuf {
    let path = dir.path().join("shop.duckdb");
    let conn = duckdb::Connection::open(&path).unwrap();
    conn.execute_batch(ddl).unwrap();
    drop(conn);
    path
}

fn shop_ddl() -> &'static str {
    r#"
CREATE TABLE customer (
    id INTEGER PRIMARY KEY,
    name VARCHAR
);

CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER REFERENCES customer(id),
    total DECIMAL(10, 2)
);

CREATE TABLE customer_profile (
    customer_id INTEGER PRIMARY KEY REFERENCES customer(id),
    bio VARCHAR
);

CREATE TABLE audit_log (
    message VARCHAR
);
"#
}

#[test]
fn test_duckdb_primary_keys() {
    let dir = TempDir::new().unwrap();
    let catalog = DuckDbCatalog::new(create_database(&dir, shop_ddl()));

    let mut rows: Vec<(String, String)> = catalog
        .primary_key_columns()
        .unwrap()
        .into_iter()
        .map(|r| (r.table, r.column))
        .collect();
    rows.sort();

    assert_eq!(
        rows,
        vec![
            ("customer".to_string(), "id".to_string()),
            ("customer_profile".to_string(), "customer_id".to_string()),
            ("orders".to_string(), "id".to_string()),
        ]
    );
}

#[test]
fn test_duckdb_foreign_key_links() {
    let dir = TempDir::new().unwrap();
    let catalog = DuckDbCatalog::new(create_database(&dir, shop_ddl()));

    let mut links: Vec<String> = catalog
        .foreign_key_links()
        .unwrap()
        .into_iter()
        .map(|r| format!("{}.{}>{}.{}", r.from_table, r.from_column, r.to_table, r.to_column))
        .collect();
    links.sort();

    assert_eq!(
        links,
        vec![
            "customer_profile.customer_id>customer.id",
            "orders.customer_id>customer.id",
        ]
    );
}

#[test]
fn test_extract_shop_schema() {
    let dir = TempDir::new().unwrap();
    let catalog = DuckDbCatalog::new(create_database(&dir, shop_ddl()));
    let schema = SchemaExtractor::new(&catalog).extract().unwrap();

    // audit_log has no key columns and is not referenced
    assert_eq!(schema.table_count(), 3);
    assert!(schema.table("audit_log").is_none());
    assert_eq!(schema.relationship_count(), 2);

    let orders = schema.table("orders").unwrap();
    assert!(orders.is_primary_key("id"));
    assert!(orders.is_foreign_key_column("customer_id"));

    let to_orders = schema
        .relationships
        .iter()
        .find(|r| r.from_table == "orders")
        .unwrap();
    assert_eq!(to_orders.to_table, "customer");
    assert!(!to_orders.is_unique);

    let to_profile = schema
        .relationships
        .iter()
        .find(|r| r.from_table == "customer_profile")
        .unwrap();
    assert_eq!(to_profile.to_table, "customer");
    assert!(to_profile.is_unique);

    assert_eq!(schema.dangling_relationships().count(), 0);
}

#[test]
fn test_extract_composite_foreign_key_folds_into_one_relationship() {
    let dir = TempDir::new().unwrap();
    let path = create_database(
        &dir,
        r#"
CREATE TABLE warehouse (
    region VARCHAR,
    code VARCHAR,
    PRIMARY KEY (region, code)
);

CREATE TABLE stock (
    id INTEGER PRIMARY KEY,
    region VARCHAR,
    code VARCHAR,
    FOREIGN KEY (region, code) REFERENCES warehouse(region, code)
);
"#,
    );
    let schema = SchemaExtractor::new(&DuckDbCatalog::new(path))
        .extract()
        .unwrap();

    assert_eq!(schema.relationship_count(), 1);
    let rel = &schema.relationships[0];
    assert_eq!(rel.from_table, "stock");
    assert_eq!(rel.to_table, "warehouse");
    assert_eq!(rel.collapsed_links, 1);
    assert_eq!(schema.table("warehouse").unwrap().primary_keys.len(), 2);
}

#[test]
fn test_extract_empty_database() {
    let dir = TempDir::new().unwrap();
    let path = create_database(&dir, "CREATE TABLE notes (body VARCHAR);");
    let schema = SchemaExtractor::new(&DuckDbCatalog::new(path))
        .extract()
        .unwrap();

    assert!(schema.is_empty());
    assert_eq!(schema.relationship_count(), 0);
}

#[test]
fn test_extract_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let catalog = DuckDbCatalog::new(create_database(&dir, shop_ddl()));

    let first = SchemaExtractor::new(&catalog).extract().unwrap();
    let second = SchemaExtractor::new(&catalog).extract().unwrap();

    assert_eq!(first.tables, second.tables);
    assert_eq!(first.relationship_count(), second.relationship_count());
}

#[test]
fn test_missing_database_file() {
    let dir = TempDir::new().unwrap();
    let catalog = DuckDbCatalog::new(dir.path().join("absent.duckdb"));

    let err = SchemaExtractor::new(&catalog).extract().unwrap_err();
    assert!(matches!(err, CatalogError::Connect { .. }));
    assert!(err.to_string().contains("absent.duckdb"));
}

#[test]
fn test_duckdb_schema_to_dot() {
    let dir = TempDir::new().unwrap();
    let catalog = DuckDbCatalog::new(create_database(&dir, shop_ddl()));
    let schema = SchemaExtractor::new(&catalog).extract().unwrap();

    let dot = to_dot(&GraphView::from_schema(&schema), Layout::LR);
    assert!(dot.contains("orders -> customer"));
    assert!(dot.contains("customer_profile -> customer"));
    assert!(dot.contains("orders.customer_id ➝ customer.id"));
}
