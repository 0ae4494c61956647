//! Catalog backends that answer the three fixed metadata queries.
//!
//! Every backend runs its query, reads every row and releases the connection
//! before returning. Nothing is cached between calls.

mod duckdb;
mod memory;
mod mssql;
pub mod sql;

pub use self::duckdb::DuckDbCatalog;
pub use memory::MemoryCatalog;
pub use mssql::MssqlCatalog;

use std::fmt;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// The fixed metadata queries every catalog answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogQuery {
    /// (table, column) for every primary-key column
    PrimaryKeyColumns,
    /// (table, column) for every column that takes part in a foreign key
    ForeignKeyColumns,
    /// (from_table, from_column, to_table, to_column) for every foreign-key column pair
    ForeignKeyLinks,
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogQuery::PrimaryKeyColumns => write!(f, "primary key columns"),
            CatalogQuery::ForeignKeyColumns => write!(f, "foreign key columns"),
            CatalogQuery::ForeignKeyLinks => write!(f, "foreign key links"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid connection configuration: {0}")]
    Config(String),
    #[error("failed to connect to {target}: {message}")]
    Connect { target: String, message: String },
    #[error("catalog query failed ({query}): {message}")]
    Query { query: CatalogQuery, message: String },
    #[error("malformed catalog result ({query}): {message}")]
    MalformedRow { query: CatalogQuery, message: String },
}

impl CatalogError {
    pub fn config(message: impl Into<String>) -> Self {
        CatalogError::Config(message.into())
    }

    pub fn connect(target: impl Into<String>, message: impl fmt::Display) -> Self {
        CatalogError::Connect {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn query(query: CatalogQuery, message: impl fmt::Display) -> Self {
        CatalogError::Query {
            query,
            message: message.to_string(),
        }
    }

    pub fn malformed(query: CatalogQuery, message: impl Into<String>) -> Self {
        CatalogError::MalformedRow {
            query,
            message: message.into(),
        }
    }
}

/// A (table, column) row from the primary-key or foreign-key column query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumnRow {
    pub table: String,
    pub column: String,
}

impl KeyColumnRow {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A row from the foreign-key link query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl ForeignKeyRow {
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
        }
    }
}

/// Read-only access to a relational catalog's key metadata
pub trait Catalog {
    /// Backend name recorded in snapshots (e.g. `mssql`)
    fn kind(&self) -> &'static str;

    /// Target description for log and status lines
    fn describe(&self) -> String;

    /// Database name, when known
    fn database(&self) -> Option<String> {
        None
    }

    fn primary_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>>;

    fn foreign_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>>;

    fn foreign_key_links(&self) -> CatalogResult<Vec<ForeignKeyRow>>;
}

/// Unwrap a catalog name column, treating NULL as a malformed result
pub(crate) fn required(
    value: Option<String>,
    query: CatalogQuery,
    column: &str,
) -> CatalogResult<String> {
    value.ok_or_else(|| CatalogError::malformed(query, format!("unexpected NULL in {}", column)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_null() {
        let err = required(None, CatalogQuery::ForeignKeyLinks, "to_table").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRow { .. }));
        assert_eq!(
            err.to_string(),
            "malformed catalog result (foreign key links): unexpected NULL in to_table"
        );
    }

    #[test]
    fn test_required_passes_value() {
        let value = required(
            Some("Customer".to_string()),
            CatalogQuery::PrimaryKeyColumns,
            "table",
        )
        .unwrap();
        assert_eq!(value, "Customer");
    }
}
