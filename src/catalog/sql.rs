//! Fixed metadata query texts.
//!
//! The SQL Server texts read the `sys.*` catalog views and run unchanged
//! against any SQL Server compatible catalog. The DuckDB texts return the
//! same row shapes from `duckdb_constraints()`.

use super::CatalogQuery;

/// (table, column) for every column of every primary-key index
pub const MSSQL_PRIMARY_KEY_COLUMNS: &str = "
SELECT t.name, c.name
FROM sys.tables t
JOIN sys.indexes i ON t.object_id = i.object_id AND i.is_primary_key = 1
JOIN sys.index_columns ic ON ic.object_id = t.object_id AND ic.index_id = i.index_id
JOIN sys.columns c ON c.object_id = t.object_id AND c.column_id = ic.column_id";

/// (table, column) for every parent column of every foreign-key constraint
pub const MSSQL_FOREIGN_KEY_COLUMNS: &str = "
SELECT t.name, c.name
FROM sys.foreign_keys fk
JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id
JOIN sys.tables t ON fk.parent_object_id = t.object_id
JOIN sys.columns c ON t.object_id = c.object_id AND fkc.parent_column_id = c.column_id";

/// (from_table, from_column, to_table, to_column) for every foreign-key column pair
pub const MSSQL_FOREIGN_KEY_LINKS: &str = "
SELECT tp.name, cp.name, tr.name, cr.name
FROM sys.foreign_keys fk
JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id
JOIN sys.tables tp ON tp.object_id = fk.parent_object_id
JOIN sys.columns cp ON cp.object_id = tp.object_id AND cp.column_id = fkc.parent_column_id
JOIN sys.tables tr ON tr.object_id = fk.referenced_object_id
JOIN sys.columns cr ON cr.object_id = tr.object_id AND cr.column_id = fkc.referenced_column_id";

pub const DUCKDB_PRIMARY_KEY_COLUMNS: &str = "
SELECT table_name, unnest(constraint_column_names)
FROM duckdb_constraints()
WHERE constraint_type = 'PRIMARY KEY'";

pub const DUCKDB_FOREIGN_KEY_COLUMNS: &str = "
SELECT table_name, unnest(constraint_column_names)
FROM duckdb_constraints()
WHERE constraint_type = 'FOREIGN KEY'";

pub const DUCKDB_FOREIGN_KEY_LINKS: &str = "
SELECT table_name, unnest(constraint_column_names), referenced_table, unnest(referenced_column_names)
FROM duckdb_constraints()
WHERE constraint_type = 'FOREIGN KEY'";

pub fn mssql(query: CatalogQuery) -> &'static str {
    match query {
        CatalogQuery::PrimaryKeyColumns => MSSQL_PRIMARY_KEY_COLUMNS,
        CatalogQuery::ForeignKeyColumns => MSSQL_FOREIGN_KEY_COLUMNS,
        CatalogQuery::ForeignKeyLinks => MSSQL_FOREIGN_KEY_LINKS,
    }
}

pub fn duckdb(query: CatalogQuery) -> &'static str {
    match query {
        CatalogQuery::PrimaryKeyColumns => DUCKDB_PRIMARY_KEY_COLUMNS,
        CatalogQuery::ForeignKeyColumns => DUCKDB_FOREIGN_KEY_COLUMNS,
        CatalogQuery::ForeignKeyLinks => DUCKDB_FOREIGN_KEY_LINKS,
    }
}
