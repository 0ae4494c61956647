//! DuckDB database files as a catalog source.

use super::{
    required, sql, Catalog, CatalogError, CatalogQuery, CatalogResult, ForeignKeyRow,
    KeyColumnRow,
};
use ::duckdb::{AccessMode, Config, Connection};
use std::path::{Path, PathBuf};

/// Reads key metadata from a DuckDB database file, opened read-only per query
#[derive(Debug, Clone)]
pub struct DuckDbCatalog {
    path: PathBuf,
}

impl DuckDbCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> CatalogResult<Connection> {
        if !self.path.exists() {
            return Err(CatalogError::connect(
                self.describe(),
                "database file does not exist",
            ));
        }
        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| CatalogError::connect(self.describe(), e))?;
        Connection::open_with_flags(&self.path, config)
            .map_err(|e| CatalogError::connect(self.describe(), e))
    }

    fn run<T>(
        &self,
        query: CatalogQuery,
        width: usize,
        map: impl Fn(Vec<Option<String>>) -> CatalogResult<T>,
    ) -> CatalogResult<Vec<T>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(sql::duckdb(query))
            .map_err(|e| CatalogError::query(query, e))?;
        let raw = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| CatalogError::query(query, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CatalogError::query(query, e))?;

        log::debug!("{}: {} rows from {}", query, raw.len(), self.path.display());
        raw.into_iter().map(map).collect()
    }

    fn key_columns(&self, query: CatalogQuery) -> CatalogResult<Vec<KeyColumnRow>> {
        self.run(query, 2, |values| {
            let mut values = values.into_iter();
            Ok(KeyColumnRow {
                table: required(values.next().flatten(), query, "table")?,
                column: required(values.next().flatten(), query, "column")?,
            })
        })
    }
}

impl Catalog for DuckDbCatalog {
    fn kind(&self) -> &'static str {
        "duckdb"
    }

    fn describe(&self) -> String {
        format!("duckdb:{}", self.path.display())
    }

    fn database(&self) -> Option<String> {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }

    fn primary_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>> {
        self.key_columns(CatalogQuery::PrimaryKeyColumns)
    }

    fn foreign_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>> {
        self.key_columns(CatalogQuery::ForeignKeyColumns)
    }

    fn foreign_key_links(&self) -> CatalogResult<Vec<ForeignKeyRow>> {
        let query = CatalogQuery::ForeignKeyLinks;
        self.run(query, 4, |values| {
            let mut values = values.into_iter();
            Ok(ForeignKeyRow {
                from_table: required(values.next().flatten(), query, "from_table")?,
                from_column: required(values.next().flatten(), query, "from_column")?,
                to_table: required(values.next().flatten(), query, "to_table")?,
                to_column: required(values.next().flatten(), query, "to_column")?,
            })
        })
    }
}
