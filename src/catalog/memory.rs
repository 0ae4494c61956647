//! In-memory catalog serving canned rows.

use super::{
    Catalog, CatalogError, CatalogQuery, CatalogResult, ForeignKeyRow, KeyColumnRow,
};

/// Catalog backed by fixed row lists, with an optional injected failure
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    pub primary_keys: Vec<KeyColumnRow>,
    pub foreign_key_columns: Vec<KeyColumnRow>,
    pub links: Vec<ForeignKeyRow>,
    failing_query: Option<CatalogQuery>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_key(mut self, table: &str, column: &str) -> Self {
        self.primary_keys.push(KeyColumnRow::new(table, column));
        self
    }

    /// Register a foreign-key column pair, filling both the column and link row lists
    pub fn foreign_key(
        mut self,
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> Self {
        self.foreign_key_columns
            .push(KeyColumnRow::new(from_table, from_column));
        self.links.push(ForeignKeyRow::new(
            from_table,
            from_column,
            to_table,
            to_column,
        ));
        self
    }

    /// Make the given query fail as if the catalog rejected it
    pub fn fail_on(mut self, query: CatalogQuery) -> Self {
        self.failing_query = Some(query);
        self
    }

    fn check(&self, query: CatalogQuery) -> CatalogResult<()> {
        if self.failing_query == Some(query) {
            return Err(CatalogError::query(query, "permission denied"));
        }
        Ok(())
    }
}

impl Catalog for MemoryCatalog {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn describe(&self) -> String {
        "in-memory catalog".to_string()
    }

    fn primary_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>> {
        self.check(CatalogQuery::PrimaryKeyColumns)?;
        Ok(self.primary_keys.clone())
    }

    fn foreign_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>> {
        self.check(CatalogQuery::ForeignKeyColumns)?;
        Ok(self.foreign_key_columns.clone())
    }

    fn foreign_key_links(&self) -> CatalogResult<Vec<ForeignKeyRow>> {
        self.check(CatalogQuery::ForeignKeyLinks)?;
        Ok(self.links.clone())
    }
}
