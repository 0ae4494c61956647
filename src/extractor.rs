//! Schema extraction: fold catalog rows into the schema model.
//!
//! Extraction is a single pass over each result set. Tables are created on
//! first sight of their name; relationships keep the first catalog row per
//! ordered (from_table, to_table) pair.

use crate::catalog::{Catalog, CatalogError, CatalogQuery, CatalogResult, KeyColumnRow};
use crate::model::{Relationship, Schema, Table};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Extraction steps reported to an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStage {
    PrimaryKeys,
    ForeignKeyColumns,
    Relationships,
    Done,
}

impl std::fmt::Display for ExtractStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractStage::PrimaryKeys => write!(f, "loading primary keys"),
            ExtractStage::ForeignKeyColumns => write!(f, "loading foreign key columns"),
            ExtractStage::Relationships => write!(f, "loading relationships"),
            ExtractStage::Done => write!(f, "done"),
        }
    }
}

/// Runs the fixed metadata queries against a catalog and builds a `Schema`
pub struct SchemaExtractor<'a> {
    catalog: &'a dyn Catalog,
    observer: Option<Box<dyn Fn(ExtractStage) + 'a>>,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self {
            catalog,
            observer: None,
        }
    }

    /// Call `observer` as each extraction step starts
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(ExtractStage) + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    fn notify(&self, stage: ExtractStage) {
        if let Some(ref observer) = self.observer {
            observer(stage);
        }
    }

    /// Load every table that has a primary-key or foreign-key column
    pub fn load_tables(&self) -> CatalogResult<BTreeMap<String, Table>> {
        let mut tables = BTreeMap::new();

        self.notify(ExtractStage::PrimaryKeys);
        let rows = self.catalog.primary_key_columns()?;
        fold_key_rows(&mut tables, rows, Table::push_primary_key);

        self.notify(ExtractStage::ForeignKeyColumns);
        let rows = self.catalog.foreign_key_columns()?;
        fold_key_rows(&mut tables, rows, Table::push_foreign_key_column);

        log::debug!("loaded {} tables from {}", tables.len(), self.catalog.describe());
        Ok(tables)
    }

    /// Load foreign-key links, one relationship per ordered table pair.
    ///
    /// `is_unique` is set when the referencing column is a primary key of
    /// its table in `tables`. Later rows for an already seen pair are
    /// counted in `collapsed_links` and otherwise dropped.
    pub fn load_relationships(
        &self,
        tables: &BTreeMap<String, Table>,
    ) -> CatalogResult<Vec<Relationship>> {
        self.notify(ExtractStage::Relationships);
        let rows = self.catalog.foreign_key_links()?;

        let mut relationships: Vec<Relationship> = Vec::new();
        let mut by_pair: AHashMap<(String, String), usize> = AHashMap::new();

        for row in rows {
            let from = tables.get(&row.from_table).ok_or_else(|| {
                CatalogError::malformed(
                    CatalogQuery::ForeignKeyLinks,
                    format!(
                        "foreign key from unknown table {} ({} ➝ {}.{})",
                        row.from_table, row.from_column, row.to_table, row.to_column
                    ),
                )
            })?;

            let pair = (row.from_table.clone(), row.to_table.clone());
            if let Some(&index) = by_pair.get(&pair) {
                let kept = &mut relationships[index];
                kept.collapsed_links += 1;
                log::debug!(
                    "folded {}.{} ➝ {}.{} into {}",
                    row.from_table,
                    row.from_column,
                    row.to_table,
                    row.to_column,
                    kept.description()
                );
                continue;
            }

            by_pair.insert(pair, relationships.len());
            relationships.push(Relationship {
                is_unique: from.is_primary_key(&row.from_column),
                from_table: row.from_table,
                from_column: row.from_column,
                to_table: row.to_table,
                to_column: row.to_column,
                collapsed_links: 0,
            });
        }

        Ok(relationships)
    }

    /// Full extraction: tables, then relationships.
    ///
    /// Tables that are only ever referenced (no key rows of their own) are
    /// added without keys so that every relationship endpoint is a table.
    pub fn extract(&self) -> CatalogResult<Schema> {
        let mut tables = self.load_tables()?;
        let relationships = self.load_relationships(&tables)?;

        for rel in &relationships {
            if !tables.contains_key(&rel.to_table) {
                log::warn!(
                    "table {} is referenced by {} but has no key columns in the catalog",
                    rel.to_table,
                    rel.from_table
                );
                tables.insert(rel.to_table.clone(), Table::new(rel.to_table.clone()));
            }
        }

        let schema = Schema::new(tables, relationships);
        let collapsed = schema.collapsed_link_count();
        if collapsed > 0 {
            log::debug!(
                "{} foreign key rows folded into existing table pairs",
                collapsed
            );
        }
        self.notify(ExtractStage::Done);
        Ok(schema)
    }
}

fn fold_key_rows(
    tables: &mut BTreeMap<String, Table>,
    rows: Vec<KeyColumnRow>,
    push: fn(&mut Table, &str) -> bool,
) {
    for row in rows {
        let table = tables
            .entry(row.table)
            .or_insert_with_key(|name| Table::new(name.clone()));
        push(table, &row.column);
    }
}
