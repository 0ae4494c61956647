//! Graph view with filtering and focus capabilities for diagram export.

use crate::model::Schema;
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use std::collections::VecDeque;

/// A key column shown inside a table node
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Whether this column is a primary key
    pub is_primary_key: bool,
    /// Whether this column takes part in a foreign key
    pub is_foreign_key: bool,
    /// If FK, which table it references
    pub references_table: Option<String>,
    /// If FK, which column it references
    pub references_column: Option<String>,
}

/// A table node
#[derive(Debug, Clone)]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// Key columns, primary keys first
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }
}

/// An edge (FK relationship) in the graph
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// Source table (child with FK)
    pub from_table: String,
    /// Source column (FK column)
    pub from_column: String,
    /// Target table (parent being referenced)
    pub to_table: String,
    /// Target column (referenced column, usually PK)
    pub to_column: String,
    /// Relationship cardinality
    pub cardinality: Cardinality,
    /// Catalog rows for the same table pair folded into this edge
    pub collapsed_links: usize,
}

impl EdgeInfo {
    /// Hover text, e.g. `Order.customer_id ➝ Customer.id`
    pub fn description(&self) -> String {
        format!(
            "{}.{} ➝ {}.{}",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }

    pub fn is_one_to_one(&self) -> bool {
        self.cardinality == Cardinality::OneToOne
    }
}

/// Relationship cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// Child rows point at one parent; the usual FK
    #[default]
    ManyToOne,
    /// The FK column is also the child's primary key
    OneToOne,
}

impl Cardinality {
    pub fn from_unique(is_unique: bool) -> Self {
        if is_unique {
            Cardinality::OneToOne
        } else {
            Cardinality::ManyToOne
        }
    }

    /// Mermaid ERD notation
    pub fn as_mermaid(self) -> &'static str {
        match self {
            Cardinality::ManyToOne => "}o--||",
            Cardinality::OneToOne => "||--||",
        }
    }
}

/// A filtered view of a schema for diagram rendering
#[derive(Debug)]
pub struct GraphView {
    /// Tables included in this view with their key columns
    pub tables: AHashMap<String, TableInfo>,
    /// Edges between tables (FK relationships)
    pub edges: Vec<EdgeInfo>,
}

impl GraphView {
    /// Create a full view from a schema (all tables and relationships)
    pub fn from_schema(schema: &Schema) -> Self {
        // Kept relationships tell us what an FK column points at
        let mut fk_lookup: AHashMap<(&str, &str), (&str, &str)> = AHashMap::new();
        for rel in &schema.relationships {
            fk_lookup.insert(
                (rel.from_table.as_str(), rel.from_column.as_str()),
                (rel.to_table.as_str(), rel.to_column.as_str()),
            );
        }

        let mut tables = AHashMap::new();
        for table in schema.tables.values() {
            let columns = table
                .all_keys()
                .into_iter()
                .map(|name| {
                    let target = fk_lookup.get(&(table.name.as_str(), name));
                    ColumnInfo {
                        name: name.to_string(),
                        is_primary_key: table.is_primary_key(name),
                        is_foreign_key: table.is_foreign_key_column(name),
                        references_table: target.map(|(t, _)| t.to_string()),
                        references_column: target.map(|(_, c)| c.to_string()),
                    }
                })
                .collect();

            tables.insert(
                table.name.clone(),
                TableInfo {
                    name: table.name.clone(),
                    columns,
                },
            );
        }

        let edges = schema
            .relationships
            .iter()
            .map(|rel| EdgeInfo {
                from_table: rel.from_table.clone(),
                from_column: rel.from_column.clone(),
                to_table: rel.to_table.clone(),
                to_column: rel.to_column.clone(),
                cardinality: Cardinality::from_unique(rel.is_unique),
                collapsed_links: rel.collapsed_links,
            })
            .collect();

        Self { tables, edges }
    }

    /// Filter to include only tables matching the given patterns
    pub fn filter_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let matching: AHashSet<String> = self
            .tables
            .keys()
            .filter(|name| patterns.iter().any(|p| p.matches(name)))
            .cloned()
            .collect();

        self.apply_node_filter(&matching);
    }

    /// Exclude tables matching the given patterns
    pub fn exclude_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let remaining: AHashSet<String> = self
            .tables
            .keys()
            .filter(|name| !patterns.iter().any(|p| p.matches(name)))
            .cloned()
            .collect();

        self.apply_node_filter(&remaining);
    }

    /// Focus on a specific table and its relationships
    pub fn focus_table(
        &mut self,
        table: &str,
        transitive: bool,
        reverse: bool,
        max_depth: Option<usize>,
    ) {
        if !self.tables.contains_key(table) {
            self.tables.clear();
            self.edges.clear();
            return;
        }

        let mut result_nodes = AHashSet::new();
        result_nodes.insert(table.to_string());

        let (outgoing, incoming) = self.build_adjacency_maps();

        if transitive {
            // Tables this table depends on (parents, transitively)
            self.traverse(&outgoing, table, max_depth, &mut result_nodes);
        }

        if reverse {
            // Tables that depend on this table (children, transitively)
            self.traverse(&incoming, table, max_depth, &mut result_nodes);
        }

        if !transitive && !reverse {
            if let Some(parents) = outgoing.get(table) {
                result_nodes.extend(parents.iter().cloned());
            }
            if let Some(children) = incoming.get(table) {
                result_nodes.extend(children.iter().cloned());
            }
        }

        self.apply_node_filter(&result_nodes);
    }

    /// Get the number of tables in the view
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Get the number of edges in the view
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Total key columns across all tables
    pub fn column_count(&self) -> usize {
        self.tables.values().map(|t| t.columns.len()).sum()
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get tables sorted alphabetically
    pub fn sorted_tables(&self) -> Vec<&TableInfo> {
        let mut tables: Vec<_> = self.tables.values().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }

    /// Get table info by name
    pub fn get_table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    fn apply_node_filter(&mut self, keep: &AHashSet<String>) {
        self.tables.retain(|n, _| keep.contains(n));
        self.edges
            .retain(|e| keep.contains(&e.from_table) && keep.contains(&e.to_table));
    }

    fn build_adjacency_maps(
        &self,
    ) -> (AHashMap<String, Vec<String>>, AHashMap<String, Vec<String>>) {
        let mut outgoing: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut incoming: AHashMap<String, Vec<String>> = AHashMap::new();

        for edge in &self.edges {
            outgoing
                .entry(edge.from_table.clone())
                .or_default()
                .push(edge.to_table.clone());
            incoming
                .entry(edge.to_table.clone())
                .or_default()
                .push(edge.from_table.clone());
        }

        (outgoing, incoming)
    }

    fn traverse(
        &self,
        adjacency: &AHashMap<String, Vec<String>>,
        start: &str,
        max_depth: Option<usize>,
        result: &mut AHashSet<String>,
    ) {
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((start.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if let Some(max) = max_depth {
                if depth >= max {
                    continue;
                }
            }

            if let Some(neighbors) = adjacency.get(&current) {
                for neighbor in neighbors {
                    if result.insert(neighbor.clone()) {
                        queue.push_back((neighbor.clone(), depth + 1));
                    }
                }
            }
        }
    }
}

/// Shared fixture for the renderer tests
#[cfg(test)]
pub(crate) fn sample_view() -> GraphView {
    use crate::catalog::MemoryCatalog;
    use crate::extractor::SchemaExtractor;

    let catalog = MemoryCatalog::new()
        .primary_key("Customer", "id")
        .primary_key("Order", "id")
        .primary_key("CustomerProfile", "customer_id")
        .foreign_key("Order", "customer_id", "Customer", "id")
        .foreign_key("CustomerProfile", "customer_id", "Customer", "id");
    let schema = SchemaExtractor::new(&catalog).extract().unwrap();
    GraphView::from_schema(&schema)
}
