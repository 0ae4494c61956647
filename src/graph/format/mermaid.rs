//! Mermaid erDiagram format output.

use crate::graph::view::GraphView;
use ahash::{AHashMap, AHashSet};

/// Generate Mermaid erDiagram from a graph view
pub fn to_mermaid(view: &GraphView) -> String {
    let mut output = String::new();

    output.push_str("erDiagram\n");

    let ids = entity_ids(view);

    // Catalog key queries carry no types, so every attribute is typed `key`
    for table in view.sorted_tables() {
        let safe_name = &ids[table.name.as_str()];
        if table.columns.is_empty() {
            output.push_str(&format!("    {} {{\n    }}\n", safe_name));
            continue;
        }

        output.push_str(&format!("    {} {{\n", safe_name));
        for col in &table.columns {
            let markers = match (col.is_primary_key, col.is_foreign_key) {
                (true, true) => " PK, FK",
                (true, false) => " PK",
                (false, true) => " FK",
                (false, false) => "",
            };
            output.push_str(&format!(
                "        key {}{}\n",
                escape_mermaid_id(&col.name),
                markers
            ));
        }
        output.push_str("    }\n");
    }

    if !view.edges.is_empty() {
        output.push('\n');
    }

    for edge in &view.edges {
        output.push_str(&format!(
            "    {} {} {} : \"{}\"\n",
            entity_id(&ids, &edge.from_table),
            edge.cardinality.as_mermaid(),
            entity_id(&ids, &edge.to_table),
            escape_mermaid_label(&edge.from_column)
        ));
    }

    output
}

/// One distinct entity id per table. Names that escape to the same id
/// (`Sales.Order`, `Sales_Order`) get a numeric suffix in sorted order.
fn entity_ids(view: &GraphView) -> AHashMap<&str, String> {
    let mut taken = AHashSet::new();
    let mut ids = AHashMap::new();
    for table in view.sorted_tables() {
        let base = escape_mermaid_id(&table.name);
        let mut id = base.clone();
        let mut n = 2;
        while !taken.insert(id.clone()) {
            id = format!("{}_{}", base, n);
            n += 1;
        }
        ids.insert(table.name.as_str(), id);
    }
    ids
}

fn entity_id(ids: &AHashMap<&str, String>, table: &str) -> String {
    ids.get(table)
        .cloned()
        .unwrap_or_else(|| escape_mermaid_id(table))
}

/// Relationship labels are quoted; markup characters become Mermaid entity codes
fn escape_mermaid_label(s: &str) -> String {
    s.replace('#', "#35;")
        .replace('"', "#quot;")
        .replace('<', "#lt;")
        .replace('>', "#gt;")
}

/// Escape a string for use as a Mermaid entity or attribute name
fn escape_mermaid_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::sample_view;

    #[test]
    fn test_mermaid_entities() {
        let output = to_mermaid(&sample_view());

        assert!(output.starts_with("erDiagram\n"));
        assert!(output.contains("    Customer {\n        key id PK\n    }"));
        assert!(output.contains("key customer_id FK"));
        assert!(output.contains("key customer_id PK, FK"));
    }

    #[test]
    fn test_mermaid_relationships() {
        let output = to_mermaid(&sample_view());

        assert!(output.contains("Order }o--|| Customer : \"customer_id\""));
        assert!(output.contains("CustomerProfile ||--|| Customer : \"customer_id\""));
    }

    #[test]
    fn test_colliding_table_names_stay_distinct() {
        use crate::catalog::MemoryCatalog;
        use crate::extractor::SchemaExtractor;

        let catalog = MemoryCatalog::new()
            .primary_key("Sales.Order", "id")
            .primary_key("Sales_Order", "id")
            .foreign_key("Sales_Order", "parent_id", "Sales.Order", "id");
        let schema = SchemaExtractor::new(&catalog).extract().unwrap();
        let output = to_mermaid(&GraphView::from_schema(&schema));

        assert_eq!(output.matches("    Sales_Order {").count(), 1);
        assert_eq!(output.matches("    Sales_Order_2 {").count(), 1);
        assert!(output.contains("Sales_Order_2 }o--|| Sales_Order : \"parent_id\""));
    }

    #[test]
    fn test_relationship_label_markup_is_encoded() {
        assert_eq!(
            escape_mermaid_label("a<b>\"c\"#"),
            "a#lt;b#gt;#quot;c#quot;#35;"
        );
    }

    #[test]
    fn test_escape_mermaid_id() {
        assert_eq!(escape_mermaid_id("Order Details"), "Order_Details");
        assert_eq!(escape_mermaid_id("Sales.Order"), "Sales_Order");
    }
}
