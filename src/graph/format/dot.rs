//! Graphviz DOT output.
//!
//! Tables render as rounded boxes with a blue header and one row per key
//! column; edges have no arrowhead and end in a small dot at the referenced
//! table. Layout is left to Graphviz's layered `dot` engine.

use crate::graph::format::Layout;
use crate::graph::view::{Cardinality, GraphView, TableInfo};

const HEADER_BG: &str = "#2b579a";
const BODY_BG: &str = "#fffff0";
const EDGE_COLOR: &str = "#778899";
const DOT_COLOR: &str = "#87cefa";

/// Rank and node separation in inches (100px at 72 dpi)
const SEPARATION: &str = "1.4";

/// Generate DOT output with one HTML-like table node per table
pub fn to_dot(view: &GraphView, layout: Layout) -> String {
    let mut output = String::new();

    output.push_str("digraph schema {\n");
    output.push_str(&format!(
        "  graph [pad=\"0.5\", nodesep=\"{sep}\", ranksep=\"{sep}\", splines=true];\n",
        sep = SEPARATION
    ));

    let rankdir = match layout {
        Layout::LR => "LR",
        Layout::TB => "TB",
    };
    output.push_str(&format!("  rankdir={};\n", rankdir));

    output.push_str("  node [shape=none, margin=0, fontname=\"Segoe UI\"];\n");
    output.push_str(&format!(
        "  edge [color=\"{}\", penwidth=1.5, arrowhead=dot, arrowsize=0.6, fillcolor=\"{}\"];\n\n",
        EDGE_COLOR, DOT_COLOR
    ));

    for table in view.sorted_tables() {
        output.push_str(&format!(
            "  {} [label=<{}>];\n",
            escape_dot_id(&table.name),
            table_label(table)
        ));
    }

    if !view.edges.is_empty() {
        output.push('\n');
    }

    for edge in &view.edges {
        let mut attrs = vec![format!(
            "tooltip=\"{}\"",
            escape_dot_string(&edge.description())
        )];
        if edge.cardinality == Cardinality::OneToOne {
            attrs.push("dir=both".to_string());
            attrs.push("arrowtail=tee".to_string());
        }
        if edge.collapsed_links > 0 {
            attrs.push(format!("label=\"+{}\"", edge.collapsed_links));
        }
        output.push_str(&format!(
            "  {} -> {} [{}];\n",
            escape_dot_id(&edge.from_table),
            escape_dot_id(&edge.to_table),
            attrs.join(", ")
        ));
    }

    output.push_str("}\n");
    output
}

/// HTML-like label: header with the table name, then one row per key column
fn table_label(table: &TableInfo) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<TABLE BORDER=\"1\" COLOR=\"lightgray\" CELLBORDER=\"0\" CELLSPACING=\"0\" CELLPADDING=\"4\" STYLE=\"ROUNDED\" BGCOLOR=\"{}\">",
        BODY_BG
    ));
    html.push_str(&format!(
        "<TR><TD BGCOLOR=\"{}\" COLSPAN=\"2\"><FONT COLOR=\"{}\"><B>{}</B></FONT></TD></TR>",
        HEADER_BG,
        BODY_BG,
        escape_html(&table.name)
    ));

    for col in &table.columns {
        let marker = match (col.is_primary_key, col.is_foreign_key) {
            (true, true) => "PK FK",
            (true, false) => "PK",
            (false, true) => "FK",
            (false, false) => "",
        };
        html.push_str("<TR>");
        html.push_str(&format!(
            "<TD ALIGN=\"LEFT\"><FONT COLOR=\"{}\"><B>{}</B></FONT></TD>",
            HEADER_BG,
            escape_html(&col.name)
        ));
        html.push_str(&format!(
            "<TD ALIGN=\"RIGHT\"><FONT POINT-SIZE=\"9\" COLOR=\"#666666\">{}</FONT></TD>",
            marker
        ));
        html.push_str("</TR>");
    }

    html.push_str("</TABLE>");
    html
}

/// Escape a string for use in DOT HTML labels
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_dot_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

const DOT_KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Escape a string for use as a DOT node ID
fn escape_dot_id(s: &str) -> String {
    if !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && !DOT_KEYWORDS.contains(&s.to_ascii_lowercase().as_str())
    {
        s.to_string()
    } else {
        format!("\"{}\"", escape_dot_string(s))
    }
}
