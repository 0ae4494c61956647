//! Diagram generation from an extracted schema.
//!
//! This module provides:
//! - A filterable graph view (tables as nodes, relationships as edges)
//! - Output formats: DOT (Graphviz), Mermaid, JSON, HTML

pub mod format;
pub mod view;

#[allow(unused_imports)]
pub use format::{to_dot, to_html, to_json, to_mermaid, Layout, OutputFormat};
pub use view::GraphView;
#[allow(unused_imports)]
pub use view::{Cardinality, ColumnInfo, EdgeInfo, TableInfo};
