//! Output formats for schema diagrams.

mod dot;
mod html;
pub(crate) mod json;
mod mermaid;

pub use dot::to_dot;
pub use html::to_html;
pub use json::to_json;
pub use mermaid::to_mermaid;
#[allow(unused_imports)]
pub use json::{ColumnJson, ErdJson, ErdStats, RelationshipJson, TableJson};

use crate::graph::view::GraphView;
use std::fmt;
use std::str::FromStr;

/// Output format for diagram export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Graphviz DOT, laid out by `dot`
    Dot,
    /// Mermaid erDiagram
    Mermaid,
    /// JSON for programmatic use
    Json,
    /// Self-contained HTML page around the Mermaid diagram
    #[default]
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Ok(OutputFormat::Dot),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Unknown format: {}. Valid options: dot, mermaid, json, html",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Dot => write!(f, "dot"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl OutputFormat {
    /// Detect format from an output file extension.
    /// Image extensions map to DOT, which is then rendered by Graphviz.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "dot" | "gv" => Some(OutputFormat::Dot),
            "mmd" | "mermaid" => Some(OutputFormat::Mermaid),
            "json" => Some(OutputFormat::Json),
            "html" | "htm" => Some(OutputFormat::Html),
            "png" | "svg" | "pdf" => Some(OutputFormat::Dot),
            _ => None,
        }
    }

    /// Render a view in this format
    pub fn render(self, view: &GraphView, layout: Layout, title: &str) -> String {
        match self {
            OutputFormat::Dot => to_dot(view, layout),
            OutputFormat::Mermaid => to_mermaid(view),
            OutputFormat::Json => to_json(view),
            OutputFormat::Html => to_html(view, title),
        }
    }
}

/// Layout direction for the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Left to right
    #[default]
    LR,
    /// Top to bottom
    TB,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Ok(Layout::LR),
            "tb" | "td" | "top-bottom" | "top-down" | "vertical" => Ok(Layout::TB),
            _ => Err(format!("Unknown layout: {}. Valid options: lr, tb", s)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::LR => write!(f, "lr"),
            Layout::TB => write!(f, "tb"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("GV"), Some(OutputFormat::Dot));
        assert_eq!(OutputFormat::from_extension("svg"), Some(OutputFormat::Dot));
        assert_eq!(OutputFormat::from_extension("htm"), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_parse_format_and_layout() {
        assert_eq!("graphviz".parse::<OutputFormat>(), Ok(OutputFormat::Dot));
        assert!("png".parse::<OutputFormat>().is_err());
        assert_eq!("top-down".parse::<Layout>(), Ok(Layout::TB));
    }
}
