//! Graph command: render the schema as a diagram.

use super::{extract_schema, ConnectionArgs};
use crate::graph::{GraphView, Layout, OutputFormat};
use crate::model::{Schema, SchemaSnapshot};
use anyhow::{bail, Result};
use glob::Pattern;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run the graph command
#[allow(clippy::too_many_arguments)]
pub fn run(
    connection: ConnectionArgs,
    snapshot: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<String>,
    layout: Option<String>,
    tables: Option<String>,
    exclude: Option<String>,
    table: Option<String>,
    transitive: bool,
    reverse: bool,
    max_depth: Option<usize>,
    render: bool,
    progress: bool,
) -> Result<()> {
    let format = if let Some(ref f) = format {
        f.parse::<OutputFormat>().map_err(|e| anyhow::anyhow!("{}", e))?
    } else if let Some(ref out) = output {
        out.extension()
            .and_then(|e| e.to_str())
            .and_then(OutputFormat::from_extension)
            .unwrap_or_default()
    } else {
        OutputFormat::default()
    };

    let layout: Layout = layout
        .map(|l| l.parse::<Layout>())
        .transpose()
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .unwrap_or_default();

    let wants_image = output
        .as_deref()
        .map(is_image_path)
        .unwrap_or(false);
    if (render || wants_image) && format != OutputFormat::Dot {
        bail!(
            "image output is rendered from DOT; use --format dot (got {})",
            format
        );
    }

    let tables_filter = parse_patterns(tables.as_deref(), "--tables")?;
    let exclude_filter = parse_patterns(exclude.as_deref(), "--exclude")?;

    let (schema, title) = load_schema(&connection, snapshot.as_deref(), progress)?;

    if schema.is_empty() && format != OutputFormat::Json {
        eprintln!("No tables with key columns found.");
        return Ok(());
    }

    let mut view = GraphView::from_schema(&schema);
    view.filter_tables(&tables_filter);
    view.exclude_tables(&exclude_filter);

    if let Some(ref table) = table {
        view.focus_table(table, transitive, reverse, max_depth);
        if view.is_empty() {
            bail!("table not found: {}", table);
        }
    }

    let content = format.render(&view, layout, &title);

    if render || wants_image {
        match output {
            Some(ref out_path) => return render_with_graphviz(&content, out_path),
            None => bail!("--render needs an --output file"),
        }
    }

    if let Some(ref out_path) = output {
        let mut file = File::create(out_path)?;
        file.write_all(content.as_bytes())?;
        eprintln!("Diagram written to: {}", out_path.display());
    } else {
        println!("{}", content);
    }

    if format != OutputFormat::Json {
        eprintln!(
            "\nDiagram: {} tables, {} key columns, {} relationships",
            view.table_count(),
            view.column_count(),
            view.edge_count()
        );
    }

    Ok(())
}

/// Schema from a snapshot file if given, otherwise from a live catalog
fn load_schema(
    connection: &ConnectionArgs,
    snapshot: Option<&Path>,
    progress: bool,
) -> Result<(Schema, String)> {
    if let Some(path) = snapshot {
        let snapshot = SchemaSnapshot::load(path)?;
        let title = diagram_title(snapshot.database.as_deref(), &snapshot.source);
        log::info!(
            "rendering snapshot {} taken {}",
            path.display(),
            snapshot.extracted_at
        );
        return Ok((snapshot.into_schema()?, title));
    }

    let catalog = connection.open_catalog()?;
    let schema = extract_schema(catalog.as_ref(), progress)?;
    let title = diagram_title(catalog.database().as_deref(), catalog.kind());
    Ok((schema, title))
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "png" | "svg" | "pdf"))
        .unwrap_or(false)
}

fn diagram_title(database: Option<&str>, source: &str) -> String {
    match database {
        Some(db) => format!("Database Schema - {}", db),
        None => format!("Database Schema ({})", source),
    }
}

/// Parse comma-separated glob patterns, rejecting invalid ones
fn parse_patterns(list: Option<&str>, flag: &str) -> Result<Vec<Pattern>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Pattern::new(s).map_err(|e| anyhow::anyhow!("invalid {} pattern '{}': {}", flag, s, e)))
        .collect()
}

/// Render DOT to PNG/SVG/PDF using Graphviz
fn render_with_graphviz(dot_source: &str, output_path: &Path) -> Result<()> {
    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");

    let format_arg = format!("-T{}", ext);

    let mut child = Command::new("dot")
        .arg(&format_arg)
        .arg("-o")
        .arg(output_path)
        .stdin(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!(
                    "Graphviz 'dot' command not found. Install Graphviz or use --format html instead."
                )
            } else {
                anyhow::anyhow!("Failed to run dot: {}", e)
            }
        })?;

    if let Some(ref mut stdin) = child.stdin {
        stdin.write_all(dot_source.as_bytes())?;
    }
    drop(child.stdin.take());

    let status = child.wait()?;
    if !status.success() {
        bail!("Graphviz dot command failed with status: {}", status);
    }

    eprintln!("Rendered to: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patterns() {
        let patterns = parse_patterns(Some("Sales*, Person ,"), "--tables").unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[0].matches("SalesOrderHeader"));
        assert!(patterns[1].matches("Person"));
    }

    #[test]
    fn test_parse_patterns_rejects_invalid_glob() {
        let err = parse_patterns(Some("[abc"), "--exclude").unwrap_err();
        assert!(err.to_string().contains("--exclude"));
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("erd.PNG")));
        assert!(is_image_path(Path::new("out/erd.svg")));
        assert!(!is_image_path(Path::new("erd.mmd")));
    }

    #[test]
    fn test_image_output_requires_dot() {
        let err = run(
            ConnectionArgs::default(),
            Some(PathBuf::from("/nonexistent/snapshot.json")),
            Some(PathBuf::from("erd.png")),
            Some("mermaid".to_string()),
            None,
            None,
            None,
            None,
            false,
            false,
            None,
            false,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("--format dot"));
    }

    #[test]
    fn test_diagram_title() {
        assert_eq!(
            diagram_title(Some("AdventureWorks2022"), "mssql"),
            "Database Schema - AdventureWorks2022"
        );
        assert_eq!(diagram_title(None, "duckdb"), "Database Schema (duckdb)");
    }
}
