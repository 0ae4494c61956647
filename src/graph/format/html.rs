//! Self-contained HTML page embedding the Mermaid diagram.
//!
//! The page pans and zooms the diagram, lists every relationship as
//! `From.col ➝ To.col` in a side panel and lets the reader copy the Mermaid
//! source.

use crate::graph::format::mermaid;
use crate::graph::view::GraphView;

pub fn to_html(view: &GraphView, title: &str) -> String {
    let mermaid_code = mermaid::to_mermaid(view);

    let stats = format!(
        "{} tables · {} keys · {} relationships",
        view.table_count(),
        view.column_count(),
        view.edge_count()
    );

    let links: String = view
        .edges
        .iter()
        .map(|e| {
            let unique = if e.is_one_to_one() {
                " <span class=\"badge\">1:1</span>"
            } else {
                ""
            };
            format!(
                "        <li>{}{}</li>\n",
                escape_html(&e.description()),
                unique
            )
        })
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/panzoom@9/dist/panzoom.min.js"></script>
  <style>
    :root {{
      --color-header: #2b579a;
      --color-bg: #fffff0;
      --color-surface: #fde8dc;
      --color-text: #1f2328;
      --color-muted: #656d76;
      --color-border: #d3d3d3;
    }}

    * {{ box-sizing: border-box; margin: 0; padding: 0; }}
    html, body {{ height: 100%; overflow: hidden; }}

    body {{
      font-family: 'Segoe UI', -apple-system, BlinkMacSystemFont, sans-serif;
      background: var(--color-bg);
      color: var(--color-text);
    }}

    .diagram-container {{
      position: absolute;
      top: 0;
      left: 0;
      right: 300px;
      bottom: 40px;
      overflow: hidden;
      cursor: grab;
    }}

    .diagram-container:active {{ cursor: grabbing; }}
    .mermaid {{ display: inline-block; transform-origin: 0 0; }}
    .mermaid svg {{ max-width: none !important; }}

    .links {{
      position: absolute;
      top: 0;
      right: 0;
      width: 300px;
      bottom: 40px;
      overflow-y: auto;
      border-left: 1px solid var(--color-border);
      background: var(--color-surface);
      padding: 12px 16px;
      font-size: 13px;
    }}

    .links h2 {{ font-size: 14px; color: var(--color-header); margin-bottom: 8px; }}
    .links ul {{ list-style: none; }}
    .links li {{ padding: 3px 0; color: #2b579a; }}
    .badge {{ font-size: 11px; color: var(--color-muted); }}

    .bottom-bar {{
      position: fixed;
      bottom: 0;
      left: 0;
      right: 0;
      height: 40px;
      background: var(--color-header);
      color: var(--color-bg);
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 0 16px;
      font-size: 13px;
    }}

    .btn {{
      background: none;
      border: 1px solid var(--color-bg);
      border-radius: 4px;
      padding: 4px 10px;
      cursor: pointer;
      color: var(--color-bg);
      font-family: inherit;
      font-size: 12px;
    }}
  </style>
</head>
<body>
  <div class="diagram-container">
    <div class="mermaid" id="diagram">
{mermaid_code}
    </div>
  </div>

  <aside class="links">
    <h2>Relationships</h2>
    <ul>
{links}    </ul>
  </aside>

  <div class="bottom-bar">
    <span class="title"><b>schema-graph</b> · {title}</span>
    <span class="stats">{stats}</span>
    <button class="btn" id="copyBtn" onclick="copyMermaid()" title="Copy Mermaid code">Copy</button>
  </div>

  <script>
    const mermaidCode = `{mermaid_code_escaped}`;

    function copyMermaid() {{
      navigator.clipboard.writeText(mermaidCode).then(() => {{
        const btn = document.getElementById('copyBtn');
        btn.textContent = 'Copied!';
        setTimeout(() => {{ btn.textContent = 'Copy'; }}, 2000);
      }});
    }}

    document.addEventListener('DOMContentLoaded', () => {{
      mermaid.initialize({{
        startOnLoad: true,
        theme: 'base',
        themeVariables: {{
          primaryColor: '#fffff0',
          primaryBorderColor: '#d3d3d3',
          primaryTextColor: '#2b579a',
          lineColor: '#778899'
        }},
        maxTextSize: 500000,
        er: {{ useMaxWidth: false }},
        securityLevel: 'strict'
      }});
      mermaid.run().then(() => {{
        panzoom(document.getElementById('diagram'), {{ maxZoom: 5, minZoom: 0.1 }});
      }});
    }});
  </script>
</body>
</html>"##,
        title = escape_html(title),
        mermaid_code = escape_html(&indent_mermaid(&mermaid_code)),
        links = links,
        stats = stats,
        mermaid_code_escaped = escape_js(&mermaid_code),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
        .replace("</", "<\\/")
}

fn indent_mermaid(code: &str) -> String {
    code.lines()
        .map(|line| format!("      {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::sample_view;

    #[test]
    fn test_html_embeds_mermaid() {
        let output = to_html(&sample_view(), "Sales");
        assert!(output.contains("erDiagram"));
        assert!(output.contains("<title>Sales</title>"));
        assert!(output.contains("panzoom"));
    }

    #[test]
    fn test_html_lists_relationships() {
        let output = to_html(&sample_view(), "Sales");
        assert!(output.contains("<li>Order.customer_id ➝ Customer.id</li>"));
        assert!(output.contains("CustomerProfile.customer_id ➝ Customer.id <span class=\"badge\">1:1</span>"));
    }

    #[test]
    fn test_html_stats() {
        let output = to_html(&sample_view(), "Sales");
        assert!(output.contains("3 tables · 4 keys · 2 relationships"));
    }

    #[test]
    fn test_html_escapes_column_names() {
        use crate::catalog::MemoryCatalog;
        use crate::extractor::SchemaExtractor;

        let hostile = "</script><img src=x onerror=alert(1)>";
        let catalog = MemoryCatalog::new()
            .primary_key("Customer", "id")
            .primary_key("Order", "id")
            .foreign_key("Order", hostile, "Customer", "id");
        let schema = SchemaExtractor::new(&catalog).extract().unwrap();
        let output = to_html(&GraphView::from_schema(&schema), "Sales");

        assert!(!output.contains("<img"));
        assert_eq!(output.matches("</script>").count(), 3);
    }

    #[test]
    fn test_escape_js_closes_no_tags() {
        assert_eq!(escape_js("a</script>`${x}"), "a<\\/script>\\`\\${x}");
    }

    #[test]
    fn test_html_escapes_title() {
        let output = to_html(&sample_view(), "<script>");
        assert!(output.contains("&lt;script&gt;"));
    }
}
