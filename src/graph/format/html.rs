//! HTML format output with an embedded Mermaid ERD.

use crate::graph::diagram::Diagram;
use crate::graph::format::mermaid;

/// Generate a standalone HTML page rendering the Mermaid ERD
pub fn to_html(diagram: &Diagram, title: &str) -> String {
    let mermaid_code = mermaid::to_mermaid(diagram);

    let stats = format!(
        "{} entities · {} fields · {} relationships",
        diagram.entity_count(),
        diagram.field_count(),
        diagram.edge_count()
    );

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
  <style>
    :root {{
      --color-bg: #ffffff;
      --color-surface: #f6f8fa;
      --color-text: #1f2328;
      --color-muted: #656d76;
      --color-border: #d0d7de;
    }}

    * {{ box-sizing: border-box; margin: 0; padding: 0; }}

    body {{
      font-family: -apple-system, BlinkMacSystemFont, sans-serif;
      background: var(--color-bg);
      color: var(--color-text);
    }}

    header {{
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 10px 16px;
      background: var(--color-surface);
      border-bottom: 1px solid var(--color-border);
      font-size: 13px;
    }}

    .stats {{ color: var(--color-muted); }}

    main {{ padding: 16px; overflow: auto; }}

    .mermaid svg {{ max-width: none !important; }}
  </style>
</head>
<body>
  <header>
    <strong>{title}</strong>
    <span class="stats">{stats}</span>
  </header>
  <main>
    <div class="mermaid" id="diagram">
{mermaid_code}
    </div>
  </main>
  <script>
    mermaid.initialize({{
      startOnLoad: true,
      theme: 'default',
      maxTextSize: 500000,
      er: {{ useMaxWidth: false }}
    }});
  </script>
</body>
</html>
"##,
        title = escape_html(title),
        stats = stats,
        mermaid_code = indent_mermaid(&escape_html(&mermaid_code)),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
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
    use crate::graph::diagram::fixtures::user_orders;

    #[test]
    fn test_html_contains_mermaid() {
        let output = to_html(&user_orders(), "Shop");
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("erDiagram"));
        assert!(output.contains("mermaid.initialize"));
    }

    #[test]
    fn test_html_escapes_title_and_code() {
        let output = to_html(&user_orders(), "A <b> & B");
        assert!(output.contains("<title>A &lt;b&gt; &amp; B</title>"));
        // Mermaid source is embedded as escaped text
        assert!(output.contains("}o--|| User : &quot;user&quot;"));
    }

    #[test]
    fn test_html_stats() {
        let output = to_html(&user_orders(), "Shop");
        assert!(output.contains("2 entities · 4 fields · 1 relationships"));
    }
}
