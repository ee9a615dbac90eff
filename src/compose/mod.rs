//! Interactive HTML page around the rendered SVG.
//!
//! The page embeds the SVG as-is inside a scrollable full-viewport container
//! and replaces the browser's native edge titles with a styled tooltip that
//! shows the HTML fragment carried by each edge's `data:text/html,` link.

mod extract;

pub use extract::{edge_tooltips, EdgeTooltip};

use crate::graph::dot::escape_html;
use crate::graph::DATA_URI_PREFIX;
use serde::{Deserialize, Serialize};

/// Presentation settings for the composed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Document title
    pub title: String,
    pub tooltip_background: String,
    pub tooltip_text: String,
    /// CSS font family of the tooltip
    pub font_family: String,
    /// CSS width of the embedded SVG
    pub canvas_width: String,
    /// CSS height of the embedded SVG
    pub canvas_height: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "Schema".to_string(),
            tooltip_background: "#fce4cf".to_string(),
            tooltip_text: "#003366".to_string(),
            font_family: "'Segoe UI'".to_string(),
            canvas_width: "2000px".to_string(),
            canvas_height: "2000px".to_string(),
        }
    }
}

/// Wrap `svg` in a self-contained HTML page with custom edge tooltips.
///
/// The SVG text is inserted unchanged. Edges without a `data:text/html,`
/// link are left alone by the page script, so any SVG yields a valid page.
pub fn compose(svg: &str, page: &PageOptions) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
  <style>
    html, body {{ margin: 0; padding: 0; overflow: hidden; }}
    #container {{ width: 100vw; height: 100vh; overflow: auto; }}
    #container svg {{ width: {canvas_width}; height: {canvas_height}; }}
    #custom-tooltip {{
      position: fixed;
      display: none;
      padding: 6px 12px;
      background: {tooltip_background};
      color: {tooltip_text};
      border-radius: 10px;
      box-shadow: 0 2px 4px rgba(0, 0, 0, 0.15);
      font-family: {font_family};
      font-size: 14px;
      z-index: 1000;
      white-space: nowrap;
      pointer-events: none;
    }}
  </style>
</head>
<body>
<div id='container'>
{svg}
</div>
<div id='custom-tooltip'></div>
<script>
  document.addEventListener('DOMContentLoaded', () => {{
    const tooltip = document.getElementById('custom-tooltip');
    const prefix = '{prefix}';

    // Native titles would show on top of the custom tooltip
    document.querySelectorAll('g.edge title').forEach(t => t.remove());
    document.querySelectorAll('g.edge a').forEach(a => {{
      a.removeAttribute('xlink:title');
      a.removeAttribute('title');
    }});

    document.querySelectorAll('g.edge').forEach(edge => {{
      const link = edge.querySelector('a');
      if (!link) return;
      const href = link.getAttribute('xlink:href') || link.getAttribute('href');
      if (!href || !href.startsWith(prefix)) return;
      let content;
      try {{
        content = decodeURIComponent(href.slice(prefix.length));
      }} catch {{
        return;
      }}

      const place = e => {{
        tooltip.style.left = (e.pageX + 8) + 'px';
        tooltip.style.top = (e.pageY + 8) + 'px';
      }};

      link.addEventListener('click', e => e.preventDefault());
      edge.addEventListener('mouseenter', e => {{
        tooltip.innerHTML = content;
        tooltip.style.display = 'block';
        place(e);
      }});
      edge.addEventListener('mousemove', place);
      edge.addEventListener('mouseleave', () => {{
        tooltip.style.display = 'none';
      }});
    }});
  }});
</script>
</body>
</html>
"##,
        title = escape_html(&page.title),
        canvas_width = page.canvas_width,
        canvas_height = page.canvas_height,
        tooltip_background = page.tooltip_background,
        tooltip_text = page.tooltip_text,
        font_family = page.font_family,
        svg = svg,
        prefix = DATA_URI_PREFIX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_EDGE_SVG: &str = r#"<svg width="62pt" height="44pt" xmlns="http://www.w3.org/2000/svg">
<g id="graph0" class="graph"><title>schema</title>
<g id="node1" class="node"><title>Users</title><text>Users</text></g>
</g>
</svg>"#;

    #[test]
    fn test_svg_is_embedded_verbatim() {
        let html = compose(NO_EDGE_SVG, &PageOptions::default());
        assert!(html.contains(NO_EDGE_SVG));
        assert!(html.contains("<div id='container'>"));
        assert!(html.contains("<div id='custom-tooltip'></div>"));
    }

    #[test]
    fn test_default_page_styling() {
        let html = compose(NO_EDGE_SVG, &PageOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Schema</title>"));
        assert!(html.contains("background: #fce4cf;"));
        assert!(html.contains("color: #003366;"));
        assert!(html.contains("width: 2000px; height: 2000px;"));
        assert!(html.contains("font-family: 'Segoe UI';"));
        assert!(html.contains("position: fixed;"));
    }

    #[test]
    fn test_script_binds_edge_links() {
        let html = compose(NO_EDGE_SVG, &PageOptions::default());
        assert!(html.contains("const prefix = 'data:text/html,';"));
        assert!(html.contains("decodeURIComponent"));
        assert!(html.contains("'mouseenter'"));
        assert!(html.contains("'mousemove'"));
        assert!(html.contains("'mouseleave'"));
        assert!(html.contains("e.pageX + 8"));
        assert!(html.contains("e.pageY + 8"));
    }

    #[test]
    fn test_undecodable_link_skips_only_that_edge() {
        let html = compose(NO_EDGE_SVG, &PageOptions::default());
        let decode = html.find("decodeURIComponent").unwrap();
        let guard = html[..decode].rfind("try {").unwrap();
        assert!(html[guard..].contains("} catch {\n        return;\n      }"));
        // The catch returns from the per-edge callback, not from the loop
        assert!(html[..guard].contains("document.querySelectorAll('g.edge').forEach(edge => {"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = PageOptions {
            title: "Sales & <Ops>".to_string(),
            ..PageOptions::default()
        };
        let html = compose(NO_EDGE_SVG, &page);
        assert!(html.contains("<title>Sales &amp; &lt;Ops&gt;</title>"));
    }

    #[test]
    fn test_page_without_edges_has_no_bindings() {
        let html = compose(NO_EDGE_SVG, &PageOptions::default());
        assert!(html.ends_with("</html>\n"));
        assert!(edge_tooltips(&html).is_empty());
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose(NO_EDGE_SVG, &PageOptions::default());
        let b = compose(NO_EDGE_SVG, &PageOptions::default());
        assert_eq!(a, b);
    }
}
