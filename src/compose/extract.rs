//! Reading tooltip bindings back out of a rendered SVG.
//!
//! Graphviz writes every edge as a `<g class="edge">` group holding a
//! `<title>` and, when the edge had a `URL`, an anchor whose `xlink:href`
//! (or `href` in newer releases) is the URL with XML entities escaped.

use crate::graph::TooltipPayload;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// Start tag of any classed group (edge, node, cluster or the graph itself)
static GROUP_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<g\b[^>]*\bclass="([^"]*)"[^>]*>"#).unwrap());

static ID_ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bid="([^"]*)""#).unwrap());

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<title>(.*?)</title>").unwrap());

static DATA_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(?:xlink:)?href="(data:text/html,[^"]*)""#).unwrap());

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// One edge of the SVG that carries a tooltip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeTooltip {
    /// `id` attribute of the edge group (`edge1`, `edge2`, ...)
    pub edge_id: String,
    /// Text of the edge's `<title>`, e.g. `Orders->Customers`
    pub title: String,
    /// Decoded HTML fragment
    pub fragment: String,
}

/// Collect the tooltip of every edge group, in document order.
///
/// Edges without a decodable `data:text/html,` link are skipped, so a
/// malformed or edge-free document simply yields an empty list.
pub fn edge_tooltips(svg: &str) -> Vec<EdgeTooltip> {
    let starts: Vec<_> = GROUP_START_RE.captures_iter(svg).collect();
    let mut tooltips = Vec::new();

    for (i, caps) in starts.iter().enumerate() {
        let is_edge = caps[1].split_whitespace().any(|class| class == "edge");
        if !is_edge {
            continue;
        }

        let tag = caps.get(0).map_or("", |m| m.as_str());
        let body_start = caps.get(0).map_or(0, |m| m.end());
        let body_end = starts
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(svg.len(), |m| m.start());
        let body = &svg[body_start..body_end];

        let Some(href) = DATA_HREF_RE.captures(body) else {
            continue;
        };
        let Some(payload) = TooltipPayload::from_data_uri(&unescape_xml(&href[1])) else {
            continue;
        };

        tooltips.push(EdgeTooltip {
            edge_id: ID_ATTR_RE
                .captures(tag)
                .map(|c| c[1].to_string())
                .unwrap_or_default(),
            title: TITLE_RE
                .captures(body)
                .map(|c| unescape_xml(&c[1]))
                .unwrap_or_default(),
            fragment: payload.into_fragment(),
        });
    }

    tooltips
}

/// Replace XML character and predefined entity references
fn unescape_xml(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}
