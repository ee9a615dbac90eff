//! Schema diagram generation.
//!
//! This module provides:
//! - The graph model built from primary-key and foreign-key rows
//! - DOT (Graphviz) emission with HTML-like table labels
//! - Tooltip payloads attached to relationship edges as `data:` URIs

pub mod dot;
pub mod model;
pub mod style;
pub mod tooltip;

pub use dot::to_dot;
pub use model::{Relationship, SchemaGraph, TableNode};
pub use style::{DiagramStyle, Layout};
pub use tooltip::{TooltipPayload, DATA_URI_PREFIX};
