//! API graph visualization component.
//!
//! Turns an OpenAPI-style document into a collapsible graph of path segments,
//! operations and payload schemas, and renders it on an HTML canvas with:
//! - A layered left-to-right (or top-to-bottom) layout
//! - Click-to-toggle path segments, starting from the top-level view
//! - Pan and zoom interactions with hover tooltips
//! - Per-method coloring and optional cluster coloring
//!
//! The pipeline is usable without a browser:
//!
//! ```ignore
//! use api_graph::{compile, compute_visible, CollapseState, SpecDocument};
//!
//! let doc = SpecDocument::from_json(text)?;
//! let graph = compile(&doc);
//! let visible = compute_visible(&graph, &CollapseState::new());
//! ```
//!
//! # Example
//!
//! ```ignore
//! view! { <ApiGraphCanvas document=Signal::derive(move || doc.clone()) fullscreen=true /> }
//! ```

/// Document to graph compilation.
pub mod compiler;
mod component;
/// Host page configuration.
pub mod config;
/// Input document model.
pub mod document;
/// Dagre-backed layered layout.
pub mod layered;
/// Layout adapter and collaborator trait.
pub mod layout;
mod render;
/// Stateful graph session driving the canvas.
pub mod session;
mod state;
/// Colors and styles.
pub mod theme;
/// Compiled graph types.
pub mod types;
/// Collapse state and visible subgraph.
pub mod visibility;

pub use compiler::{CompileOptions, compile, compile_with};
pub use component::ApiGraphCanvas;
pub use config::GraphConfig;
pub use document::{HttpMethod, SpecDocument};
pub use layered::DagreLayout;
pub use layout::{Direction, LayeredLayout, LayoutAdapter, LayoutConfig, LayoutRequest, Position};
pub use session::{GraphSession, PlacedNode, Scene};
pub use theme::Theme;
pub use types::{ApiGraph, GraphEdge, GraphNode, NodeKind, Relation, VisibleSubgraph};
pub use visibility::{CollapseState, compute_visible};
