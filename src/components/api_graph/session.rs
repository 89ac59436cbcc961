//! Interactive session: owns the current graph and collapse state and keeps
//! the positioned scene in sync with them.
//!
//! Every change (new document, toggle, method filter) recompiles or
//! recomputes visibility and layout in full.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use super::compiler::{CompileOptions, compile_with};
use super::document::{HttpMethod, SpecDocument};
use super::layered::DagreLayout;
use super::layout::{LayeredLayout, LayoutAdapter, NodeSize, Position};
use super::types::{ApiGraph, GraphEdge, GraphNode, NodeId, VisibleSubgraph};
use super::visibility::{CollapseState, compute_visible};

/// A visible node with its layout box.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
	/// The compiled node being drawn.
	pub node: GraphNode,
	/// Top-left corner.
	pub position: Position,
	/// Box size, taken from the layout config.
	pub size: NodeSize,
	/// Effective collapse flag, meaningful for toggleable path segments.
	pub collapsed: bool,
	/// Index of the node's top-level cluster, in first-appearance order.
	pub cluster: Option<usize>,
}

impl PlacedNode {
	/// Middle of the node box.
	pub fn center(&self) -> Position {
		Position::new(
			self.position.x + self.size.width / 2.0,
			self.position.y + self.size.height / 2.0,
		)
	}

	/// Whether the layout-space point lies inside this node's box.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.position.x
			&& x <= self.position.x + self.size.width
			&& y >= self.position.y
			&& y <= self.position.y + self.size.height
	}
}

/// The positioned visible subgraph handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// Visible nodes in compile order.
	pub nodes: Vec<PlacedNode>,
	/// Visible edges; both endpoints are in `nodes`.
	pub edges: Vec<GraphEdge>,
}

impl Scene {
	/// Looks up a placed node by id.
	pub fn node(&self, id: &str) -> Option<&PlacedNode> {
		self.nodes.iter().find(|placed| placed.node.id == id)
	}

	/// Bounding box `(min, max)` of all node boxes.
	pub fn bounds(&self) -> Option<(Position, Position)> {
		let mut nodes = self.nodes.iter();
		let first = nodes.next()?;
		let mut min = first.position;
		let mut max = Position::new(
			first.position.x + first.size.width,
			first.position.y + first.size.height,
		);
		for placed in nodes {
			min.x = min.x.min(placed.position.x);
			min.y = min.y.min(placed.position.y);
			max.x = max.x.max(placed.position.x + placed.size.width);
			max.y = max.y.max(placed.position.y + placed.size.height);
		}
		Some((min, max))
	}
}

/// Holds one document's graph, its collapse state and the derived scene.
pub struct GraphSession<L = DagreLayout> {
	document: SpecDocument,
	options: CompileOptions,
	graph: ApiGraph,
	collapse: CollapseState,
	adapter: LayoutAdapter<L>,
	visible: VisibleSubgraph,
	scene: Scene,
	revision: u64,
}

impl<L: LayeredLayout> GraphSession<L> {
	/// Compiles `document` and computes the initial (default collapse) view.
	pub fn new(document: SpecDocument, options: CompileOptions, adapter: LayoutAdapter<L>) -> Self {
		let graph = compile_with(&document, &options);
		let mut session = Self {
			document,
			options,
			graph,
			collapse: CollapseState::new(),
			adapter,
			visible: VisibleSubgraph::default(),
			scene: Scene::default(),
			revision: 0,
		};
		session.refresh();
		session
	}

	/// Replaces the document wholesale. Collapse choices carry over by id.
	pub fn replace_document(&mut self, document: SpecDocument) {
		self.document = document;
		self.rebuild();
	}

	/// Restricts which HTTP methods become operation nodes.
	pub fn set_methods(&mut self, methods: BTreeSet<HttpMethod>) {
		if self.options.methods == methods {
			return;
		}
		self.options.methods = methods;
		self.rebuild();
	}

	/// Flips the collapse flag of a path segment and recomputes the view.
	///
	/// Returns the new flag, or `None` when `id` is not a path segment of the
	/// current graph (nothing changes in that case).
	pub fn toggle(&mut self, id: &str) -> Option<bool> {
		let node = self.graph.node(id)?;
		if !node.is_path_segment() {
			debug!("api-graph: ignoring toggle of non-path node {id}");
			return None;
		}
		let collapsed = self.collapse.toggle(id);
		info!(
			"api-graph: {} {id}",
			if collapsed { "collapsed" } else { "expanded" }
		);
		self.refresh();
		Some(collapsed)
	}

	/// Returns to the default view. Does nothing when no choice was made.
	pub fn reset_collapse(&mut self) {
		if self.collapse.is_empty() {
			return;
		}
		info!("api-graph: clearing {} collapse choices", self.collapse.len());
		self.collapse.reset();
		self.refresh();
	}

	/// The full compiled graph, hidden nodes included.
	pub fn graph(&self) -> &ApiGraph {
		&self.graph
	}

	/// Current collapse choices.
	pub fn collapse_state(&self) -> &CollapseState {
		&self.collapse
	}

	/// Nodes and edges shown under the current collapse state.
	pub fn visible(&self) -> &VisibleSubgraph {
		&self.visible
	}

	/// The visible subgraph with layout applied.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Incremented on every recomputation; renderers use it to refit.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	fn rebuild(&mut self) {
		self.graph = compile_with(&self.document, &self.options);
		info!(
			"api-graph: compiled {} nodes, {} edges",
			self.graph.nodes.len(),
			self.graph.edges.len()
		);
		self.refresh();
	}

	/// Recomputes visibility and layout from scratch.
	fn refresh(&mut self) {
		self.visible = compute_visible(&self.graph, &self.collapse);
		let positions = self.adapter.layout(&self.visible);
		self.scene = self.place(&positions);
		self.revision += 1;
	}

	fn place(&self, positions: &BTreeMap<NodeId, Position>) -> Scene {
		let size = self.adapter.config().node_size;
		let mut clusters: Vec<&str> = Vec::new();
		let nodes = self
			.visible
			.nodes
			.iter()
			.map(|node| {
				let cluster = node.group.as_deref().map(|group| {
					clusters.iter().position(|c| *c == group).unwrap_or_else(|| {
						clusters.push(group);
						clusters.len() - 1
					})
				});
				PlacedNode {
					node: node.clone(),
					position: positions.get(&node.id).copied().unwrap_or_default(),
					size,
					collapsed: node.is_path_segment() && self.collapse.is_collapsed(&node.id),
					cluster,
				}
			})
			.collect();

		Scene {
			nodes,
			edges: self.visible.edges.clone(),
		}
	}
}

impl GraphSession<DagreLayout> {
	/// Session using the built-in [`DagreLayout`].
	pub fn with_defaults(document: SpecDocument) -> Self {
		Self::new(document, CompileOptions::default(), LayoutAdapter::default())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::api_graph::document::{Operation, PathItem};
	use crate::components::api_graph::layout::LayoutConfig;

	fn with_ops(methods: &[HttpMethod]) -> PathItem {
		let mut item = PathItem::default();
		for &method in methods {
			item.insert(method, Operation::default());
		}
		item
	}

	fn users_doc() -> SpecDocument {
		let mut doc = SpecDocument::default();
		doc.paths.insert("/users".into(), with_ops(&[HttpMethod::Get]));
		doc.paths.insert(
			"/users/{id}".into(),
			with_ops(&[HttpMethod::Get, HttpMethod::Delete]),
		);
		doc
	}

	fn scene_ids<L: LayeredLayout>(session: &GraphSession<L>) -> Vec<&str> {
		session
			.scene()
			.nodes
			.iter()
			.map(|p| p.node.id.as_str())
			.collect()
	}

	#[test]
	fn starts_collapsed_and_expands_on_toggle() {
		let mut session = GraphSession::with_defaults(users_doc());
		assert_eq!(scene_ids(&session), vec!["/users"]);
		assert!(session.scene().nodes[0].collapsed);

		assert_eq!(session.toggle("/users"), Some(false));
		assert_eq!(session.scene().nodes.len(), 5);
		assert_eq!(session.scene().edges.len(), 4);
		assert!(!session.scene().nodes[0].collapsed);
	}

	#[test]
	fn toggling_operations_or_unknown_ids_changes_nothing() {
		let mut session = GraphSession::with_defaults(users_doc());
		session.toggle("/users");
		let revision = session.revision();
		let before = session.scene().clone();

		assert_eq!(session.toggle("/users_GET"), None);
		assert_eq!(session.toggle("/nope"), None);
		assert_eq!(session.scene(), &before);
		assert_eq!(session.revision(), revision);
	}

	#[test]
	fn collapse_state_survives_document_replacement() {
		let mut session = GraphSession::with_defaults(users_doc());
		session.toggle("/users");
		session.toggle("/users/{id}");

		let mut next = users_doc();
		next.paths.insert("/orders".into(), with_ops(&[HttpMethod::Post]));
		session.replace_document(next);

		assert_eq!(scene_ids(&session), vec!["/users", "/users_GET", "/users/{id}", "/orders"]);
		assert!(session.scene().node("/users/{id}").unwrap().collapsed);
	}

	#[test]
	fn method_filter_rebuilds_the_graph() {
		let mut session = GraphSession::with_defaults(users_doc());
		session.toggle("/users");
		session.set_methods([HttpMethod::Delete].into_iter().collect());
		assert_eq!(scene_ids(&session), vec!["/users", "/users/{id}", "/users/{id}_DELETE"]);

		let revision = session.revision();
		session.set_methods([HttpMethod::Delete].into_iter().collect());
		assert_eq!(session.revision(), revision);
	}

	#[test]
	fn scene_nodes_carry_positions_sizes_and_clusters() {
		let config = LayoutConfig::default();
		let mut session = GraphSession::new(
			users_doc(),
			CompileOptions::default(),
			LayoutAdapter::new(DagreLayout, config.clone()),
		);
		session.toggle("/users");

		let root = session.scene().node("/users").unwrap();
		let child = session.scene().node("/users/{id}").unwrap();
		assert_eq!(root.size, config.node_size);
		assert!(child.position.x > root.position.x);
		assert_eq!(root.cluster, Some(0));
		assert_eq!(child.cluster, Some(0));
		assert!(root.contains(root.center().x, root.center().y));

		let (min, max) = session.scene().bounds().unwrap();
		assert_eq!(min.x, root.position.x);
		assert!(max.x >= child.position.x + child.size.width);
	}

	#[test]
	fn reset_returns_to_the_default_view() {
		let mut session = GraphSession::with_defaults(users_doc());
		session.toggle("/users");
		session.reset_collapse();
		assert_eq!(scene_ids(&session), vec!["/users"]);
		assert!(session.collapse_state().is_empty());

		let revision = session.revision();
		session.reset_collapse();
		assert_eq!(session.revision(), revision);
	}

	#[test]
	fn empty_document_yields_an_empty_scene() {
		let session = GraphSession::with_defaults(SpecDocument::default());
		assert!(session.scene().nodes.is_empty());
		assert!(session.scene().bounds().is_none());
	}
}
