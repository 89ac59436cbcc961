//! Visibility engine: which nodes and edges of a compiled graph are shown
//! for a given collapse state.
//!
//! [`compute_visible`] is a pure function of the graph and the collapse map.
//! It is recomputed in full after every toggle and every rebuild; nothing is
//! patched incrementally.

use std::collections::{HashMap, HashSet};

use super::types::{ApiGraph, NodeId, NodeKind, VisibleSubgraph};

/// Collapsed/expanded flags keyed by path segment id.
///
/// Only explicit choices are stored. A segment without an entry is collapsed
/// when it is a top-level segment and expanded otherwise, so freshly loaded
/// documents open in the low-clutter view. Entries for ids that no longer
/// exist are kept and simply never consulted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapseState {
	explicit: HashMap<NodeId, bool>,
}

impl CollapseState {
	/// State with no explicit choices: the default view.
	pub fn new() -> Self {
		Self::default()
	}

	/// Effective collapsed flag of the path segment `id`.
	pub fn is_collapsed(&self, id: &str) -> bool {
		self.explicit
			.get(id)
			.copied()
			.unwrap_or_else(|| is_top_level(id))
	}

	/// Flips the effective flag of `id` and returns the new value.
	pub fn toggle(&mut self, id: &str) -> bool {
		let collapsed = !self.is_collapsed(id);
		self.explicit.insert(id.to_string(), collapsed);
		collapsed
	}

	/// Records an explicit flag for `id`.
	pub fn set_collapsed(&mut self, id: &str, collapsed: bool) {
		self.explicit.insert(id.to_string(), collapsed);
	}

	/// Drops every explicit choice, returning to the default view.
	pub fn reset(&mut self) {
		self.explicit.clear();
	}

	/// Number of explicit entries, stale ones included.
	pub fn len(&self) -> usize {
		self.explicit.len()
	}

	/// Whether no explicit choice has been made.
	pub fn is_empty(&self) -> bool {
		self.explicit.is_empty()
	}
}

/// A path segment id with exactly one segment (`/users`), or the root `/`.
pub fn is_top_level(id: &str) -> bool {
	id.starts_with('/') && !id[1..].contains('/')
}

/// Strict ancestors of a path segment id, nearest first.
///
/// `/a/b/c` yields `/a/b` then `/a`. Each step strictly shortens the id, so
/// the walk always terminates at the top level.
pub fn ancestor_ids(id: &str) -> impl Iterator<Item = &str> {
	let mut rest = id;
	std::iter::from_fn(move || {
		let cut = rest.rfind('/').filter(|&cut| cut > 0)?;
		rest = &rest[..cut];
		Some(rest)
	})
}

/// Whether any strict ancestor of the path segment `id` is collapsed.
fn hidden_by_ancestor(id: &str, collapse: &CollapseState) -> bool {
	ancestor_ids(id).any(|ancestor| collapse.is_collapsed(ancestor))
}

/// Computes the visible, edge-closed subgraph of `graph`.
///
/// - A path segment is visible when no strict ancestor is collapsed. A
///   collapsed segment stays visible so it can be expanded again.
/// - An operation is visible when its path segment is visible and expanded.
/// - A payload schema is visible when any operation using it is visible.
/// - An edge is visible when both endpoints are.
pub fn compute_visible(graph: &ApiGraph, collapse: &CollapseState) -> VisibleSubgraph {
	let mut visible: HashSet<&str> = HashSet::new();

	for node in &graph.nodes {
		if let NodeKind::PathSegment { path, .. } = &node.kind {
			if !hidden_by_ancestor(path, collapse) {
				visible.insert(node.id.as_str());
			}
		}
	}

	for node in &graph.nodes {
		if let NodeKind::Operation { path, .. } = &node.kind {
			if visible.contains(path.as_str()) && !collapse.is_collapsed(path) {
				visible.insert(node.id.as_str());
			}
		}
	}

	let referenced: HashSet<&str> = graph
		.edges
		.iter()
		.filter(|edge| !edge.relation.is_hierarchical() && visible.contains(edge.source.as_str()))
		.map(|edge| edge.target.as_str())
		.collect();
	for node in &graph.nodes {
		if matches!(node.kind, NodeKind::PayloadSchema { .. })
			&& referenced.contains(node.id.as_str())
		{
			visible.insert(node.id.as_str());
		}
	}

	let nodes = graph
		.nodes
		.iter()
		.filter(|node| visible.contains(node.id.as_str()))
		.cloned()
		.collect();
	let edges = graph
		.edges
		.iter()
		.filter(|edge| visible.contains(edge.source.as_str()) && visible.contains(edge.target.as_str()))
		.cloned()
		.collect();

	VisibleSubgraph { nodes, edges }
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::api_graph::compiler::compile;
	use crate::components::api_graph::document::{
		HttpMethod, MediaType, Operation, PathItem, RequestBody, SchemaDefinition, SchemaRef,
		SpecDocument,
	};

	fn with_ops(methods: &[HttpMethod]) -> PathItem {
		let mut item = PathItem::default();
		for &method in methods {
			item.insert(method, Operation::default());
		}
		item
	}

	fn users_graph() -> ApiGraph {
		let mut doc = SpecDocument::default();
		doc.paths.insert("/users".into(), with_ops(&[HttpMethod::Get]));
		doc.paths.insert(
			"/users/{id}".into(),
			with_ops(&[HttpMethod::Get, HttpMethod::Delete]),
		);
		compile(&doc)
	}

	#[test]
	fn ancestors_are_walked_nearest_first() {
		let ancestors: Vec<_> = ancestor_ids("/a/b/c").collect();
		assert_eq!(ancestors, vec!["/a/b", "/a"]);
		assert_eq!(ancestor_ids("/a").count(), 0);
		assert_eq!(ancestor_ids("/").count(), 0);
		assert_eq!(ancestor_ids("").count(), 0);
	}

	#[test]
	fn top_level_segments_default_to_collapsed() {
		let state = CollapseState::new();
		assert!(state.is_collapsed("/users"));
		assert!(state.is_collapsed("/"));
		assert!(!state.is_collapsed("/users/{id}"));
	}

	#[test]
	fn default_view_shows_only_top_level_segments() {
		let graph = users_graph();
		let visible = compute_visible(&graph, &CollapseState::new());
		assert_eq!(visible.node_ids(), vec!["/users"]);
		assert!(visible.edges.is_empty());
	}

	#[test]
	fn expanding_top_level_reveals_the_whole_subtree() {
		let graph = users_graph();
		let mut state = CollapseState::new();
		assert!(!state.toggle("/users"));

		let visible = compute_visible(&graph, &state);
		assert_eq!(
			visible.node_ids(),
			vec![
				"/users",
				"/users_GET",
				"/users/{id}",
				"/users/{id}_GET",
				"/users/{id}_DELETE",
			]
		);
		assert_eq!(visible.edges.len(), 4);
	}

	#[test]
	fn collapsed_inner_segment_stays_visible_but_hides_operations() {
		let graph = users_graph();
		let mut state = CollapseState::new();
		state.set_collapsed("/users", false);
		state.set_collapsed("/users/{id}", true);

		let visible = compute_visible(&graph, &state);
		assert_eq!(visible.node_ids(), vec!["/users", "/users_GET", "/users/{id}"]);
		assert!(visible
			.edges
			.iter()
			.all(|e| visible.contains(&e.source) && visible.contains(&e.target)));
	}

	#[test]
	fn toggle_twice_restores_the_view() {
		let graph = users_graph();
		let mut state = CollapseState::new();
		state.set_collapsed("/users", false);
		let before = compute_visible(&graph, &state);

		state.toggle("/users/{id}");
		assert_ne!(compute_visible(&graph, &state), before);
		state.toggle("/users/{id}");
		assert_eq!(compute_visible(&graph, &state), before);
	}

	#[test]
	fn stale_entries_are_ignored() {
		let graph = users_graph();
		let mut state = CollapseState::new();
		state.set_collapsed("/users", false);
		let before = compute_visible(&graph, &state);

		state.set_collapsed("/orders", false);
		state.set_collapsed("/gone/away", true);
		assert_eq!(compute_visible(&graph, &state), before);
		assert_eq!(state.len(), 3);
	}

	#[test]
	fn shared_schema_stays_visible_while_any_user_is_visible() {
		let mut doc = SpecDocument::default();
		doc.components
			.schemas
			.insert("Item".into(), SchemaDefinition::default());
		let body = || {
			Operation {
				request_body: Some(RequestBody {
					content: [(
						"application/json".to_string(),
						MediaType {
							schema: Some(SchemaRef {
								reference: Some("#/components/schemas/Item".into()),
								items: None,
							}),
						},
					)]
					.into_iter()
					.collect(),
				}),
				..Default::default()
			}
		};
		let mut carts = PathItem::default();
		carts.insert(HttpMethod::Post, body());
		let mut orders = PathItem::default();
		orders.insert(HttpMethod::Post, body());
		doc.paths.insert("/carts".into(), carts);
		doc.paths.insert("/orders".into(), orders);
		let graph = compile(&doc);

		let mut state = CollapseState::new();
		assert!(!compute_visible(&graph, &state).contains("schema_Item"));

		state.set_collapsed("/orders", false);
		let visible = compute_visible(&graph, &state);
		assert!(visible.contains("schema_Item"));
		let schema_edges: Vec<_> = visible
			.edges
			.iter()
			.filter(|e| e.target == "schema_Item")
			.map(|e| e.source.as_str())
			.collect();
		assert_eq!(schema_edges, vec!["/orders_POST"]);
	}

	#[test]
	fn empty_graph_is_trivially_visible() {
		let visible = compute_visible(&ApiGraph::default(), &CollapseState::new());
		assert!(visible.nodes.is_empty());
		assert!(visible.edges.is_empty());
	}
}
