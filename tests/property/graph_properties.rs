use std::collections::HashSet;

use api_graph::components::api_graph::document::{
	Components, MediaType, Operation, PathItem, RequestBody, Response, SchemaDefinition, SchemaRef,
};
use api_graph::components::api_graph::{
	ApiGraph, CollapseState, DagreLayout, HttpMethod, LayoutAdapter, NodeKind, SpecDocument,
	compile, compute_visible,
};
use indexmap::IndexMap;
use proptest::prelude::*;

// `users_GET` and `users_GET_GET` collide with generated operation ids.
const SEGMENTS: &[&str] = &[
	"users",
	"orders",
	"{id}",
	"items",
	"v1",
	"users_GET",
	"users_GET_GET",
];
const SCHEMAS: &[&str] = &["User", "Order", "Missing"];

/// Paths with and without a leading slash and with an optional trailing
/// one, so that distinct keys normalize to the same path.
fn path_strategy() -> impl Strategy<Value = String> {
	(
		prop::collection::vec(prop::sample::select(SEGMENTS), 1..4),
		any::<bool>(),
		any::<bool>(),
	)
		.prop_map(|(segments, leading, trailing)| {
			let mut path = segments.join("/");
			if leading {
				path.insert(0, '/');
			}
			if trailing {
				path.push('/');
			}
			path
		})
}

fn schema_ref(name: &str) -> SchemaRef {
	SchemaRef {
		reference: Some(format!("#/components/schemas/{name}")),
		items: None,
	}
}

fn json(schema: Option<SchemaRef>) -> IndexMap<String, MediaType> {
	schema
		.map(|schema| {
			IndexMap::from([(
				"application/json".to_string(),
				MediaType {
					schema: Some(schema),
				},
			)])
		})
		.unwrap_or_default()
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
	(
		prop::option::of(prop::sample::select(SCHEMAS)),
		prop::option::of(prop::sample::select(SCHEMAS)),
	)
		.prop_map(|(request, response)| Operation {
			request_body: request.map(|name| RequestBody {
				content: json(Some(schema_ref(name))),
			}),
			responses: IndexMap::from([(
				"200".to_string(),
				Response {
					description: None,
					content: json(response.map(schema_ref)),
				},
			)]),
			..Operation::default()
		})
}

fn path_item_strategy() -> impl Strategy<Value = PathItem> {
	prop::collection::vec(
		(prop::sample::select(HttpMethod::ALL.to_vec()), operation_strategy()),
		0..3,
	)
	.prop_map(|operations| {
		let mut item = PathItem::default();
		for (method, operation) in operations {
			item.insert(method, operation);
		}
		item
	})
}

fn document_strategy() -> impl Strategy<Value = SpecDocument> {
	prop::collection::vec((path_strategy(), path_item_strategy()), 0..8).prop_map(|entries| {
		// Later duplicates of a key replace earlier ones, as in a JSON object.
		let paths: IndexMap<String, PathItem> = entries.into_iter().collect();
		let schemas = ["User", "Order"]
			.into_iter()
			.map(|name| (name.to_string(), SchemaDefinition::default()))
			.collect();
		SpecDocument {
			paths,
			components: Components { schemas },
		}
	})
}

fn path_ids(graph: &ApiGraph) -> Vec<String> {
	graph
		.nodes
		.iter()
		.filter(|node| node.is_path_segment())
		.map(|node| node.id.clone())
		.collect()
}

fn visible_ids(graph: &ApiGraph, collapse: &CollapseState) -> HashSet<String> {
	compute_visible(graph, collapse)
		.nodes
		.into_iter()
		.map(|node| node.id)
		.collect()
}

proptest! {
	#[test]
	fn compilation_is_deterministic(doc in document_strategy()) {
		let first = serde_json::to_string(&compile(&doc)).unwrap();
		let second = serde_json::to_string(&compile(&doc)).unwrap();
		prop_assert_eq!(first, second);
	}

	#[test]
	fn node_and_edge_ids_are_unique(doc in document_strategy()) {
		let graph = compile(&doc);
		let nodes: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		let edges: HashSet<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
		prop_assert_eq!(nodes.len(), graph.nodes.len());
		prop_assert_eq!(edges.len(), graph.edges.len());
	}

	#[test]
	fn every_operation_gets_its_own_node(doc in document_strategy()) {
		let graph = compile(&doc);
		let expected: usize = doc.paths.values().map(PathItem::len).sum();
		let operations = graph
			.nodes
			.iter()
			.filter(|node| matches!(node.kind, NodeKind::Operation { .. }))
			.count();
		prop_assert_eq!(operations, expected);
	}

	#[test]
	fn edges_connect_existing_nodes(doc in document_strategy()) {
		let graph = compile(&doc);
		for edge in &graph.edges {
			prop_assert!(graph.contains(&edge.source), "missing source {}", edge.source);
			prop_assert!(graph.contains(&edge.target), "missing target {}", edge.target);
		}
	}

	#[test]
	fn unresolvable_references_never_become_nodes(doc in document_strategy()) {
		let graph = compile(&doc);
		prop_assert!(!graph.contains("schema_Missing"));
	}

	#[test]
	fn visible_subgraph_is_edge_closed(doc in document_strategy(), flips in prop::collection::vec(any::<prop::sample::Index>(), 0..6)) {
		let graph = compile(&doc);
		let paths = path_ids(&graph);
		let mut collapse = CollapseState::new();
		if !paths.is_empty() {
			for flip in flips {
				collapse.toggle(&paths[flip.index(paths.len())]);
			}
		}

		let visible = compute_visible(&graph, &collapse);
		for node in &visible.nodes {
			prop_assert!(graph.contains(&node.id));
		}
		for edge in &visible.edges {
			prop_assert!(visible.contains(&edge.source));
			prop_assert!(visible.contains(&edge.target));
		}
	}

	#[test]
	fn collapsing_never_reveals_nodes(doc in document_strategy(), pick in any::<prop::sample::Index>()) {
		let graph = compile(&doc);
		let paths = path_ids(&graph);
		prop_assume!(!paths.is_empty());
		let target = &paths[pick.index(paths.len())];

		let mut expanded = CollapseState::new();
		for id in &paths {
			expanded.set_collapsed(id, false);
		}
		let mut collapsed = expanded.clone();
		collapsed.set_collapsed(target, true);

		let before = visible_ids(&graph, &expanded);
		let after = visible_ids(&graph, &collapsed);
		prop_assert!(after.is_subset(&before));
		prop_assert!(after.contains(target.as_str()));
	}

	#[test]
	fn fully_expanded_view_shows_every_path_and_operation(doc in document_strategy()) {
		let graph = compile(&doc);
		let mut collapse = CollapseState::new();
		for id in path_ids(&graph) {
			collapse.set_collapsed(&id, false);
		}
		let visible = visible_ids(&graph, &collapse);
		for node in &graph.nodes {
			if !matches!(node.kind, NodeKind::PayloadSchema { .. }) {
				prop_assert!(visible.contains(&node.id), "hidden {}", node.id);
			}
		}
	}

	#[test]
	fn double_toggle_restores_the_view(doc in document_strategy(), pick in any::<prop::sample::Index>()) {
		let graph = compile(&doc);
		let paths = path_ids(&graph);
		prop_assume!(!paths.is_empty());
		let target = &paths[pick.index(paths.len())];

		let mut collapse = CollapseState::new();
		let before = compute_visible(&graph, &collapse);
		collapse.toggle(target);
		collapse.toggle(target);
		prop_assert_eq!(compute_visible(&graph, &collapse), before);
	}

	#[test]
	fn layout_places_every_visible_node(doc in document_strategy()) {
		let graph = compile(&doc);
		let mut collapse = CollapseState::new();
		for id in path_ids(&graph) {
			collapse.set_collapsed(&id, false);
		}
		let visible = compute_visible(&graph, &collapse);
		let positions = LayoutAdapter::<DagreLayout>::default().layout(&visible);

		prop_assert_eq!(positions.len(), visible.nodes.len());
		for node in &visible.nodes {
			let position = positions[&node.id];
			prop_assert!(position.x.is_finite() && position.y.is_finite());
		}
	}
}
