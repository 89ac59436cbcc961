//! Graph data structures produced by the compiler and consumed by the
//! visibility engine, layout adapter and renderer.

use std::collections::HashMap;

use serde::Serialize;

use super::document::HttpMethod;

/// Stable node identity, built compositionally from a node's ancestry.
pub type NodeId = String;

/// Stable edge identity, derived from `(source, target, relation)`.
pub type EdgeId = String;

/// One property line shown on a payload schema node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaProperty {
	/// Property key.
	pub name: String,
	/// `type`, with the format in parentheses when present.
	pub type_name: String,
}

/// Kind-specific node payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
	/// One `/`-delimited prefix of one or more paths.
	PathSegment {
		/// Full prefix, identical to the node id.
		path: String,
		/// The last segment, without the leading slash.
		segment: String,
		/// Segment is a `{template}` parameter. Presentation hint only.
		parameter: bool,
		/// Number of segments in `path` (top-level segments have depth 1).
		depth: usize,
		/// Enclosing path segment, `None` for top-level segments.
		parent: Option<NodeId>,
		/// Some other path segment extends this one.
		has_children: bool,
		/// At least one operation hangs directly under this segment.
		has_operations: bool,
	},
	/// One HTTP method under a full path.
	Operation {
		/// Id of the owning path segment.
		path: NodeId,
		method: HttpMethod,
		summary: Option<String>,
		description: Option<String>,
		operation_id: Option<String>,
	},
	/// A named schema referenced by request or response payloads.
	PayloadSchema {
		name: String,
		properties: Vec<SchemaProperty>,
	},
}

/// A node of the compiled graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: NodeId,
	/// What the node stands for, flattened into the serialized node.
	#[serde(flatten)]
	pub kind: NodeKind,
	/// Display label.
	pub label: String,
	/// Multi-line hover text.
	pub tooltip: String,
	/// Top-level path this node clusters under. Schema nodes have no group.
	pub group: Option<String>,
}

impl GraphNode {
	/// Whether this is a path segment node.
	pub fn is_path_segment(&self) -> bool {
		matches!(self.kind, NodeKind::PathSegment { .. })
	}

	/// Whether the renderer should offer a collapse/expand affordance.
	pub fn is_toggleable(&self) -> bool {
		matches!(
			self.kind,
			NodeKind::PathSegment {
				has_children: true,
				..
			} | NodeKind::PathSegment {
				has_operations: true,
				..
			}
		)
	}

	/// Advisory `hasChildren` flag. Always `false` for non-path nodes.
	pub fn has_children(&self) -> bool {
		matches!(
			self.kind,
			NodeKind::PathSegment {
				has_children: true,
				..
			}
		)
	}
}

/// Relationship an edge expresses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "relation", rename_all = "snake_case")]
pub enum Relation {
	/// Path segment to its immediate child segment.
	ParentChild,
	/// Path segment to one of its operations. Hierarchical, like `ParentChild`.
	Invokes,
	/// Operation to the schema of its request body.
	Consumes,
	/// Operation to the schema of a response, tagged with the status code.
	Produces { status: String },
}

impl Relation {
	/// Edges that follow the path tree rather than payload references.
	pub fn is_hierarchical(&self) -> bool {
		matches!(self, Relation::ParentChild | Relation::Invokes)
	}

	/// Suffix used to keep edge ids unique per relation.
	fn id_tag(&self) -> String {
		match self {
			Relation::ParentChild => "child".into(),
			Relation::Invokes => "invokes".into(),
			Relation::Consumes => "consumes".into(),
			Relation::Produces { status } => format!("produces-{status}"),
		}
	}
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
	/// See [`edge_id`].
	pub id: EdgeId,
	/// Source node ID.
	pub source: NodeId,
	/// Target node ID.
	pub target: NodeId,
	/// Why the edge exists.
	#[serde(flatten)]
	pub relation: Relation,
	/// Optional text drawn along the edge.
	pub label: Option<String>,
}

impl GraphEdge {
	/// Builds an edge whose id is derived from its endpoints and relation.
	pub fn new(source: &str, target: &str, relation: Relation, label: Option<String>) -> Self {
		Self {
			id: edge_id(source, target, &relation),
			source: source.to_string(),
			target: target.to_string(),
			relation,
			label,
		}
	}
}

/// Edge id for `(source, target, relation)`.
pub fn edge_id(source: &str, target: &str, relation: &Relation) -> EdgeId {
	format!("e{source}-{target}:{}", relation.id_tag())
}

/// Complete compiled graph: ordered nodes and edges.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ApiGraph {
	/// Nodes in compile order.
	pub nodes: Vec<GraphNode>,
	/// Edges in compile order.
	pub edges: Vec<GraphEdge>,
	#[serde(skip)]
	index: HashMap<NodeId, usize>,
}

impl ApiGraph {
	/// Wraps ordered nodes and edges, indexing nodes by id.
	pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
		let index = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		Self {
			nodes,
			edges,
			index,
		}
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Whether a node with this id exists.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Whether the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

impl PartialEq for ApiGraph {
	fn eq(&self, other: &Self) -> bool {
		self.nodes == other.nodes && self.edges == other.edges
	}
}

/// Edge-closed subset of an [`ApiGraph`], in compile order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VisibleSubgraph {
	/// Visible nodes in compile order.
	pub nodes: Vec<GraphNode>,
	/// Edges whose endpoints are both visible.
	pub edges: Vec<GraphEdge>,
}

impl VisibleSubgraph {
	/// Whether the node with this id is visible.
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.iter().any(|node| node.id == id)
	}

	/// Ids of the visible nodes, in order.
	pub fn node_ids(&self) -> Vec<&str> {
		self.nodes.iter().map(|node| node.id.as_str()).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn path_node(id: &str, has_children: bool, has_operations: bool) -> GraphNode {
		GraphNode {
			id: id.into(),
			kind: NodeKind::PathSegment {
				path: id.into(),
				segment: id.trim_start_matches('/').into(),
				parameter: false,
				depth: 1,
				parent: None,
				has_children,
				has_operations,
			},
			label: id.into(),
			tooltip: format!("Path: {id}"),
			group: Some(id.into()),
		}
	}

	#[test]
	fn edge_ids_distinguish_relations_and_status_codes() {
		let ok = edge_id("/a_GET", "schema_A", &Relation::Produces { status: "200".into() });
		let created = edge_id("/a_GET", "schema_A", &Relation::Produces { status: "201".into() });
		let body = edge_id("/a_GET", "schema_A", &Relation::Consumes);
		assert_ne!(ok, created);
		assert_ne!(ok, body);
		assert_eq!(ok, "e/a_GET-schema_A:produces-200");
	}

	#[test]
	fn toggleable_requires_children_or_operations() {
		assert!(path_node("/a", true, false).is_toggleable());
		assert!(path_node("/a", false, true).is_toggleable());
		assert!(!path_node("/a", false, false).is_toggleable());
		assert!(!path_node("/a", false, true).has_children());
	}

	#[test]
	fn graph_indexes_nodes_by_id() {
		let graph = ApiGraph::new(vec![path_node("/a", false, false), path_node("/b", false, false)], vec![]);
		assert_eq!(graph.node("/b").map(|n| n.label.as_str()), Some("/b"));
		assert!(graph.node("/c").is_none());
		assert!(graph.contains("/a"));
	}

	#[test]
	fn nodes_serialize_with_flattened_kind_tag() {
		let json = serde_json::to_value(path_node("/a", true, false)).unwrap();
		assert_eq!(json["kind"], "path_segment");
		assert_eq!(json["id"], "/a");
		assert_eq!(json["has_children"], true);
	}
}
