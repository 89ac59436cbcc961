//! Graph compiler: turns a [`SpecDocument`] into an ordered, deduplicated
//! node/edge graph with stable ids.
//!
//! Traversal is outer loop by path, inner loop by method, both in the order
//! the document lists them. Ids depend only on document content, so
//! collapse state keyed by id survives recompilation.

use std::collections::{BTreeSet, HashSet};

use log::debug;
use serde::Deserialize;

use super::document::{HttpMethod, Operation, SpecDocument, resolve_schema_name};
use super::types::{
	ApiGraph, EdgeId, GraphEdge, GraphNode, NodeId, NodeKind, Relation, SchemaProperty,
};

/// Options controlling which parts of a document become nodes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
	/// Methods that produce operation nodes. Others are skipped entirely.
	pub methods: BTreeSet<HttpMethod>,
}

impl Default for CompileOptions {
	fn default() -> Self {
		Self {
			methods: HttpMethod::ALL.into_iter().collect(),
		}
	}
}

/// Compiles `doc` with every HTTP method enabled.
pub fn compile(doc: &SpecDocument) -> ApiGraph {
	compile_with(doc, &CompileOptions::default())
}

/// Compiles `doc`, emitting operations only for the enabled methods.
pub fn compile_with(doc: &SpecDocument, options: &CompileOptions) -> ApiGraph {
	let mut builder = GraphBuilder::new(doc);

	for (path, item) in &doc.paths {
		let Some(full_path) = builder.add_path(path) else {
			continue;
		};
		for (method, operation) in item.operations() {
			if !options.methods.contains(&method) {
				continue;
			}
			builder.add_operation(&full_path, method, operation);
		}
	}

	builder.finish()
}

/// Splits a path string into its non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
	path.split('/').filter(|segment| !segment.is_empty())
}

/// Whether `segment` is a `{template}` parameter.
pub fn is_parameter_segment(segment: &str) -> bool {
	segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Whether `candidate` extends `base` by at least one `/`-delimited segment.
pub fn is_strict_extension(candidate: &str, base: &str) -> bool {
	candidate.len() > base.len()
		&& candidate.starts_with(base)
		&& candidate.as_bytes()[base.len()] == b'/'
}

/// Every path segment id the document will produce, collected up front so
/// operation ids can avoid colliding with them.
fn collect_path_ids(doc: &SpecDocument) -> HashSet<NodeId> {
	let mut ids = HashSet::new();
	for path in doc.paths.keys() {
		let mut prefix = String::new();
		for segment in path_segments(path) {
			prefix.push('/');
			prefix.push_str(segment);
			ids.insert(prefix.clone());
		}
		if prefix.is_empty() && path.starts_with('/') {
			ids.insert("/".to_string());
		}
	}
	ids
}

fn schema_node_id(name: &str) -> NodeId {
	format!("schema_{name}")
}

struct GraphBuilder<'a> {
	doc: &'a SpecDocument,
	path_ids: HashSet<NodeId>,
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	node_ids: HashSet<NodeId>,
	edge_ids: HashSet<EdgeId>,
	operation_parents: HashSet<NodeId>,
}

impl<'a> GraphBuilder<'a> {
	fn new(doc: &'a SpecDocument) -> Self {
		Self {
			doc,
			path_ids: collect_path_ids(doc),
			nodes: Vec::new(),
			edges: Vec::new(),
			node_ids: HashSet::new(),
			edge_ids: HashSet::new(),
			operation_parents: HashSet::new(),
		}
	}

	fn push_node(&mut self, node: GraphNode) {
		if self.node_ids.insert(node.id.clone()) {
			self.nodes.push(node);
		}
	}

	fn push_edge(&mut self, edge: GraphEdge) {
		if self.edge_ids.insert(edge.id.clone()) {
			self.edges.push(edge);
		}
	}

	/// Adds one node per prefix of `path` plus the parent/child edges
	/// between them. Returns the id of the full-path node.
	fn add_path(&mut self, path: &str) -> Option<NodeId> {
		let mut parent: Option<NodeId> = None;
		let mut cluster: Option<String> = None;

		for (index, segment) in path_segments(path).enumerate() {
			let current = match &parent {
				Some(parent) => format!("{parent}/{segment}"),
				None => format!("/{segment}"),
			};
			let group = cluster.get_or_insert_with(|| current.clone()).clone();

			self.push_node(GraphNode {
				id: current.clone(),
				kind: NodeKind::PathSegment {
					path: current.clone(),
					segment: segment.to_string(),
					parameter: is_parameter_segment(segment),
					depth: index + 1,
					parent: parent.clone(),
					has_children: false,
					has_operations: false,
				},
				label: format!("/{segment}"),
				tooltip: format!("Path: {current}"),
				group: Some(group),
			});

			if let Some(parent) = &parent {
				self.push_edge(GraphEdge::new(parent, &current, Relation::ParentChild, None));
			}
			parent = Some(current);
		}

		if parent.is_none() && path.starts_with('/') {
			let root = "/".to_string();
			self.push_node(GraphNode {
				id: root.clone(),
				kind: NodeKind::PathSegment {
					path: root.clone(),
					segment: String::new(),
					parameter: false,
					depth: 1,
					parent: None,
					has_children: false,
					has_operations: false,
				},
				label: root.clone(),
				tooltip: format!("Path: {root}"),
				group: Some(root.clone()),
			});
			parent = Some(root);
		}

		if parent.is_none() {
			debug!("api-graph: skipping path {path:?} with no segments");
		}
		parent
	}

	fn is_taken(&self, id: &str) -> bool {
		self.path_ids.contains(id) || self.node_ids.contains(id)
	}

	/// `<path>_<METHOD>`, unless that names a path segment or an earlier
	/// operation (`/users` and `/users/` both own a GET). Fallbacks use `//`,
	/// which no path segment id contains.
	fn operation_id(&self, full_path: &str, method: HttpMethod) -> NodeId {
		let id = format!("{full_path}_{method}");
		if !self.is_taken(&id) {
			return id;
		}
		let fallback = format!("{full_path}//{method}");
		if !self.is_taken(&fallback) {
			return fallback;
		}
		let mut n = 2;
		loop {
			let candidate = format!("{fallback}~{n}");
			if !self.is_taken(&candidate) {
				return candidate;
			}
			n += 1;
		}
	}

	fn add_operation(&mut self, full_path: &str, method: HttpMethod, operation: &Operation) {
		let id = self.operation_id(full_path, method);
		if id != format!("{full_path}_{method}") {
			debug!("api-graph: {method} {full_path} already taken, using id {id}");
		}
		let group = self
			.nodes
			.iter()
			.find(|node| node.id == full_path)
			.and_then(|node| node.group.clone());
		let summary = operation.summary.clone().unwrap_or_default();
		let description = operation.description.clone().unwrap_or_default();

		self.push_node(GraphNode {
			id: id.clone(),
			kind: NodeKind::Operation {
				path: full_path.to_string(),
				method,
				summary: operation.summary.clone(),
				description: operation.description.clone(),
				operation_id: operation.operation_id.clone(),
			},
			label: method.to_string(),
			tooltip: format!("Method: {method}\n{summary}\n{description}"),
			group,
		});
		self.operation_parents.insert(full_path.to_string());
		self.push_edge(GraphEdge::new(
			full_path,
			&id,
			Relation::Invokes,
			Some(method.to_string()),
		));

		if let Some(body) = &operation.request_body {
			for media in body.content.values() {
				let Some(reference) = media.schema.as_ref().and_then(|s| s.target()) else {
					continue;
				};
				self.link_schema(&id, reference, Relation::Consumes, "Request Body".to_string());
			}
		}

		for (status, response) in &operation.responses {
			for media in response.content.values() {
				let Some(reference) = media.schema.as_ref().and_then(|s| s.target()) else {
					continue;
				};
				self.link_schema(
					&id,
					reference,
					Relation::Produces {
						status: status.clone(),
					},
					format!("Response {status}"),
				);
			}
		}
	}

	/// Connects an operation to the schema named by `reference`, creating the
	/// schema node on first use. Unresolvable references are skipped.
	fn link_schema(&mut self, operation: &str, reference: &str, relation: Relation, label: String) {
		let Some(name) = resolve_schema_name(self.doc, reference) else {
			debug!("api-graph: {operation}: skipping unresolved schema reference {reference:?}");
			return;
		};
		let schema_id = schema_node_id(&name);

		if !self.node_ids.contains(&schema_id) {
			let properties: Vec<SchemaProperty> = self
				.doc
				.schema(&name)
				.map(|schema| {
					schema
						.properties
						.iter()
						.map(|(prop, def)| SchemaProperty {
							name: prop.clone(),
							type_name: def.type_name(),
						})
						.collect()
				})
				.unwrap_or_default();
			let tooltip = schema_tooltip(&name, &properties);
			self.push_node(GraphNode {
				id: schema_id.clone(),
				kind: NodeKind::PayloadSchema {
					name: name.clone(),
					properties,
				},
				label: name,
				tooltip,
				group: None,
			});
		}

		self.push_edge(GraphEdge::new(operation, &schema_id, relation, Some(label)));
	}

	/// Fills in the derived `has_children` / `has_operations` flags.
	fn finish(mut self) -> ApiGraph {
		let path_ids: Vec<NodeId> = self
			.nodes
			.iter()
			.filter(|node| node.is_path_segment())
			.map(|node| node.id.clone())
			.collect();

		for node in &mut self.nodes {
			if let NodeKind::PathSegment {
				has_children,
				has_operations,
				..
			} = &mut node.kind
			{
				*has_children = path_ids
					.iter()
					.any(|other| is_strict_extension(other, &node.id));
				*has_operations = self.operation_parents.contains(&node.id);
			}
		}

		ApiGraph::new(self.nodes, self.edges)
	}
}

fn schema_tooltip(name: &str, properties: &[SchemaProperty]) -> String {
	if properties.is_empty() {
		return format!("Schema: {name}\nNo properties");
	}
	let lines: Vec<String> = properties
		.iter()
		.map(|p| format!("- {}: {}", p.name, p.type_name))
		.collect();
	format!("Schema: {name}\nProperties:\n{}", lines.join("\n"))
}
