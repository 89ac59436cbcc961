//! Layout adapter between the visible subgraph and a layered layout
//! collaborator.
//!
//! The adapter owns no placement logic. It sizes every node, picks the flow
//! direction, delegates to a [`LayeredLayout`], and converts the
//! collaborator's center-based coordinates to top-left corners.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::Deserialize;

use super::types::{NodeId, VisibleSubgraph};

/// A point in layout space, in the same unit as [`NodeSize`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Horizontal coordinate, growing to the right.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Position {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Logical size of a node box.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct NodeSize {
	/// Extent along x.
	pub width: f64,
	/// Extent along y.
	pub height: f64,
}

/// Direction ranks flow in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Direction {
	/// Root on the left, leaves to the right (`LR`).
	#[default]
	#[serde(rename = "LR")]
	LeftToRight,
	/// Root on top, leaves below (`TB`).
	#[serde(rename = "TB")]
	TopToBottom,
}

/// Layout tuning, deserializable from the host page's graph config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Size given to every node.
	pub node_size: NodeSize,
	/// Direction ranks flow in, `LR` unless configured.
	pub direction: Direction,
	/// Gap between consecutive ranks.
	pub rank_sep: f64,
	/// Gap between neighbouring nodes in one rank.
	pub node_sep: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_size: NodeSize {
				width: 180.0,
				height: 60.0,
			},
			direction: Direction::LeftToRight,
			rank_sep: 50.0,
			node_sep: 50.0,
		}
	}
}

/// One node handed to the layout collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
	/// Id of the visible node.
	pub id: NodeId,
	/// Box the collaborator must reserve.
	pub size: NodeSize,
}

/// Everything a layered layout needs: sized nodes, directed edges, tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRequest {
	/// Direction ranks flow in.
	pub direction: Direction,
	/// Gap between consecutive ranks.
	pub rank_sep: f64,
	/// Gap between neighbouring nodes in one rank.
	pub node_sep: f64,
	/// Nodes in visible order.
	pub nodes: Vec<LayoutNode>,
	/// `(source, target)` pairs.
	pub edges: Vec<(NodeId, NodeId)>,
}

/// A layered (Sugiyama-style) graph layout algorithm.
///
/// Implementations return the **center** of every node they place.
pub trait LayeredLayout {
	/// Centers of the placed nodes, keyed by id. Nodes may be missing.
	fn place(&self, request: &LayoutRequest) -> HashMap<NodeId, Position>;
}

impl<L: LayeredLayout + ?Sized> LayeredLayout for &L {
	fn place(&self, request: &LayoutRequest) -> HashMap<NodeId, Position> {
		(**self).place(request)
	}
}

/// Translates visible subgraphs for a [`LayeredLayout`] and back.
#[derive(Clone, Debug, Default)]
pub struct LayoutAdapter<L> {
	engine: L,
	config: LayoutConfig,
}

impl<L: LayeredLayout> LayoutAdapter<L> {
	/// Adapter that delegates placement to `engine`.
	pub fn new(engine: L, config: LayoutConfig) -> Self {
		Self { engine, config }
	}

	/// Sizes, direction and separations in use.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Builds the collaborator's input for `subgraph`.
	pub fn request(&self, subgraph: &VisibleSubgraph) -> LayoutRequest {
		LayoutRequest {
			direction: self.config.direction,
			rank_sep: self.config.rank_sep,
			node_sep: self.config.node_sep,
			nodes: subgraph
				.nodes
				.iter()
				.map(|node| LayoutNode {
					id: node.id.clone(),
					size: self.config.node_size,
				})
				.collect(),
			edges: subgraph
				.edges
				.iter()
				.map(|edge| (edge.source.clone(), edge.target.clone()))
				.collect(),
		}
	}

	/// Lays out `subgraph` in full, returning the top-left corner of every node.
	pub fn layout(&self, subgraph: &VisibleSubgraph) -> BTreeMap<NodeId, Position> {
		let request = self.request(subgraph);
		let centers = self.engine.place(&request);
		let NodeSize { width, height } = self.config.node_size;

		request
			.nodes
			.into_iter()
			.map(|node| {
				let position = match centers.get(&node.id) {
					Some(center) => Position::new(center.x - width / 2.0, center.y - height / 2.0),
					None => {
						warn!("api-graph: layout returned no position for {}", node.id);
						Position::default()
					}
				};
				(node.id, position)
			})
			.collect()
	}
}
