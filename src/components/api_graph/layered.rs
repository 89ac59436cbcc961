//! Built-in layered layout backed by `dugong`, the dagre port.
//!
//! Ranks, crossing reduction and coordinate assignment all happen in
//! dagre; this module only translates a [`LayoutRequest`] into a graphlib
//! graph and reads the node centers back out.

use std::collections::{HashMap, HashSet};

use dugong::graphlib::{Graph, GraphOptions};
use dugong::{EdgeLabel, GraphLabel, NodeLabel, RankDir};

use super::layout::{Direction, LayeredLayout, LayoutRequest, Position};
use super::types::NodeId;

/// Default [`LayeredLayout`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct DagreLayout;

fn rank_dir(direction: Direction) -> RankDir {
	match direction {
		Direction::LeftToRight => RankDir::LR,
		Direction::TopToBottom => RankDir::TB,
	}
}

impl DagreLayout {
	/// Builds the dagre input graph. Edges with an unknown endpoint or equal
	/// endpoints are left out.
	fn graph(request: &LayoutRequest) -> Graph<NodeLabel, EdgeLabel, GraphLabel> {
		let mut g: Graph<NodeLabel, EdgeLabel, GraphLabel> = Graph::new(GraphOptions {
			directed: true,
			multigraph: true,
			compound: false,
		});
		g.set_graph(GraphLabel {
			rankdir: rank_dir(request.direction),
			nodesep: request.node_sep,
			ranksep: request.rank_sep,
			..Default::default()
		});

		let mut known: HashSet<&str> = HashSet::with_capacity(request.nodes.len());
		for node in &request.nodes {
			known.insert(node.id.as_str());
			g.set_node(
				node.id.clone(),
				NodeLabel {
					width: node.size.width,
					height: node.size.height,
					..Default::default()
				},
			);
		}

		for (index, (source, target)) in request.edges.iter().enumerate() {
			if source == target || !known.contains(source.as_str()) || !known.contains(target.as_str())
			{
				continue;
			}
			g.set_edge_named(
				source.clone(),
				target.clone(),
				Some(format!("e{index}")),
				Some(EdgeLabel {
					minlen: 1,
					weight: 1.0,
					..Default::default()
				}),
			);
		}
		g
	}
}

impl LayeredLayout for DagreLayout {
	fn place(&self, request: &LayoutRequest) -> HashMap<NodeId, Position> {
		if request.nodes.is_empty() {
			return HashMap::new();
		}

		let mut g = Self::graph(request);
		dugong::layout_dagreish(&mut g);

		request
			.nodes
			.iter()
			.filter_map(|node| {
				let label = g.node(&node.id)?;
				let (Some(x), Some(y)) = (label.x, label.y) else {
					return None;
				};
				Some((node.id.clone(), Position::new(x, y)))
			})
			.collect()
	}
}
