//! Layered (dagre) layout adapter.
//!
//! `dugong` reports node centers; the canvas positions nodes by their top-left
//! corner, so every result is shifted by half the node size.

use std::collections::HashSet;

use dugong::graphlib::{Graph, GraphOptions};
use dugong::{EdgeLabel, GraphLabel, NodeLabel, RankDir};
use log::debug;

use super::types::{FlowEdge, FlowNode, Position, Side};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutDirection {
	#[default]
	TopBottom,
	LeftRight,
}

impl LayoutDirection {
	fn rank_dir(self) -> RankDir {
		match self {
			LayoutDirection::TopBottom => RankDir::TB,
			LayoutDirection::LeftRight => RankDir::LR,
		}
	}

	/// (target, source) handle sides for nodes laid out in this direction.
	pub fn handle_sides(self) -> (Side, Side) {
		match self {
			LayoutDirection::TopBottom => (Side::Top, Side::Bottom),
			LayoutDirection::LeftRight => (Side::Left, Side::Right),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptions {
	pub direction: LayoutDirection,
	/// Size pages give to nodes before an automatic layout.
	pub node_width: f64,
	pub node_height: f64,
	pub node_sep: f64,
	pub rank_sep: f64,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			direction: LayoutDirection::TopBottom,
			node_width: 172.0,
			node_height: 36.0,
			node_sep: 50.0,
			rank_sep: 50.0,
		}
	}
}

/// How a canvas assigns node positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LayoutStrategy {
	/// Positions come from the data as-is.
	#[default]
	Static,
	/// Positions are recomputed on every structural change.
	Auto(LayoutOptions),
}

/// Identity of a node/edge collection pair. Position-only mutations leave it
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructureKey {
	pub node_count: usize,
	pub edge_version: u64,
}

/// Returns `nodes` with positions assigned by a layered layout of `edges`.
///
/// Each node is laid out with its own style size. Edges with an endpoint
/// missing from `nodes` are ignored.
pub fn layout_nodes(nodes: &[FlowNode], edges: &[FlowEdge], options: &LayoutOptions) -> Vec<FlowNode> {
	if nodes.is_empty() {
		return Vec::new();
	}

	let mut g = Graph::<NodeLabel, EdgeLabel, GraphLabel>::new(GraphOptions {
		multigraph: true,
		..Default::default()
	});
	g.set_graph(GraphLabel {
		rankdir: options.direction.rank_dir(),
		nodesep: options.node_sep,
		ranksep: options.rank_sep,
		..Default::default()
	});

	for node in nodes {
		g.set_node(
			node.id.clone(),
			NodeLabel {
				width: node.width(),
				height: node.height(),
				..Default::default()
			},
		);
	}

	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let mut skipped = 0;
	for edge in edges {
		if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
			skipped += 1;
			continue;
		}
		g.set_edge_named(
			edge.source.clone(),
			edge.target.clone(),
			Some(edge.id.clone()),
			Some(EdgeLabel {
				minlen: 1,
				weight: 1.0,
				..Default::default()
			}),
		);
	}

	dugong::layout(&mut g);
	debug!(
		"layout: {} nodes, {} edges ({} dangling skipped), {:?}",
		nodes.len(),
		edges.len() - skipped,
		skipped,
		options.direction
	);

	let (target_side, source_side) = options.direction.handle_sides();
	nodes
		.iter()
		.map(|node| {
			let mut out = node.clone();
			if let Some(label) = g.node(&node.id) {
				out.position = Position::new(
					label.x.unwrap_or(0.0) - node.width() / 2.0,
					label.y.unwrap_or(0.0) - node.height() / 2.0,
				);
			}
			out.target_position = target_side;
			out.source_position = source_side;
			out
		})
		.collect()
}
