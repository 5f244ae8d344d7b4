use std::collections::HashMap;

use log::{debug, info};

use super::layout::{LayoutStrategy, StructureKey, layout_nodes};
use super::minimap::MiniMapProjection;
use super::types::{Connection, FlowData, FlowEdge, FlowNode, Side, add_edge};
use super::viewport::{ViewTransform, nodes_bounds};

/// Handle hit radius in screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 8.0;
pub const HANDLE_RADIUS: f64 = 4.0;
const ZOOM_STEP: f64 = 1.2;

#[derive(Clone, Debug, PartialEq)]
pub struct FlowOptions {
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub fit_padding: f64,
	pub background_gap: f64,
	pub background_dot_size: f64,
	pub background_color: String,
	pub minimap_stroke_width: f64,
}

impl Default for FlowOptions {
	fn default() -> Self {
		Self {
			min_zoom: 0.5,
			max_zoom: 1.5,
			fit_padding: 0.2,
			background_gap: 20.0,
			background_dot_size: 1.0,
			background_color: "#e0e0e0".into(),
			minimap_stroke_width: 3.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandleRef {
	pub node_idx: usize,
	pub side: Side,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// In-progress connect gesture.
#[derive(Clone, Debug, Default)]
pub struct ConnectState {
	pub from: Option<HandleRef>,
	/// Pointer position in flow coordinates.
	pub cursor_x: f64,
	pub cursor_y: f64,
}

pub struct FlowState {
	pub nodes: Vec<FlowNode>,
	pub edges: Vec<FlowEdge>,
	pub options: FlowOptions,
	pub strategy: LayoutStrategy,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: ConnectState,
	/// Projection captured when a minimap drag starts, held until it ends.
	pub minimap_pan: Option<MiniMapProjection>,
	pub hover: Option<usize>,
	pub interactive: bool,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	edge_version: u64,
	edge_seq: u64,
	laid_out: Option<StructureKey>,
}

impl FlowState {
	pub fn new(data: &FlowData, width: f64, height: f64, options: FlowOptions, strategy: LayoutStrategy) -> Self {
		let mut state = Self {
			nodes: data.nodes.clone(),
			edges: data.edges.clone(),
			options,
			strategy,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			connect: ConnectState::default(),
			minimap_pan: None,
			hover: None,
			interactive: true,
			width,
			height,
			flow_time: 0.0,
			edge_version: 0,
			edge_seq: 0,
			laid_out: None,
		};
		state.sync_layout();
		state.fit_view();
		state
	}

	/// Replaces the node collection.
	pub fn set_nodes(&mut self, nodes: Vec<FlowNode>) {
		self.nodes = nodes;
		self.reset_gestures();
	}

	/// Replaces the edge collection. Always counts as a structural change,
	/// even when the new edges equal the old ones.
	pub fn set_edges(&mut self, edges: Vec<FlowEdge>) {
		self.edges = edges;
		self.edge_version += 1;
	}

	pub fn replace_data(&mut self, data: &FlowData) {
		self.set_nodes(data.nodes.clone());
		self.set_edges(data.edges.clone());
	}

	fn reset_gestures(&mut self) {
		self.drag = DragState::default();
		self.connect = ConnectState::default();
		self.hover = None;
	}

	pub fn structure_key(&self) -> StructureKey {
		StructureKey {
			node_count: self.nodes.len(),
			edge_version: self.edge_version,
		}
	}

	/// Runs the layout pass if the strategy is automatic and the structure has
	/// changed since the last pass. Returns whether positions were recomputed.
	pub fn sync_layout(&mut self) -> bool {
		let LayoutStrategy::Auto(options) = &self.strategy else {
			return false;
		};
		let key = self.structure_key();
		if self.laid_out == Some(key) || self.nodes.is_empty() {
			return false;
		}
		self.nodes = layout_nodes(&self.nodes, &self.edges, options);
		self.laid_out = Some(key);
		debug!("relayout for {:?}", key);
		true
	}

	/// Edges whose endpoints both exist, as (source index, target index, edge).
	pub fn resolved_edges(&self) -> Vec<(usize, usize, &FlowEdge)> {
		let index: HashMap<&str, usize> = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		self.edges
			.iter()
			.filter_map(|e| {
				let src = *index.get(e.source.as_str())?;
				let tgt = *index.get(e.target.as_str())?;
				Some((src, tgt, e))
			})
			.collect()
	}

	/// Handles exposed by a node, given its kind and handle sides.
	pub fn handles(node: &FlowNode) -> impl Iterator<Item = Side> {
		let target = node.kind.has_target_handle().then_some(node.target_position);
		let source = node.kind.has_source_handle().then_some(node.source_position);
		target.into_iter().chain(source)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (fx, fy) = self.transform.screen_to_flow(sx, sy);
		// Later nodes are drawn on top.
		self.nodes.iter().rposition(|n| n.contains(fx, fy))
	}

	pub fn handle_at_position(&self, sx: f64, sy: f64) -> Option<HandleRef> {
		self.nodes.iter().enumerate().rev().find_map(|(node_idx, node)| {
			Self::handles(node).find_map(|side| {
				let (hx, hy) = node.handle_point(side);
				let (hx, hy) = self.transform.flow_to_screen(hx, hy);
				let (dx, dy) = (hx - sx, hy - sy);
				((dx * dx + dy * dy).sqrt() <= HANDLE_HIT_RADIUS).then_some(HandleRef { node_idx, side })
			})
		})
	}

	pub fn minimap(&self) -> MiniMapProjection {
		MiniMapProjection::new(&self.nodes, &self.transform, self.width, self.height)
	}

	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let Some(node) = self.nodes.get(idx) else {
			return;
		};
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: node.position.x,
			node_start_y: node.position.y,
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		if !self.drag.active {
			return;
		}
		let Some(node) = self.drag.node_idx.and_then(|idx| self.nodes.get_mut(idx)) else {
			return;
		};
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		node.position.x = self.drag.node_start_x + dx;
		node.position.y = self.drag.node_start_y + dy;
	}

	pub fn end_drag(&mut self) {
		self.drag = DragState::default();
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	pub fn begin_connect(&mut self, from: HandleRef, sx: f64, sy: f64) {
		let (fx, fy) = self.transform.screen_to_flow(sx, sy);
		self.connect = ConnectState {
			from: Some(from),
			cursor_x: fx,
			cursor_y: fy,
		};
	}

	pub fn connect_to(&mut self, sx: f64, sy: f64) {
		if self.connect.from.is_some() {
			let (fx, fy) = self.transform.screen_to_flow(sx, sy);
			self.connect.cursor_x = fx;
			self.connect.cursor_y = fy;
		}
	}

	/// Completes the gesture at a screen point. Appends one edge when the
	/// pointer is over a handle other than the starting one.
	pub fn finish_connect(&mut self, sx: f64, sy: f64) -> Option<Connection> {
		let from = self.connect.from.take()?;
		let to = self.handle_at_position(sx, sy).filter(|h| *h != from)?;
		let start = self.nodes.get(from.node_idx)?;
		let end = self.nodes.get(to.node_idx)?;
		// A gesture started on a target handle runs from the drop node to the start node.
		let from_target = start.kind.has_target_handle() && from.side == start.target_position;
		let ((source, source_side), (target, target_side)) = if from_target {
			((end, to.side), (start, from.side))
		} else {
			((start, from.side), (end, to.side))
		};
		let connection = Connection {
			source: source.id.clone(),
			source_side,
			target: target.id.clone(),
			target_side,
		};
		self.add_connection(&connection);
		Some(connection)
	}

	pub fn add_connection(&mut self, connection: &Connection) {
		add_edge(connection, self.edge_seq, &mut self.edges);
		self.edge_seq += 1;
		self.edge_version += 1;
		info!("connected {} -> {}", connection.source, connection.target);
	}

	pub fn cancel_gestures(&mut self) {
		self.end_drag();
		self.end_pan();
		self.connect = ConnectState::default();
		self.minimap_pan = None;
		self.hover = None;
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transform
			.zoom_at(sx, sy, factor, self.options.min_zoom, self.options.max_zoom);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, 1.0 / ZOOM_STEP);
	}

	pub fn fit_view(&mut self) {
		let Some(bounds) = nodes_bounds(&self.nodes) else {
			return;
		};
		self.transform = ViewTransform::fit(
			&bounds,
			self.width,
			self.height,
			self.options.fit_padding,
			self.options.min_zoom,
			self.options.max_zoom,
		);
	}

	/// Starts a minimap drag. The projection is frozen until `end_minimap_pan`
	/// so the pointed flow location does not move as the viewport follows it.
	pub fn begin_minimap_pan(&mut self, sx: f64, sy: f64) {
		self.minimap_pan = Some(self.minimap());
		self.center_on_minimap(sx, sy);
	}

	pub fn end_minimap_pan(&mut self) {
		self.minimap_pan = None;
	}

	/// Centers the viewport on the flow point under a minimap screen point.
	pub fn center_on_minimap(&mut self, sx: f64, sy: f64) {
		let (fx, fy) = match &self.minimap_pan {
			Some(map) => map.unproject(sx, sy),
			None => self.minimap().unproject(sx, sy),
		};
		self.transform.x = self.width / 2.0 - fx * self.transform.k;
		self.transform.y = self.height / 2.0 - fy * self.transform.k;
	}

	pub fn toggle_interactive(&mut self) -> bool {
		self.interactive = !self.interactive;
		if !self.interactive {
			self.end_drag();
			self.connect = ConnectState::default();
		}
		self.interactive
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover = node;
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::layout::{LayoutDirection, LayoutOptions};
	use crate::components::flow::types::{NodeKind, Position};

	fn data() -> FlowData {
		FlowData {
			nodes: vec![
				FlowNode::new("a", "A", Position::new(0.0, 0.0)).with_kind(NodeKind::Input),
				FlowNode::new("b", "B", Position::new(0.0, 200.0)),
				FlowNode::new("c", "C", Position::new(300.0, 200.0)).with_kind(NodeKind::Output),
			],
			edges: vec![FlowEdge::new("ab", "a", "b")],
		}
	}

	fn static_state() -> FlowState {
		FlowState::new(&data(), 800.0, 600.0, FlowOptions::default(), LayoutStrategy::Static)
	}

	fn auto_state() -> FlowState {
		FlowState::new(
			&data(),
			800.0,
			600.0,
			FlowOptions::default(),
			LayoutStrategy::Auto(LayoutOptions {
				direction: LayoutDirection::LeftRight,
				..Default::default()
			}),
		)
	}

	fn screen_of(state: &FlowState, idx: usize, side: Side) -> (f64, f64) {
		let (x, y) = state.nodes[idx].handle_point(side);
		state.transform.flow_to_screen(x, y)
	}

	#[test]
	fn static_strategy_keeps_given_positions() {
		let state = static_state();
		assert_eq!(state.nodes, data().nodes);
	}

	#[test]
	fn connecting_adds_exactly_one_edge_and_keeps_positions() {
		let mut state = static_state();
		let before = state.nodes.clone();
		let edges_before = state.resolved_edges().len();

		let (sx, sy) = screen_of(&state, 1, Side::Bottom);
		let from = state.handle_at_position(sx, sy).unwrap();
		state.begin_connect(from, sx, sy);
		let (tx, ty) = screen_of(&state, 2, Side::Top);
		state.connect_to(tx, ty);
		let conn = state.finish_connect(tx, ty).unwrap();

		assert_eq!(conn.source, "b");
		assert_eq!(conn.target, "c");
		assert_eq!(state.resolved_edges().len(), edges_before + 1);
		assert_eq!(state.nodes, before);
	}

	#[test]
	fn connecting_from_target_handle_reverses_direction() {
		let mut state = static_state();
		let (sx, sy) = screen_of(&state, 1, Side::Top);
		let from = state.handle_at_position(sx, sy).unwrap();
		assert_eq!(from.side, Side::Top);
		state.begin_connect(from, sx, sy);
		let (tx, ty) = screen_of(&state, 0, Side::Bottom);
		let conn = state.finish_connect(tx, ty).unwrap();

		assert_eq!((conn.source.as_str(), conn.target.as_str()), ("a", "b"));
		assert_eq!((conn.source_side, conn.target_side), (Side::Bottom, Side::Top));
		let last = state.edges.last().unwrap();
		assert_eq!((last.source.as_str(), last.target.as_str()), ("a", "b"));
	}

	#[test]
	fn minimap_drag_settles_on_pointed_location() {
		let mut state = static_state();
		let panel = state.minimap().panel;
		let (px, py) = (panel.x + 10.0, panel.y + 10.0);
		state.begin_minimap_pan(px, py);
		let settled = state.transform.clone();
		for _ in 0..5 {
			state.center_on_minimap(px, py);
			assert_eq!(state.transform, settled);
		}
		state.end_minimap_pan();
		assert!(state.minimap_pan.is_none());
	}

	#[test]
	fn connect_dropped_on_canvas_is_cancelled() {
		let mut state = static_state();
		let (sx, sy) = screen_of(&state, 0, Side::Bottom);
		let from = state.handle_at_position(sx, sy).unwrap();
		state.begin_connect(from, sx, sy);
		assert!(state.finish_connect(-500.0, -500.0).is_none());
		assert_eq!(state.edges.len(), 1);
		assert!(state.connect.from.is_none());
	}

	#[test]
	fn duplicate_connections_are_kept() {
		let mut state = static_state();
		let conn = Connection {
			source: "a".into(),
			source_side: Side::Bottom,
			target: "b".into(),
			target_side: Side::Top,
		};
		state.add_connection(&conn);
		state.add_connection(&conn);
		assert_eq!(state.resolved_edges().len(), 3);
	}

	#[test]
	fn dangling_edges_are_not_resolved() {
		let mut state = static_state();
		state.set_edges(vec![FlowEdge::new("ax", "a", "missing"), FlowEdge::new("ab", "a", "b")]);
		let resolved = state.resolved_edges();
		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].2.id, "ab");
	}

	#[test]
	fn drag_moves_node_in_flow_space() {
		let mut state = static_state();
		state.transform = ViewTransform {
			x: 0.0,
			y: 0.0,
			k: 0.5,
		};
		state.begin_drag(1, 10.0, 10.0);
		state.drag_to(20.0, 30.0);
		state.end_drag();
		assert_eq!(state.nodes[1].position, Position::new(20.0, 240.0));
	}

	#[test]
	fn drag_is_not_overwritten_by_relayout() {
		let mut state = auto_state();
		state.begin_drag(1, 0.0, 0.0);
		state.drag_to(40.0, 40.0);
		state.end_drag();
		let dragged = state.nodes[1].position;
		for _ in 0..10 {
			assert!(!state.sync_layout());
		}
		assert_eq!(state.nodes[1].position, dragged);
	}

	#[test]
	fn structural_changes_trigger_relayout() {
		let mut state = auto_state();
		let edges = state.edges.clone();
		state.set_edges(edges);
		assert!(state.sync_layout());
		assert!(!state.sync_layout());

		let mut nodes = state.nodes.clone();
		nodes.push(FlowNode::new("d", "D", Position::default()));
		state.set_nodes(nodes);
		assert!(state.sync_layout());
		assert_eq!(state.nodes.len(), 4);
	}

	#[test]
	fn empty_auto_layout_does_nothing() {
		let mut state = FlowState::new(
			&FlowData::default(),
			800.0,
			600.0,
			FlowOptions::default(),
			LayoutStrategy::Auto(LayoutOptions::default()),
		);
		assert!(!state.sync_layout());
		assert!(state.nodes.is_empty());
	}

	#[test]
	fn auto_layout_ranks_left_to_right() {
		let state = auto_state();
		assert!(state.nodes[0].position.x < state.nodes[1].position.x);
		assert_eq!(state.nodes[0].source_position, Side::Right);
	}

	#[test]
	fn zoom_controls_clamp() {
		let mut state = static_state();
		for _ in 0..20 {
			state.zoom_in();
		}
		assert_eq!(state.transform.k, 1.5);
		for _ in 0..20 {
			state.zoom_out();
		}
		assert_eq!(state.transform.k, 0.5);
		for _ in 0..20 {
			state.zoom_at(10.0, 10.0, 3.0);
		}
		assert_eq!(state.transform.k, 1.5);
	}

	#[test]
	fn hit_testing_prefers_topmost_node() {
		let mut state = static_state();
		state.transform = ViewTransform::default();
		let mut nodes = state.nodes.clone();
		nodes.push(FlowNode::new("top", "Top", Position::new(10.0, 10.0)));
		state.set_nodes(nodes);
		assert_eq!(state.node_at_position(20.0, 20.0), Some(3));
		assert_eq!(state.node_at_position(-100.0, -100.0), None);
	}

	#[test]
	fn pan_translates_viewport() {
		let mut state = static_state();
		let (x0, y0) = (state.transform.x, state.transform.y);
		state.begin_pan(100.0, 100.0);
		state.pan_to(130.0, 90.0);
		state.end_pan();
		state.pan_to(500.0, 500.0);
		assert_eq!(state.transform.x, x0 + 30.0);
		assert_eq!(state.transform.y, y0 - 10.0);
	}

	#[test]
	fn locking_cancels_running_drag() {
		let mut state = static_state();
		state.begin_drag(0, 0.0, 0.0);
		assert!(!state.toggle_interactive());
		assert!(!state.drag.active);
		assert!(state.toggle_interactive());
	}

	#[test]
	fn input_nodes_only_expose_source_handle() {
		let state = static_state();
		assert_eq!(FlowState::handles(&state.nodes[0]).collect::<Vec<_>>(), [Side::Bottom]);
		assert_eq!(FlowState::handles(&state.nodes[2]).collect::<Vec<_>>(), [Side::Top]);
		assert_eq!(
			FlowState::handles(&state.nodes[1]).collect::<Vec<_>>(),
			[Side::Top, Side::Bottom]
		);
	}
}
