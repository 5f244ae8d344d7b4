/// Role of a node in the diagram. Only affects rendering and minimap color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeKind {
	/// Source node, exposes only a source handle.
	Input,
	/// Sink node, exposes only a target handle.
	Output,
	#[default]
	Default,
}

impl NodeKind {
	pub fn has_source_handle(self) -> bool {
		self != NodeKind::Output
	}

	pub fn has_target_handle(self) -> bool {
		self != NodeKind::Input
	}
}

/// Side of a node a handle is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
	Top,
	Right,
	Bottom,
	Left,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub background: String,
	pub border_color: String,
	pub border_width: f64,
	pub border_radius: f64,
	pub font_size: f64,
	pub bold: bool,
	pub width: f64,
	pub height: f64,
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			background: "#ffffff".into(),
			border_color: "#1a192b".into(),
			border_width: 1.0,
			border_radius: 3.0,
			font_size: 12.0,
			bold: false,
			width: 150.0,
			height: 40.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowNode {
	pub id: String,
	pub kind: NodeKind,
	/// Display text, lines separated by `\n`.
	pub label: String,
	/// Top-left corner in flow coordinates.
	pub position: Position,
	pub style: NodeStyle,
	pub source_position: Side,
	pub target_position: Side,
}

impl FlowNode {
	pub fn new(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
		Self {
			id: id.into(),
			kind: NodeKind::Default,
			label: label.into(),
			position,
			style: NodeStyle::default(),
			source_position: Side::Bottom,
			target_position: Side::Top,
		}
	}

	pub fn with_kind(mut self, kind: NodeKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn with_style(mut self, style: NodeStyle) -> Self {
		self.style = style;
		self
	}

	pub fn width(&self) -> f64 {
		self.style.width
	}

	pub fn height(&self) -> f64 {
		self.style.height
	}

	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.position.x
			&& x <= self.position.x + self.width()
			&& y >= self.position.y
			&& y <= self.position.y + self.height()
	}

	/// Flow-space anchor of the handle on `side`.
	pub fn handle_point(&self, side: Side) -> (f64, f64) {
		let Position { x, y } = self.position;
		let (w, h) = (self.width(), self.height());
		match side {
			Side::Top => (x + w / 2.0, y),
			Side::Right => (x + w, y + h / 2.0),
			Side::Bottom => (x + w / 2.0, y + h),
			Side::Left => (x, y + h / 2.0),
		}
	}

	pub fn label_lines(&self) -> impl Iterator<Item = &str> {
		self.label.split('\n')
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeCurve {
	#[default]
	Bezier,
	SmoothStep,
	Step,
	Straight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: String,
	pub stroke_width: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			stroke: "#b1b1b7".into(),
			stroke_width: 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub animated: bool,
	pub style: EdgeStyle,
	pub curve: EdgeCurve,
	/// Draw an arrowhead at the target end.
	pub marker_end: bool,
}

impl FlowEdge {
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			animated: false,
			style: EdgeStyle::default(),
			curve: EdgeCurve::default(),
			marker_end: false,
		}
	}

	pub fn animated(mut self, animated: bool) -> Self {
		self.animated = animated;
		self
	}

	pub fn with_stroke(mut self, stroke: impl Into<String>, width: f64) -> Self {
		self.style = EdgeStyle {
			stroke: stroke.into(),
			stroke_width: width,
		};
		self
	}

	pub fn with_curve(mut self, curve: EdgeCurve) -> Self {
		self.curve = curve;
		self
	}
}

/// A finished connect gesture, from one node handle to another.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
	pub source: String,
	pub source_side: Side,
	pub target: String,
	pub target_side: Side,
}

/// Appends an edge for `connection`. Duplicates and cycles are not checked.
pub fn add_edge(connection: &Connection, seq: u64, edges: &mut Vec<FlowEdge>) {
	edges.push(FlowEdge::new(
		format!("edge-{}-{}-{}", connection.source, connection.target, seq),
		connection.source.clone(),
		connection.target.clone(),
	));
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowData {
	pub nodes: Vec<FlowNode>,
	pub edges: Vec<FlowEdge>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn handle_points_sit_on_node_border() {
		let node = FlowNode::new("a", "A", Position::new(10.0, 20.0));
		assert_eq!(node.handle_point(Side::Top), (85.0, 20.0));
		assert_eq!(node.handle_point(Side::Bottom), (85.0, 60.0));
		assert_eq!(node.handle_point(Side::Left), (10.0, 40.0));
		assert_eq!(node.handle_point(Side::Right), (160.0, 40.0));
	}

	#[test]
	fn add_edge_does_not_dedup() {
		let conn = Connection {
			source: "a".into(),
			source_side: Side::Bottom,
			target: "b".into(),
			target_side: Side::Top,
		};
		let mut edges = Vec::new();
		add_edge(&conn, 0, &mut edges);
		add_edge(&conn, 1, &mut edges);
		assert_eq!(edges.len(), 2);
		assert_ne!(edges[0].id, edges[1].id);
		assert_eq!(edges[1].source, "a");
		assert_eq!(edges[1].target, "b");
	}

	#[test]
	fn edges_have_no_arrowhead_unless_requested() {
		assert!(!FlowEdge::new("ab", "a", "b").marker_end);

		let mut edges = Vec::new();
		let conn = Connection {
			source: "a".into(),
			source_side: Side::Bottom,
			target: "b".into(),
			target_side: Side::Top,
		};
		add_edge(&conn, 0, &mut edges);
		assert!(!edges[0].marker_end);
	}

	#[test]
	fn label_splits_on_newlines() {
		let node = FlowNode::new("a", "Goal\n(Month 1-2)", Position::default());
		assert_eq!(node.label_lines().collect::<Vec<_>>(), ["Goal", "(Month 1-2)"]);
	}

	#[test]
	fn input_and_output_nodes_expose_one_handle() {
		assert!(!NodeKind::Input.has_target_handle());
		assert!(NodeKind::Input.has_source_handle());
		assert!(!NodeKind::Output.has_source_handle());
		assert!(NodeKind::Default.has_source_handle() && NodeKind::Default.has_target_handle());
	}
}
