use super::types::{FlowNode, NodeKind};
use super::viewport::{Rect, ViewTransform, nodes_bounds};

pub const MINIMAP_WIDTH: f64 = 200.0;
pub const MINIMAP_HEIGHT: f64 = 150.0;
const MINIMAP_MARGIN: f64 = 15.0;

pub fn node_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Input => "#1976d2",
		NodeKind::Output => "#558b2f",
		NodeKind::Default => "#666",
	}
}

/// Maps a flow-space region onto the minimap panel in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct MiniMapProjection {
	/// Panel rectangle on screen.
	pub panel: Rect,
	/// Flow region shown by the panel.
	pub area: Rect,
	pub scale: f64,
	offset_x: f64,
	offset_y: f64,
}

impl MiniMapProjection {
	/// Panel anchored in the bottom-right corner of a `width` x `height` canvas,
	/// showing every node plus the current viewport.
	pub fn new(nodes: &[FlowNode], transform: &ViewTransform, width: f64, height: f64) -> Self {
		let panel = Rect {
			x: width - MINIMAP_WIDTH - MINIMAP_MARGIN,
			y: height - MINIMAP_HEIGHT - MINIMAP_MARGIN,
			width: MINIMAP_WIDTH,
			height: MINIMAP_HEIGHT,
		};
		let view = transform.visible_rect(width, height);
		let area = nodes_bounds(nodes).map_or(view, |b| b.union(&view));
		let scale = (MINIMAP_WIDTH / area.width).min(MINIMAP_HEIGHT / area.height);
		let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
		let offset_x = panel.x + (MINIMAP_WIDTH - area.width * scale) / 2.0 - area.x * scale;
		let offset_y = panel.y + (MINIMAP_HEIGHT - area.height * scale) / 2.0 - area.y * scale;
		Self {
			panel,
			area,
			scale,
			offset_x,
			offset_y,
		}
	}

	pub fn project(&self, r: &Rect) -> Rect {
		Rect {
			x: r.x * self.scale + self.offset_x,
			y: r.y * self.scale + self.offset_y,
			width: r.width * self.scale,
			height: r.height * self.scale,
		}
	}

	/// Flow coordinate under a screen point inside the panel.
	pub fn unproject(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.offset_x) / self.scale, (sy - self.offset_y) / self.scale)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::types::Position;

	#[test]
	fn colors_follow_node_role() {
		assert_eq!(node_color(NodeKind::Input), "#1976d2");
		assert_eq!(node_color(NodeKind::Output), "#558b2f");
		assert_eq!(node_color(NodeKind::Default), "#666");
	}

	#[test]
	fn projected_nodes_stay_inside_panel() {
		let nodes = vec![
			FlowNode::new("a", "A", Position::new(0.0, 0.0)),
			FlowNode::new("b", "B", Position::new(2000.0, 900.0)),
		];
		let t = ViewTransform::default();
		let map = MiniMapProjection::new(&nodes, &t, 800.0, 600.0);
		for node in &nodes {
			let r = map.project(&Rect {
				x: node.position.x,
				y: node.position.y,
				width: node.width(),
				height: node.height(),
			});
			assert!(r.x >= map.panel.x - 1e-9);
			assert!(r.y >= map.panel.y - 1e-9);
			assert!(r.x + r.width <= map.panel.x + map.panel.width + 1e-9);
			assert!(r.y + r.height <= map.panel.y + map.panel.height + 1e-9);
		}
	}

	#[test]
	fn unproject_inverts_project() {
		let nodes = vec![FlowNode::new("a", "A", Position::new(40.0, 60.0))];
		let map = MiniMapProjection::new(&nodes, &ViewTransform::default(), 800.0, 600.0);
		let r = map.project(&Rect {
			x: 40.0,
			y: 60.0,
			width: 0.0,
			height: 0.0,
		});
		let (fx, fy) = map.unproject(r.x, r.y);
		assert!((fx - 40.0).abs() < 1e-9);
		assert!((fy - 60.0).abs() < 1e-9);
	}
}
