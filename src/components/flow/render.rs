use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule};

use super::minimap::node_color;
use super::path::{EdgePath, edge_path};
use super::state::{FlowState, HANDLE_RADIUS};
use super::types::FlowNode;
use super::viewport::Rect;

const CANVAS_BACKGROUND: &str = "#f9fafb";
const HANDLE_FILL: &str = "#1a192b";
const CONNECTION_STROKE: &str = "#b1b1b7";
const ARROW_SIZE: f64 = 8.0;
const DASH: f64 = 5.0;

pub fn render(state: &FlowState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(CANVAS_BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_background(state, ctx);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_connection_line(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();

	draw_minimap(state, ctx);
}

fn draw_background(state: &FlowState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let gap = state.options.background_gap * k;
	if gap < 2.0 {
		return;
	}
	let size = (state.options.background_dot_size * k).max(0.5);
	let (ox, oy) = (state.transform.x.rem_euclid(gap), state.transform.y.rem_euclid(gap));
	ctx.set_fill_style_str(&state.options.background_color);
	let mut x = ox;
	while x < state.width {
		let mut y = oy;
		while y < state.height {
			ctx.fill_rect(x - size / 2.0, y - size / 2.0, size, size);
			y += gap;
		}
		x += gap;
	}
}

fn trace_path(ctx: &CanvasRenderingContext2d, path: &EdgePath) {
	ctx.begin_path();
	match path {
		EdgePath::Bezier { from, c1, c2, to } => {
			ctx.move_to(from.0, from.1);
			ctx.bezier_curve_to(c1.0, c1.1, c2.0, c2.1, to.0, to.1);
		}
		EdgePath::Polyline { points, radius } => {
			let Some((first, rest)) = points.split_first() else {
				return;
			};
			ctx.move_to(first.0, first.1);
			for (i, p) in rest.iter().enumerate() {
				match rest.get(i + 1) {
					Some(next) if *radius > 0.0 => {
						let _ = ctx.arc_to(p.0, p.1, next.0, next.1, *radius);
					}
					_ => ctx.line_to(p.0, p.1),
				}
			}
		}
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: (f64, f64), (ux, uy): (f64, f64)) {
	let (back_x, back_y) = (tip.0 - ux * ARROW_SIZE, tip.1 - uy * ARROW_SIZE);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edges(state: &FlowState, ctx: &CanvasRenderingContext2d) {
	let dash_offset = -(state.flow_time * 30.0) % (DASH * 2.0);

	for (src, tgt, edge) in state.resolved_edges() {
		let (source, target) = (&state.nodes[src], &state.nodes[tgt]);
		let from = source.handle_point(source.source_position);
		let to = target.handle_point(target.target_position);
		let path = edge_path(edge.curve, from, source.source_position, to, target.target_position);

		ctx.set_stroke_style_str(&edge.style.stroke);
		ctx.set_line_width(edge.style.stroke_width);
		if edge.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(DASH),
				&JsValue::from_f64(DASH),
			));
			ctx.set_line_dash_offset(dash_offset);
		}
		trace_path(ctx, &path);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if edge.marker_end {
			ctx.set_fill_style_str(&edge.style.stroke);
			draw_arrow(ctx, to, path.end_direction());
		}
	}
}

fn draw_connection_line(state: &FlowState, ctx: &CanvasRenderingContext2d) {
	let Some(from) = state.connect.from else {
		return;
	};
	let Some(node) = state.nodes.get(from.node_idx) else {
		return;
	};
	let (x, y) = node.handle_point(from.side);
	ctx.set_stroke_style_str(CONNECTION_STROKE);
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.move_to(x, y);
	ctx.line_to(state.connect.cursor_x, state.connect.cursor_y);
	ctx.stroke();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, r: &Rect, radius: f64) {
	let radius = radius.min(r.width / 2.0).min(r.height / 2.0);
	let (x1, y1) = (r.x + r.width, r.y + r.height);
	ctx.begin_path();
	ctx.move_to(r.x + radius, r.y);
	let _ = ctx.arc_to(x1, r.y, x1, y1, radius);
	let _ = ctx.arc_to(x1, y1, r.x, y1, radius);
	let _ = ctx.arc_to(r.x, y1, r.x, r.y, radius);
	let _ = ctx.arc_to(r.x, r.y, x1, r.y, radius);
	ctx.close_path();
}

fn node_rect(node: &FlowNode) -> Rect {
	Rect {
		x: node.position.x,
		y: node.position.y,
		width: node.width(),
		height: node.height(),
	}
}

fn draw_nodes(state: &FlowState, ctx: &CanvasRenderingContext2d) {
	for (idx, node) in state.nodes.iter().enumerate() {
		let style = &node.style;
		let hovered = state.hover == Some(idx);

		rounded_rect(ctx, &node_rect(node), style.border_radius);
		ctx.set_fill_style_str(&style.background);
		ctx.fill();
		ctx.set_stroke_style_str(&style.border_color);
		ctx.set_line_width(if hovered {
			style.border_width + 1.0
		} else {
			style.border_width
		});
		ctx.stroke();

		draw_label(ctx, node);

		for side in FlowState::handles(node) {
			let (hx, hy) = node.handle_point(side);
			ctx.begin_path();
			let _ = ctx.arc(hx, hy, HANDLE_RADIUS, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(HANDLE_FILL);
			ctx.fill();
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(1.0);
			ctx.stroke();
		}
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, node: &FlowNode) {
	let style = &node.style;
	let weight = if style.bold { "bold " } else { "" };
	ctx.set_font(&format!("{}{}px sans-serif", weight, style.font_size));
	ctx.set_fill_style_str("#222");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	let line_height = style.font_size * 1.3;
	let lines: Vec<&str> = node.label_lines().collect();
	let cx = node.position.x + node.width() / 2.0;
	let top = node.position.y + node.height() / 2.0 - line_height * (lines.len() as f64 - 1.0) / 2.0;
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, cx, top + line_height * i as f64);
	}
}

fn draw_minimap(state: &FlowState, ctx: &CanvasRenderingContext2d) {
	let map = state.minimap();
	let panel = map.panel;

	ctx.set_fill_style_str("white");
	ctx.fill_rect(panel.x, panel.y, panel.width, panel.height);

	ctx.set_line_width(state.options.minimap_stroke_width);
	for node in &state.nodes {
		let r = map.project(&node_rect(node));
		let color = node_color(node.kind);
		rounded_rect(ctx, &r, 5.0 * map.scale);
		ctx.set_fill_style_str("#e2e2e2");
		ctx.fill();
		ctx.set_stroke_style_str(color);
		ctx.stroke();
	}

	// Mask everything outside the visible area.
	let view = map.project(&state.transform.visible_rect(state.width, state.height));
	ctx.begin_path();
	ctx.rect(panel.x, panel.y, panel.width, panel.height);
	ctx.rect(view.x, view.y, view.width, view.height);
	ctx.set_fill_style_str("rgba(240, 240, 240, 0.6)");
	ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);

	ctx.set_stroke_style_str("#ccc");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(panel.x, panel.y, panel.width, panel.height);
}
