use super::types::{EdgeCurve, Side};

const CURVATURE: f64 = 0.25;
const STEP_OFFSET: f64 = 20.0;

/// Geometry of a rendered edge in flow coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgePath {
	Bezier {
		from: (f64, f64),
		c1: (f64, f64),
		c2: (f64, f64),
		to: (f64, f64),
	},
	/// Orthogonal or straight segments; `radius` rounds the corners.
	Polyline { points: Vec<(f64, f64)>, radius: f64 },
}

impl EdgePath {
	/// Unit direction of the last segment, for the arrowhead.
	pub fn end_direction(&self) -> (f64, f64) {
		let (a, b) = match self {
			EdgePath::Bezier { c2, to, .. } => (*c2, *to),
			EdgePath::Polyline { points, .. } => match points.as_slice() {
				[.., a, b] => (*a, *b),
				_ => return (0.0, 1.0),
			},
		};
		let (dx, dy) = (b.0 - a.0, b.1 - a.1);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 1e-6 { (0.0, 1.0) } else { (dx / len, dy / len) }
	}
}

fn side_vector(side: Side) -> (f64, f64) {
	match side {
		Side::Top => (0.0, -1.0),
		Side::Right => (1.0, 0.0),
		Side::Bottom => (0.0, 1.0),
		Side::Left => (-1.0, 0.0),
	}
}

fn control_offset(distance: f64) -> f64 {
	if distance >= 0.0 {
		0.5 * distance
	} else {
		CURVATURE * 25.0 * (-distance).sqrt()
	}
}

fn control_point(side: Side, (x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> (f64, f64) {
	match side {
		Side::Left => (x1 - control_offset(x1 - x2), y1),
		Side::Right => (x1 + control_offset(x2 - x1), y1),
		Side::Top => (x1, y1 - control_offset(y1 - y2)),
		Side::Bottom => (x1, y1 + control_offset(y2 - y1)),
	}
}

fn is_horizontal(side: Side) -> bool {
	matches!(side, Side::Left | Side::Right)
}

fn step_points(from: (f64, f64), from_side: Side, to: (f64, f64), to_side: Side) -> Vec<(f64, f64)> {
	let (sv, tv) = (side_vector(from_side), side_vector(to_side));
	let start = (from.0 + sv.0 * STEP_OFFSET, from.1 + sv.1 * STEP_OFFSET);
	let end = (to.0 + tv.0 * STEP_OFFSET, to.1 + tv.1 * STEP_OFFSET);
	let mut points = vec![from, start];
	match (is_horizontal(from_side), is_horizontal(to_side)) {
		(false, false) => {
			let mid_y = (start.1 + end.1) / 2.0;
			points.push((start.0, mid_y));
			points.push((end.0, mid_y));
		}
		(true, true) => {
			let mid_x = (start.0 + end.0) / 2.0;
			points.push((mid_x, start.1));
			points.push((mid_x, end.1));
		}
		(false, true) => points.push((start.0, end.1)),
		(true, false) => points.push((end.0, start.1)),
	}
	points.push(end);
	points.push(to);
	points.dedup();
	points
}

pub fn edge_path(curve: EdgeCurve, from: (f64, f64), from_side: Side, to: (f64, f64), to_side: Side) -> EdgePath {
	match curve {
		EdgeCurve::Bezier => EdgePath::Bezier {
			from,
			c1: control_point(from_side, from, to),
			c2: control_point(to_side, to, from),
			to,
		},
		EdgeCurve::SmoothStep => EdgePath::Polyline {
			points: step_points(from, from_side, to, to_side),
			radius: 5.0,
		},
		EdgeCurve::Step => EdgePath::Polyline {
			points: step_points(from, from_side, to, to_side),
			radius: 0.0,
		},
		EdgeCurve::Straight => EdgePath::Polyline {
			points: vec![from, to],
			radius: 0.0,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vertical_bezier_bends_along_handle_sides() {
		let path = edge_path(EdgeCurve::Bezier, (0.0, 0.0), Side::Bottom, (100.0, 200.0), Side::Top);
		let EdgePath::Bezier { c1, c2, .. } = path else {
			panic!("expected bezier");
		};
		assert_eq!(c1, (0.0, 100.0));
		assert_eq!(c2, (100.0, 100.0));
	}

	#[test]
	fn step_path_is_orthogonal() {
		let path = edge_path(EdgeCurve::Step, (0.0, 0.0), Side::Bottom, (100.0, 200.0), Side::Top);
		let EdgePath::Polyline { points, .. } = path else {
			panic!("expected polyline");
		};
		assert_eq!(points.first(), Some(&(0.0, 0.0)));
		assert_eq!(points.last(), Some(&(100.0, 200.0)));
		for pair in points.windows(2) {
			let (a, b) = (pair[0], pair[1]);
			assert!(a.0 == b.0 || a.1 == b.1, "diagonal segment {a:?} -> {b:?}");
		}
	}

	#[test]
	fn arrow_points_into_target() {
		let path = edge_path(EdgeCurve::Straight, (0.0, 0.0), Side::Right, (10.0, 0.0), Side::Left);
		assert_eq!(path.end_direction(), (1.0, 0.0));
		let bezier = edge_path(EdgeCurve::Bezier, (0.0, 0.0), Side::Bottom, (0.0, 100.0), Side::Top);
		assert_eq!(bezier.end_direction(), (0.0, 1.0));
	}
}
