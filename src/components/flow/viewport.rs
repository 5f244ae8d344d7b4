use super::types::FlowNode;

/// Screen = flow * k + (x, y).
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let (x0, y0) = (self.x.min(other.x), self.y.min(other.y));
		let x1 = (self.x + self.width).max(other.x + other.width);
		let y1 = (self.y + self.height).max(other.y + other.height);
		Rect {
			x: x0,
			y: y0,
			width: x1 - x0,
			height: y1 - y0,
		}
	}
}

/// Bounding box of all nodes in flow space, `None` for an empty slice.
pub fn nodes_bounds(nodes: &[FlowNode]) -> Option<Rect> {
	nodes
		.iter()
		.map(|n| Rect {
			x: n.position.x,
			y: n.position.y,
			width: n.width(),
			height: n.height(),
		})
		.reduce(|acc, r| acc.union(&r))
}

impl ViewTransform {
	pub fn screen_to_flow(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn flow_to_screen(&self, fx: f64, fy: f64) -> (f64, f64) {
		(fx * self.k + self.x, fy * self.k + self.y)
	}

	/// Scales by `factor` keeping the screen point (sx, sy) fixed. The
	/// resulting zoom never leaves `[min_k, max_k]`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, min_k: f64, max_k: f64) {
		let new_k = (self.k * factor).clamp(min_k, max_k);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Transform that centers `bounds` in a `width` x `height` viewport with
	/// `padding` as a fraction of the bounds size.
	pub fn fit(bounds: &Rect, width: f64, height: f64, padding: f64, min_k: f64, max_k: f64) -> Self {
		let kx = width / (bounds.width * (1.0 + padding));
		let ky = height / (bounds.height * (1.0 + padding));
		let k = kx.min(ky);
		let k = if k.is_finite() { k.clamp(min_k, max_k) } else { max_k };
		let (cx, cy) = (bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0);
		Self {
			x: width / 2.0 - cx * k,
			y: height / 2.0 - cy * k,
			k,
		}
	}

	/// Visible area in flow coordinates.
	pub fn visible_rect(&self, width: f64, height: f64) -> Rect {
		let (x, y) = self.screen_to_flow(0.0, 0.0);
		Rect {
			x,
			y,
			width: width / self.k,
			height: height / self.k,
		}
	}
}
