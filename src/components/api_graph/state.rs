//! View state for the canvas: pan/zoom transform, hover and hit testing.

use super::session::{PlacedNode, Scene};

/// Padding kept around the graph when fitting it to the canvas.
const FIT_MARGIN: f64 = 40.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal screen offset of the layout origin.
	pub x: f64,
	/// Vertical screen offset of the layout origin.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
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

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	/// Pointer position when the pan started.
	pub start_x: f64,
	pub start_y: f64,
	/// Transform offset when the pan started.
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Canvas-side state that is independent of the graph itself.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
	pub transform: ViewTransform,
	pub pan: PanState,
	/// Canvas size in CSS pixels.
	pub width: f64,
	pub height: f64,
	/// Id of the node under the pointer.
	pub hovered: Option<String>,
	/// Session revision the transform was last fitted to.
	fitted_revision: Option<u64>,
}

impl ViewState {
	/// Identity transform on a `width` x `height` canvas.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	/// Converts a canvas point to layout space.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under the screen point, if any.
	pub fn node_at_position<'a>(&self, scene: &'a Scene, sx: f64, sy: f64) -> Option<&'a PlacedNode> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		scene.nodes.iter().rev().find(|placed| placed.contains(gx, gy))
	}

	/// Zooms by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Begins a pan at the screen point `(sx, sy)`.
	pub fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Moves the view so the pan origin follows the pointer.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Stops panning; later moves only update hover.
	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Records a new canvas size. The transform is kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Fits `scene` into the canvas when it changed since the last fit.
	///
	/// Zoom never exceeds 100%, so small graphs keep their natural size and
	/// are centered instead. Returns whether the transform changed.
	pub fn fit_if_changed(&mut self, scene: &Scene, revision: u64) -> bool {
		if self.fitted_revision == Some(revision) {
			return false;
		}
		self.fitted_revision = Some(revision);
		let Some((min, max)) = scene.bounds() else {
			self.transform = ViewTransform::default();
			return true;
		};

		let (graph_w, graph_h) = (max.x - min.x, max.y - min.y);
		let available_w = (self.width - 2.0 * FIT_MARGIN).max(1.0);
		let available_h = (self.height - 2.0 * FIT_MARGIN).max(1.0);
		let k = (available_w / graph_w.max(1.0))
			.min(available_h / graph_h.max(1.0))
			.clamp(0.1, 1.0);

		self.transform = ViewTransform {
			x: (self.width - graph_w * k) / 2.0 - min.x * k,
			y: (self.height - graph_h * k) / 2.0 - min.y * k,
			k,
		};
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::api_graph::layout::{NodeSize, Position};
	use crate::components::api_graph::types::{GraphNode, NodeKind};

	fn placed(id: &str, x: f64, y: f64) -> PlacedNode {
		PlacedNode {
			node: GraphNode {
				id: id.into(),
				kind: NodeKind::PayloadSchema {
					name: id.into(),
					properties: vec![],
				},
				label: id.into(),
				tooltip: String::new(),
				group: None,
			},
			position: Position::new(x, y),
			size: NodeSize {
				width: 100.0,
				height: 50.0,
			},
			collapsed: false,
			cluster: None,
		}
	}

	fn scene() -> Scene {
		Scene {
			nodes: vec![placed("a", 0.0, 0.0), placed("b", 200.0, 0.0)],
			edges: vec![],
		}
	}

	#[test]
	fn hit_testing_respects_the_transform() {
		let mut view = ViewState::new(800.0, 600.0);
		view.transform = ViewTransform {
			x: 10.0,
			y: 20.0,
			k: 2.0,
		};
		let scene = scene();

		assert_eq!(view.node_at_position(&scene, 12.0, 22.0).map(|p| p.node.id.as_str()), Some("a"));
		assert_eq!(view.node_at_position(&scene, 410.0, 30.0).map(|p| p.node.id.as_str()), Some("b"));
		assert!(view.node_at_position(&scene, 300.0, 30.0).is_none());
	}

	#[test]
	fn zoom_keeps_the_anchor_point_fixed() {
		let mut view = ViewState::new(800.0, 600.0);
		let before = view.screen_to_graph(100.0, 100.0);
		view.zoom_at(100.0, 100.0, 1.1);
		let after = view.screen_to_graph(100.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);

		for _ in 0..100 {
			view.zoom_at(0.0, 0.0, 0.5);
		}
		assert_eq!(view.transform.k, 0.1);
	}

	#[test]
	fn panning_moves_relative_to_the_start() {
		let mut view = ViewState::new(800.0, 600.0);
		view.start_pan(100.0, 100.0);
		view.pan_to(130.0, 90.0);
		assert_eq!((view.transform.x, view.transform.y), (30.0, -10.0));
		view.end_pan();
		view.pan_to(500.0, 500.0);
		assert_eq!((view.transform.x, view.transform.y), (30.0, -10.0));
	}

	#[test]
	fn fitting_centers_small_graphs_once_per_revision() {
		let mut view = ViewState::new(800.0, 600.0);
		assert!(view.fit_if_changed(&scene(), 1));
		assert_eq!(view.transform.k, 1.0);
		assert_eq!(view.transform.x, (800.0 - 300.0) / 2.0);
		assert_eq!(view.transform.y, (600.0 - 50.0) / 2.0);

		view.transform.x = 0.0;
		assert!(!view.fit_if_changed(&scene(), 1));
		assert_eq!(view.transform.x, 0.0);
	}

	#[test]
	fn fitting_shrinks_wide_graphs() {
		let mut view = ViewState::new(400.0, 300.0);
		let wide = Scene {
			nodes: vec![placed("a", 0.0, 0.0), placed("b", 1900.0, 0.0)],
			edges: vec![],
		};
		view.fit_if_changed(&wide, 1);
		assert!(view.transform.k < 1.0);
		assert!(view.transform.k * 2000.0 <= 400.0 - 80.0 + 1e-9);
	}
}
