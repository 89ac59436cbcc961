//! Canvas rendering for the API graph.
//!
//! Rendering uses two passes in world space after the background:
//! 1. Edges (lines, arrowheads, labels)
//! 2. Node boxes with labels and collapse toggles

use std::borrow::Cow;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::session::{PlacedNode, Scene};
use super::state::ViewState;
use super::theme::{Color, Theme};
use super::types::{GraphEdge, NodeKind, Relation};

/// Arrowhead length in world units.
const ARROW_SIZE: f64 = 8.0;
/// Edge labels are hidden below this zoom level.
const EDGE_LABEL_MIN_K: f64 = 0.5;
/// Width reserved on the right of a node for the toggle glyph.
const TOGGLE_WIDTH: f64 = 22.0;
/// Characters per label line before truncation.
const MAX_LABEL_CHARS: usize = 22;

/// Renders the complete scene to the canvas.
pub fn render(view: &ViewState, scene: &Scene, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	draw_background(view, ctx, theme);

	ctx.save();
	let _ = ctx.translate(view.transform.x, view.transform.y);
	let _ = ctx.scale(view.transform.k, view.transform.k);

	for edge in &scene.edges {
		draw_edge(scene, edge, ctx, theme, view.transform.k);
	}
	for placed in &scene.nodes {
		let hovered = view.hovered.as_deref() == Some(placed.node.id.as_str());
		draw_node(placed, hovered, ctx, theme, view.transform.k);
	}

	ctx.restore();
}

fn draw_background(view: &ViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		let Ok(gradient) = ctx.create_radial_gradient(
			view.width / 2.0,
			view.height / 2.0,
			0.0,
			view.width / 2.0,
			view.height / 2.0,
			view.width.max(view.height) * 0.8,
		) else {
			return;
		};
		let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
		let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, view.width, view.height);
}

/// Point where the segment from `placed`'s center toward `(tx, ty)` leaves
/// its box.
pub fn box_anchor(placed: &PlacedNode, tx: f64, ty: f64) -> (f64, f64) {
	let center = placed.center();
	let (dx, dy) = (tx - center.x, ty - center.y);
	if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
		return (center.x, center.y);
	}
	let (half_w, half_h) = (placed.size.width / 2.0, placed.size.height / 2.0);
	let scale_x = if dx.abs() > f64::EPSILON { half_w / dx.abs() } else { f64::INFINITY };
	let scale_y = if dy.abs() > f64::EPSILON { half_h / dy.abs() } else { f64::INFINITY };
	let t = scale_x.min(scale_y);
	(center.x + dx * t, center.y + dy * t)
}

fn draw_edge(
	scene: &Scene,
	edge: &GraphEdge,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	k: f64,
) {
	let (Some(source), Some(target)) = (scene.node(&edge.source), scene.node(&edge.target)) else {
		return;
	};
	let (sc, tc) = (source.center(), target.center());
	let (x1, y1) = box_anchor(source, tc.x, tc.y);
	let (x2, y2) = box_anchor(target, sc.x, sc.y);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	let method = match &target.node.kind {
		NodeKind::Operation { method, .. } => Some(*method),
		_ => None,
	};
	let color = theme.edge_color(&edge.relation, method);

	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(theme.edge.line_width);
	// Payload edges are dashed to set them apart from the path tree.
	if matches!(edge.relation, Relation::Consumes | Relation::Produces { .. }) {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(6.0),
			&JsValue::from_f64(4.0),
		));
	}
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2 - ux * ARROW_SIZE, y2 - uy * ARROW_SIZE);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	let (back_x, back_y) = (x2 - ux * ARROW_SIZE, y2 - uy * ARROW_SIZE);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	ctx.set_fill_style_str(&color.to_css());
	ctx.begin_path();
	ctx.move_to(x2, y2);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();

	if let Some(label) = &edge.label {
		if k >= EDGE_LABEL_MIN_K && !edge.relation.is_hierarchical() {
			ctx.set_fill_style_str(&theme.edge.label.to_css());
			ctx.set_font("10px sans-serif");
			ctx.set_text_align("center");
			ctx.set_text_baseline("bottom");
			let _ = ctx.fill_text(label, (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 2.0);
		}
	}
}

fn draw_node(
	placed: &PlacedNode,
	hovered: bool,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	k: f64,
) {
	let (x, y) = (placed.position.x, placed.position.y);
	let (w, h) = (placed.size.width, placed.size.height);
	let fill = theme.node_fill(&placed.node, placed.cluster);

	ctx.set_fill_style_str(&fill.to_css());
	ctx.begin_path();
	ctx.rect(x, y, w, h);
	ctx.fill();

	let (border, border_width) = if hovered {
		(theme.node.hover_color, 2.0)
	} else {
		(theme.node.border_color, 1.0)
	};
	ctx.set_stroke_style_str(&border.to_css());
	ctx.set_line_width(border_width / k.max(0.5));
	ctx.stroke_rect(x, y, w, h);

	let text = theme.text_on(fill);
	let toggleable = placed.node.is_toggleable();
	let text_width = if toggleable { w - TOGGLE_WIDTH } else { w };
	let subtitle = subtitle(placed);

	ctx.set_fill_style_str(&text.to_css());
	ctx.set_font(theme.node.font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let title_y = if subtitle.is_some() { y + h * 0.38 } else { y + h / 2.0 };
	let _ = ctx.fill_text(
		&truncate_label(&placed.node.label, MAX_LABEL_CHARS),
		x + text_width / 2.0,
		title_y,
	);

	if let Some(subtitle) = subtitle {
		ctx.set_fill_style_str(&text.with_alpha(0.75).to_css());
		ctx.set_font("10px sans-serif");
		let _ = ctx.fill_text(
			&truncate_label(&subtitle, MAX_LABEL_CHARS + 6),
			x + text_width / 2.0,
			y + h * 0.7,
		);
	}

	if toggleable {
		draw_toggle(ctx, text, x + w - TOGGLE_WIDTH / 2.0, y + h / 2.0, placed.collapsed);
	}
}

/// Draws `+` for collapsed nodes and `−` for expanded ones.
fn draw_toggle(ctx: &CanvasRenderingContext2d, color: Color, cx: f64, cy: f64, collapsed: bool) {
	let arm = 4.5;
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(2.0);
	ctx.begin_path();
	ctx.move_to(cx - arm, cy);
	ctx.line_to(cx + arm, cy);
	if collapsed {
		ctx.move_to(cx, cy - arm);
		ctx.line_to(cx, cy + arm);
	}
	ctx.stroke();
}

/// Second label line: operation summary or schema property count.
fn subtitle(placed: &PlacedNode) -> Option<String> {
	match &placed.node.kind {
		NodeKind::Operation {
			summary: Some(summary),
			..
		} if !summary.is_empty() => Some(summary.clone()),
		NodeKind::PayloadSchema { properties, .. } => Some(match properties.len() {
			1 => "1 property".to_string(),
			n => format!("{n} properties"),
		}),
		_ => None,
	}
}

/// Shortens `text` to at most `max` characters, ending with an ellipsis.
pub fn truncate_label(text: &str, max: usize) -> Cow<'_, str> {
	if text.chars().count() <= max {
		return Cow::Borrowed(text);
	}
	let kept: String = text.chars().take(max.saturating_sub(1)).collect();
	Cow::Owned(format!("{kept}…"))
}
