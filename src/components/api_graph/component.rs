//! Leptos component wrapping the API graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for collapse toggles, panning, and zooming. A `requestAnimationFrame`
//! loop redraws the current scene each frame and refits the view whenever the
//! session recomputes its layout.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::document::{HttpMethod, SpecDocument};
use super::layered::DagreLayout;
use super::layout::LayoutAdapter;
use super::render;
use super::session::GraphSession;
use super::state::ViewState;
use super::theme::Theme;

/// Bundles the graph session with view state and theme.
struct GraphContext {
	session: GraphSession<DagreLayout>,
	view: ViewState,
	theme: Theme,
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Pointer position relative to the canvas's top-left corner.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive, collapsible graph of an API document on a canvas.
///
/// Pass the document via the reactive `document` signal; every change
/// recompiles the graph while keeping collapse choices for ids that still
/// exist. Path nodes with children or operations toggle on click.
///
/// `methods` drives the HTTP method filter and overrides the configured one.
/// Every change of `reset` returns to the default collapse view.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ApiGraphCanvas(
	#[prop(into)] document: Signal<SpecDocument>,
	#[prop(optional)] config: GraphConfig,
	#[prop(optional, into)] methods: Option<Signal<BTreeSet<HttpMethod>>>,
	#[prop(optional, into)] reset: Option<Signal<u32>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("api-graph: canvas 2d context unavailable");
			return;
		};

		let mut options = config.compile.clone();
		if let Some(methods) = methods {
			options.methods = methods.get_untracked();
		}
		let session = GraphSession::new(
			document.get_untracked(),
			options,
			LayoutAdapter::new(DagreLayout, config.layout.clone()),
		);
		info!(
			"api-graph: {} nodes compiled, {} visible",
			session.graph().nodes.len(),
			session.visible().nodes.len()
		);
		*context_init.borrow_mut() = Some(GraphContext {
			session,
			view: ViewState::new(w, h),
			theme: config.theme.resolve(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.view.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let revision = c.session.revision();
				c.view.fit_if_changed(c.session.scene(), revision);
				render::render(&c.view, c.session.scene(), &ctx, &c.theme);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), &*animate_inner.borrow()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_doc = context.clone();
	Effect::new(move |prev: Option<()>| {
		let next = document.get();
		if prev.is_none() {
			return;
		}
		if let Some(ref mut c) = *context_doc.borrow_mut() {
			c.session.replace_document(next);
		}
	});

	if let Some(methods) = methods {
		let context_methods = context.clone();
		Effect::new(move |_| {
			let selected = methods.get();
			if let Some(ref mut c) = *context_methods.borrow_mut() {
				c.session.set_methods(selected);
			}
		});
	}

	if let Some(reset) = reset {
		let context_reset = context.clone();
		Effect::new(move |prev: Option<()>| {
			reset.track();
			if prev.is_none() {
				return;
			}
			if let Some(ref mut c) = *context_reset.borrow_mut() {
				c.session.reset_collapse();
			}
		});
	}

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut c) = *context_md.borrow_mut() {
			let target = c
				.view
				.node_at_position(c.session.scene(), x, y)
				.filter(|placed| placed.node.is_toggleable())
				.map(|placed| placed.node.id.clone());
			match target {
				Some(id) => {
					c.session.toggle(&id);
				}
				None => c.view.start_pan(x, y),
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.view.pan.active {
				c.view.pan_to(x, y);
				return;
			}
			let hovered = c.view.node_at_position(c.session.scene(), x, y);
			let tooltip = hovered.map(|placed| placed.node.tooltip.clone()).unwrap_or_default();
			let toggleable = hovered.is_some_and(|placed| placed.node.is_toggleable());
			let hovered_id = hovered.map(|placed| placed.node.id.clone());
			if hovered_id != c.view.hovered {
				if let Some(canvas) = canvas_ref.get() {
					let canvas: HtmlCanvasElement = canvas.into();
					canvas.set_title(&tooltip);
					let cursor = if toggleable { "pointer" } else { "grab" };
					let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
				}
				c.view.hovered = hovered_id;
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.view.end_pan();
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.view.end_pan();
			c.view.hovered = None;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.view.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="api-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
