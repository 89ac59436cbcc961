//! api-graph: Interactive, collapsible graph visualization for OpenAPI documents.
//!
//! This crate compiles an API document into a graph of path segments,
//! operations and payload schemas, derives the visible subgraph from per-node
//! collapse state, lays it out in layers and renders it on a canvas.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

/// UI components.
pub mod components;

pub use components::api_graph::{
	ApiGraph, ApiGraphCanvas, CollapseState, GraphConfig, GraphEdge, GraphNode, GraphSession,
	HttpMethod, SpecDocument, VisibleSubgraph, compile, compute_visible,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("api-graph: logging initialized");
}

/// Text content of the `<script>` element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the API document from a script element with id="spec-data".
/// Expected format: OpenAPI JSON with `paths` and optional `components.schemas`.
fn load_spec_document() -> Option<SpecDocument> {
	let json_text = script_text("spec-data")?;

	match SpecDocument::from_json(&json_text) {
		Ok(doc) => {
			info!(
				"api-graph: loaded {} paths, {} schemas",
				doc.paths.len(),
				doc.components.schemas.len()
			);
			Some(doc)
		}
		Err(e) => {
			warn!("api-graph: failed to parse API document: {}", e);
			None
		}
	}
}

/// Load optional settings from a script element with id="graph-config".
fn load_config() -> GraphConfig {
	let Some(json_text) = script_text("graph-config") else {
		return GraphConfig::default();
	};

	GraphConfig::from_json(&json_text).unwrap_or_else(|e| {
		warn!("api-graph: failed to parse graph config, using defaults: {}", e);
		GraphConfig::default()
	})
}

/// Main application component.
/// Loads the API document from DOM and renders the collapsible graph with a
/// method filter and a reset control.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let document = load_spec_document().unwrap_or_default();
	let document_signal = Signal::derive(move || document.clone());
	let config = load_config();
	let methods = RwSignal::new(config.compile.methods.clone());
	let reset = RwSignal::new(0u32);

	let method_toggles = HttpMethod::ALL
		.into_iter()
		.map(|method| {
			view! {
				<label class="method-toggle">
					<input
						type="checkbox"
						prop:checked=move || methods.with(|selected| selected.contains(&method))
						on:change=move |_| {
							methods.update(|selected| {
								if !selected.remove(&method) {
									selected.insert(method);
								}
							})
						}
					/>
					{method.as_str()}
				</label>
			}
		})
		.collect_view();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="API Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ApiGraphCanvas
				document=document_signal
				config=config
				methods=methods
				reset=reset
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"API Graph"</h1>
				<p class="subtitle">"Click a path to expand or collapse it. Scroll to zoom. Drag background to pan."</p>
				<div class="method-filter">
					{method_toggles}
					<button on:click=move |_| reset.update(|n| *n += 1)>"Reset view"</button>
				</div>
			</div>
		</div>
	}
}
