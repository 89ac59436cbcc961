//! Graph configuration read from the host page.
//!
//! Every section is optional; missing keys take their defaults.
//!
//! ```json
//! {
//!   "layout": { "direction": "LR", "node_size": { "width": 180, "height": 60 } },
//!   "compile": { "methods": ["GET", "POST"] },
//!   "theme": { "name": "paper", "color_by_cluster": true }
//! }
//! ```

use serde::Deserialize;

use super::compiler::CompileOptions;
use super::layout::LayoutConfig;
use super::theme::ThemeConfig;

/// Complete graph configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Node size, direction and separations.
	pub layout: LayoutConfig,
	/// Which methods become operation nodes.
	pub compile: CompileOptions,
	/// Theme name and cluster coloring.
	pub theme: ThemeConfig,
}

impl GraphConfig {
	/// Decode a configuration from JSON text.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}
