//! Visual theming for the API graph.
//!
//! Provides colors per node kind, HTTP method and edge relation, plus a
//! cluster palette for coloring by top-level path.

use log::warn;
use serde::Deserialize;

use super::document::HttpMethod;
use super::types::{GraphNode, NodeKind, Relation};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color from its red, green and blue channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with an explicit alpha in `0.0..=1.0`.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same channels, new alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Perceived brightness in `0.0..=1.0`, used to pick label contrast.
	pub fn luminance(self) -> f64 {
		(0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
	}

	/// CSS color string: `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Per-method badge colors. Unknown methods use `fallback`.
#[derive(Clone, Debug)]
pub struct MethodColors {
	/// `GET`
	pub get: Color,
	/// `POST`
	pub post: Color,
	/// `PUT`
	pub put: Color,
	/// `DELETE`
	pub delete: Color,
	/// `PATCH`
	pub patch: Color,
	/// `OPTIONS`, `HEAD` and `TRACE`
	pub fallback: Color,
}

impl MethodColors {
	/// Badge color for `method`.
	pub fn get(&self, method: HttpMethod) -> Color {
		match method {
			HttpMethod::Get => self.get,
			HttpMethod::Post => self.post,
			HttpMethod::Put => self.put,
			HttpMethod::Delete => self.delete,
			HttpMethod::Patch => self.patch,
			HttpMethod::Options | HttpMethod::Head | HttpMethod::Trace => self.fallback,
		}
	}
}

impl Default for MethodColors {
	fn default() -> Self {
		Self {
			get: Color::rgb(76, 175, 80),     // #4CAF50
			post: Color::rgb(255, 152, 0),    // #FF9800
			put: Color::rgb(33, 150, 243),    // #2196F3
			delete: Color::rgb(244, 67, 54),  // #F44336
			patch: Color::rgb(156, 39, 176),  // #9C27B0
			fallback: Color::rgb(96, 125, 139), // #607D8B
		}
	}
}

/// A curated color palette for top-level clusters.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Cluster colors, assigned in order and reused once exhausted.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Neutral slate used when a palette has no colors.
	pub const FALLBACK: Color = Color::rgb(96, 125, 139);

	/// Muted, harmonious palette - slate blues and teals (default)
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}

	/// Soft pastel palette - gentle, pleasing colors
	pub fn pastel() -> Self {
		Self {
			colors: vec![
				Color::rgb(200, 180, 190), // Dusty rose
				Color::rgb(180, 195, 205), // Powder blue
				Color::rgb(190, 200, 180), // Sage
				Color::rgb(205, 195, 180), // Cream
				Color::rgb(185, 190, 200), // Lavender gray
				Color::rgb(195, 185, 175), // Mushroom
				Color::rgb(180, 200, 195), // Seafoam
				Color::rgb(200, 190, 185), // Blush
			],
		}
	}

	/// Color for cluster `index`, cycling through the palette. An empty
	/// palette yields [`NodePalette::FALLBACK`].
	pub fn get(&self, index: usize) -> Color {
		if self.colors.is_empty() {
			return Self::FALLBACK;
		}
		self.colors[index % self.colors.len()]
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Edge visual style, one color per relation.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Path segment to child segment
	pub hierarchy: Color,
	/// Operation to request body schema
	pub consumes: Color,
	/// Operation to response schema
	pub produces: Color,
	/// Edge label text
	pub label: Color,
	/// Line width in world units
	pub line_width: f64,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Fill for literal path segments
	pub path: Color,
	/// Fill for `{parameter}` segments
	pub parameter: Color,
	/// Fill for payload schemas
	pub schema: Color,
	/// Fill for operations
	pub methods: MethodColors,
	/// Label color on light fills
	pub text_dark: Color,
	/// Label color on dark fills
	pub text_light: Color,
	/// Border drawn around every other node
	pub border_color: Color,
	/// Border drawn around the hovered node
	pub hover_color: Color,
	/// Label font (CSS shorthand)
	pub font: &'static str,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Name accepted by [`Theme::by_name`]
	pub name: &'static str,
	/// Canvas background.
	pub background: BackgroundStyle,
	/// Edge colors and width.
	pub edge: EdgeStyle,
	/// Node fills, borders and fonts.
	pub node: NodeStyle,
	/// Cluster colors, used when `color_by_cluster` is set
	pub palette: NodePalette,
	/// Color path and operation nodes by top-level cluster instead of kind.
	pub color_by_cluster: bool,
}

impl Theme {
	/// Dark theme with kind-based node colors (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			edge: EdgeStyle {
				hierarchy: Color::rgba(140, 160, 180, 0.6),
				consumes: Color::rgb(255, 183, 77),
				produces: Color::rgb(100, 181, 246),
				label: Color::rgba(220, 225, 230, 0.85),
				line_width: 1.5,
			},
			node: NodeStyle {
				path: Color::rgb(94, 129, 172),
				parameter: Color::rgb(130, 120, 150),
				schema: Color::rgb(185, 145, 110),
				methods: MethodColors::default(),
				text_dark: Color::rgb(22, 27, 34),
				text_light: Color::rgb(240, 242, 245),
				border_color: Color::rgba(255, 255, 255, 0.15),
				hover_color: Color::rgb(255, 255, 255),
				font: "13px sans-serif",
			},
			palette: NodePalette::slate(),
			color_by_cluster: false,
		}
	}

	/// Light theme in the classic Material palette
	pub fn paper() -> Self {
		Self {
			name: "paper",
			background: BackgroundStyle {
				color: Color::rgb(250, 250, 250),
				color_secondary: Color::rgb(250, 250, 250),
				use_gradient: false,
			},
			edge: EdgeStyle {
				hierarchy: Color::rgb(153, 153, 153), // #999
				consumes: Color::rgb(255, 183, 77),   // #FFB74D
				produces: Color::rgb(100, 181, 246),  // #64B5F6
				label: Color::rgb(66, 66, 66),
				line_width: 1.0,
			},
			node: NodeStyle {
				path: Color::rgb(187, 222, 251),      // #BBDEFB
				parameter: Color::rgb(225, 190, 231), // #E1BEE7
				schema: Color::rgb(255, 213, 79),     // #FFD54F
				methods: MethodColors::default(),
				text_dark: Color::rgb(0, 0, 0),
				text_light: Color::rgb(255, 255, 255),
				border_color: Color::rgb(0, 0, 0),
				hover_color: Color::rgb(33, 33, 33),
				font: "13px sans-serif",
			},
			palette: NodePalette::pastel(),
			color_by_cluster: false,
		}
	}

	/// Looks a theme up by name.
	pub fn by_name(name: &str) -> Option<Self> {
		match name {
			"default" => Some(Self::default_theme()),
			"paper" => Some(Self::paper()),
			_ => None,
		}
	}

	/// Fill color for `node`. `cluster` is the index of the node's
	/// top-level group, if any.
	pub fn node_fill(&self, node: &GraphNode, cluster: Option<usize>) -> Color {
		let clustered = self.color_by_cluster && !matches!(node.kind, NodeKind::PayloadSchema { .. });
		if let (true, Some(index)) = (clustered, cluster) {
			let base = self.palette.get(index);
			return match node.kind {
				NodeKind::Operation { .. } => base.darken(0.25),
				_ => base,
			};
		}
		match &node.kind {
			NodeKind::PathSegment {
				parameter: true, ..
			} => self.node.parameter,
			NodeKind::PathSegment { .. } => self.node.path,
			NodeKind::Operation { method, .. } => self.node.methods.get(*method),
			NodeKind::PayloadSchema { .. } => self.node.schema,
		}
	}

	/// Label color with enough contrast against `fill`.
	pub fn text_on(&self, fill: Color) -> Color {
		if fill.luminance() > 0.6 {
			self.node.text_dark
		} else {
			self.node.text_light
		}
	}

	/// Stroke color for an edge. Invocation edges take the method color of
	/// their target operation.
	pub fn edge_color(&self, relation: &Relation, method: Option<HttpMethod>) -> Color {
		match relation {
			Relation::ParentChild => self.edge.hierarchy,
			Relation::Invokes => method
				.map(|m| self.node.methods.get(m))
				.unwrap_or(self.edge.hierarchy),
			Relation::Consumes => self.edge.consumes,
			Relation::Produces { .. } => self.edge.produces,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

/// Name-based theme selection for config files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
	/// Theme name (`default` or `paper`).
	pub name: Option<String>,
	/// Overrides the theme's `color_by_cluster`.
	pub color_by_cluster: bool,
}

impl ThemeConfig {
	/// Resolves the configured theme, falling back to the default.
	pub fn resolve(&self) -> Theme {
		let mut theme = match self.name.as_deref() {
			Some(name) => Theme::by_name(name).unwrap_or_else(|| {
				warn!("api-graph: unknown theme {name:?}, using default");
				Theme::default()
			}),
			None => Theme::default(),
		};
		theme.color_by_cluster = self.color_by_cluster;
		theme
	}
}
