//! Decoded OpenAPI document model consumed by the graph compiler.
//!
//! Only the fragments the graph needs are modelled. Every field defaults to
//! "absent", so partial or sloppy documents still decode and simply produce
//! a smaller graph.
//!
//! Every mapping keeps the key order of the encoded document, so the graph
//! is emitted in the order the document lists paths, methods and payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// HTTP methods that can appear under a path item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `PUT`
	Put,
	/// `POST`
	Post,
	/// `DELETE`
	Delete,
	/// `OPTIONS`
	Options,
	/// `HEAD`
	Head,
	/// `PATCH`
	Patch,
	/// `TRACE`
	Trace,
}

impl HttpMethod {
	/// Every method, in the order the method filter lists them.
	pub const ALL: [HttpMethod; 8] = [
		HttpMethod::Get,
		HttpMethod::Put,
		HttpMethod::Post,
		HttpMethod::Delete,
		HttpMethod::Options,
		HttpMethod::Head,
		HttpMethod::Patch,
		HttpMethod::Trace,
	];

	/// Matches a path item key case-insensitively (`get`, `GET`, `Delete`).
	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|method| method.as_str().eq_ignore_ascii_case(key))
	}

	/// Upper-case method name, as used in node ids and labels.
	pub fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Put => "PUT",
			HttpMethod::Post => "POST",
			HttpMethod::Delete => "DELETE",
			HttpMethod::Options => "OPTIONS",
			HttpMethod::Head => "HEAD",
			HttpMethod::Patch => "PATCH",
			HttpMethod::Trace => "TRACE",
		}
	}
}

impl std::fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Root of a decoded API description.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SpecDocument {
	/// Path strings to their operations, in document order.
	#[serde(default)]
	pub paths: IndexMap<String, PathItem>,
	/// Shared definitions.
	#[serde(default)]
	pub components: Components,
}

impl SpecDocument {
	/// Decode a document from JSON text.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Looks up a schema definition by its component name.
	pub fn schema(&self, name: &str) -> Option<&SchemaDefinition> {
		self.components.schemas.get(name)
	}
}

/// Reusable document components. Only schemas matter to the graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Components {
	/// Named schemas that `$ref` pointers resolve against.
	#[serde(default)]
	pub schemas: IndexMap<String, SchemaDefinition>,
}

/// Operations available under one path string, in document order.
///
/// Method keys match case-insensitively (`get`, `GET` and `Get` are all
/// GET). Non-method keys (`parameters`, `summary`, `servers`, extensions)
/// are ignored by the decoder.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<String, serde_json::Value>")]
pub struct PathItem {
	operations: Vec<(HttpMethod, Operation)>,
}

impl TryFrom<IndexMap<String, serde_json::Value>> for PathItem {
	type Error = serde_json::Error;

	fn try_from(entries: IndexMap<String, serde_json::Value>) -> Result<Self, Self::Error> {
		let mut operations = Vec::new();
		for (key, value) in entries {
			let Some(method) = HttpMethod::from_key(&key) else {
				continue;
			};
			operations.push((method, serde_json::from_value(value)?));
		}
		Ok(Self { operations })
	}
}

impl PathItem {
	/// Returns the first operation declared for `method`, if any.
	pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
		self.operations
			.iter()
			.find(|(declared, _)| *declared == method)
			.map(|(_, operation)| operation)
	}

	/// Declared operations in document order.
	///
	/// Keys differing only in case (`get` and `GET`) are both kept.
	pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
		self.operations
			.iter()
			.map(|(method, operation)| (*method, operation))
	}

	/// Sets the operation for `method`, replacing an earlier one in place or
	/// appending it after the existing operations.
	pub fn insert(&mut self, method: HttpMethod, operation: Operation) {
		match self.operations.iter_mut().find(|(declared, _)| *declared == method) {
			Some((_, slot)) => *slot = operation,
			None => self.operations.push((method, operation)),
		}
	}

	/// Number of declared operations.
	pub fn len(&self) -> usize {
		self.operations.len()
	}

	/// Whether no operation is declared.
	pub fn is_empty(&self) -> bool {
		self.operations.is_empty()
	}
}

/// A single HTTP operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
	/// One-line summary, shown as the node subtitle.
	#[serde(default)]
	pub summary: Option<String>,
	/// Longer text, shown in tooltips.
	#[serde(default)]
	pub description: Option<String>,
	/// `operationId`, kept for tooltips.
	#[serde(default)]
	pub operation_id: Option<String>,
	/// Request payload, when the operation takes one.
	#[serde(default)]
	pub request_body: Option<RequestBody>,
	/// Keyed by status code (`"200"`, `"404"`, `"default"`).
	#[serde(default)]
	pub responses: IndexMap<String, Response>,
}

/// Request payload description.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RequestBody {
	/// Keyed by media type.
	#[serde(default)]
	pub content: IndexMap<String, MediaType>,
}

/// Response payload description for one status code.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Response {
	/// Human-readable outcome.
	#[serde(default)]
	pub description: Option<String>,
	/// Keyed by media type.
	#[serde(default)]
	pub content: IndexMap<String, MediaType>,
}

/// Payload under one media type (`application/json`, ...).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MediaType {
	/// Payload schema, usually a `$ref`.
	#[serde(default)]
	pub schema: Option<SchemaRef>,
}

/// Inline schema position that may point at a named component.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SchemaRef {
	/// JSON pointer such as `#/components/schemas/User`.
	#[serde(default, rename = "$ref")]
	pub reference: Option<String>,
	/// Element schema for array payloads.
	#[serde(default)]
	pub items: Option<Box<SchemaRef>>,
}

impl SchemaRef {
	/// Reference to a named schema, looking through one level of `items`.
	pub fn target(&self) -> Option<&str> {
		self.reference
			.as_deref()
			.or_else(|| self.items.as_ref().and_then(|items| items.reference.as_deref()))
	}
}

/// A named schema under `components.schemas`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SchemaDefinition {
	/// JSON schema `type`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Free-form description.
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	/// Properties in document order.
	pub properties: IndexMap<String, PropertyDefinition>,
}

/// A property of a named schema.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PropertyDefinition {
	/// JSON schema `type`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Refinement such as `int64` or `date-time`.
	#[serde(default)]
	pub format: Option<String>,
	/// Pointer to another schema, for object-valued properties.
	#[serde(default, rename = "$ref")]
	pub reference: Option<String>,
}

impl PropertyDefinition {
	/// Short type description for tooltips.
	pub fn type_name(&self) -> String {
		match (&self.kind, &self.reference) {
			(Some(kind), _) => match &self.format {
				Some(format) => format!("{kind} ({format})"),
				None => kind.clone(),
			},
			(None, Some(reference)) => reference_name(reference).to_string(),
			(None, None) => "unknown".to_string(),
		}
	}
}

/// Extracts the trailing name of a `$ref` pointer, undoing JSON-pointer escapes.
///
/// `#/components/schemas/User` yields `User`.
pub fn reference_name(reference: &str) -> std::borrow::Cow<'_, str> {
	let last = reference.rsplit('/').next().unwrap_or(reference);
	if last.contains('~') {
		last.replace("~1", "/").replace("~0", "~").into()
	} else {
		last.into()
	}
}

/// Resolves a `$ref` to the name of a schema declared in `doc`.
///
/// Returns `None` when the pointer names no known schema.
pub fn resolve_schema_name(doc: &SpecDocument, reference: &str) -> Option<String> {
	let name = reference_name(reference);
	doc.components
		.schemas
		.contains_key(name.as_ref())
		.then(|| name.into_owned())
}
