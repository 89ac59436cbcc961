/// Canvas graph of an API document.
pub mod api_graph;
