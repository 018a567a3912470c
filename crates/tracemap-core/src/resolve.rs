//! Layer/type resolution for trace tags.
//!
//! Datasets written by current extractors carry a numeric `layer_id` into
//! the dataset's layer table. Older datasets carry a colon-delimited
//! `trace_target` string whose trailing segment is the layer name
//! (`"docs/req.md:Requirement"`). Both shapes are folded into a single
//! [`LayerRef`] and resolved by [`resolve_type`].
//!
//! Resolution never fails: anything that cannot be mapped to a name becomes
//! [`UNKNOWN_LAYER`].

use serde::Serialize;

use crate::model::Layer;

/// Sentinel layer name for tags whose layer cannot be resolved.
pub const UNKNOWN_LAYER: &str = "Unknown";

/// How a tag refers to its layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerRef {
    /// Index into the dataset's layer table. `encoded` is the legacy string
    /// carried alongside it, used when the index does not resolve.
    ById { id: i64, encoded: Option<String> },
    /// Legacy colon-delimited encoding; the trailing segment is the name.
    ByEncodedString(String),
    /// Neither field was present.
    Unspecified,
}

impl LayerRef {
    /// Build a reference from the raw optional dataset fields.
    ///
    /// The numeric id wins when present; an empty legacy string is treated
    /// as absent.
    #[must_use]
    pub fn from_parts(trace_target: Option<&str>, layer_id: Option<i64>) -> Self {
        let encoded = trace_target
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        match (layer_id, encoded) {
            (Some(id), encoded) => Self::ById { id, encoded },
            (None, Some(encoded)) => Self::ByEncodedString(encoded),
            (None, None) => Self::Unspecified,
        }
    }
}

/// The dataset's ordered layer names, indexed by `layer_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTable {
    names: Vec<String>,
}

impl LayerTable {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    #[must_use]
    pub fn from_layers(layers: &[Layer]) -> Self {
        Self::new(layers.iter().map(|l| l.name.clone()).collect())
    }

    /// Look up a layer name by raw id. Negative or out-of-range ids yield `None`.
    #[must_use]
    pub fn name(&self, id: i64) -> Option<&str> {
        let idx = usize::try_from(id).ok()?;
        self.names.get(idx).map(String::as_str)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolve a layer reference to its layer/type name.
#[must_use]
pub fn resolve_type(layer: &LayerRef, table: &LayerTable) -> String {
    match layer {
        LayerRef::ById { id, encoded } => table.name(*id).map_or_else(
            || {
                tracing::trace!(layer_id = *id, "layer id not in layer table");
                encoded
                    .as_deref()
                    .map_or_else(|| UNKNOWN_LAYER.to_string(), decode_trailing_segment)
            },
            ToString::to_string,
        ),
        LayerRef::ByEncodedString(encoded) => decode_trailing_segment(encoded),
        LayerRef::Unspecified => UNKNOWN_LAYER.to_string(),
    }
}

/// Convenience wrapper over [`LayerRef::from_parts`] + [`resolve_type`].
#[must_use]
pub fn resolve_type_parts(
    trace_target: Option<&str>,
    layer_id: Option<i64>,
    table: &LayerTable,
) -> String {
    resolve_type(&LayerRef::from_parts(trace_target, layer_id), table)
}

fn decode_trailing_segment(encoded: &str) -> String {
    let segment = encoded.rsplit(':').next().unwrap_or_default().trim();
    if segment.is_empty() {
        UNKNOWN_LAYER.to_string()
    } else {
        segment.to_string()
    }
}
