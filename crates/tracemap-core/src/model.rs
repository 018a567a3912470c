//! Traceability dataset model.
//!
//! # Input shape
//!
//! The external extractor writes one JSON document per run:
//!
//! ```text
//! {
//!   "layers":     [{ "name": "Requirement" }, ...],
//!   "files":      [{ "file": "docs/req.md", "version": "git:abc" }, ...],
//!   "trace_tags": [{ "id": "@REQ1@", "layer_id": 0, "file_id": 0, "line": 3,
//!                    "description": "...", "from_tags": ["NONE"] }, ...],
//!   "health":     { ... }            // optional
//! }
//! ```
//!
//! Older extractors wrote `nodes` instead of `trace_tags`, a per-tag `file`
//! path instead of `file_id`, and a colon-encoded `trace_target` instead of
//! `layer_id`. Both shapes deserialize into the same types.
//!
//! ## Links
//!
//! Each entry of a tag's `from_tags` names a parent. The derived link is
//! directed parent → child: `source = parent id`, `target = tag id`. The
//! literal `"NONE"` marks a root tag and never produces a link.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DatasetError;
use crate::resolve::{LayerRef, LayerTable, resolve_type};
use crate::version::FileVersion;

/// Sentinel in `from_tags` meaning "this tag has no parent".
pub const NO_PARENT: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single traceable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceTag {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// 1-based; absent or `null` means line 1.
    #[serde(default = "default_line", deserialize_with = "line_or_default")]
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent ids; absent or `null` means no parents.
    #[serde(default, deserialize_with = "null_as_default")]
    pub from_tags: Vec<String>,
    /// Legacy per-tag version descriptor, superseded by `files[].version`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_version: Option<String>,
}

const fn default_line() -> u32 {
    1
}

fn line_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_line))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TraceTag {
    #[must_use]
    pub fn layer_ref(&self) -> LayerRef {
        LayerRef::from_parts(self.trace_target.as_deref(), self.layer_id)
    }

    /// Parent ids with the `"NONE"` sentinel and blanks removed.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.from_tags
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty() && *p != NO_PARENT)
    }

    /// Parent ids joined with `,`, as shown in source-viewer headers.
    #[must_use]
    pub fn parents_joined(&self) -> String {
        self.parents().collect::<Vec<_>>().join(",")
    }
}

/// Extractor-computed health figures, when the extractor provides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthData {
    #[serde(default)]
    pub total_tags: u64,
    #[serde(default)]
    pub tags_with_links: u64,
    #[serde(default)]
    pub isolated_tags: u64,
    #[serde(default)]
    pub dangling_references: u64,
    #[serde(default)]
    pub isolated_tag_list: Vec<IsolatedTagEntry>,
    #[serde(default)]
    pub dangling_reference_list: Vec<DanglingReferenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsolatedTagEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReferenceEntry {
    #[serde(default)]
    pub child_tag: String,
    #[serde(default)]
    pub missing_parent: String,
    #[serde(default)]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub line: Option<u32>,
}

/// A derived parent → child link between tag ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub source: String,
    pub target: String,
}

/// One extractor snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(alias = "nodes")]
    pub trace_tags: Vec<TraceTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthData>,
}

impl Dataset {
    /// Parse a dataset from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Parse`] if the JSON is malformed or the
    /// required `trace_tags` field is absent.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Missing`] when the file does not exist,
    /// [`DatasetError::Read`] on other I/O failures, and
    /// [`DatasetError::Parse`] on malformed content.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DatasetError::Missing(path.to_path_buf())
            } else {
                DatasetError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let dataset = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            tags = dataset.trace_tags.len(),
            layers = dataset.layers.len(),
            files = dataset.files.len(),
            "loaded traceability dataset"
        );
        Ok(dataset)
    }

    #[must_use]
    pub fn layer_table(&self) -> LayerTable {
        LayerTable::from_layers(&self.layers)
    }

    /// Resolved layer/type name of every tag, in dataset order.
    #[must_use]
    pub fn tag_types(&self) -> Vec<String> {
        let table = self.layer_table();
        self.trace_tags
            .iter()
            .map(|tag| resolve_type(&tag.layer_ref(), &table))
            .collect()
    }

    /// Derive parent → child links from every tag's `from_tags`.
    #[must_use]
    pub fn derive_links(&self) -> Vec<TagLink> {
        self.trace_tags
            .iter()
            .flat_map(|tag| {
                tag.parents().map(move |parent| TagLink {
                    source: parent.to_string(),
                    target: tag.id.clone(),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn find_tag(&self, id: &str) -> Option<&TraceTag> {
        self.trace_tags.iter().find(|t| t.id == id)
    }

    /// File entry for a raw `file_id`, if it is in range.
    #[must_use]
    pub fn file_entry(&self, file_id: Option<i64>) -> Option<&FileEntry> {
        let idx = usize::try_from(file_id?).ok()?;
        self.files.get(idx)
    }

    /// Resolve a tag's source path: `file_id` first, then the legacy `file`.
    #[must_use]
    pub fn resolve_file_path<'a>(&'a self, tag: &'a TraceTag) -> Option<&'a str> {
        self.file_entry(tag.file_id)
            .map(|f| f.file.as_str())
            .or(tag.file.as_deref())
    }

    /// Resolve a tag's file version descriptor.
    #[must_use]
    pub fn file_version(&self, tag: &TraceTag) -> FileVersion {
        match self.file_entry(tag.file_id) {
            Some(entry) => FileVersion::parse(entry.version.as_deref()),
            None => FileVersion::parse(tag.file_version.as_deref()),
        }
    }
}
