//! Traceability health: link participation, isolated tags and dangling
//! references.
//!
//! The extractor usually ships these figures in the dataset's `health`
//! block. Older extractors did not, so the same figures are derived from the
//! tags when the block is absent.

use std::collections::HashSet;

use serde::Serialize;
use tracemap_core::model::{DanglingReferenceEntry, HealthData, IsolatedTagEntry};
use tracemap_core::paths::{LISTING_EXTENSION, base_name, file_extension_or, target_id};
use tracemap_core::{Dataset, LayerTable, resolve_type};
use tracing::warn;

/// Shown for a tag whose file cannot be resolved.
const UNKNOWN_FILE: &str = "unknown";

/// A tag mentioned in a health listing, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRef {
    pub id: String,
    /// Layer name, empty when the tag is not in the dataset.
    pub layer: String,
    /// Base file name, or `unknown`.
    pub file: String,
    /// Source-viewer id; `None` when the file is unknown.
    pub target_id: Option<String>,
    pub extension: Option<String>,
    pub line: u32,
    pub description: String,
    /// Parent ids joined with `,`.
    pub parents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    pub child: TagRef,
    pub missing_parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub total_tags: u64,
    pub tags_with_links: u64,
    pub tags_with_links_pct: u64,
    pub isolated_tags: u64,
    pub isolated_pct: u64,
    pub dangling_references: u64,
    /// True when the figures were computed here rather than read from the
    /// dataset.
    pub derived: bool,
    pub isolated: Vec<TagRef>,
    pub dangling: Vec<DanglingRef>,
}

impl HealthSummary {
    /// Summarize the dataset's health block, deriving it when absent.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let (data, derived) = dataset
            .health
            .as_ref()
            .map_or_else(|| (derive_health(dataset), true), |h| (h.clone(), false));

        let total_tags = data.total_tags;
        let mut tags_with_links = data.tags_with_links;
        if tags_with_links > total_tags {
            warn!(
                tags_with_links,
                total_tags, "tags_with_links exceeds total_tags; capping"
            );
            tags_with_links = total_tags;
        }

        let table = dataset.layer_table();
        let isolated = data
            .isolated_tag_list
            .iter()
            .map(|entry| tag_ref(dataset, &table, &entry.id, entry.file_id, entry.line))
            .collect();
        let dangling = data
            .dangling_reference_list
            .iter()
            .map(|entry| DanglingRef {
                child: tag_ref(dataset, &table, &entry.child_tag, entry.file_id, entry.line),
                missing_parent: entry.missing_parent.clone(),
            })
            .collect();

        Self {
            total_tags,
            tags_with_links,
            tags_with_links_pct: floor_pct(tags_with_links, total_tags),
            isolated_tags: data.isolated_tags,
            isolated_pct: floor_pct(data.isolated_tags, total_tags),
            dangling_references: data.dangling_references,
            derived,
            isolated,
            dangling,
        }
    }
}

/// `floor(100 * part / total)`, 0 when `total` is 0.
#[must_use]
pub const fn floor_pct(part: u64, total: u64) -> u64 {
    if total == 0 {
        0
    } else {
        part.saturating_mul(100) / total
    }
}

/// Compute health figures from the tags themselves.
///
/// - A tag has links when it is either end of a link whose parent exists.
/// - A tag is isolated when no other tag lists it as a parent.
/// - A parent id that names no tag is a dangling reference.
#[must_use]
pub fn derive_health(dataset: &Dataset) -> HealthData {
    let ids: HashSet<&str> = dataset.trace_tags.iter().map(|t| t.id.as_str()).collect();

    let mut linked: HashSet<&str> = HashSet::new();
    let mut referenced: HashSet<&str> = HashSet::new();
    let mut dangling_reference_list = Vec::new();

    for tag in &dataset.trace_tags {
        for parent in tag.parents() {
            if ids.contains(parent) {
                linked.insert(parent);
                linked.insert(tag.id.as_str());
                if parent != tag.id {
                    referenced.insert(parent);
                }
            } else {
                dangling_reference_list.push(DanglingReferenceEntry {
                    child_tag: tag.id.clone(),
                    missing_parent: parent.to_string(),
                    file_id: tag.file_id,
                    line: Some(tag.line),
                });
            }
        }
    }

    let isolated_tag_list: Vec<IsolatedTagEntry> = dataset
        .trace_tags
        .iter()
        .filter(|t| !referenced.contains(t.id.as_str()))
        .map(|t| IsolatedTagEntry {
            id: t.id.clone(),
            file_id: t.file_id,
            line: Some(t.line),
        })
        .collect();

    HealthData {
        total_tags: dataset.trace_tags.len() as u64,
        tags_with_links: linked.len() as u64,
        isolated_tags: isolated_tag_list.len() as u64,
        dangling_references: dangling_reference_list.len() as u64,
        isolated_tag_list,
        dangling_reference_list,
    }
}

fn tag_ref(
    dataset: &Dataset,
    table: &LayerTable,
    id: &str,
    file_id: Option<i64>,
    line: Option<u32>,
) -> TagRef {
    let tag = dataset.find_tag(id);
    let file = dataset
        .file_entry(file_id)
        .map(|f| base_name(&f.file).to_string())
        .filter(|f| !f.is_empty());

    TagRef {
        id: id.to_string(),
        layer: tag
            .map(|t| resolve_type(&t.layer_ref(), table))
            .unwrap_or_default(),
        target_id: file.as_deref().map(target_id),
        extension: file
            .as_deref()
            .map(|f| file_extension_or(f, LISTING_EXTENSION).to_string()),
        file: file.unwrap_or_else(|| UNKNOWN_FILE.to_string()),
        line: line.filter(|l| *l > 0).unwrap_or(1),
        description: tag
            .and_then(|t| t.description.clone())
            .unwrap_or_default(),
        parents: tag.map(|t| t.parents_joined()).unwrap_or_default(),
    }
}
