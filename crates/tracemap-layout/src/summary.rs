//! Per-layer coverage summary.
//!
//! For every layer that has tags and at least one cross-layer link, lists the
//! share of its mass reaching each upstream layer (closest first) and each
//! downstream layer (layer order), then one row per source file with the
//! fraction of its tags covered in each direction.

use std::collections::BTreeMap;

use serde::Serialize;
use tracemap_core::Dataset;
use tracemap_core::paths::{base_name, file_extension, target_id};

use crate::coverage::{Coverage, as_f64, format_pct, format_pct_counts};
use crate::graph::{Adjacency, NodesByLayer};
use crate::order::LayerOrder;

/// Files with this base name hold extractor configuration, not trace tags.
const CONFIG_FILE_NAME: &str = "config.md";

/// Coverage of the tags of one layer found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCoverage {
    /// Base file name.
    pub name: String,
    pub target_id: String,
    pub extension: String,
    /// Display form of the file version.
    pub version: String,
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub up_pct: String,
    pub down_pct: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub layer: String,
    pub total: usize,
    /// `"<Layer> <pct>"` entries, closest upstream layer first.
    pub upstream: Vec<String>,
    /// `"<Layer> <pct>"` entries in layer order.
    pub downstream: Vec<String>,
    /// Per-file rows sorted by file name.
    pub files: Vec<FileCoverage>,
}

#[derive(Default)]
struct FileTally {
    total: usize,
    up: usize,
    down: usize,
    version: String,
}

/// Build the summary for every layer with tags and at least one link.
#[must_use]
pub fn summarize(
    dataset: &Dataset,
    order: &LayerOrder,
    adjacency: &Adjacency,
    types: &[String],
    nodes: &NodesByLayer,
    coverage: &Coverage,
) -> Vec<LayerSummary> {
    let mut summaries = Vec::new();

    for (k, (layer, column)) in nodes.iter().enumerate() {
        let Some(record) = coverage.at(k) else { continue };
        if record.total == 0 {
            continue;
        }
        let den = as_f64(record.total);

        let upstream: Vec<String> = (0..k)
            .rev()
            .filter_map(|t| part(order, t, record.mass_up.get(t).copied(), den))
            .collect();
        let downstream: Vec<String> = ((k + 1)..order.len())
            .filter_map(|t| part(order, t, record.mass_down.get(t).copied(), den))
            .collect();
        if upstream.is_empty() && downstream.is_empty() {
            continue;
        }

        let files = file_rows(dataset, order, adjacency, types, k, column);
        summaries.push(LayerSummary {
            layer: layer.to_string(),
            total: record.total,
            upstream,
            downstream,
            files,
        });
    }

    summaries
}

fn part(order: &LayerOrder, target: usize, mass: Option<f64>, den: f64) -> Option<String> {
    let mass = mass.filter(|m| *m > 0.0)?;
    Some(format!("{} {}", order.get(target)?, format_pct(mass, den)))
}

fn file_rows(
    dataset: &Dataset,
    order: &LayerOrder,
    adjacency: &Adjacency,
    types: &[String],
    k: usize,
    column: &[usize],
) -> Vec<FileCoverage> {
    let mut tallies: BTreeMap<String, FileTally> = BTreeMap::new();

    for &i in column {
        let Some(tag) = dataset.trace_tags.get(i) else { continue };
        let name = dataset.resolve_file_path(tag).map(base_name).unwrap_or_default();
        if name.is_empty() || name == CONFIG_FILE_NAME {
            continue;
        }

        let (mut has_up, mut has_down) = (false, false);
        for j in adjacency.neighbors(i) {
            match types.get(j).and_then(|t| order.position(t)) {
                Some(pos) if pos < k => has_up = true,
                Some(pos) if pos > k => has_down = true,
                _ => {}
            }
        }

        let tally = tallies.entry(name.to_string()).or_insert_with(|| FileTally {
            version: dataset.file_version(tag).display(),
            ..FileTally::default()
        });
        tally.total += 1;
        tally.up += usize::from(has_up);
        tally.down += usize::from(has_down);
    }

    tallies
        .into_iter()
        .map(|(name, tally)| FileCoverage {
            target_id: target_id(&name),
            extension: file_extension(&name).to_string(),
            version: tally.version,
            total: tally.total,
            up: tally.up,
            down: tally.down,
            up_pct: format_pct_counts(tally.up, tally.total),
            down_pct: format_pct_counts(tally.down, tally.total),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TraceGraph, partition_by_layer};

    fn run(json: &str) -> Vec<LayerSummary> {
        let ds = Dataset::from_json_str(json).expect("parse");
        let graph = TraceGraph::from_dataset(&ds);
        let order = LayerOrder::resolve(&[], &graph.types);
        let nodes = partition_by_layer(&graph.types, &order);
        let coverage = Coverage::compute(&order, &graph.adjacency, &graph.types, &nodes);
        summarize(&ds, &order, &graph.adjacency, &graph.types, &nodes, &coverage)
    }

    const THREE_LAYERS: &str = r#"{
        "layers": [{"name": "Req"}, {"name": "Arch"}, {"name": "Impl"}],
        "files": [
            {"file": "docs/req.md", "version": "git:abc"},
            {"file": "docs/arch.md"},
            {"file": "src/main.sh", "version": "mtime:2025-12-26T10:30:45Z"},
            {"file": "docs/config.md"}
        ],
        "trace_tags": [
            {"id": "R1", "layer_id": 0, "file_id": 0},
            {"id": "R2", "layer_id": 0, "file_id": 0},
            {"id": "A1", "layer_id": 1, "file_id": 1, "from_tags": ["R1"]},
            {"id": "I1", "layer_id": 2, "file_id": 2, "from_tags": ["A1", "R1"]},
            {"id": "I2", "layer_id": 2, "file_id": 3}
        ]
    }"#;

    #[test]
    fn upstream_parts_closest_first() {
        let rows = run(THREE_LAYERS);
        let imp = rows.iter().find(|r| r.layer == "Impl").expect("Impl row");
        // I1 splits its unit between Arch and Req; Impl has 2 tags.
        assert_eq!(imp.upstream, vec!["Arch 25%", "Req 25%"]);
        assert!(imp.downstream.is_empty());
    }

    #[test]
    fn downstream_parts_in_layer_order() {
        let rows = run(THREE_LAYERS);
        let req = rows.iter().find(|r| r.layer == "Req").expect("Req row");
        // R1 reaches Arch and Impl: 0.5 each over 2 Req tags.
        assert_eq!(req.downstream, vec!["Arch 25%", "Impl 25%"]);
        assert!(req.upstream.is_empty());
    }

    #[test]
    fn file_rows_skip_config_and_show_versions() {
        let rows = run(THREE_LAYERS);
        let req = rows.iter().find(|r| r.layer == "Req").expect("Req row");
        assert_eq!(req.files.len(), 1);
        let file = &req.files[0];
        assert_eq!(file.name, "req.md");
        assert_eq!(file.target_id, "Target_req_md");
        assert_eq!(file.extension, "md");
        assert_eq!(file.version, "abc");
        assert_eq!((file.total, file.up, file.down), (2, 0, 1));
        assert_eq!(file.up_pct, "");
        assert_eq!(file.down_pct, "50%");

        let imp = rows.iter().find(|r| r.layer == "Impl").expect("Impl row");
        let names: Vec<&str> = imp.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main.sh"]);
        assert_eq!(imp.files[0].version, "2025-12-26 10:30");
    }

    #[test]
    fn layers_without_links_are_omitted() {
        let rows = run(r#"{ "layers": [{"name": "A"}, {"name": "B"}],
            "trace_tags": [{"id": "a", "layer_id": 0}, {"id": "b", "layer_id": 1}] }"#);
        assert!(rows.is_empty());
    }

    #[test]
    fn files_sorted_by_name() {
        let rows = run(r#"{
            "layers": [{"name": "A"}, {"name": "B"}],
            "files": [{"file": "z.md"}, {"file": "a.md"}, {"file": "b.md"}],
            "trace_tags": [
                {"id": "a1", "layer_id": 0, "file_id": 0},
                {"id": "a2", "layer_id": 0, "file_id": 1},
                {"id": "b1", "layer_id": 1, "file_id": 2, "from_tags": ["a1", "a2"]}
            ] }"#);
        let a = rows.iter().find(|r| r.layer == "A").expect("A row");
        let names: Vec<&str> = a.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "z.md"]);
        assert_eq!(a.files[0].version, "unknown");
    }
}
