//! Full pipeline: dataset in, renderer-ready report out.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracemap_core::Dataset;
use tracemap_core::config::ProjectConfig;
use tracing::{info, instrument};

use crate::bands::{Band, BandLayout, Ribbon, column_centers, ribbons};
use crate::bars::BarLayout;
use crate::color::{ColorContext, LegendEntry};
use crate::coverage::{Coverage, LayerCoverage, format_pct_counts};
use crate::flow::FlowLayout;
use crate::graph::{TraceGraph, partition_by_layer};
use crate::health::HealthSummary;
use crate::order::LayerOrder;
use crate::summary::{LayerSummary, summarize};

/// Horizontal margin on each side of the coverage diagram.
const COVERAGE_MARGIN_X: f64 = 20.0;
const COVERAGE_MARGIN_TOP: f64 = 5.0;
const COVERAGE_MARGIN_BOTTOM: f64 = 20.0;

/// Message a renderer shows instead of an empty coverage diagram.
pub const EMPTY_MESSAGE: &str = "No traceability tags found.";

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Everything a renderer needs for one dataset snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    /// Hash of the tag ids and resolved links; unchanged hash means
    /// unchanged diagrams.
    pub content_hash: String,
    pub layer_order: LayerOrder,
    pub stats: GraphSummary,
    pub coverage: CoverageView,
    pub flow: FlowLayout,
    pub summary: Vec<LayerSummary>,
    pub health: HealthSummary,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub tags: usize,
    pub links: usize,
    /// Links dropped because an endpoint did not resolve.
    pub skipped_links: usize,
    pub edges: usize,
    pub components: usize,
}

/// Layer-coverage diagram geometry.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageView {
    /// True when no layer has tags; the renderer shows [`EMPTY_MESSAGE`].
    pub empty: bool,
    pub width: f64,
    pub height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub bar_width: f64,
    pub columns: Vec<CoverageColumn>,
    pub ribbons: Vec<Ribbon>,
}

/// One layer bar with its statistics and bands.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageColumn {
    pub layer: String,
    pub color: String,
    /// Bar center, relative to the inner area.
    pub x: f64,
    pub total: usize,
    pub covered_up: usize,
    pub covered_down: usize,
    pub up_pct: String,
    pub down_pct: String,
    pub bar_height: f64,
    pub bar_offset: f64,
    pub up_fill: f64,
    pub down_fill: f64,
    pub connections: Vec<String>,
    pub mass_up: BTreeMap<String, f64>,
    pub mass_down: BTreeMap<String, f64>,
    pub bands_up: BTreeMap<String, Band>,
    pub bands_down: BTreeMap<String, Band>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

impl TraceReport {
    /// Run every stage once over `dataset`.
    ///
    /// Layer order comes from `config.layers.order`, else from the dataset's
    /// layer table, else from first appearance.
    #[instrument(skip_all, fields(tags = dataset.trace_tags.len(), width))]
    #[must_use]
    pub fn build(dataset: &Dataset, config: &ProjectConfig, width: f64) -> Self {
        let graph = TraceGraph::from_dataset(dataset);

        let explicit: Vec<String> = if config.layers.order.is_empty() {
            dataset.layers.iter().map(|l| l.name.clone()).collect()
        } else {
            config.layers.order.clone()
        };
        let order = LayerOrder::resolve(&explicit, &graph.types);
        let nodes = partition_by_layer(&graph.types, &order);

        let coverage = Coverage::compute(&order, &graph.adjacency, &graph.types, &nodes);
        let bars = BarLayout::compute(&order, &coverage, &config.coverage);
        let bands = BandLayout::compute(&order, &bars, &coverage);
        let ribbons = ribbons(&order, &coverage, &bands, config.coverage.label_min_band);

        let flow = FlowLayout::compute(&graph, &order, width, &config.flow);

        let mut colors = ColorContext::new(&explicit, &config.colors);
        let legend = colors.legend(order.names());

        let coverage_view = coverage_view(
            &order,
            &coverage,
            &bars,
            &bands,
            ribbons,
            &mut colors,
            width,
            config,
        );

        let summary = summarize(
            dataset,
            &order,
            &graph.adjacency,
            &graph.types,
            &nodes,
            &coverage,
        );
        let health = HealthSummary::from_dataset(dataset);

        let valid = graph.valid_links().count();
        let stats = GraphSummary {
            tags: graph.node_count(),
            links: graph.links.len(),
            skipped_links: graph.links.len() - valid,
            edges: graph.adjacency.edge_count(),
            components: graph.adjacency.component_count(),
        };

        info!(
            layers = order.len(),
            tags = stats.tags,
            links = stats.links,
            skipped = stats.skipped_links,
            "built traceability report"
        );

        Self {
            content_hash: graph.content_hash,
            layer_order: order,
            stats,
            coverage: coverage_view,
            flow,
            summary,
            health,
            legend,
        }
    }

    /// Load a dataset file and build its report.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be loaded.
    pub fn from_path(path: &Path, config: &ProjectConfig, width: f64) -> Result<Self> {
        let dataset = Dataset::load(path)
            .with_context(|| format!("loading traceability data from {}", path.display()))?;
        Ok(Self::build(&dataset, config, width))
    }

    /// Pretty-printed JSON for the renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[allow(clippy::too_many_arguments)]
fn coverage_view(
    order: &LayerOrder,
    coverage: &Coverage,
    bars: &BarLayout,
    bands: &BandLayout,
    ribbons: Vec<Ribbon>,
    colors: &mut ColorContext,
    width: f64,
    config: &ProjectConfig,
) -> CoverageView {
    let empty = coverage.layers().iter().all(|l| l.total == 0);
    let inner_width = (width - 2.0 * COVERAGE_MARGIN_X).max(0.0);
    let inner_height = bars.canvas_height();
    let xs = column_centers(order.len(), inner_width);

    let named = |values: &[f64]| -> BTreeMap<String, f64> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .filter_map(|(t, v)| Some((order.get(t)?.to_string(), *v)))
            .collect()
    };
    let named_bands = |row: Option<&Vec<Option<Band>>>| -> BTreeMap<String, Band> {
        row.into_iter()
            .flatten()
            .enumerate()
            .filter_map(|(t, b)| Some((order.get(t)?.to_string(), (*b)?)))
            .collect()
    };

    let columns = coverage
        .layers()
        .iter()
        .enumerate()
        .map(|(k, layer): (usize, &LayerCoverage)| CoverageColumn {
            layer: layer.layer.clone(),
            color: colors.color_for(&layer.layer),
            x: xs.get(k).copied().unwrap_or(0.0),
            total: layer.total,
            covered_up: layer.covered_up,
            covered_down: layer.covered_down,
            up_pct: format_pct_counts(layer.covered_up, layer.total),
            down_pct: format_pct_counts(layer.covered_down, layer.total),
            bar_height: bars.heights.get(k).copied().unwrap_or(0.0),
            bar_offset: bars.offsets.get(k).copied().unwrap_or(0.0),
            up_fill: bars.up_fill.get(k).copied().unwrap_or(0.0),
            down_fill: bars.down_fill.get(k).copied().unwrap_or(0.0),
            connections: bars
                .connections
                .get(k)
                .into_iter()
                .flatten()
                .filter_map(|&t| order.get(t).map(ToString::to_string))
                .collect(),
            mass_up: named(&layer.mass_up),
            mass_down: named(&layer.mass_down),
            bands_up: named_bands(bands.up.get(k)),
            bands_down: named_bands(bands.down.get(k)),
        })
        .collect();

    CoverageView {
        empty,
        width,
        height: COVERAGE_MARGIN_TOP + inner_height + COVERAGE_MARGIN_BOTTOM,
        inner_width,
        inner_height,
        margin_left: COVERAGE_MARGIN_X,
        margin_top: COVERAGE_MARGIN_TOP,
        bar_width: config.coverage.bar_width,
        columns,
        ribbons,
    }
}
