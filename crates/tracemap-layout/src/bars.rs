//! Bar geometry for the layer-coverage diagram.
//!
//! Each layer is drawn as one vertical bar. Bar height grows with coverage
//! and is clamped to the configured range. Bars are stacked vertically by
//! following each layer's strongest upstream source, so layers fed mainly by
//! the same source sit one under another next to it.

use serde::Serialize;
use tracemap_core::config::CoverageConfig;
use tracing::instrument;

use crate::coverage::{Coverage, as_f64};
use crate::order::LayerOrder;

/// Share of a layer's total that sets the minimum bar height.
const TOTAL_HEIGHT_FACTOR: f64 = 0.3;

/// Space kept below the lowest bar when sizing the canvas.
const CANVAS_BOTTOM_PADDING: f64 = 20.0;

/// Per-layer bar geometry, indexed by layer order position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarLayout {
    pub heights: Vec<f64>,
    pub offsets: Vec<f64>,
    /// Downstream layer positions with positive mass, in layer order.
    pub connections: Vec<Vec<usize>>,
    /// Height of the upstream-covered fill (`covered_up / total * height`).
    pub up_fill: Vec<f64>,
    /// Height of the downstream-covered fill.
    pub down_fill: Vec<f64>,
    canvas_height: f64,
}

impl BarLayout {
    /// Compute bar heights, connections and vertical offsets.
    #[instrument(skip_all, fields(layers = order.len()))]
    #[must_use]
    pub fn compute(order: &LayerOrder, coverage: &Coverage, config: &CoverageConfig) -> Self {
        let n = order.len();
        let mut heights = Vec::with_capacity(n);
        let mut up_fill = Vec::with_capacity(n);
        let mut down_fill = Vec::with_capacity(n);
        let mut connections = Vec::with_capacity(n);

        for k in 0..n {
            let Some(layer) = coverage.at(k) else {
                heights.push(config.min_bar_height);
                up_fill.push(0.0);
                down_fill.push(0.0);
                connections.push(Vec::new());
                continue;
            };

            let total = as_f64(layer.total);
            let up = as_f64(layer.covered_up);
            let down = as_f64(layer.covered_down);
            let height = bar_height(up, down, total, config);
            heights.push(height);

            if layer.total > 0 {
                up_fill.push(up / total * height);
                down_fill.push(down / total * height);
            } else {
                up_fill.push(0.0);
                down_fill.push(0.0);
            }

            connections.push(
                layer
                    .mass_down
                    .iter()
                    .enumerate()
                    .filter(|&(t, m)| t > k && *m > 0.0)
                    .map(|(t, _)| t)
                    .collect(),
            );
        }

        let offsets = chain_offsets(coverage, &heights, &connections, config.bar_spacing);

        let max_y = offsets
            .iter()
            .zip(&heights)
            .map(|(o, h)| o + h)
            .fold(0.0_f64, f64::max);
        let canvas_height = (max_y + CANVAS_BOTTOM_PADDING)
            .max(config.min_height)
            .min(config.max_height);

        Self {
            heights,
            offsets,
            connections,
            up_fill,
            down_fill,
            canvas_height,
        }
    }

    /// Inner canvas height: lowest bar bottom plus padding, clamped to the
    /// configured range.
    #[must_use]
    pub const fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// `min(max_bar, max(min_bar, max(up, down, total * 0.3) * height_per_node))`.
///
/// The maximum wins when the configured bounds cross.
#[must_use]
pub fn bar_height(covered_up: f64, covered_down: f64, total: f64, config: &CoverageConfig) -> f64 {
    let basis = covered_up
        .max(covered_down)
        .max(total * TOTAL_HEIGHT_FACTOR);
    (basis * config.height_per_node)
        .max(config.min_bar_height)
        .min(config.max_bar_height)
}

/// Position each bar under its strongest upstream source.
///
/// The strongest source of layer `k` is the earlier layer with the largest
/// `mass_down[s][k]`; on ties the earliest wins. A layer is placed at its
/// source's offset when it is the source's first connection, otherwise just
/// below the preceding connection. Layers without a source sit at 0.
fn chain_offsets(
    coverage: &Coverage,
    heights: &[f64],
    connections: &[Vec<usize>],
    spacing: f64,
) -> Vec<f64> {
    let mut offsets = vec![0.0; heights.len()];

    for k in 1..heights.len() {
        let mut strongest = None;
        let mut max_weight = 0.0;
        for s in 0..k {
            let weight = coverage
                .at(s)
                .and_then(|l| l.mass_down.get(k).copied())
                .unwrap_or(0.0);
            if weight > max_weight {
                max_weight = weight;
                strongest = Some(s);
            }
        }

        let Some(source) = strongest else {
            continue;
        };
        let siblings = &connections[source];
        offsets[k] = match siblings.iter().position(|&t| t == k) {
            Some(0) | None => offsets[source],
            Some(idx) => {
                let prev = siblings[idx - 1];
                offsets[prev] + heights[prev] + spacing
            }
        };
    }

    offsets
}
