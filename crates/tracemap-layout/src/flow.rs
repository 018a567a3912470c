//! Tag-level flow diagram layout.
//!
//! Every tag is a small box. Boxes are grouped into one column per type,
//! columns are spread evenly across the width, and each column is centered
//! vertically in the space left between the top and bottom padding. Links
//! are drawn from the right edge of the parent to the left edge of the
//! child.

use std::collections::HashMap;

use serde::Serialize;
use tracemap_core::config::FlowConfig;
use tracing::instrument;

use crate::coverage::as_f64;
use crate::graph::{NodesByLayer, TraceGraph};
use crate::order::LayerOrder;
use crate::reorder::reorder_by_barycenter;

/// Row count and natural canvas height of the flow diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowDimensions {
    pub rows: usize,
    pub height: f64,
}

/// Box of one tag in the flow diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeGeometry {
    /// Node index in the dataset.
    pub index: usize,
    pub id: String,
    pub layer: String,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl NodeGeometry {
    #[must_use]
    pub fn mid_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A parent → child connector between two boxes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub source: usize,
    pub target: usize,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Columns for the flow diagram: the layer order, then every other type
/// present in the dataset (`Unknown` included) in first-appearance order.
#[must_use]
pub fn flow_columns(types: &[String], order: &LayerOrder) -> NodesByLayer {
    let mut names: Vec<String> = order.names().to_vec();
    for ty in types {
        if !names.contains(ty) {
            names.push(ty.clone());
        }
    }

    let mut columns = vec![Vec::new(); names.len()];
    for (i, ty) in types.iter().enumerate() {
        if let Some(pos) = names.iter().position(|n| n == ty) {
            columns[pos].push(i);
        }
    }
    NodesByLayer::from_columns(names, columns)
}

/// Rows needed by the tallest column and the canvas height that fits them.
#[must_use]
pub fn flow_dimensions(column_sizes: &[usize], config: &FlowConfig) -> FlowDimensions {
    let rows = column_sizes.iter().copied().max().unwrap_or(0).max(1);
    let height = as_f64(rows).mul_add(config.node_height, config.top_padding)
        + as_f64(rows - 1) * config.node_gap
        + config.bottom_padding;
    FlowDimensions { rows, height }
}

/// Place every node of `columns` on the grid.
///
/// Column `k` of `n` sits at `x = k / max(1, n - 1) * (width - 2 * side) +
/// side`, pulled left so the box never crosses `width - side`.
#[must_use]
pub fn position_nodes_in_grid(
    columns: &NodesByLayer,
    ids: &[String],
    width: f64,
    height: f64,
    config: &FlowConfig,
) -> Vec<NodeGeometry> {
    let denom = as_f64(columns.len().saturating_sub(1).max(1));
    let available = (height - config.top_padding - config.bottom_padding).max(0.0);
    let max_x = width - config.side_padding - config.node_width;
    let pitch = config.node_height + config.node_gap;

    let mut placed = Vec::with_capacity(columns.node_count());
    for (k, (layer, column)) in columns.iter().enumerate() {
        let x = (as_f64(k) / denom)
            .mul_add(width - 2.0 * config.side_padding, config.side_padding)
            .min(max_x);

        let count = column.len();
        let column_height = if count > 0 {
            as_f64(count).mul_add(config.node_height, as_f64(count - 1) * config.node_gap)
        } else {
            0.0
        };
        let start_y = config.top_padding + ((available - column_height) / 2.0).max(0.0);

        for (i, &node) in column.iter().enumerate() {
            let y0 = as_f64(i).mul_add(pitch, start_y);
            placed.push(NodeGeometry {
                index: node,
                id: ids.get(node).cloned().unwrap_or_default(),
                layer: layer.to_string(),
                x0: x,
                x1: x + config.node_width,
                y0,
                y1: y0 + config.node_height,
            });
        }
    }
    placed
}

// ---------------------------------------------------------------------------
// FlowLayout
// ---------------------------------------------------------------------------

/// Complete flow diagram geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowLayout {
    /// Column names, left to right.
    pub columns: Vec<String>,
    pub width: f64,
    pub rows: usize,
    pub height: f64,
    /// `height` grown, if needed, to fit the lowest box plus padding.
    pub fitted_height: f64,
    pub nodes: Vec<NodeGeometry>,
    pub edges: Vec<FlowEdge>,
}

impl FlowLayout {
    #[instrument(skip_all, fields(nodes = graph.node_count(), width))]
    #[must_use]
    pub fn compute(graph: &TraceGraph, order: &LayerOrder, width: f64, config: &FlowConfig) -> Self {
        let mut columns = flow_columns(&graph.types, order);
        reorder_by_barycenter(&mut columns, &graph.links);

        let sizes: Vec<usize> = columns.iter().map(|(_, c)| c.len()).collect();
        let FlowDimensions { rows, height } = flow_dimensions(&sizes, config);
        let nodes = position_nodes_in_grid(&columns, &graph.ids, width, height, config);

        let by_index: HashMap<usize, &NodeGeometry> =
            nodes.iter().map(|g| (g.index, g)).collect();
        let edges = graph
            .valid_links()
            .filter_map(|(s, t)| {
                let (src, dst) = (by_index.get(&s)?, by_index.get(&t)?);
                Some(FlowEdge {
                    source: s,
                    target: t,
                    x0: src.x1,
                    y0: src.mid_y(),
                    x1: dst.x0,
                    y1: dst.mid_y(),
                })
            })
            .collect();

        let fitted_height = nodes
            .iter()
            .map(|n| n.y1)
            .reduce(f64::max)
            .map_or(height, |y_max| height.max((y_max + config.fit_padding).ceil()));

        Self {
            columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
            width,
            rows,
            height,
            fitted_height,
            nodes,
            edges,
        }
    }
}
