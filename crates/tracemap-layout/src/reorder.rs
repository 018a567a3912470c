//! Barycenter column ordering.
//!
//! One forward pass: every column after the first is sorted by the mean
//! position of each node's linked neighbors in the column before it. The
//! previous column is read after it has itself been reordered. Nodes with no
//! neighbor there sort last. The sort is stable, so ties and unlinked nodes
//! keep their relative order.
//!
//! This is a single sweep, not an iterated crossing minimization.

use std::collections::HashMap;

use tracing::instrument;

use crate::coverage::as_f64;
use crate::graph::{IndexLink, NodesByLayer};

/// Reorder every column after the first by barycenter, in place.
///
/// Links are read in both directions; unresolved endpoints are ignored.
#[instrument(skip_all, fields(columns = nodes.len(), links = links.len()))]
pub fn reorder_by_barycenter(nodes: &mut NodesByLayer, links: &[IndexLink]) {
    let mut neighbors: HashMap<usize, Vec<usize>> = HashMap::new();
    for link in links {
        if let (Some(s), Some(t)) = (link.source, link.target) {
            neighbors.entry(s).or_default().push(t);
            neighbors.entry(t).or_default().push(s);
        }
    }

    for k in 1..nodes.len() {
        let previous: HashMap<usize, usize> = nodes
            .column(k - 1)
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();

        let Some(column) = nodes.column_mut(k) else {
            continue;
        };

        let mut keyed: Vec<(f64, usize)> = column
            .iter()
            .map(|&node| (barycenter(node, &neighbors, &previous), node))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        column.clear();
        column.extend(keyed.into_iter().map(|(_, node)| node));
    }
}

/// Mean position of `node`'s neighbors in the previous column, or `+∞`.
fn barycenter(
    node: usize,
    neighbors: &HashMap<usize, Vec<usize>>,
    previous: &HashMap<usize, usize>,
) -> f64 {
    let positions: Vec<usize> = neighbors
        .get(&node)
        .into_iter()
        .flatten()
        .filter_map(|n| previous.get(n).copied())
        .collect();

    if positions.is_empty() {
        f64::INFINITY
    } else {
        as_f64(positions.iter().sum::<usize>()) / as_f64(positions.len())
    }
}
