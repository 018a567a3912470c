//! Graph construction from a traceability dataset.
//!
//! ## Edge Direction
//!
//! Links keep their parent → child direction in [`IndexLink`] because the
//! flow diagram and the column reorder read it. The [`Adjacency`] built from
//! them is undirected: coverage only asks "which layers does this node touch,
//! and are they upstream or downstream of it", and that is decided by layer
//! order, not by link direction.
//!
//! ## Invalid Links
//!
//! A link whose endpoint names no tag, or whose index is out of range, is
//! logged and skipped. It never adds an edge and never aborts the build.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use tracemap_core::Dataset;
use tracing::{instrument, warn};

// ---------------------------------------------------------------------------
// IndexLink
// ---------------------------------------------------------------------------

/// A parent → child link resolved to node indices.
///
/// `None` marks an endpoint whose tag id did not resolve to any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IndexLink {
    pub source: Option<usize>,
    pub target: Option<usize>,
}

impl IndexLink {
    #[must_use]
    pub const fn new(source: usize, target: usize) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
        }
    }

    /// Both endpoints, if both resolved and are below `node_count`.
    #[must_use]
    pub fn endpoints(&self, node_count: usize) -> Option<(usize, usize)> {
        match (self.source, self.target) {
            (Some(s), Some(t)) if s < node_count && t < node_count => Some((s, t)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Undirected, symmetric adjacency over node indices `0..node_count`.
///
/// Node `i` is petgraph node `NodeIndex::new(i)`. Parallel edges are kept:
/// a pair linked twice is listed twice, which consumers that deduplicate by
/// layer do not notice.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    graph: UnGraph<(), ()>,
}

impl Adjacency {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Neighbor indices of node `i`; empty when `i` is out of range.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let in_range = i < self.graph.node_count();
        let start = NodeIndex::new(if in_range { i } else { 0 });
        self.graph
            .neighbors(start)
            .filter(move |_| in_range)
            .map(NodeIndex::index)
    }

    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors(i).count()
    }

    /// Number of connected components, isolated nodes included.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }
}

/// Build the undirected adjacency for `node_count` nodes.
///
/// Runs in O(V + E). Links with an unresolved or out-of-range endpoint are
/// logged and skipped.
#[must_use]
pub fn build_adjacency(node_count: usize, links: &[IndexLink]) -> Adjacency {
    let mut graph = UnGraph::<(), ()>::with_capacity(node_count, links.len());
    for _ in 0..node_count {
        graph.add_node(());
    }

    for link in links {
        match link.endpoints(node_count) {
            Some((s, t)) => {
                graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
            }
            None => warn!(
                source = ?link.source,
                target = ?link.target,
                node_count,
                "skipping link with unresolved or out-of-range endpoint"
            ),
        }
    }

    Adjacency { graph }
}

// ---------------------------------------------------------------------------
// TraceGraph
// ---------------------------------------------------------------------------

/// Nodes, resolved types and links of one dataset snapshot.
#[derive(Debug, Clone)]
pub struct TraceGraph {
    /// Tag id per node, in dataset order.
    pub ids: Vec<String>,
    /// Resolved layer/type name per node (`Unknown` when unresolvable).
    pub types: Vec<String>,
    /// Derived links in dataset order, resolved to node indices.
    pub links: Vec<IndexLink>,
    pub adjacency: Adjacency,
    /// BLAKE3 hash of the resolved link list, prefixed with `blake3:`.
    pub content_hash: String,
}

impl TraceGraph {
    /// Build the graph for a dataset.
    ///
    /// When two tags share an id, links resolve to the later one.
    #[instrument(skip(dataset), fields(tags = dataset.trace_tags.len()))]
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let ids: Vec<String> = dataset.trace_tags.iter().map(|t| t.id.clone()).collect();
        let types = dataset.tag_types();

        let index_of: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let links: Vec<IndexLink> = dataset
            .derive_links()
            .iter()
            .map(|link| {
                let resolved = IndexLink {
                    source: index_of.get(link.source.as_str()).copied(),
                    target: index_of.get(link.target.as_str()).copied(),
                };
                if resolved.source.is_none() {
                    tracing::debug!(
                        parent = %link.source,
                        child = %link.target,
                        "link references a tag that is not in the dataset"
                    );
                }
                resolved
            })
            .collect();

        let adjacency = build_adjacency(ids.len(), &links);
        let content_hash = compute_link_hash(&ids, &links);

        tracing::debug!(
            nodes = adjacency.node_count(),
            edges = adjacency.edge_count(),
            "built trace graph"
        );

        Self {
            ids,
            types,
            links,
            adjacency,
            content_hash,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Links whose endpoints both resolved, as `(source, target)` pairs.
    pub fn valid_links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.node_count();
        self.links.iter().filter_map(move |l| l.endpoints(n))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Hash node ids and resolved link endpoints in order.
fn compute_link_hash(ids: &[String], links: &[IndexLink]) -> String {
    let mut hasher = blake3::Hasher::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for link in links {
        for end in [link.source, link.target] {
            match end {
                Some(i) => hasher.update(&(i as u64).to_le_bytes()),
                None => hasher.update(b"-"),
            };
        }
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
