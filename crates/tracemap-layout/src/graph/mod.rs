//! Layered trace graph.
//!
//! # Overview
//!
//! Tags become nodes indexed by their position in the dataset. Derived
//! parent → child links are resolved to index pairs and folded into an
//! undirected adjacency on a petgraph [`UnGraph`](petgraph::graph::UnGraph).
//! Nodes are then grouped into columns by resolved layer.
//!
//! ## Pipeline
//!
//! ```text
//! Dataset
//!        ↓  build::TraceGraph::from_dataset()
//! TraceGraph { ids, types, links: Vec<IndexLink>, adjacency }
//!        ↓  partition::partition_by_layer()
//! NodesByLayer (one column of node indices per ordered layer)
//! ```
//!
//! ## Cache Invalidation
//!
//! [`TraceGraph::content_hash`] is a BLAKE3 hash of the resolved link list.
//! Renderers can compare it against the previous run to skip a redraw.

pub mod build;
pub mod partition;

pub use build::{Adjacency, IndexLink, TraceGraph, build_adjacency};
pub use partition::{NodesByLayer, partition_by_layer};
