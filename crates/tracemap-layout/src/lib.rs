#![forbid(unsafe_code)]
//! tracemap-layout library.
//!
//! Turns a [`tracemap_core::Dataset`] into plain data for an external
//! renderer: a layered graph, per-layer coverage statistics, bar and band
//! geometry for the layer-coverage diagram, grid geometry for the flow
//! diagram, textual summaries and health listings.
//!
//! ## Pipeline
//!
//! ```text
//! Dataset
//!    ↓  graph::TraceGraph::from_dataset()
//! TraceGraph (types, index links, undirected adjacency)
//!    ↓  graph::partition_by_layer()
//! NodesByLayer
//!    ↓  coverage::Coverage::compute()
//! Coverage ──→ bars::BarLayout ──→ bands::BandLayout ──→ bands::ribbons()
//!          └─→ summary::LayerSummary
//! ```
//!
//! Every component is a pure function over in-memory data, except
//! [`reorder::reorder_by_barycenter`] which permutes columns in place and
//! [`color::ColorContext`] which grows its mapping lazily.
//!
//! # Conventions
//!
//! - **Errors**: The engine does not fail on structurally valid input.
//!   Bad links are skipped, unresolvable layers become `Unknown`, and
//!   zero denominators yield empty labels.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod bands;
pub mod bars;
pub mod color;
pub mod coverage;
pub mod flow;
pub mod graph;
pub mod health;
pub mod order;
pub mod reorder;
pub mod report;
pub mod summary;

pub use coverage::{Coverage, format_pct};
pub use graph::{Adjacency, IndexLink, NodesByLayer, TraceGraph};
pub use order::LayerOrder;
pub use report::TraceReport;
