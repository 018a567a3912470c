#![forbid(unsafe_code)]
//! tracemap-core library.
//!
//! Owns the traceability dataset model consumed from the external tag
//! extractor, the layer/type resolver, file path and version helpers, the
//! error taxonomy, and configuration loading.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library errors, `anyhow::Result` at
//!   configuration and I/O boundaries.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod resolve;
pub mod version;

pub use error::{ConfigError, DatasetError, ErrorCode};
pub use model::{Dataset, FileEntry, HealthData, Layer, TagLink, TraceTag};
pub use resolve::{LayerRef, LayerTable, UNKNOWN_LAYER, resolve_type, resolve_type_parts};
