//! Layer ordering.
//!
//! Layer order defines direction: a layer at a lower position is upstream
//! of every layer at a higher position. The configured order is the
//! reliable path. Inferring order from the first appearance of each type in
//! the dataset depends on how the extractor happened to walk the sources, so
//! it is only a fallback.

use std::collections::HashSet;

use serde::Serialize;
use tracemap_core::UNKNOWN_LAYER;

/// Ordered, duplicate-free list of layer names. Never contains `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerOrder {
    names: Vec<String>,
}

impl LayerOrder {
    /// Keep the configured names that occur in `present`, in configured order.
    #[must_use]
    pub fn explicit(order: &[String], present: &[String]) -> Self {
        let present: HashSet<&str> = present.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let names = order
            .iter()
            .filter(|name| name.as_str() != UNKNOWN_LAYER)
            .filter(|name| present.contains(name.as_str()))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        Self { names }
    }

    /// First-appearance order of the resolved types.
    #[must_use]
    pub fn inferred(types: &[String]) -> Self {
        let mut seen = HashSet::new();
        let names: Vec<String> = types
            .iter()
            .filter(|name| name.as_str() != UNKNOWN_LAYER)
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        if !names.is_empty() {
            tracing::debug!(
                layers = ?names,
                "no layer order configured; using first-appearance order"
            );
        }
        Self { names }
    }

    /// Explicit order when one is given, else inferred order.
    #[must_use]
    pub fn resolve(explicit: &[String], types: &[String]) -> Self {
        if explicit.is_empty() {
            Self::inferred(types)
        } else {
            Self::explicit(explicit, types)
        }
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
