//! Layer color assignment.
//!
//! A [`ColorContext`] belongs to one rendering session and is passed to
//! whatever needs colors. It starts with the configured palette mapped onto
//! the declared layer order (before it is filtered to the layers present in
//! the dataset, so a layer keeps its color when an earlier one has no tags),
//! maps `Unknown` to its own color, and hands out further palette entries to
//! new layer names as they are first seen. An existing mapping is never
//! changed.

use std::collections::HashMap;

use serde::Serialize;
use tracemap_core::UNKNOWN_LAYER;
use tracemap_core::config::ColorConfig;

/// Used when the configured palette is empty.
const FALLBACK_COLOR: &str = "#95a5a6";

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    #[serde(rename = "type")]
    pub layer: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct ColorContext {
    palette: Vec<String>,
    unknown: String,
    assigned: HashMap<String, String>,
}

impl ColorContext {
    /// Seed `palette[i]` for the `i`-th declared layer, then `Unknown`.
    ///
    /// A repeated name keeps its first slot; the slot index still advances.
    #[must_use]
    pub fn new(declared: &[String], config: &ColorConfig) -> Self {
        let mut ctx = Self {
            palette: config.palette.clone(),
            unknown: config.unknown.clone(),
            assigned: HashMap::new(),
        };
        for (slot, name) in declared.iter().enumerate() {
            if name == UNKNOWN_LAYER || ctx.assigned.contains_key(name) {
                continue;
            }
            let color = ctx.palette_slot(slot);
            ctx.assigned.insert(name.clone(), color);
        }
        ctx.assigned
            .insert(UNKNOWN_LAYER.to_string(), ctx.unknown.clone());
        ctx
    }

    fn palette_slot(&self, slot: usize) -> String {
        if self.palette.is_empty() {
            FALLBACK_COLOR.to_string()
        } else {
            self.palette[slot % self.palette.len()].clone()
        }
    }

    /// Color for `name`, assigning the next palette entry on first sight.
    ///
    /// The next entry is `palette[assigned % palette.len()]`, where
    /// `assigned` counts every mapping made so far, `Unknown` included.
    pub fn color_for(&mut self, name: &str) -> String {
        if name == UNKNOWN_LAYER {
            return self.unknown.clone();
        }
        if let Some(color) = self.assigned.get(name) {
            return color.clone();
        }

        let color = self.palette_slot(self.assigned.len());
        tracing::trace!(layer = name, color = %color, "assigned layer color");
        self.assigned.insert(name.to_string(), color.clone());
        color
    }

    /// Legend entries for the given types, or just `Unknown` when empty.
    pub fn legend(&mut self, types: &[String]) -> Vec<LegendEntry> {
        if types.is_empty() {
            return vec![LegendEntry {
                layer: UNKNOWN_LAYER.to_string(),
                color: self.unknown.clone(),
            }];
        }
        types
            .iter()
            .map(|t| LegendEntry {
                layer: t.clone(),
                color: self.color_for(t),
            })
            .collect()
    }

    /// Number of names with a color, `Unknown` included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn context(layers: &[&str]) -> ColorContext {
        ColorContext::new(&strings(layers), &ColorConfig::default())
    }

    #[test]
    fn seeds_palette_in_layer_order() {
        let mut ctx = context(&["Requirement", "Architecture"]);
        assert_eq!(ctx.color_for("Requirement"), "#e74c3c");
        assert_eq!(ctx.color_for("Architecture"), "#3498db");
        assert_eq!(ctx.color_for("Unknown"), "#7f8c8d");
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn declared_slots_survive_missing_layers() {
        // Slots follow the declared list even if "Architecture" is never drawn.
        let mut ctx = context(&["Requirement", "Architecture", "Implementation"]);
        assert_eq!(ctx.color_for("Implementation"), "#2ecc71");
        assert_eq!(ctx.color_for("Requirement"), "#e74c3c");
    }

    #[test]
    fn repeated_and_unknown_declarations_keep_slot_positions() {
        let mut ctx = context(&["A", "A", "Unknown", "B"]);
        assert_eq!(ctx.color_for("A"), "#e74c3c");
        assert_eq!(ctx.color_for("Unknown"), "#7f8c8d");
        assert_eq!(ctx.color_for("B"), "#f39c12");
    }

    #[test]
    fn new_names_take_next_slot() {
        let mut ctx = context(&["A", "B"]);
        // A, B and Unknown are taken, so the next slot is palette[3].
        assert_eq!(ctx.color_for("C"), "#f39c12");
        assert_eq!(ctx.color_for("D"), "#9b59b6");
    }

    #[test]
    fn mapping_is_stable() {
        let mut ctx = context(&[]);
        let first = ctx.color_for("X");
        ctx.color_for("Y");
        ctx.color_for("Z");
        assert_eq!(ctx.color_for("X"), first);
    }

    #[test]
    fn palette_wraps() {
        let mut ctx = context(&[]);
        let colors: Vec<String> = (0..12).map(|i| ctx.color_for(&format!("L{i}"))).collect();
        // Unknown holds slot 0, so L9 lands on slot 10 % 10 = 0.
        assert_eq!(colors[9], "#e74c3c");
        assert_eq!(colors[0], "#3498db");
    }

    #[test]
    fn legend_lists_types_or_unknown() {
        let mut ctx = context(&["A"]);
        let legend = ctx.legend(&strings(&["A", "Unknown"]));
        assert_eq!(legend[0].color, "#e74c3c");
        assert_eq!(legend[1].color, "#7f8c8d");

        let empty = ctx.legend(&[]);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].layer, "Unknown");
    }

    #[test]
    fn empty_palette_falls_back() {
        let cfg = ColorConfig {
            palette: Vec::new(),
            ..ColorConfig::default()
        };
        let mut ctx = ColorContext::new(&[], &cfg);
        assert_eq!(ctx.color_for("Z"), FALLBACK_COLOR);
    }
}
