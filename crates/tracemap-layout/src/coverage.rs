//! Per-layer coverage statistics.
//!
//! # Algorithm
//!
//! For each node `i` in layer `L` at order position `k`, the layers of its
//! neighbors are split into an upstream set (position `< k`) and a downstream
//! set (position `> k`), each deduplicated by layer. Same-layer neighbors and
//! neighbors outside the layer order count for neither.
//!
//! - A non-empty upstream set adds 1 to `covered_up[L]` and `1 / |set|` to
//!   `mass_up[L][T]` for every `T` in the set.
//! - The downstream set is handled the same way with `covered_down` and
//!   `mass_down`.
//!
//! So each node contributes exactly one unit of mass per direction it is
//! connected in, spread evenly over the distinct layers it reaches.

use serde::Serialize;
use tracing::instrument;

use crate::graph::{Adjacency, NodesByLayer};
use crate::order::LayerOrder;

// ---------------------------------------------------------------------------
// LayerCoverage
// ---------------------------------------------------------------------------

/// Coverage record for one layer.
///
/// `mass_up` and `mass_down` are indexed by target layer order position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerCoverage {
    pub layer: String,
    pub total: usize,
    pub covered_up: usize,
    pub covered_down: usize,
    pub mass_up: Vec<f64>,
    pub mass_down: Vec<f64>,
}

impl LayerCoverage {
    fn empty(layer: &str, layer_count: usize) -> Self {
        Self {
            layer: layer.to_string(),
            total: 0,
            covered_up: 0,
            covered_down: 0,
            mass_up: vec![0.0; layer_count],
            mass_down: vec![0.0; layer_count],
        }
    }

    /// Number of upstream layers with positive mass.
    #[must_use]
    pub fn out_degree_up(&self) -> usize {
        self.mass_up.iter().filter(|m| **m > 0.0).count()
    }

    /// Number of downstream layers with positive mass.
    #[must_use]
    pub fn out_degree_down(&self) -> usize {
        self.mass_down.iter().filter(|m| **m > 0.0).count()
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

/// Coverage records for every layer, in layer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Coverage {
    layers: Vec<LayerCoverage>,
}

impl Coverage {
    /// Compute coverage for every layer of `order`.
    ///
    /// `types[i]` is the resolved layer of node `i`; `nodes` must have been
    /// partitioned with the same `order`.
    #[instrument(skip_all, fields(layers = order.len(), nodes = types.len()))]
    #[must_use]
    pub fn compute(
        order: &LayerOrder,
        adjacency: &Adjacency,
        types: &[String],
        nodes: &NodesByLayer,
    ) -> Self {
        let layer_count = order.len();
        let position_of = |node: usize| types.get(node).and_then(|t| order.position(t));

        let mut layers = Vec::with_capacity(layer_count);
        let mut up_set: Vec<usize> = Vec::new();
        let mut down_set: Vec<usize> = Vec::new();

        for (k, name) in order.iter().enumerate() {
            let mut record = LayerCoverage::empty(name, layer_count);
            let column = nodes.column(k);
            record.total = column.len();

            for &i in column {
                up_set.clear();
                down_set.clear();
                for j in adjacency.neighbors(i) {
                    let Some(pos) = position_of(j) else { continue };
                    let set = match pos.cmp(&k) {
                        std::cmp::Ordering::Less => &mut up_set,
                        std::cmp::Ordering::Greater => &mut down_set,
                        std::cmp::Ordering::Equal => continue,
                    };
                    if !set.contains(&pos) {
                        set.push(pos);
                    }
                }

                if !up_set.is_empty() {
                    record.covered_up += 1;
                    let share = 1.0 / as_f64(up_set.len());
                    for &t in &up_set {
                        record.mass_up[t] += share;
                    }
                }
                if !down_set.is_empty() {
                    record.covered_down += 1;
                    let share = 1.0 / as_f64(down_set.len());
                    for &t in &down_set {
                        record.mass_down[t] += share;
                    }
                }
            }

            tracing::trace!(
                layer = name,
                total = record.total,
                covered_up = record.covered_up,
                covered_down = record.covered_down,
                "layer coverage"
            );
            layers.push(record);
        }

        Self { layers }
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerCoverage] {
        &self.layers
    }

    #[must_use]
    pub fn get(&self, layer: &str) -> Option<&LayerCoverage> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    /// Record at order position `pos`.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<&LayerCoverage> {
        self.layers.get(pos)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn total(&self, layer: &str) -> usize {
        self.get(layer).map_or(0, |l| l.total)
    }

    #[must_use]
    pub fn covered_up(&self, layer: &str) -> usize {
        self.get(layer).map_or(0, |l| l.covered_up)
    }

    #[must_use]
    pub fn covered_down(&self, layer: &str) -> usize {
        self.get(layer).map_or(0, |l| l.covered_down)
    }

    /// Upstream mass of `source` attributed to layer `target`.
    #[must_use]
    pub fn mass_up(&self, source: &str, target: &str) -> f64 {
        self.mass_between(source, target, |l| &l.mass_up)
    }

    /// Downstream mass of `source` attributed to layer `target`.
    #[must_use]
    pub fn mass_down(&self, source: &str, target: &str) -> f64 {
        self.mass_between(source, target, |l| &l.mass_down)
    }

    #[must_use]
    pub fn out_degree_up(&self, layer: &str) -> usize {
        self.get(layer).map_or(0, LayerCoverage::out_degree_up)
    }

    #[must_use]
    pub fn out_degree_down(&self, layer: &str) -> usize {
        self.get(layer).map_or(0, LayerCoverage::out_degree_down)
    }

    fn mass_between(
        &self,
        source: &str,
        target: &str,
        side: impl Fn(&LayerCoverage) -> &Vec<f64>,
    ) -> f64 {
        let Some(target_pos) = self.layers.iter().position(|l| l.layer == target) else {
            return 0.0;
        };
        self.get(source)
            .and_then(|l| side(l).get(target_pos).copied())
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Percentage formatting
// ---------------------------------------------------------------------------

/// Format `value / total` as a percentage label.
///
/// - `total <= 0` or `value == 0` gives `""` (no label).
/// - `0 < p < 0.5` gives `"<1%"`.
/// - `p >= 10` is rounded to a whole number.
/// - Otherwise one decimal, with a trailing `.0` dropped.
///
/// `p` is `value / total * 100` in that order, and rounding works on the
/// exact binary value of `p`: `23 / 40` is `57.49999…` and prints `"57%"`.
/// Only exact ties round up (`12.5 → "13%"`).
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_pct(value: f64, total: f64) -> String {
    if total <= 0.0 || value == 0.0 || !value.is_finite() || !total.is_finite() {
        return String::new();
    }

    let p = value / total * 100.0;
    if p > 0.0 && p < 0.5 {
        return "<1%".to_string();
    }

    let fixed = to_fixed(p, if p >= 10.0 { 0 } else { 1 });
    let trimmed = fixed.strip_suffix(".0").unwrap_or(&fixed);
    format!("{trimmed}%")
}

/// Round `x` to `digits` decimals, picking the larger candidate on an exact
/// tie.
///
/// `x` sits exactly halfway between two `digits`-decimal values only when
/// `x * 2^(digits + 1)` is an odd integer; that product is exact, unlike
/// `x * 10^digits`.
#[allow(clippy::float_cmp)]
fn to_fixed(x: f64, digits: i32) -> String {
    let precision = usize::try_from(digits).unwrap_or(0);
    let halves = x * 2f64.powi(digits + 1);
    let is_tie = halves.fract() == 0.0 && halves.rem_euclid(2.0) == 1.0;
    if is_tie {
        let scale = 10f64.powi(digits);
        let up = (x * scale).ceil() / scale;
        format!("{up:.precision$}")
    } else {
        format!("{x:.precision$}")
    }
}

/// [`format_pct`] over integer counts.
#[must_use]
pub fn format_pct_counts(value: usize, total: usize) -> String {
    format_pct(as_f64(value), as_f64(total))
}

#[allow(clippy::cast_precision_loss)]
pub(crate) const fn as_f64(n: usize) -> f64 {
    n as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
