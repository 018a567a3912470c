//! Band and ribbon geometry for the layer-coverage diagram.
//!
//! A band is the slice of a layer's bar that carries its mass towards one
//! other layer. Upstream bands stack from the bar top, closest upstream
//! layer first. Downstream bands stack from the bar top in layer order. A
//! ribbon joins the downstream band of layer `a` to the upstream band of a
//! later layer `b`.

use serde::Serialize;
use tracing::instrument;

use crate::bars::BarLayout;
use crate::coverage::{Coverage, LayerCoverage, as_f64, format_pct};
use crate::order::LayerOrder;

/// Vertical extent of a band within a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub y0: f64,
    pub y1: f64,
}

impl Band {
    #[must_use]
    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).max(0.0)
    }

    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

// ---------------------------------------------------------------------------
// BandLayout
// ---------------------------------------------------------------------------

/// Bands per `[layer][target layer]`, both indexed by order position.
/// `None` where the layer sends no mass to the target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandLayout {
    pub up: Vec<Vec<Option<Band>>>,
    pub down: Vec<Vec<Option<Band>>>,
}

impl BandLayout {
    /// Stack each layer's mass into bands.
    ///
    /// The pixel scale of layer `L` is `bar_height[L] / total[L]` (0 for an
    /// empty layer). Zero-height bands are left out and do not move the
    /// stacking cursor.
    #[instrument(skip_all, fields(layers = order.len()))]
    #[must_use]
    pub fn compute(order: &LayerOrder, bars: &BarLayout, coverage: &Coverage) -> Self {
        let n = order.len();
        let mut up = vec![vec![None; n]; n];
        let mut down = vec![vec![None; n]; n];

        for k in 0..n {
            let Some(layer) = coverage.at(k) else { continue };
            let scale = scale_for(layer, bars.heights.get(k).copied().unwrap_or(0.0));
            let offset = bars.offsets.get(k).copied().unwrap_or(0.0);

            let mut cursor = offset;
            for t in (0..k).rev() {
                let h = layer.mass_up.get(t).copied().unwrap_or(0.0) * scale;
                if h <= 0.0 {
                    continue;
                }
                up[k][t] = Some(Band {
                    y0: cursor,
                    y1: cursor + h,
                });
                cursor += h;
            }

            let mut cursor = offset;
            for t in (k + 1)..n {
                let h = layer.mass_down.get(t).copied().unwrap_or(0.0) * scale;
                if h <= 0.0 {
                    continue;
                }
                down[k][t] = Some(Band {
                    y0: cursor,
                    y1: cursor + h,
                });
                cursor += h;
            }
        }

        Self { up, down }
    }

    /// Upstream band of layer `layer` towards `target`.
    #[must_use]
    pub fn up_band(&self, layer: usize, target: usize) -> Option<Band> {
        self.up.get(layer)?.get(target).copied().flatten()
    }

    /// Downstream band of layer `layer` towards `target`.
    #[must_use]
    pub fn down_band(&self, layer: usize, target: usize) -> Option<Band> {
        self.down.get(layer)?.get(target).copied().flatten()
    }
}

fn scale_for(layer: &LayerCoverage, bar_height: f64) -> f64 {
    if layer.total > 0 {
        bar_height / as_f64(layer.total)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Ribbons
// ---------------------------------------------------------------------------

/// A connection between the downstream band of `from` and the upstream band
/// of `to`, where `from` precedes `to` in layer order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ribbon {
    pub from: String,
    pub to: String,
    pub from_band: Band,
    pub to_band: Band,
    /// Drawn over the adjacent-layer ribbons (the layers are not neighbors).
    pub overlay: bool,
    /// `mass_down[from][to]` as a percentage of `from`'s total.
    pub from_pct: String,
    /// `mass_up[to][from]` as a percentage of `to`'s total.
    pub to_pct: String,
    pub show_label: bool,
}

/// Assemble ribbons in draw order: adjacent layer pairs first, then pairs
/// two or more layers apart as overlays.
///
/// A pair is emitted only when both band ends exist. The `from_pct` label is
/// shown when both bands are at least `label_min_band` tall and the ribbon is
/// an overlay or `from` feeds more than one downstream layer.
#[must_use]
pub fn ribbons(
    order: &LayerOrder,
    coverage: &Coverage,
    bands: &BandLayout,
    label_min_band: f64,
) -> Vec<Ribbon> {
    let n = order.len();
    let adjacent = (0..n.saturating_sub(1)).map(|i| (i, i + 1, false));
    let overlays = (0..n).flat_map(|i| ((i + 2)..n).map(move |j| (i, j, true)));

    adjacent
        .chain(overlays)
        .filter_map(|(a, b, overlay)| {
            ribbon_between(order, coverage, bands, a, b, overlay, label_min_band)
        })
        .collect()
}

fn ribbon_between(
    order: &LayerOrder,
    coverage: &Coverage,
    bands: &BandLayout,
    a: usize,
    b: usize,
    overlay: bool,
    label_min_band: f64,
) -> Option<Ribbon> {
    let from_band = bands.down_band(a, b)?;
    let to_band = bands.up_band(b, a)?;
    let from_layer = coverage.at(a)?;
    let to_layer = coverage.at(b)?;

    let from_pct = format_pct(
        from_layer.mass_down.get(b).copied().unwrap_or(0.0),
        as_f64(from_layer.total),
    );
    let to_pct = format_pct(
        to_layer.mass_up.get(a).copied().unwrap_or(0.0),
        as_f64(to_layer.total),
    );

    let tall_enough = from_band.height().min(to_band.height()) >= label_min_band;
    let show_label =
        tall_enough && (overlay || from_layer.out_degree_down() > 1) && !from_pct.is_empty();

    Some(Ribbon {
        from: order.get(a)?.to_string(),
        to: order.get(b)?.to_string(),
        from_band,
        to_band,
        overlay,
        from_pct,
        to_pct,
        show_label,
    })
}

/// Point-scale x positions for `count` columns across `inner_width`, with
/// half a step of padding at each end.
#[must_use]
pub fn column_centers(count: usize, inner_width: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let step = inner_width / as_f64(count);
    (0..count).map(|i| step * (as_f64(i) + 0.5)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{IndexLink, build_adjacency, partition_by_layer};
    use tracemap_core::config::CoverageConfig;

    struct Fixture {
        order: LayerOrder,
        coverage: Coverage,
        bars: BarLayout,
        bands: BandLayout,
    }

    fn fixture(types: &[&str], links: &[(usize, usize)]) -> Fixture {
        let types: Vec<String> = types.iter().map(ToString::to_string).collect();
        let order = LayerOrder::inferred(&types);
        let links: Vec<IndexLink> = links.iter().map(|&(s, t)| IndexLink::new(s, t)).collect();
        let adjacency = build_adjacency(types.len(), &links);
        let nodes = partition_by_layer(&types, &order);
        let coverage = Coverage::compute(&order, &adjacency, &types, &nodes);
        let bars = BarLayout::compute(&order, &coverage, &CoverageConfig::default());
        let bands = BandLayout::compute(&order, &bars, &coverage);
        Fixture {
            order,
            coverage,
            bars,
            bands,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_link_fills_both_bars() {
        let f = fixture(&["R", "A"], &[(0, 1)]);
        let down = f.bands.down_band(0, 1).expect("R→A band");
        let up = f.bands.up_band(1, 0).expect("A←R band");
        assert!(approx(down.y0, 0.0));
        assert!(approx(down.height(), f.bars.heights[0]));
        assert!(approx(up.height(), f.bars.heights[1]));
        assert!(f.bands.up_band(0, 1).is_none());
    }

    #[test]
    fn downstream_bands_stack_in_layer_order() {
        let f = fixture(&["R", "A", "I"], &[(0, 1), (0, 2)]);
        let to_a = f.bands.down_band(0, 1).expect("R→A");
        let to_i = f.bands.down_band(0, 2).expect("R→I");
        assert!(approx(to_a.y0, f.bars.offsets[0]));
        assert!(approx(to_i.y0, to_a.y1));
        assert!(approx(to_a.height() + to_i.height(), f.bars.heights[0]));
    }

    #[test]
    fn upstream_bands_stack_closest_first() {
        // I0 links up to A1 and R2.
        let f = fixture(&["R", "A", "I"], &[(0, 2), (1, 2)]);
        let to_a = f.bands.up_band(2, 1).expect("I←A");
        let to_r = f.bands.up_band(2, 0).expect("I←R");
        assert!(approx(to_a.y0, f.bars.offsets[2]));
        assert!(approx(to_r.y0, to_a.y1));
    }

    #[test]
    fn ribbons_adjacent_first_then_overlays() {
        let f = fixture(&["R", "A", "I"], &[(0, 1), (0, 2), (1, 2)]);
        let rs = ribbons(&f.order, &f.coverage, &f.bands, 12.0);
        let pairs: Vec<(&str, &str, bool)> = rs
            .iter()
            .map(|r| (r.from.as_str(), r.to.as_str(), r.overlay))
            .collect();
        assert_eq!(
            pairs,
            vec![("R", "A", false), ("A", "I", false), ("R", "I", true)]
        );
        assert_eq!(rs[0].from_pct, "50%");
        assert_eq!(rs[0].to_pct, "100%");
    }

    #[test]
    fn label_policy() {
        let f = fixture(&["R", "A", "I"], &[(0, 1), (0, 2), (1, 2)]);
        let rs = ribbons(&f.order, &f.coverage, &f.bands, 12.0);
        // R feeds two layers, bands are 15 px each.
        assert!(rs[0].show_label);
        // A feeds only I and the ribbon is adjacent.
        assert!(!rs[1].show_label);
        // Overlays always qualify when tall enough.
        assert!(rs[2].show_label);

        let rs = ribbons(&f.order, &f.coverage, &f.bands, 100.0);
        assert!(rs.iter().all(|r| !r.show_label));
    }

    #[test]
    fn missing_band_end_drops_the_ribbon() {
        let f = fixture(&["R", "A"], &[]);
        assert!(ribbons(&f.order, &f.coverage, &f.bands, 12.0).is_empty());
    }

    #[test]
    fn column_centers_use_half_step_padding() {
        let xs = column_centers(4, 400.0);
        assert_eq!(xs.len(), 4);
        assert!(approx(xs[0], 50.0));
        assert!(approx(xs[3], 350.0));
        assert!(column_centers(0, 400.0).is_empty());
    }
}
