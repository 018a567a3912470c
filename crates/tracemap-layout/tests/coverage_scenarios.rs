//! Known-topology regression scenarios for the coverage and layout engine.

use tracemap_core::Dataset;
use tracemap_core::config::{CoverageConfig, ProjectConfig};
use tracemap_layout::bands::{BandLayout, ribbons};
use tracemap_layout::bars::BarLayout;
use tracemap_layout::graph::{IndexLink, build_adjacency, partition_by_layer};
use tracemap_layout::reorder::reorder_by_barycenter;
use tracemap_layout::{Coverage, LayerOrder, TraceGraph, TraceReport, format_pct};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Scenario {
    types: Vec<String>,
    order: LayerOrder,
    links: Vec<IndexLink>,
}

impl Scenario {
    fn new(types: &[&str], links: &[(usize, usize)]) -> Self {
        let types: Vec<String> = types.iter().map(ToString::to_string).collect();
        let order = LayerOrder::inferred(&types);
        let links = links.iter().map(|&(s, t)| IndexLink::new(s, t)).collect();
        Self {
            types,
            order,
            links,
        }
    }

    fn coverage(&self) -> Coverage {
        let adjacency = build_adjacency(self.types.len(), &self.links);
        let nodes = partition_by_layer(&self.types, &self.order);
        Coverage::compute(&self.order, &adjacency, &self.types, &nodes)
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

#[test]
fn two_layers_one_link() {
    let cov = Scenario::new(&["R", "A"], &[(0, 1)]).coverage();
    assert_eq!(cov.total("R"), 1);
    assert_eq!(cov.total("A"), 1);
    assert_eq!(cov.covered_down("R"), 1);
    assert_eq!(cov.covered_up("A"), 1);
    assert!(approx(cov.mass_down("R", "A"), 1.0));
    assert!(approx(cov.mass_up("A", "R"), 1.0));
}

#[test]
fn middle_node_splits_downstream_mass() {
    let cov = Scenario::new(&["M", "D", "E"], &[(0, 1), (0, 2)]).coverage();
    assert!(approx(cov.mass_down("M", "D"), 0.5));
    assert!(approx(cov.mass_down("M", "E"), 0.5));
    assert_eq!(cov.covered_down("M"), 1);
}

#[test]
fn link_direction_does_not_matter_for_coverage() {
    let forward = Scenario::new(&["R", "A"], &[(0, 1)]).coverage();
    let backward = Scenario::new(&["R", "A"], &[(1, 0)]).coverage();
    assert_eq!(forward, backward);
}

#[test]
fn out_of_range_link_is_harmless() {
    let adjacency = build_adjacency(2, &[IndexLink::new(0, 2), IndexLink::new(3, 1)]);
    assert_eq!(adjacency.edge_count(), 0);
    assert_eq!(adjacency.neighbors(0).count(), 0);
    assert_eq!(adjacency.neighbors(1).count(), 0);
}

#[test]
fn partition_keeps_relative_order() {
    let types: Vec<String> = ["B", "A", "B", "Unknown", "A", "B"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let order = LayerOrder::inferred(&types);
    let nodes = partition_by_layer(&types, &order);
    assert_eq!(nodes.get("B"), Some([0, 2, 5].as_slice()));
    assert_eq!(nodes.get("A"), Some([1, 4].as_slice()));
    assert_eq!(nodes.node_count(), 5);
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

#[test]
fn barycenter_places_b1_before_b0() {
    let s = Scenario::new(&["A", "A", "B", "B"], &[(1, 2), (0, 3)]);
    let mut nodes = partition_by_layer(&s.types, &s.order);
    reorder_by_barycenter(&mut nodes, &s.links);
    assert_eq!(nodes.get("B"), Some([3, 2].as_slice()));
}

#[test]
fn barycenter_pushes_disconnected_last() {
    let s = Scenario::new(&["A", "B", "B"], &[(0, 1)]);
    let mut nodes = partition_by_layer(&s.types, &s.order);
    reorder_by_barycenter(&mut nodes, &s.links);
    assert_eq!(nodes.get("B"), Some([1, 2].as_slice()));
}

#[test]
fn barycenter_on_empty_input() {
    let s = Scenario::new(&[], &[]);
    let mut nodes = partition_by_layer(&s.types, &s.order);
    reorder_by_barycenter(&mut nodes, &s.links);
    assert!(nodes.is_empty());
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn bands_never_exceed_their_bar() {
    let s = Scenario::new(
        &["R", "R", "A", "A", "I", "T"],
        &[(0, 2), (1, 3), (2, 4), (3, 4), (0, 5), (4, 5)],
    );
    let cov = s.coverage();
    let bars = BarLayout::compute(&s.order, &cov, &CoverageConfig::default());
    let bands = BandLayout::compute(&s.order, &bars, &cov);

    for (k, _) in s.order.iter().enumerate() {
        let top = bars.offsets[k];
        let bottom = top + bars.heights[k];
        for band in bands.up[k].iter().chain(bands.down[k].iter()).flatten() {
            assert!(band.y0 >= top - 1e-9);
            assert!(band.y1 <= bottom + 1e-9);
            assert!(band.y1 > band.y0);
        }
    }

    for ribbon in ribbons(&s.order, &cov, &bands, 12.0) {
        let from = s.order.position(&ribbon.from).expect("from layer");
        let to = s.order.position(&ribbon.to).expect("to layer");
        assert!(from < to);
        assert_eq!(ribbon.overlay, to - from > 1);
    }
}

#[test]
fn format_pct_known_values() {
    assert_eq!(format_pct(1.0, 1000.0), "<1%");
    assert_eq!(format_pct(10.0, 100.0), "10%");
    assert_eq!(format_pct(99.0, 1000.0), "9.9%");
    assert_eq!(format_pct(999.0, 1000.0), "100%");
    assert_eq!(format_pct(5.0, 1000.0), "0.5%");
    assert_eq!(format_pct(0.0, 1000.0), "");
    assert_eq!(format_pct(1.0, 0.0), "");
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn legacy_dataset_runs_through_the_pipeline() {
    let ds = Dataset::from_json_str(
        r#"{ "nodes": [
            { "id": "R1", "trace_target": "docs/req.md:Requirement", "file": "docs/req.md", "line": 2 },
            { "id": "T1", "trace_target": "tests/t.sh:Unit Test", "file": "tests/t.sh",
              "from_tags": ["R1"] }
        ] }"#,
    )
    .expect("parse legacy");
    let graph = TraceGraph::from_dataset(&ds);
    assert_eq!(graph.types, vec!["Requirement", "Unit Test"]);

    let report = TraceReport::build(&ds, &ProjectConfig::default(), 600.0);
    assert_eq!(report.layer_order.names(), ["Requirement", "Unit Test"]);
    assert_eq!(report.summary.len(), 2);
    assert_eq!(report.summary[0].downstream, vec!["Unit Test 100%"]);
    assert_eq!(report.summary[1].upstream, vec!["Requirement 100%"]);
    assert_eq!(report.summary[0].files[0].target_id, "Target_req_md");
}

#[test]
fn report_is_deterministic() {
    let json = r#"{
        "layers": [{"name": "R"}, {"name": "A"}, {"name": "I"}],
        "trace_tags": [
            {"id": "r1", "layer_id": 0}, {"id": "r2", "layer_id": 0},
            {"id": "a1", "layer_id": 1, "from_tags": ["r2"]},
            {"id": "a2", "layer_id": 1, "from_tags": ["r1"]},
            {"id": "i1", "layer_id": 2, "from_tags": ["a1", "r1"]}
        ] }"#;
    let ds = Dataset::from_json_str(json).expect("parse");
    let a = TraceReport::build(&ds, &ProjectConfig::default(), 900.0)
        .to_json()
        .expect("json");
    let b = TraceReport::build(&ds, &ProjectConfig::default(), 900.0)
        .to_json()
        .expect("json");
    assert_eq!(a, b);
}
