//! `tmap coverage`: per-layer totals, covered counts and bar geometry.

use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use tracemap_layout::TraceReport;

use super::{DEFAULT_WIDTH, Source};
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `tmap coverage`.
#[derive(Args, Debug, Default)]
pub struct CoverageArgs {}

#[derive(Debug, Serialize)]
struct CoverageRow {
    layer: String,
    total: usize,
    covered_up: usize,
    covered_down: usize,
    up_pct: String,
    down_pct: String,
    bar_height: f64,
    bar_offset: f64,
    connections: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CoverageOutput {
    empty: bool,
    canvas_height: f64,
    layers: Vec<CoverageRow>,
}

impl CoverageOutput {
    fn from_report(report: TraceReport) -> Self {
        let view = report.coverage;
        let layers = view
            .columns
            .into_iter()
            .map(|c| CoverageRow {
                layer: c.layer,
                total: c.total,
                covered_up: c.covered_up,
                covered_down: c.covered_down,
                up_pct: c.up_pct,
                down_pct: c.down_pct,
                bar_height: c.bar_height,
                bar_offset: c.bar_offset,
                connections: c.connections,
            })
            .collect();
        Self {
            empty: view.empty,
            canvas_height: view.inner_height,
            layers,
        }
    }
}

/// Execute `tmap coverage`.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or output fails.
pub fn run_coverage(
    _args: &CoverageArgs,
    output: OutputMode,
    source: &Source,
) -> anyhow::Result<()> {
    let payload = CoverageOutput::from_report(source.report(DEFAULT_WIDTH)?);
    render_mode(output, &payload, render_coverage_text, render_coverage_pretty)
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn render_coverage_text(report: &CoverageOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "layer\ttotal\tcovered_up\tcovered_down\tup_pct\tdown_pct\tbar_height\tbar_offset"
    )?;
    for row in &report.layers {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.1}\t{:.1}",
            row.layer,
            row.total,
            row.covered_up,
            row.covered_down,
            or_dash(&row.up_pct),
            or_dash(&row.down_pct),
            row.bar_height,
            row.bar_offset
        )?;
    }
    Ok(())
}

fn render_coverage_pretty(report: &CoverageOutput, w: &mut dyn Write) -> io::Result<()> {
    if report.empty {
        return writeln!(w, "No traceability tags found.");
    }

    pretty_section(w, "Layer coverage")?;
    writeln!(
        w,
        "{:<20} {:>6} {:>10} {:>6} {:>10} {:>6}  linked to",
        "layer", "total", "upstream", "", "downstream", ""
    )?;
    for row in &report.layers {
        let links = if row.connections.is_empty() {
            "-".to_string()
        } else {
            row.connections.join(", ")
        };
        writeln!(
            w,
            "{:<20} {:>6} {:>10} {:>6} {:>10} {:>6}  {}",
            row.layer,
            row.total,
            row.covered_up,
            or_dash(&row.up_pct),
            row.covered_down,
            or_dash(&row.down_pct),
            links
        )?;
    }
    writeln!(w)?;
    writeln!(w, "canvas height: {:.0}px", report.canvas_height)
}
