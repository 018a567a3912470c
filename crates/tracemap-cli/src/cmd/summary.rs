//! `tmap summary`: per-layer coverage and per-file breakdown.

use std::io::{self, Write};

use clap::Args;
use tracemap_layout::summary::LayerSummary;

use super::{DEFAULT_WIDTH, Source};
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `tmap summary`.
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    /// Omit the per-file rows.
    #[arg(long)]
    pub no_files: bool,
}

/// Execute `tmap summary`.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or output fails.
pub fn run_summary(args: &SummaryArgs, output: OutputMode, source: &Source) -> anyhow::Result<()> {
    let mut summary = source.report(DEFAULT_WIDTH)?.summary;
    if args.no_files {
        for layer in &mut summary {
            layer.files.clear();
        }
    }
    render_mode(output, summary.as_slice(), render_summary_text, render_summary_pretty)
}

fn joined(parts: &[String]) -> String {
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn render_summary_text(layers: &[LayerSummary], w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "layer\ttotal\tupstream\tdownstream")?;
    for layer in layers {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            layer.layer,
            layer.total,
            joined(&layer.upstream),
            joined(&layer.downstream)
        )?;
        for file in &layer.files {
            writeln!(
                w,
                "  {}\t{}\t{}\t{}\t{}",
                file.name,
                file.extension,
                file.version,
                or_dash(&file.up_pct),
                or_dash(&file.down_pct)
            )?;
        }
    }
    Ok(())
}

fn render_summary_pretty(layers: &[LayerSummary], w: &mut dyn Write) -> io::Result<()> {
    if layers.is_empty() {
        return writeln!(w, "No linked traceability tags found.");
    }

    for (i, layer) in layers.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        pretty_section(w, &format!("{} ({} tags)", layer.layer, layer.total))?;
        writeln!(w, "  upstream:   {}", joined(&layer.upstream))?;
        writeln!(w, "  downstream: {}", joined(&layer.downstream))?;

        if layer.files.is_empty() {
            continue;
        }
        let name_width = layer
            .files
            .iter()
            .map(|f| f.name.len())
            .max()
            .unwrap_or(4)
            .max(4);
        writeln!(
            w,
            "  {:<name_width$}  {:>6}  {:>6}  version",
            "file", "up", "down"
        )?;
        for file in &layer.files {
            writeln!(
                w,
                "  {:<name_width$}  {:>6}  {:>6}  {}",
                file.name,
                or_dash(&file.up_pct),
                or_dash(&file.down_pct),
                file.version
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracemap_layout::summary::FileCoverage;

    fn sample() -> Vec<LayerSummary> {
        vec![LayerSummary {
            layer: "Requirement".into(),
            total: 2,
            upstream: vec![],
            downstream: vec!["Architecture 50%".into()],
            files: vec![FileCoverage {
                name: "req.md".into(),
                target_id: "req".into(),
                extension: "md".into(),
                version: "git:abc1234".into(),
                total: 2,
                up: 0,
                down: 1,
                up_pct: String::new(),
                down_pct: "50%".into(),
            }],
        }]
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let mut buf = Vec::new();
        render_summary_text(&sample(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Requirement\t2\t-\tArchitecture 50%"));
        assert!(out.contains("  req.md\tmd\tgit:abc1234\t-\t50%"));
    }

    #[test]
    fn pretty_lists_layer_heading_and_files() {
        let mut buf = Vec::new();
        render_summary_pretty(&sample(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("Requirement (2 tags)\n"));
        assert!(out.contains("downstream: Architecture 50%"));
        assert!(out.contains("req.md"));
    }

    #[test]
    fn pretty_handles_empty_summary() {
        let mut buf = Vec::new();
        render_summary_pretty(&[], &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No linked"));
    }
}
