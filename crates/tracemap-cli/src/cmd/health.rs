//! `tmap health`: link coverage, isolated tags and dangling references.

use std::io::{self, Write};

use clap::Args;
use tracemap_layout::health::{HealthSummary, TagRef};

use super::{DEFAULT_WIDTH, Source};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `tmap health`.
#[derive(Args, Debug, Default)]
pub struct HealthArgs {}

/// Execute `tmap health`.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or output fails.
pub fn run_health(_args: &HealthArgs, output: OutputMode, source: &Source) -> anyhow::Result<()> {
    let health = source.report(DEFAULT_WIDTH)?.health;
    render_mode(output, &health, render_health_text, render_health_pretty)
}

fn location(tag: &TagRef) -> String {
    format!("{}:{}", tag.file, tag.line)
}

fn render_health_text(health: &HealthSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "total_tags\t{}", health.total_tags)?;
    writeln!(
        w,
        "tags_with_links\t{}\t{}%",
        health.tags_with_links, health.tags_with_links_pct
    )?;
    writeln!(
        w,
        "isolated_tags\t{}\t{}%",
        health.isolated_tags, health.isolated_pct
    )?;
    writeln!(w, "dangling_references\t{}", health.dangling_references)?;
    for tag in &health.isolated {
        writeln!(w, "isolated\t{}\t{}\t{}", tag.id, tag.layer, location(tag))?;
    }
    for dangling in &health.dangling {
        writeln!(
            w,
            "dangling\t{}\t{}\t{}",
            dangling.child.id,
            dangling.missing_parent,
            location(&dangling.child)
        )?;
    }
    Ok(())
}

fn render_health_pretty(health: &HealthSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Coverage analysis")?;
    pretty_kv(w, "Total tags", health.total_tags.to_string())?;
    pretty_kv(
        w,
        "Tags with links",
        format!("{} ({}%)", health.tags_with_links, health.tags_with_links_pct),
    )?;
    pretty_kv(
        w,
        "Isolated tags",
        format!("{} ({}%)", health.isolated_tags, health.isolated_pct),
    )?;
    pretty_kv(
        w,
        "Dangling references",
        health.dangling_references.to_string(),
    )?;
    if health.derived {
        writeln!(w, "(derived from tags; dataset carried no health block)")?;
    }

    if !health.isolated.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Isolated tags")?;
        for tag in &health.isolated {
            let layer = if tag.layer.is_empty() { "-" } else { tag.layer.as_str() };
            writeln!(w, "  {:<24} {:<16} {}", tag.id, layer, location(tag))?;
        }
    }

    if !health.dangling.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Dangling references")?;
        for dangling in &health.dangling {
            writeln!(
                w,
                "  {:<24} -> {:<24} {}",
                dangling.child.id,
                dangling.missing_parent,
                location(&dangling.child)
            )?;
        }
    }

    if health.isolated.is_empty() && health.dangling.is_empty() {
        writeln!(w)?;
        writeln!(w, "✓ no isolated tags or dangling references")?;
    }
    Ok(())
}
