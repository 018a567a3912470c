//! `tmap layout`: full report JSON for the diagram renderer.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use super::{DEFAULT_WIDTH, Source};

/// Arguments for `tmap layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Diagram width in pixels.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: f64,

    /// Write the JSON to this file instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Execute `tmap layout`.
///
/// The report is always JSON; it is the renderer's input, not a summary.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded, the width is not a
/// positive number, or writing fails.
pub fn run_layout(args: &LayoutArgs, source: &Source) -> anyhow::Result<()> {
    if !(args.width.is_finite() && args.width > 0.0) {
        anyhow::bail!("--width must be a positive number, got {}", args.width);
    }

    let report = source.report(args.width)?;
    let json = report.to_json().context("serializing layout report")?;

    match &args.out {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), hash = %report.content_hash, "layout written");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
