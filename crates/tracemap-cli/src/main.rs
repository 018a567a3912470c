#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tmap: requirements traceability coverage and diagram layout",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Traceability dataset produced by the tag extractor.
    #[arg(long, global = true, default_value = "traceability.json")]
    data: PathBuf,

    /// Layer order, upstream first (comma separated). Overrides config.
    #[arg(long, global = true, value_delimiter = ',')]
    order: Vec<String>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Per-layer upstream/downstream coverage",
        long_about = "Show, for every linked layer, the share of its tags reached from each \
                      other layer, plus a per-file breakdown.",
        after_help = "EXAMPLES:\n    # Summary for ./traceability.json\n    tmap summary\n\n    # Explicit layer order\n    tmap summary --order Requirement,Architecture,Implementation\n\n    # Emit machine-readable output\n    tmap summary --format json"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        about = "Tag link health",
        long_about = "Show linked, isolated and dangling tag counts with the offending tags.",
        after_help = "EXAMPLES:\n    # Health report\n    tmap health\n\n    # Emit machine-readable output\n    tmap health --json"
    )]
    Health(cmd::health::HealthArgs),

    #[command(
        about = "Layer coverage and bar geometry",
        long_about = "Show per-layer totals, covered counts, percentages and the bar layout \
                      of the layer-coverage diagram.",
        after_help = "EXAMPLES:\n    # Coverage table\n    tmap coverage\n\n    # Tab-separated rows\n    tmap coverage --format text"
    )]
    Coverage(cmd::coverage::CoverageArgs),

    #[command(
        about = "Full layout JSON for the renderer",
        long_about = "Run the whole pipeline and emit the diagram layout report as JSON.",
        after_help = "EXAMPLES:\n    # Print to stdout\n    tmap layout --width 1400\n\n    # Write to a file\n    tmap layout --out report.json"
    )]
    Layout(cmd::layout::LayoutArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    tmap completions bash > /etc/bash_completion.d/tmap"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TRACEMAP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tracemap=debug,info"
        } else {
            "tracemap=info,warn"
        })
    });

    let format = env::var("TRACEMAP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    let source = cmd::Source {
        project_root: env::current_dir()?,
        data: cli.data,
        order: cmd::parse_order(&cli.order),
    };
    debug!(data = %source.data.display(), ?output, "starting");

    match cli.command {
        Commands::Summary(args) => cmd::summary::run_summary(&args, output, &source),
        Commands::Health(args) => cmd::health::run_health(&args, output, &source),
        Commands::Coverage(args) => cmd::coverage::run_coverage(&args, output, &source),
        Commands::Layout(args) => cmd::layout::run_layout(&args, &source),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error = CliError::from_anyhow(&err);
            if let Err(render_err) = render_error(output, &error) {
                eprintln!("error: {err:#} (while reporting: {render_err})");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_traceability_json() {
        let cli = Cli::parse_from(["tmap", "summary"]);
        assert_eq!(cli.data, PathBuf::from("traceability.json"));
        assert!(cli.order.is_empty());
        assert!(cli.format.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "tmap",
            "health",
            "--data",
            "out/t.json",
            "--format",
            "text",
            "-v",
        ]);
        assert_eq!(cli.data, PathBuf::from("out/t.json"));
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Health(_)));
    }

    #[test]
    fn order_is_comma_delimited() {
        let cli = Cli::parse_from(["tmap", "--order", "Req,Arch,Impl", "coverage"]);
        assert_eq!(cli.order, vec!["Req", "Arch", "Impl"]);
    }

    #[test]
    fn hidden_json_flag_parses() {
        let cli = Cli::parse_from(["tmap", "summary", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn layout_width_defaults() {
        let cli = Cli::parse_from(["tmap", "layout"]);
        match cli.command {
            Commands::Layout(args) => {
                assert!((args.width - cmd::DEFAULT_WIDTH).abs() < f64::EPSILON);
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tmap", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Zsh,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["tmap", "summary"],
            vec!["tmap", "summary", "--no-files"],
            vec!["tmap", "health"],
            vec!["tmap", "coverage"],
            vec!["tmap", "layout", "--width", "900"],
            vec!["tmap", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
