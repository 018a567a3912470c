//! Project and user configuration.
//!
//! Project settings live in `<project>/.tracemap/config.toml`; every table
//! and key is optional and falls back to the defaults below. User settings
//! live in `<config dir>/tracemap/config.toml` and currently only choose the
//! default output format.
//!
//! ```toml
//! [layers]
//! order = ["Requirement", "Architecture", "Implementation", "Unit Test"]
//!
//! [coverage]
//! height_per_node = 15
//! max_bar_height = 200
//!
//! [flow]
//! node_height = 24
//! ```

use std::collections::HashSet;
use std::env;
use std::io::IsTerminal;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Directory (relative to the project root) holding project configuration.
pub const PROJECT_CONFIG_DIR: &str = ".tracemap";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub layers: LayerOrderConfig,
    #[serde(default)]
    pub coverage: CoverageConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerOrderConfig {
    /// Explicit upstream → downstream layer order. When empty, order is
    /// inferred from first appearance in the dataset.
    #[serde(default)]
    pub order: Vec<String>,
}

/// Geometry for the layer-coverage (parallel sets) diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    #[serde(default = "default_height_per_node")]
    pub height_per_node: f64,
    #[serde(default = "default_min_bar_height")]
    pub min_bar_height: f64,
    #[serde(default = "default_max_bar_height")]
    pub max_bar_height: f64,
    #[serde(default = "default_bar_spacing")]
    pub bar_spacing: f64,
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    #[serde(default = "default_max_height")]
    pub max_height: f64,
    /// Ribbons thinner than this at either end get no percentage label.
    #[serde(default = "default_label_min_band")]
    pub label_min_band: f64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            height_per_node: default_height_per_node(),
            min_bar_height: default_min_bar_height(),
            max_bar_height: default_max_bar_height(),
            bar_spacing: default_bar_spacing(),
            bar_width: default_bar_width(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            label_min_band: default_label_min_band(),
        }
    }
}

/// Geometry for the tag-level flow diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_node_height")]
    pub node_height: f64,
    #[serde(default = "default_node_gap")]
    pub node_gap: f64,
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_top_padding")]
    pub top_padding: f64,
    #[serde(default = "default_bottom_padding")]
    pub bottom_padding: f64,
    #[serde(default = "default_side_padding")]
    pub side_padding: f64,
    /// Extra room kept below the lowest node when fitting the canvas.
    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            node_height: default_node_height(),
            node_gap: default_node_gap(),
            node_width: default_node_width(),
            top_padding: default_top_padding(),
            bottom_padding: default_bottom_padding(),
            side_padding: default_side_padding(),
            fit_padding: default_fit_padding(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_unknown_color")]
    pub unknown: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            unknown: default_unknown_color(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

impl ProjectConfig {
    /// Reject layer orders that list a name twice.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateLayer`] naming the first repeat.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for name in &self.layers.order {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateLayer(name.clone()));
            }
        }
        Ok(())
    }
}

/// Load `<project_root>/.tracemap/config.toml`, or defaults when absent.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, does not parse, or
/// names a layer twice.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = project_root.join(PROJECT_CONFIG_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let config = toml::from_str::<ProjectConfig>(&content)
        .map_err(|source| ConfigError::Parse { path, source })?;
    config.validate()?;
    Ok(config)
}

/// Load the per-user config, or defaults when there is none.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("tracemap/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    toml::from_str::<UserConfig>(&content).map_err(|source| ConfigError::Parse { path, source })
}

/// Resolve project + user config and the effective output format.
///
/// # Errors
///
/// Propagates configuration load failures.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_json,
        user.output.clone(),
        env_format,
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Pick the output format: `--json` > `FORMAT` env > user config > TTY default.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty { "pretty" } else { "text" }.to_string()
}

const fn default_height_per_node() -> f64 {
    15.0
}

const fn default_min_bar_height() -> f64 {
    30.0
}

const fn default_max_bar_height() -> f64 {
    200.0
}

const fn default_bar_spacing() -> f64 {
    15.0
}

const fn default_bar_width() -> f64 {
    16.0
}

const fn default_min_height() -> f64 {
    150.0
}

const fn default_max_height() -> f64 {
    800.0
}

const fn default_label_min_band() -> f64 {
    12.0
}

const fn default_node_height() -> f64 {
    24.0
}

const fn default_node_gap() -> f64 {
    6.0
}

const fn default_node_width() -> f64 {
    20.0
}

const fn default_top_padding() -> f64 {
    20.0
}

const fn default_bottom_padding() -> f64 {
    60.0
}

const fn default_side_padding() -> f64 {
    20.0
}

const fn default_fit_padding() -> f64 {
    40.0
}

fn default_palette() -> Vec<String> {
    [
        "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#95a5a6",
        "#34495e", "#c0392b",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_unknown_color() -> String {
    "#7f8c8d".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::TempDir::new().expect("tempdir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.layers.order.is_empty());
        assert!((cfg.coverage.height_per_node - 15.0).abs() < f64::EPSILON);
        assert!((cfg.coverage.max_bar_height - 200.0).abs() < f64::EPSILON);
        assert!((cfg.flow.node_height - 24.0).abs() < f64::EPSILON);
        assert_eq!(cfg.colors.palette.len(), 10);
        assert_eq!(cfg.colors.unknown, "#7f8c8d");
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let root = tempfile::TempDir::new().expect("tempdir");
        let dir = root.path().join(PROJECT_CONFIG_DIR);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(
            dir.join("config.toml"),
            "[layers]\norder = [\"Requirement\", \"Test\"]\n\n[coverage]\nmax_bar_height = 120\n",
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load");
        assert_eq!(cfg.layers.order, vec!["Requirement", "Test"]);
        assert!((cfg.coverage.max_bar_height - 120.0).abs() < f64::EPSILON);
        assert!((cfg.coverage.min_bar_height - 30.0).abs() < f64::EPSILON);
        assert_eq!(cfg.flow, FlowConfig::default());
    }

    #[test]
    fn malformed_project_config_is_parse_error() {
        let root = tempfile::TempDir::new().expect("tempdir");
        let dir = root.path().join(PROJECT_CONFIG_DIR);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join("config.toml"), "[layers\norder = 3").expect("write");

        let err = load_project_config(root.path()).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn duplicate_layer_in_order_is_rejected() {
        let cfg = ProjectConfig {
            layers: LayerOrderConfig {
                order: vec!["A".into(), "B".into(), "A".into()],
            },
            ..ProjectConfig::default()
        };
        let err = cfg.validate().expect_err("duplicate");
        assert!(matches!(err, ConfigError::DuplicateLayer(ref name) if name == "A"));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("pretty".into()), Some("text".into()), true);
        assert_eq!(output, "json");
    }

    #[test]
    fn env_beats_user_config() {
        let output = resolve_output(false, Some("json".into()), Some("text".into()), true);
        assert_eq!(output, "text");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        assert_eq!(resolve_output(false, Some("table".into()), Some("human".into()), false), "pretty");
        assert_eq!(resolve_output(false, Some("human".into()), Some("table".into()), false), "text");
    }

    #[test]
    fn tty_decides_when_nothing_is_set() {
        assert_eq!(resolve_output(false, None, None, true), "pretty");
        assert_eq!(resolve_output(false, None, Some("bogus".into()), false), "text");
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\n").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
