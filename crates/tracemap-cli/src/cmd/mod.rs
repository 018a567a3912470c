pub mod completions;
pub mod coverage;
pub mod health;
pub mod layout;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracemap_core::config::{ProjectConfig, load_project_config};
use tracemap_layout::TraceReport;
use tracing::debug;

/// Width used when a command does not take `--width`.
pub const DEFAULT_WIDTH: f64 = 1200.0;

/// Inputs shared by every reporting command.
#[derive(Debug, Clone)]
pub struct Source {
    pub project_root: PathBuf,
    pub data: PathBuf,
    /// `--order` override; empty means "use config".
    pub order: Vec<String>,
}

impl Source {
    /// Dataset path, relative paths taken from the project root.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        if self.data.is_absolute() {
            self.data.clone()
        } else {
            self.project_root.join(&self.data)
        }
    }

    /// Project config with the `--order` override applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the effective
    /// layer order names a layer twice.
    pub fn config(&self) -> Result<ProjectConfig> {
        let mut config = load_project_config(&self.project_root)
            .with_context(|| format!("loading config under {}", self.project_root.display()))?;
        if !self.order.is_empty() {
            debug!(order = ?self.order, "layer order overridden on the command line");
            config.layers.order.clone_from(&self.order);
            config.validate().context("validating --order")?;
        }
        Ok(config)
    }

    /// Load config and dataset, then run the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or dataset cannot be loaded.
    pub fn report(&self, width: f64) -> Result<TraceReport> {
        let config = self.config()?;
        TraceReport::from_path(&self.data_path(), &config, width)
    }
}

/// Parse the `--order` value: comma separated, blanks dropped.
#[must_use]
pub fn parse_order(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|part| part.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn source(dir: &Path, order: &[&str]) -> Source {
        Source {
            project_root: dir.to_path_buf(),
            data: PathBuf::from("traceability.json"),
            order: order.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn parse_order_splits_and_trims() {
        let raw = vec!["Req, Arch".to_string(), ",Impl,".to_string()];
        assert_eq!(parse_order(&raw), vec!["Req", "Arch", "Impl"]);
    }

    #[test]
    fn relative_data_path_joins_project_root() {
        let dir = TempDir::new().unwrap();
        let src = source(dir.path(), &[]);
        assert_eq!(src.data_path(), dir.path().join("traceability.json"));
    }

    #[test]
    fn order_override_replaces_config_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".tracemap")).unwrap();
        fs::write(
            dir.path().join(".tracemap/config.toml"),
            "[layers]\norder = [\"A\", \"B\"]\n",
        )
        .unwrap();

        let config = source(dir.path(), &["B", "A"]).config().unwrap();
        assert_eq!(config.layers.order, vec!["B", "A"]);

        let config = source(dir.path(), &[]).config().unwrap();
        assert_eq!(config.layers.order, vec!["A", "B"]);
    }

    #[test]
    fn duplicate_order_override_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = source(dir.path(), &["A", "A"]).config().unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }

    #[test]
    fn missing_dataset_surfaces_dataset_error() {
        let dir = TempDir::new().unwrap();
        let err = source(dir.path(), &[]).report(DEFAULT_WIDTH).unwrap_err();
        assert!(
            err.chain()
                .any(|c| c.downcast_ref::<tracemap_core::DatasetError>().is_some())
        );
    }
}
