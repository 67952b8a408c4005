//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns it; the core crate never sees it.  Script settings do not
//! live here: they belong to the per-project store under `.kickstart/`.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `KICKSTART_OUTPUT__FORMAT`, `KICKSTART_RUNTIME__SCRIPTS_DIR`, ...
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::OutputFormat;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output settings.
    pub output: OutputConfig,
    /// How scripts are found and run.
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bound on a single external command unless the project store sets
    /// `bootstrap.command_timeout_secs`.
    pub command_timeout_secs: u64,
    /// Extra directory of `script.toml` scripts, loaded after the built-ins.
    pub scripts_dir: Option<PathBuf>,
    /// Location of the project config store, relative to the project root.
    pub project_config: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 120,
            scripts_dir: None,
            project_config: PathBuf::from(".kickstart/config.toml"),
        }
    }
}

impl RuntimeConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Project store path for `root`.
    pub fn project_config_in(&self, root: &Path) -> PathBuf {
        root.join(&self.project_config)
    }
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// An explicit `config_file` must exist; the platform default may not.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "Loading app configuration");

        Config::builder()
            .add_source(File::from(path.as_path()).required(required))
            .add_source(
                Environment::with_prefix("KICKSTART")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| format!("Invalid configuration (file: {})", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kickstart.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "kickstart", "kickstart")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kickstart.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_runtime_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.runtime.command_timeout(), Duration::from_secs(120));
        assert_eq!(
            cfg.runtime.project_config_in(Path::new("/p")),
            PathBuf::from("/p/.kickstart/config.toml")
        );
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kickstart.toml");
        std::fs::write(
            &path,
            "[runtime]\ncommand_timeout_secs = 30\nscripts_dir = \"/opt/scripts\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.runtime.command_timeout_secs, 30);
        assert_eq!(cfg.runtime.scripts_dir, Some(PathBuf::from("/opt/scripts")));
        assert_eq!(cfg.runtime.project_config, PathBuf::from(".kickstart/config.toml"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn config_path_is_non_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
