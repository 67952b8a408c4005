//! `kickstart init`: write a default project config store.

use std::path::Path;

use kickstart_adapters::TomlConfigStorage;
use kickstart_core::{
    application::ports::ConfigStorage,
    domain::{ConfigEntry, ConfigKey},
    error::KickstartError,
};
use tracing::instrument;

use crate::{
    cli::InitArgs,
    commands::context,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Create `.kickstart/config.toml` with the runtime's own settings.
#[instrument(skip_all, fields(root = %args.root.display()))]
pub fn execute(args: InitArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = context::project_root(&args.root)?;
    let path = config.runtime.project_config_in(&root);

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(());
    }

    let entries = default_entries(&root, &config)?;
    TomlConfigStorage::new(&path).save(&entries)?;

    output.success(&format!("Configuration created at {}", path.display()))?;
    Ok(())
}

fn default_entries(root: &Path, config: &AppConfig) -> CliResult<Vec<ConfigEntry>> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    [
        ("bootstrap.backup_existing_files", "false".to_string()),
        (
            "bootstrap.command_timeout_secs",
            config.runtime.command_timeout_secs.to_string(),
        ),
        ("project.name", project_name),
    ]
    .into_iter()
    .map(|(key, value)| {
        let key = key
            .parse::<ConfigKey>()
            .map_err(|e| CliError::Core(KickstartError::from(e)))?;
        Ok(ConfigEntry { key, value })
    })
    .collect()
}
