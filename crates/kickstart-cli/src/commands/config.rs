//! `kickstart config`: read and write the project config store.

use kickstart_adapters::load_answers;
use kickstart_core::{
    application::{ConfigStore, ports::ScriptStore},
    domain::{AnswersOverride, ConfigKey},
    error::KickstartError,
};
use tracing::instrument;

use crate::{
    cli::{ConfigArgs, ConfigCommands},
    commands::context,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
#[instrument(skip_all, fields(root = %args.root.display()))]
pub fn execute(args: ConfigArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // `path` works before the project exists; everything else opens the store.
    let open = || -> CliResult<ConfigStore> {
        let root = context::project_root(&args.root)?;
        context::config_store(&root, &config, AnswersOverride::new())
    };

    match &args.command {
        ConfigCommands::Path => {
            let path = config.runtime.project_config_in(&args.root);
            output.print(&path.display().to_string())?;
        }

        ConfigCommands::Get { key, default } => {
            let value = get_value(&open()?, key, default.as_deref())?;
            output.print(&value)?;
        }

        ConfigCommands::Set { key, value } => {
            let mut store = open()?;
            store.set(parse_key(key)?, value.clone());
            store.persist()?;
            output.success(&format!("{key} = {value:?}"))?;
        }

        ConfigCommands::List => {
            let store = open()?;
            let entries = store.entries();
            if output.is_json() {
                let map: serde_json::Map<String, serde_json::Value> = entries
                    .into_iter()
                    .map(|e| (e.key.to_string(), e.value.into()))
                    .collect();
                output.json(&map)?;
            } else if entries.is_empty() {
                output.info(&format!("No values in {}", store.location().display()))?;
            } else {
                for entry in entries {
                    output.print(&format!("{} = {:?}", entry.key, entry.value))?;
                }
            }
        }

        ConfigCommands::ImportAnswers { file } => {
            let mut store = open()?;
            let answers = load_answers(file)?;
            let scripts = context::script_store(&config)?.list()?;
            store.register_bindings(scripts.iter().flat_map(|s| s.variables.iter()));
            let written = store.update_from_answers(&answers)?;
            store.persist()?;
            output.success(&format!(
                "Imported {} value(s) into {}",
                written.len(),
                store.location().display()
            ))?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn parse_key(raw: &str) -> CliResult<ConfigKey> {
    raw.parse::<ConfigKey>()
        .map_err(|e| CliError::Core(KickstartError::from(e)))
}

fn get_value(store: &ConfigStore, key: &str, default: Option<&str>) -> CliResult<String> {
    let parsed = parse_key(key)?;
    match (store.lookup(&parsed), default) {
        (Some(value), _) => Ok(value.to_string()),
        (None, Some(default)) => Ok(default.to_string()),
        (None, None) => Err(CliError::KeyNotSet {
            key: key.to_string(),
            store: store.location(),
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_adapters::MemoryConfigStorage;

    fn store(pairs: &[(&str, &str)]) -> ConfigStore {
        let storage = MemoryConfigStorage::with_entries(pairs).unwrap();
        ConfigStore::load(Box::new(storage), AnswersOverride::new()).unwrap()
    }

    #[test]
    fn get_known_key() {
        let s = store(&[("cicd.provider", "gitlab")]);
        assert_eq!(get_value(&s, "cicd.provider", None).unwrap(), "gitlab");
    }

    #[test]
    fn get_unset_key_uses_default() {
        let s = store(&[]);
        assert_eq!(get_value(&s, "cicd.provider", Some("github")).unwrap(), "github");
    }

    #[test]
    fn get_unset_key_without_default_is_not_found() {
        let s = store(&[]);
        let err = get_value(&s, "cicd.provider", None).unwrap_err();
        assert!(matches!(err, CliError::KeyNotSet { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn malformed_key_is_configuration_error() {
        let err = parse_key("not a key").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
