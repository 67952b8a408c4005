//! Wiring shared by the commands: the script catalogue, the orchestrator
//! with real adapters, the project root and its config store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use kickstart_adapters::{
    FilesystemScriptLoader, InMemoryStore, LocalFilesystem, ProcessRunner, StrictRenderer,
    SystemClock, SystemToolProbe, TomlConfigStorage, load_answers,
};
use kickstart_core::{
    application::{ApplicationError, ConfigStore, ScriptOrchestrator, ports::ScriptStore},
    domain::AnswersOverride,
    error::KickstartError,
};

use crate::{config::AppConfig, error::CliResult};

/// Answers file picked up from the project when none is given.
pub const DEFAULT_ANSWERS_FILE: &str = ".kickstart/answers.env";

/// Built-in scripts, then any from `runtime.scripts_dir`.
#[instrument(skip_all)]
pub fn script_store(config: &AppConfig) -> CliResult<InMemoryStore> {
    let store = InMemoryStore::with_builtin()?;
    if let Some(dir) = &config.runtime.scripts_dir {
        let loaded = FilesystemScriptLoader::new(dir).load_all()?;
        info!(dir = %dir.display(), count = loaded.len(), "Loaded extra scripts");
        for definition in loaded {
            store.insert(definition)?;
        }
    }
    Ok(store)
}

/// Orchestrator over the local machine.
pub fn orchestrator(config: &AppConfig) -> CliResult<ScriptOrchestrator> {
    let store = script_store(config)?;
    Ok(ScriptOrchestrator::new(
        Arc::new(store),
        Arc::new(LocalFilesystem::new()),
        Box::new(SystemToolProbe::new()),
        Box::new(ProcessRunner::new()),
        Box::new(StrictRenderer::new()),
        Arc::new(SystemClock),
    )
    .with_default_timeout(config.runtime.command_timeout()))
}

/// Absolute project root. It must already exist.
pub fn project_root(root: &Path) -> CliResult<PathBuf> {
    let resolved = root.canonicalize().map_err(|e| {
        KickstartError::from(ApplicationError::TargetDirectory {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })
    })?;
    debug!(root = %resolved.display(), "Project root resolved");
    Ok(resolved)
}

/// Answers for this invocation: the explicit file if given, else the
/// project's default file if present, else none.
pub fn answers(root: &Path, explicit: Option<&Path>) -> CliResult<AnswersOverride> {
    if let Some(path) = explicit {
        return Ok(load_answers(path)?);
    }
    let default = root.join(DEFAULT_ANSWERS_FILE);
    if default.is_file() {
        debug!(path = %default.display(), "Using project answers file");
        return Ok(load_answers(&default)?);
    }
    Ok(AnswersOverride::new())
}

/// The project config store with this invocation's answers on top.
pub fn config_store(
    root: &Path,
    config: &AppConfig,
    answers: AnswersOverride,
) -> CliResult<ConfigStore> {
    let storage = TomlConfigStorage::new(config.runtime.project_config_in(root));
    Ok(ConfigStore::load(Box::new(storage), answers)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_target_directory_error() {
        let dir = TempDir::new().unwrap();
        let err = project_root(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn answers_default_file_is_optional() {
        let dir = TempDir::new().unwrap();
        assert!(answers(dir.path(), None).unwrap().is_empty());

        std::fs::create_dir(dir.path().join(".kickstart")).unwrap();
        std::fs::write(dir.path().join(DEFAULT_ANSWERS_FILE), "CICD_PROVIDER=gitlab\n").unwrap();
        let found = answers(dir.path(), None).unwrap();
        assert_eq!(found.get("CICD_PROVIDER"), Some("gitlab"));
    }

    #[test]
    fn extra_scripts_join_the_builtins() {
        let dir = TempDir::new().unwrap();
        let script_dir = dir.path().join("x");
        std::fs::create_dir(&script_dir).unwrap();
        std::fs::write(
            script_dir.join("script.toml"),
            "[script]\nname = \"x\"\nphase = 1\ncreates = [\"x.yml\"]\n\n\
             [[files]]\npath = \"x.yml\"\ncontent = \"x: 1\\n\"\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.runtime.scripts_dir = Some(dir.path().to_path_buf());
        let store = script_store(&config).unwrap();
        assert!(store.contains("x"));
        assert!(store.contains("bootstrap-git"));
    }
}
