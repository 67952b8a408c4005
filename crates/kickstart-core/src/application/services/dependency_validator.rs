//! Gate each script on its declared requirements.
//!
//! Validation runs before any artifact of the script is touched. Required
//! tools and predecessors are fatal when unmet; optional tools and conflicts
//! only produce warnings.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, ScriptStore, ToolProbe},
        services::{config_store::ConfigStore, session::Session},
    },
    domain::{ConfigKey, ScriptManifest, ToolRequirement},
    error::KickstartResult,
};

/// Result of validating one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The script may run. Warnings go into its report.
    Ready { warnings: Vec<String> },
    /// Turned off via `scripts.<name>.enabled = false`.
    Disabled,
}

pub struct DependencyValidator {
    probe: Box<dyn ToolProbe>,
    filesystem: Arc<dyn Filesystem>,
    store: Arc<dyn ScriptStore>,
}

impl DependencyValidator {
    pub fn new(
        probe: Box<dyn ToolProbe>,
        filesystem: Arc<dyn Filesystem>,
        store: Arc<dyn ScriptStore>,
    ) -> Self {
        Self {
            probe,
            filesystem,
            store,
        }
    }

    #[instrument(skip_all, fields(script = %manifest.name, session = %session.id()))]
    pub fn validate(
        &self,
        manifest: &ScriptManifest,
        session: &Session,
        root: &Path,
        config: &ConfigStore,
    ) -> KickstartResult<ValidationOutcome> {
        let enabled_key: ConfigKey = format!("scripts.{}.enabled", manifest.name).parse()?;
        if !config.get_bool(&enabled_key, true) {
            debug!("Script disabled by configuration");
            return Ok(ValidationOutcome::Disabled);
        }

        for tool in &manifest.requires.tools {
            if let Err(reason) = self.check_tool(tool) {
                return Err(ApplicationError::MissingTool {
                    script: manifest.name.clone(),
                    tool: tool.to_string(),
                    reason,
                }
                .into());
            }
        }

        for predecessor in &manifest.requires.scripts {
            self.check_predecessor(manifest, predecessor, session, root)?;
        }

        let mut warnings = Vec::new();
        for tool in &manifest.requires.optional {
            if let Err(reason) = self.check_tool(tool) {
                warn!(tool = %tool, %reason, "Optional tool unavailable");
                warnings.push(format!("optional tool '{tool}' unavailable: {reason}"));
            }
        }

        for other in &manifest.conflicts {
            if session.is_completed(other) {
                warnings.push(format!("conflicting script '{other}' already ran in this session"));
            } else if self.has_artifacts(other, root) {
                warnings.push(format!("artifacts of conflicting script '{other}' found"));
            }
        }

        Ok(ValidationOutcome::Ready { warnings })
    }

    fn check_tool(&self, tool: &ToolRequirement) -> Result<(), String> {
        let Some(info) = self.probe.probe(tool) else {
            return Err("not found on PATH".into());
        };
        let Some(range) = tool.version_req() else {
            return Ok(());
        };
        match info.version {
            None => Err(format!("version could not be determined (need {range})")),
            Some(found) if tool.accepts(&found) => Ok(()),
            Some(found) => Err(format!("found {found}, need {range}")),
        }
    }

    fn check_predecessor(
        &self,
        manifest: &ScriptManifest,
        predecessor: &str,
        session: &Session,
        root: &Path,
    ) -> KickstartResult<()> {
        if session.is_completed(predecessor) {
            return Ok(());
        }

        let missing = || -> KickstartResult<()> {
            Err(ApplicationError::MissingPredecessor {
                script: manifest.name.clone(),
                predecessor: predecessor.to_string(),
            }
            .into())
        };

        if !self.store.contains(predecessor) {
            return missing();
        }
        if manifest.idempotent && self.all_artifacts_present(predecessor, root)? {
            debug!(predecessor, "Predecessor satisfied by on-disk artifacts");
            return Ok(());
        }
        missing()
    }

    fn all_artifacts_present(&self, script: &str, root: &Path) -> KickstartResult<bool> {
        let definition = self.store.get(script)?;
        let creates = &definition.manifest.creates;
        Ok(!creates.is_empty()
            && creates
                .iter()
                .all(|a| self.filesystem.exists(&root.join(a.path.as_path()))))
    }

    fn has_artifacts(&self, script: &str, root: &Path) -> bool {
        self.store.get(script).is_ok_and(|definition| {
            definition
                .manifest
                .creates
                .iter()
                .any(|a| self.filesystem.exists(&root.join(a.path.as_path())))
        })
    }
}
