//! Script Orchestrator - main application service.
//!
//! This service coordinates a bootstrap run:
//! 1. Plan: resolve the selection and order it by phase and dependencies
//! 2. Validate each script's requirements
//! 3. Render its templates (all of them, before any write)
//! 4. Write artifacts through the file tracker
//! 5. Run post-commands
//!
//! Execution is strictly sequential. The first fatal error stops the run.
//! Nothing is rolled back automatically.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{
            Clock, CommandInvocation, CommandOutput, CommandRunner, Filesystem, ScriptStore,
            TemplateRenderer, ToolProbe,
        },
        services::{
            config_store::ConfigStore,
            dependency_validator::{DependencyValidator, ValidationOutcome},
            file_tracker::FileOperationTracker,
            session::Session,
        },
    },
    domain::{
        CommandSpec, ConfigKey, DomainError, ExecutionPlan, ExecutionReport, ProjectFields,
        RenderContext, ReportCounts, ScriptDefinition, ScriptManifest, WritePolicy,
        order_scripts,
    },
    error::{KickstartError, KickstartResult},
};

/// Default bound on a single external command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

const BACKUP_KEY: &str = "bootstrap.backup_existing_files";
const TIMEOUT_KEY: &str = "bootstrap.command_timeout_secs";
const PROJECT_NAME_KEY: &str = "project.name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStatus {
    Completed,
    Disabled,
    Failed,
}

/// Outcome of one script within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRun {
    pub name: String,
    pub status: ScriptStatus,
    pub report: ExecutionReport,
    /// Post-commands that actually ran.
    pub commands: Vec<String>,
}

/// Everything a run did, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub session_id: Uuid,
    pub scripts: Vec<ScriptRun>,
}

impl RunSummary {
    fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            scripts: Vec::new(),
        }
    }

    /// Every script's records and notes in one report, in run order.
    pub fn combined_report(&self) -> ExecutionReport {
        self.scripts
            .iter()
            .fold(ExecutionReport::new(), |mut all, script| {
                all.merge(script.report.clone());
                all
            })
    }

    pub fn totals(&self) -> ReportCounts {
        self.combined_report().counts()
    }

    pub fn completed(&self) -> impl Iterator<Item = &ScriptRun> {
        self.scripts
            .iter()
            .filter(|s| s.status == ScriptStatus::Completed)
    }
}

/// A run stopped by a fatal error, with what it did before stopping.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub summary: RunSummary,
    #[source]
    pub error: KickstartError,
}

/// Dry-run verdict for one planned script.
#[derive(Debug, Clone)]
pub enum CheckStatus {
    Ready { warnings: Vec<String> },
    Disabled,
    Blocked { error: KickstartError },
}

#[derive(Debug, Clone)]
pub struct ScriptCheck {
    pub name: String,
    pub status: CheckStatus,
}

impl ScriptCheck {
    pub fn is_blocked(&self) -> bool {
        matches!(self.status, CheckStatus::Blocked { .. })
    }
}

/// Main orchestration service.
pub struct ScriptOrchestrator {
    store: Arc<dyn ScriptStore>,
    filesystem: Arc<dyn Filesystem>,
    validator: DependencyValidator,
    tracker: FileOperationTracker,
    runner: Box<dyn CommandRunner>,
    renderer: Box<dyn TemplateRenderer>,
    clock: Arc<dyn Clock>,
    default_timeout: Duration,
}

impl ScriptOrchestrator {
    /// Create a new orchestrator with the given adapters.
    pub fn new(
        store: Arc<dyn ScriptStore>,
        filesystem: Arc<dyn Filesystem>,
        probe: Box<dyn ToolProbe>,
        runner: Box<dyn CommandRunner>,
        renderer: Box<dyn TemplateRenderer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            validator: DependencyValidator::new(probe, filesystem.clone(), store.clone()),
            tracker: FileOperationTracker::new(filesystem.clone(), clock.clone()),
            store,
            filesystem,
            runner,
            renderer,
            clock,
            default_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Timeout used when the project config does not set one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// All registered scripts, in registration order.
    pub fn scripts(&self) -> KickstartResult<Vec<ScriptDefinition>> {
        self.store.list()
    }

    /// Resolve a selection into an ordered plan.
    ///
    /// An empty `only` selects every registered script, except that a script
    /// conflicting with an earlier-registered selected one is left out.
    /// Naming both sides of a conflict in `only` is an error. Names in `only`
    /// and `skip` must all be known.
    #[instrument(skip(self))]
    pub fn plan(&self, only: &[String], skip: &[String]) -> KickstartResult<ExecutionPlan> {
        let all = self.store.list()?;
        let known: HashSet<&str> = all.iter().map(ScriptDefinition::name).collect();

        if let Some(name) = only
            .iter()
            .chain(skip)
            .find(|n| !known.contains(n.as_str()))
        {
            return Err(DomainError::UnknownScript { name: name.clone() }.into());
        }

        let mut selected: Vec<&ScriptManifest> = Vec::new();
        for manifest in all
            .iter()
            .filter(|d| only.is_empty() || only.iter().any(|o| o == d.name()))
            .filter(|d| !skip.iter().any(|s| s == d.name()))
            .map(|d| &d.manifest)
        {
            if only.is_empty() {
                let clash = selected.iter().find(|earlier| {
                    earlier.conflicts.contains(&manifest.name)
                        || manifest.conflicts.contains(&earlier.name)
                });
                if let Some(earlier) = clash {
                    warn!(
                        script = %manifest.name,
                        kept = %earlier.name,
                        "Left out of the default selection: conflicts with an earlier script"
                    );
                    continue;
                }
            }
            selected.push(manifest);
        }

        let plan = order_scripts(&selected)?;
        info!(scripts = plan.len(), "Plan ready");
        Ok(plan)
    }

    /// Execute a plan against a project root.
    #[instrument(skip(self, plan, config), fields(root = %root.display()))]
    pub fn run(
        &self,
        root: &Path,
        plan: &ExecutionPlan,
        config: &ConfigStore,
    ) -> Result<RunSummary, RunFailure> {
        let mut session = Session::new();
        let mut summary = RunSummary::new(session.id());

        if let Err(error) = self.tracker.ensure_root(root) {
            return Err(RunFailure { summary, error });
        }

        for name in plan.names() {
            let mut run = ScriptRun {
                name: name.to_string(),
                status: ScriptStatus::Failed,
                report: ExecutionReport::new(),
                commands: Vec::new(),
            };

            let result = self.store.get(name).and_then(|definition| {
                self.run_script(&definition, root, &session, config, &mut run)
            });

            match result {
                Ok(status) => {
                    run.status = status;
                    if status == ScriptStatus::Completed {
                        session.mark_completed(name);
                    }
                    summary.scripts.push(run);
                }
                Err(error) => {
                    warn!(script = name, %error, "Script failed, stopping run");
                    summary.scripts.push(run);
                    return Err(RunFailure { summary, error });
                }
            }
        }

        let totals = summary.totals();
        info!(
            created = totals.created,
            skipped = totals.skipped,
            backed_up = totals.backed_up,
            warnings = totals.warnings,
            "Run finished"
        );
        Ok(summary)
    }

    #[instrument(skip_all, fields(script = %definition.name()))]
    fn run_script(
        &self,
        definition: &ScriptDefinition,
        root: &Path,
        session: &Session,
        config: &ConfigStore,
        run: &mut ScriptRun,
    ) -> KickstartResult<ScriptStatus> {
        let manifest = &definition.manifest;

        match self.validator.validate(manifest, session, root, config)? {
            ValidationOutcome::Disabled => {
                info!("Disabled, skipping");
                return Ok(ScriptStatus::Disabled);
            }
            ValidationOutcome::Ready { warnings } => {
                for w in warnings {
                    run.report.warn(w);
                }
            }
        }

        let context = self.render_context(definition, root, config)?;
        let rendered = self.render_files(definition, &context)?;

        let policy = WritePolicy {
            auto_backup: config.get_bool(&config_key(BACKUP_KEY)?, false),
            tolerant: manifest.safe,
        };

        for dir in &definition.directories {
            self.tracker.ensure_dir(root, dir, policy, &mut run.report)?;
        }
        for (file, body) in definition.files.iter().zip(&rendered) {
            self.tracker.write_file(
                root,
                &file.path,
                body,
                file.permissions,
                policy,
                &mut run.report,
            )?;
        }

        let timeout = Duration::from_secs(
            config.get_u64(&config_key(TIMEOUT_KEY)?, self.default_timeout.as_secs()),
        );
        for command in &definition.commands {
            if let Some(ran) = self.run_command(definition, command, root, &context, timeout)? {
                run.commands.push(ran);
            }
        }

        Ok(ScriptStatus::Completed)
    }

    /// Validate every planned script without writing anything.
    ///
    /// Scripts are assumed to succeed in plan order, so a dependency on an
    /// earlier planned script counts as met. A blocked script does not.
    #[instrument(skip(self, plan, config), fields(root = %root.display()))]
    pub fn check(
        &self,
        root: &Path,
        plan: &ExecutionPlan,
        config: &ConfigStore,
    ) -> KickstartResult<Vec<ScriptCheck>> {
        self.tracker.ensure_root(root)?;
        let mut session = Session::new();
        let mut checks = Vec::with_capacity(plan.len());

        for name in plan.names() {
            let definition = self.store.get(name)?;
            let status = match self
                .validator
                .validate(&definition.manifest, &session, root, config)
            {
                Ok(ValidationOutcome::Disabled) => CheckStatus::Disabled,
                Ok(ValidationOutcome::Ready { warnings }) => {
                    let rendered = self
                        .render_context(&definition, root, config)
                        .and_then(|context| self.render_files(&definition, &context));
                    match rendered {
                        Ok(_) => {
                            session.mark_completed(name);
                            CheckStatus::Ready { warnings }
                        }
                        Err(error) => CheckStatus::Blocked { error },
                    }
                }
                Err(error) => CheckStatus::Blocked { error },
            };
            checks.push(ScriptCheck {
                name: name.to_string(),
                status,
            });
        }

        Ok(checks)
    }

    /// Run a script's declared rollback command in the project root.
    ///
    /// Only ever called on request; failed runs are not rolled back.
    #[instrument(skip(self, config), fields(root = %root.display()))]
    pub fn rollback(
        &self,
        root: &Path,
        name: &str,
        config: &ConfigStore,
    ) -> KickstartResult<CommandOutput> {
        self.tracker.ensure_root(root)?;
        let definition = self.store.get(name)?;
        let Some(command_line) = definition.manifest.rollback.as_deref() else {
            return Err(ApplicationError::NoRollback {
                script: name.to_string(),
            }
            .into());
        };

        let command = CommandSpec::shell(command_line);
        let invocation = CommandInvocation {
            program: command.program.clone(),
            args: command.args.clone(),
            cwd: root.to_path_buf(),
            timeout: Duration::from_secs(
                config.get_u64(&config_key(TIMEOUT_KEY)?, self.default_timeout.as_secs()),
            ),
        };

        info!(command = command_line, "Rolling back");
        let output = self.runner.run(&invocation)?;
        if !output.success() {
            return Err(ApplicationError::CommandFailed {
                command: command_line.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(output)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Built-in variables plus every binding the script declares.
    fn render_context(
        &self,
        definition: &ScriptDefinition,
        root: &Path,
        config: &ConfigStore,
    ) -> KickstartResult<RenderContext> {
        let fallback_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let project_name = config
            .lookup(&config_key(PROJECT_NAME_KEY)?)
            .map(str::to_string)
            .unwrap_or(fallback_name);

        let builtins = ProjectFields::new(project_name, self.clock.now().year());
        let mut context = RenderContext::from_fields(&builtins)?;

        for binding in &definition.variables {
            let value = config
                .answers()
                .get(&binding.name.to_ascii_uppercase())
                .or_else(|| config.lookup(&binding.key))
                .or(binding.default.as_deref());
            if let Some(value) = value {
                context = context.with_variable(binding.name.clone(), value);
            }
        }
        Ok(context)
    }

    /// Render every file body up front so a missing value aborts the script
    /// before anything is written.
    fn render_files(
        &self,
        definition: &ScriptDefinition,
        context: &RenderContext,
    ) -> KickstartResult<Vec<String>> {
        definition
            .files
            .iter()
            .map(|file| {
                self.renderer
                    .render(&file.body, context)
                    .map_err(|e| match e {
                        KickstartError::Domain(source) => ApplicationError::RenderingFailed {
                            script: definition.name().to_string(),
                            path: file.path.to_string(),
                            source,
                        }
                        .into(),
                        other => other,
                    })
            })
            .collect()
    }

    /// Returns the command line when the command ran, `None` when skipped.
    fn run_command(
        &self,
        definition: &ScriptDefinition,
        command: &CommandSpec,
        root: &Path,
        context: &RenderContext,
        timeout: Duration,
    ) -> KickstartResult<Option<String>> {
        if let Some(marker) = &command.unless_exists {
            if self.filesystem.exists(&root.join(marker.as_path())) {
                debug!(command = %command.display(), marker = %marker, "Skipping command");
                return Ok(None);
            }
        }

        let args = command
            .args
            .iter()
            .map(|a| self.renderer.render(a, context))
            .collect::<KickstartResult<Vec<_>>>()?;
        let invocation = CommandInvocation {
            program: command.program.clone(),
            args,
            cwd: root.to_path_buf(),
            timeout,
        };
        let command_line = invocation.display();

        info!(script = definition.name(), command = %command_line, "Running command");
        let output = self.runner.run(&invocation)?;
        if !output.success() {
            return Err(ApplicationError::CommandFailed {
                command: command_line,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(Some(command_line))
    }
}

fn config_key(raw: &str) -> KickstartResult<ConfigKey> {
    Ok(raw.parse()?)
}
