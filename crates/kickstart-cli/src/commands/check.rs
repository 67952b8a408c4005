//! `kickstart check`: dry-run every gate without writing.

use tracing::instrument;

use crate::{
    cli::SelectionArgs,
    commands::context,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Validate every planned script. Blocked scripts make the command fail
/// with the dependency exit code after all verdicts are printed.
#[instrument(skip_all, fields(root = %args.root.display()))]
pub fn execute(args: SelectionArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = context::project_root(&args.root)?;
    let orchestrator = context::orchestrator(&config)?;
    let plan = orchestrator.plan(&args.only, &args.skip)?;

    let answers = context::answers(&root, None)?;
    let store = context::config_store(&root, &config, answers)?;
    let checks = orchestrator.check(&root, &plan, &store)?;
    output.checks(&checks)?;

    let blocked: Vec<String> = checks
        .iter()
        .filter(|c| c.is_blocked())
        .map(|c| c.name.clone())
        .collect();
    if blocked.is_empty() {
        Ok(())
    } else {
        Err(CliError::ChecksBlocked { blocked })
    }
}
