//! `kickstart rollback`: run one script's declared undo command.

use tracing::instrument;

use crate::{
    cli::RollbackArgs, commands::context, config::AppConfig, error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(script = %args.name))]
pub fn execute(args: RollbackArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = context::project_root(&args.root)?;
    let orchestrator = context::orchestrator(&config)?;
    let store = context::config_store(&root, &config, Default::default())?;

    let result = orchestrator.rollback(&root, &args.name, &store)?;
    let stdout = result.stdout.trim();
    if !stdout.is_empty() {
        output.print(stdout)?;
    }
    output.success(&format!("Rolled back {}", args.name))?;
    Ok(())
}
