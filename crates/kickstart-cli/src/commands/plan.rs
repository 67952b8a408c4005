//! `kickstart plan`: show the execution order.

use crate::{
    cli::SelectionArgs, commands::context, config::AppConfig, error::CliResult,
    output::OutputManager,
};

pub fn execute(args: SelectionArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let orchestrator = context::orchestrator(&config)?;
    let plan = orchestrator.plan(&args.only, &args.skip)?;
    output.plan(&plan)?;
    Ok(())
}
