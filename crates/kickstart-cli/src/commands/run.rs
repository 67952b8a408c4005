//! `kickstart run`: plan, execute and report.

use tracing::{info, instrument};

use crate::{
    cli::RunArgs,
    commands::context,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Run the selected scripts against the project root.
///
/// A fatal error stops the run; whatever finished before it is still
/// reported, then the error decides the exit code. Answers are only saved
/// after a clean run, and are checked for key clashes before it starts.
#[instrument(skip_all, fields(root = %args.selection.root.display()))]
pub fn execute(args: RunArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = context::project_root(&args.selection.root)?;
    let orchestrator = context::orchestrator(&config)?;
    let plan = orchestrator.plan(&args.selection.only, &args.selection.skip)?;

    let answers = context::answers(&root, args.answers.as_deref())?;
    if args.save_answers && answers.is_empty() {
        return Err(CliError::InvalidInput {
            message: "--save-answers needs a non-empty answers file".into(),
            source: None,
        });
    }
    let mut store = context::config_store(&root, &config, answers.clone())?;
    let scripts = orchestrator.scripts()?;
    store.register_bindings(
        scripts
            .iter()
            .filter(|s| plan.contains(s.name()))
            .flat_map(|s| s.variables.iter()),
    );
    if args.save_answers {
        // Fail before touching the project, not after.
        store.answer_entries(&answers)?;
    }

    let summary = match orchestrator.run(&root, &plan, &store) {
        Ok(summary) => summary,
        Err(failure) => {
            output.run_summary(&failure.summary)?;
            return Err(failure.error.into());
        }
    };
    output.run_summary(&summary)?;

    if args.save_answers {
        let written = store.update_from_answers(&answers)?;
        store.persist()?;
        info!(keys = written.len(), "Answers saved");
        output.info(&format!(
            "Saved {} answer(s) to {}",
            written.len(),
            store.location().display()
        ))?;
    }
    Ok(())
}
