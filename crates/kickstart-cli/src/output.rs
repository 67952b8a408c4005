//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use kickstart_core::{
    application::{CheckStatus, RunSummary, ScriptCheck, ScriptRun, ScriptStatus},
    domain::{ArtifactOutcome, ExecutionPlan},
};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    ///
    /// `Auto` resolves to human on a terminal and plain otherwise.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = args.requested_format(config);
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.marked("\u{2713}", msg, |s| s.green().bold().to_string())
    }

    /// Error indicator: `✗ <msg>`.  Not suppressed in quiet mode.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("\u{2717} {msg}")
        } else {
            format!("{} {}", "\u{2717}".red().bold(), msg.red())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.marked("\u{26a0}", msg, |s| s.yellow().bold().to_string())
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.marked("\u{2139}", msg, |s| s.blue().bold().to_string())
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Pretty JSON on stdout. Written even in quiet mode so pipes stay parseable.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    // ── Domain reports ─────────────────────────────────────────────────────

    /// Print everything a run did, script by script, then the totals.
    pub fn run_summary(&self, summary: &RunSummary) -> io::Result<()> {
        if self.is_json() {
            return self.json(summary);
        }

        for script in &summary.scripts {
            self.script_run(script)?;
        }

        let totals = summary.totals();
        self.print("")?;
        self.header(&format!(
            "{} created, {} skipped, {} backed up, {} warning(s)",
            totals.created, totals.skipped, totals.backed_up, totals.warnings
        ))
    }

    fn script_run(&self, run: &ScriptRun) -> io::Result<()> {
        match run.status {
            ScriptStatus::Completed => self.success(&run.name)?,
            ScriptStatus::Disabled => self.info(&format!("{} (disabled)", run.name))?,
            ScriptStatus::Failed => self.error(&run.name)?,
        }

        for record in run.report.records() {
            let mut line = format!("    {:<22} {}", record.outcome.label(), record.target.display());
            if let Some(backup) = &record.backup {
                line.push_str(&format!(" (backup: {})", backup.display()));
            }
            if record.outcome == ArtifactOutcome::Warning {
                if let Some(message) = &record.message {
                    line.push_str(&format!(": {message}"));
                }
            }
            self.print(&line)?;
        }
        for note in run.report.notes() {
            self.warning(&format!("    {note}"))?;
        }
        for command in &run.commands {
            self.print(&format!("    ran {:<18} {command}", ""))?;
        }
        Ok(())
    }

    /// Print the execution order.
    pub fn plan(&self, plan: &ExecutionPlan) -> io::Result<()> {
        if self.is_json() {
            return self.json(plan);
        }
        if plan.is_empty() {
            return self.info("Nothing selected");
        }
        self.header("Execution plan:")?;
        for (index, step) in plan.steps().iter().enumerate() {
            self.print(&format!("  {:>2}. {:<20} phase {}", index + 1, step.name, step.phase))?;
        }
        Ok(())
    }

    /// Print one verdict per planned script.
    pub fn checks(&self, checks: &[ScriptCheck]) -> io::Result<()> {
        if self.is_json() {
            let rows: Vec<_> = checks
                .iter()
                .map(|check| match &check.status {
                    CheckStatus::Ready { warnings } => serde_json::json!({
                        "name": check.name,
                        "status": "ready",
                        "warnings": warnings,
                    }),
                    CheckStatus::Disabled => serde_json::json!({
                        "name": check.name,
                        "status": "disabled",
                    }),
                    CheckStatus::Blocked { error } => serde_json::json!({
                        "name": check.name,
                        "status": "blocked",
                        "error": error.to_string(),
                    }),
                })
                .collect();
            return self.json(&rows);
        }

        for check in checks {
            match &check.status {
                CheckStatus::Ready { warnings } => {
                    self.success(&format!("{} ready", check.name))?;
                    for warning in warnings {
                        self.warning(&format!("    {warning}"))?;
                    }
                }
                CheckStatus::Disabled => self.info(&format!("{} (disabled)", check.name))?,
                CheckStatus::Blocked { error } => {
                    self.error(&format!("{} blocked: {error}", check.name))?
                }
            }
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }

    fn marked(&self, mark: &str, msg: &str, paint: impl Fn(&str) -> String) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("{mark} {msg}")
        } else {
            format!("{} {}", paint(mark), msg)
        };
        self.term.write_line(&line)
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;

    fn make_manager(quiet: bool, no_color: bool, format: OutputFormat) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
            output_format: format,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true, OutputFormat::Plain);
        assert!(out.print("hello").is_ok());
        assert!(out.quiet);
    }

    #[test]
    fn error_not_suppressed_in_quiet_mode() {
        let out = make_manager(true, true, OutputFormat::Plain);
        assert!(out.error("something went wrong").is_ok());
    }

    #[test]
    fn colour_only_for_human_format() {
        assert!(!make_manager(false, false, OutputFormat::Human).no_color);
        assert!(make_manager(false, true, OutputFormat::Human).no_color);
        assert!(make_manager(false, false, OutputFormat::Plain).no_color);
    }

    #[test]
    fn config_format_applies_when_flag_is_auto() {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: true,
            config: None,
            output_format: OutputFormat::Auto,
        };
        let mut config = AppConfig::default();
        config.output.format = OutputFormat::Json;
        assert!(OutputManager::new(&args, &config).is_json());
    }

    #[test]
    fn empty_plan_prints() {
        let out = make_manager(false, true, OutputFormat::Plain);
        assert!(out.plan(&ExecutionPlan::default()).is_ok());
        assert_eq!(out.resolved_format, OutputFormat::Plain);
    }
}
