//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kickstart",
    bin_name = "kickstart",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Idempotent project bootstrap",
    long_about = "Kickstart runs ordered bootstrap scripts against a project \
                  directory. Re-running is safe: finished work is skipped and \
                  hand-edited files are never silently overwritten.",
    after_help = "EXAMPLES:\n\
        \x20 kickstart run\n\
        \x20 kickstart run ./my-app --only bootstrap-git --only bootstrap-github\n\
        \x20 kickstart check --skip docker\n\
        \x20 kickstart config set cicd.provider gitlab\n\
        \x20 kickstart completions bash > /usr/share/bash-completion/completions/kickstart",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plan and execute bootstrap scripts.
    #[command(
        visible_alias = "r",
        about = "Run bootstrap scripts",
        after_help = "EXAMPLES:\n\
            \x20 kickstart run\n\
            \x20 kickstart run ./my-app --skip docker\n\
            \x20 kickstart run --answers answers.env --save-answers"
    )]
    Run(RunArgs),

    /// Print the execution order without running anything.
    #[command(about = "Show the execution plan")]
    Plan(SelectionArgs),

    /// Validate requirements of every planned script without writing.
    #[command(
        about = "Check requirements without running",
        after_help = "EXAMPLES:\n\
            \x20 kickstart check\n\
            \x20 kickstart check --only bootstrap-github"
    )]
    Check(SelectionArgs),

    /// List available scripts.
    #[command(
        visible_alias = "ls",
        about = "List available scripts",
        after_help = "EXAMPLES:\n\
            \x20 kickstart list\n\
            \x20 kickstart list --format json"
    )]
    List(ListArgs),

    /// Run a script's declared rollback command.
    #[command(
        about = "Undo a script",
        after_help = "EXAMPLES:\n\
            \x20 kickstart rollback bootstrap-git"
    )]
    Rollback(RollbackArgs),

    /// Create a project config store.
    #[command(
        about = "Initialise project configuration",
        after_help = "EXAMPLES:\n\
            \x20 kickstart init\n\
            \x20 kickstart init ./my-app --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kickstart completions bash > ~/.local/share/bash-completion/completions/kickstart\n\
            \x20 kickstart completions zsh  > ~/.zfunc/_kickstart\n\
            \x20 kickstart completions fish > ~/.config/fish/completions/kickstart.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the project config store.
    #[command(
        about = "Project configuration management",
        after_help = "EXAMPLES:\n\
            \x20 kickstart config get cicd.provider\n\
            \x20 kickstart config set cicd.provider gitlab\n\
            \x20 kickstart config import-answers answers.env\n\
            \x20 kickstart config list --root ./my-app"
    )]
    Config(ConfigArgs),
}

// ── shared selection ──────────────────────────────────────────────────────────

/// Project root plus script selection.
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Project directory.
    #[arg(value_name = "ROOT", default_value = ".", help = "Project directory")]
    pub root: PathBuf,

    /// Run only these scripts (repeatable).
    #[arg(
        long = "only",
        value_name = "NAME",
        help = "Select only this script (repeatable)"
    )]
    pub only: Vec<String>,

    /// Leave these scripts out (repeatable).
    #[arg(
        long = "skip",
        value_name = "NAME",
        help = "Leave this script out (repeatable)"
    )]
    pub skip: Vec<String>,
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Arguments for `kickstart run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Answers file overriding config values for this run.
    #[arg(
        short = 'a',
        long = "answers",
        value_name = "FILE",
        env = "KICKSTART_ANSWERS",
        help = "Answers file (KEY=value lines)"
    )]
    pub answers: Option<PathBuf>,

    /// Copy the answers into the project config store after the run.
    #[arg(long = "save-answers", help = "Persist answers to the config store")]
    pub save_answers: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `kickstart list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── rollback ──────────────────────────────────────────────────────────────────

/// Arguments for `kickstart rollback`.
#[derive(Debug, Args)]
pub struct RollbackArgs {
    /// Script whose rollback command should run.
    #[arg(value_name = "NAME", help = "Script name")]
    pub name: String,

    #[arg(value_name = "ROOT", default_value = ".", help = "Project directory")]
    pub root: PathBuf,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kickstart init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(value_name = "ROOT", default_value = ".", help = "Project directory")]
    pub root: PathBuf,

    /// Overwrite an existing config store.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kickstart completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Arguments for `kickstart config`.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Project whose store is addressed.
    #[arg(
        long = "root",
        value_name = "DIR",
        default_value = ".",
        global = true,
        help = "Project directory"
    )]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Subcommands for `kickstart config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key, e.g. `cicd.provider`.
        key: String,
        /// Printed when the key is not set.
        #[arg(long = "default", value_name = "VALUE")]
        default: Option<String>,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key.
        key: String,
        /// New value.
        value: String,
    },
    /// Print every stored value.
    List,
    /// Print the path of the project config store.
    Path,
    /// Copy every answer in FILE into the store.
    ImportAnswers {
        /// Answers file (KEY=value lines).
        file: PathBuf,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────
