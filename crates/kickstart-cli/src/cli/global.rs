//! Flags accepted by every subcommand, flattened into [`super::Cli`].

use clap::Args;
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log more: `-v` per script, `-vv` per artifact and probe, `-vvv` all.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Only print errors.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never emit ANSI colour codes (also set by `NO_COLOR`).
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Application settings file.
    ///
    /// Layered over the platform default. The per-project store under
    /// `.kickstart/` is separate; see `kickstart config`.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        env = "KICKSTART_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// How reports are written to stdout.
    #[arg(long = "output-format", global = true, value_enum, default_value = "auto")]
    pub output_format: OutputFormat,
}

impl GlobalArgs {
    /// The flag when given, otherwise `output.format` from the app config.
    /// May still be `Auto`.
    pub fn requested_format(&self, config: &AppConfig) -> OutputFormat {
        match self.output_format {
            OutputFormat::Auto => config.output.format,
            explicit => explicit,
        }
    }
}

/// Rendering of reports, plans and checks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human on a terminal, plain otherwise.
    #[default]
    Auto,
    /// Coloured, with status marks.
    Human,
    /// Status marks, no colour.
    Plain,
    /// One JSON document per command.
    Json,
}
