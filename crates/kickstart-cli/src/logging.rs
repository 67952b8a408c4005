//! Tracing subscriber setup for the binary.
//!
//! Core and adapters only emit events; nothing below the CLI installs a
//! subscriber. Levels per flag:
//!
//! | Flag(s)   | Level | Typical events                          |
//! |-----------|-------|-----------------------------------------|
//! | (none)    | WARN  | left-out scripts, fallbacks             |
//! | `-v`      | INFO  | plan size, each script and command      |
//! | `-vv`     | DEBUG | artifact decisions, tool probes         |
//! | `-vvv`    | TRACE | everything                              |
//! | `--quiet` | ERROR |                                         |
//!
//! A set `RUST_LOG` replaces the flag-derived filter.

use std::io::IsTerminal as _;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cli::{GlobalArgs, OutputFormat},
    config::AppConfig,
};

/// Crates whose events the default filter lets through.
const CRATES: [&str; 3] = ["kickstart", "kickstart_core", "kickstart_adapters"];

/// Install the global subscriber, writing to stderr.
///
/// JSON output on stdout gets JSON logs on stderr, so both streams stay
/// machine-readable.
pub fn init_logging(args: &GlobalArgs, config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(level_for(args))));

    let layer = if args.requested_format(config) == OutputFormat::Json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        let ansi = !(args.no_color || config.output.no_color) && std::io::stderr().is_terminal();
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .without_time()
            .with_ansi(ansi)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

fn level_for(args: &GlobalArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(verbose: u8, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            no_color: true,
            config: None,
            output_format: OutputFormat::Plain,
        }
    }

    #[test]
    fn verbosity_table() {
        let cases = [
            (0, false, LevelFilter::WARN),
            (1, false, LevelFilter::INFO),
            (2, false, LevelFilter::DEBUG),
            (3, false, LevelFilter::TRACE),
            (9, false, LevelFilter::TRACE),
            (0, true, LevelFilter::ERROR),
            (3, true, LevelFilter::ERROR),
        ];
        for (verbose, quiet, expected) in cases {
            assert_eq!(level_for(&flags(verbose, quiet)), expected, "-v x{verbose} quiet={quiet}");
        }
    }

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            directives(LevelFilter::DEBUG),
            "kickstart=debug,kickstart_core=debug,kickstart_adapters=debug"
        );
    }
}
