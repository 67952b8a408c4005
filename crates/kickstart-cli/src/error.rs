//! Errors as the user sees them: one message, a few suggestions and an
//! exit code picked from the error's category.

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use kickstart_core::error::KickstartError;

pub use kickstart_core::error::ErrorCategory as CoreCategory;

use crate::config::AppConfig;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input that clap could not catch.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// App configuration could not be read or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from the runtime.
    #[error("{0}")]
    Core(#[from] KickstartError),

    /// `check` found scripts that would not run.
    #[error("{} script(s) blocked: {}", .blocked.len(), .blocked.join(", "))]
    ChecksBlocked { blocked: Vec<String> },

    /// `config get` on a key nobody set, without `--default`.
    #[error("Config key '{key}' is not set in {}", .store.display())]
    KeyNotSet { key: String, store: PathBuf },

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                format!(
                    "Check your config file at {}",
                    AppConfig::config_path().display()
                ),
                "Environment overrides use KICKSTART_<SECTION>__<KEY>".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::ChecksBlocked { .. } => vec![
                "See the blocked scripts above for the reason".into(),
                "Leave a script out with --skip NAME".into(),
            ],

            Self::KeyNotSet { key, .. } => vec![
                format!("Set it with: kickstart config set {key} VALUE"),
                "Or pass --default VALUE".into(),
            ],

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Dependency | CoreCategory::Execution => ErrorCategory::Dependency,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::ChecksBlocked { .. } => ErrorCategory::Dependency,
            Self::KeyNotSet { .. } => ErrorCategory::NotFound,
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Dependency    |  5   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Dependency => 5,
            ErrorCategory::Internal => 1,
        }
    }

    /// Report for stderr: the message, its causes when `verbose`, then
    /// suggestions. ANSI colour only when `color` is set.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> String| {
            if color {
                style(text)
            } else {
                text.to_owned()
            }
        };

        let mut lines = vec![
            String::new(),
            format!(
                "{} {}",
                paint("\u{2717} Error:", |t| t.red().bold().to_string()),
                paint(&self.to_string(), |t| t.red().to_string())
            ),
        ];

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                lines.push(paint(&format!("  caused by: {err}"), |t| t.dimmed().to_string()));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            lines.push(String::new());
            lines.push(paint("Suggestions:", |t| t.yellow().bold().to_string()));
            lines.extend(suggestions.iter().map(|s| format!("  {s}")));
        }

        if !verbose {
            lines.push(String::new());
            lines.push(paint("Run with -v for the cause chain.", |t| {
                t.dimmed().to_string()
            }));
        }

        lines.push(String::new());
        lines.join("\n")
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Dependency => tracing::error!("Bootstrap stopped: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// A requirement was not met or an external command failed.
    Dependency,
    /// Internal/system error.
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_core::{application::ApplicationError, domain::DomainError};
    use std::io;

    fn missing_tool() -> CliError {
        KickstartError::from(ApplicationError::MissingTool {
            script: "bootstrap-git".into(),
            tool: "git".into(),
            reason: "not found on PATH".into(),
        })
        .into()
    }

    // ── suggestions ───────────────────────────────────────────────────────

    #[test]
    fn key_not_set_suggests_config_set() {
        let err = CliError::KeyNotSet {
            key: "cicd.provider".into(),
            store: PathBuf::from(".kickstart/config.toml"),
        };
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("kickstart config set cicd.provider"))
        );
    }

    #[test]
    fn core_suggestions_pass_through() {
        assert!(!missing_tool().suggestions().is_empty());
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn exit_code_user_error() {
        let err = CliError::InvalidInput {
            message: "x".into(),
            source: None,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_code_unknown_script_is_not_found() {
        let err: CliError = KickstartError::from(DomainError::UnknownScript {
            name: "nope".into(),
        })
        .into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_code_configuration() {
        let err = CliError::ConfigError {
            message: "x".into(),
            source: None,
        };
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn exit_code_missing_tool_is_dependency() {
        assert_eq!(missing_tool().exit_code(), 5);
        assert_eq!(
            CliError::ChecksBlocked {
                blocked: vec!["docker".into()]
            }
            .exit_code(),
            5
        );
    }

    #[test]
    fn exit_code_internal() {
        let err = CliError::IoError {
            message: "x".into(),
            source: io::Error::other("e"),
        };
        assert_eq!(err.exit_code(), 1);
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn plain_render_has_message_and_suggestions() {
        let s = missing_tool().render(false, false);
        assert!(s.contains("Error:"));
        assert!(s.contains("git"));
        assert!(s.contains("Suggestions:"));
        assert!(!s.contains('\u{1b}'));
    }

    #[test]
    fn verbose_render_drops_the_hint() {
        let s = CliError::ChecksBlocked { blocked: vec![] }.render(true, false);
        assert!(!s.contains("Run with -v"));
    }

    #[test]
    fn verbose_render_lists_causes() {
        let err = CliError::ConfigError {
            message: "bad file".into(),
            source: Some(Box::new(io::Error::other("disk gone"))),
        };
        assert!(err.render(true, false).contains("caused by: disk gone"));
    }
}
