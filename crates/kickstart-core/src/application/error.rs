//! Application layer errors.
//!
//! These errors represent failures while running scripts against a real
//! project, not rule violations. Rule violations are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A required executable is missing or has the wrong version.
    #[error("Script '{script}' requires '{tool}': {reason}")]
    MissingTool {
        script: String,
        tool: String,
        reason: String,
    },

    /// A predecessor script has neither run nor left its artifacts behind.
    #[error("Script '{script}' requires '{predecessor}' to have run first")]
    MissingPredecessor { script: String, predecessor: String },

    /// A written artifact did not read back as expected.
    #[error("Verification failed for {path}: {reason}")]
    VerificationFailed { path: PathBuf, reason: String },

    /// The backup copy could not be made or checked; the original is untouched.
    #[error("Could not back up {path}: {reason}")]
    BackupFailed { path: PathBuf, reason: String },

    /// The project root is missing or not a directory.
    #[error("Target directory {path} is unusable: {reason}")]
    TargetDirectory { path: PathBuf, reason: String },

    /// A template body could not be rendered.
    #[error("Script '{script}' cannot render {path}: {source}")]
    RenderingFailed {
        script: String,
        path: String,
        #[source]
        source: DomainError,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An external command could not be started or exited unsuccessfully.
    #[error("Command `{command}` failed{}: {stderr}", .status.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// An external command exceeded its time budget and was killed.
    #[error("Command `{command}` timed out after {timeout_secs}s")]
    CommandTimedOut { command: String, timeout_secs: u64 },

    /// Store access failed (lock poisoned, etc.).
    #[error("Script store error")]
    StoreLockError,

    /// Rollback was requested for a script that declares none.
    #[error("Script '{script}' does not declare a rollback command")]
    NoRollback { script: String },

    /// The project config store could not be read or written.
    #[error("Config store error at {path}: {reason}")]
    ConfigStorage { path: PathBuf, reason: String },

    /// Saving a key would make it both a value and a section of another.
    #[error("Config key '{key}' clashes with '{existing}'")]
    ConfigKeyClash { key: String, existing: String },

    /// The answers file could not be parsed.
    #[error("Answers file {path} is invalid: {reason}")]
    AnswersFile { path: PathBuf, reason: String },

    /// A script directory entry could not be loaded.
    #[error("Cannot load script from {path}: {reason}")]
    ScriptLoad { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingTool { tool, .. } => vec![
                format!("Install '{tool}' and make sure it is on your PATH"),
                "Check with: kickstart check".into(),
            ],
            Self::MissingPredecessor { predecessor, .. } => vec![
                format!("Run '{predecessor}' first: kickstart run --only {predecessor}"),
                "Or drop --skip for it so it runs in the same invocation".into(),
            ],
            Self::VerificationFailed { path, .. } => vec![
                format!("Inspect {} by hand", path.display()),
                "Another process may be writing to the project".into(),
            ],
            Self::BackupFailed { path, .. } => vec![
                format!("Check write permissions next to {}", path.display()),
                "Or turn off bootstrap.backup_existing_files".into(),
            ],
            Self::TargetDirectory { path, .. } => vec![
                format!("Create the directory first: mkdir -p {}", path.display()),
            ],
            Self::RenderingFailed { source, .. } => source.suggestions(),
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::CommandFailed { .. } => vec![
                "Re-run with -vv to see the command output".into(),
            ],
            Self::CommandTimedOut { .. } => vec![
                "Raise bootstrap.command_timeout_secs in the project config".into(),
            ],
            Self::StoreLockError => vec![
                "The script store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::NoRollback { .. } => vec![
                "Only scripts with a 'rollback' entry can be rolled back".into(),
            ],
            Self::ConfigStorage { path, .. } => vec![
                format!("Check the TOML syntax of {}", path.display()),
                "Recreate it with: kickstart init --force".into(),
            ],
            Self::ConfigKeyClash { key, existing } => vec![
                format!("'{key}' and '{existing}' cannot both hold a value"),
                "Rename the answer, or bind it to another key with a script variable".into(),
            ],
            Self::AnswersFile { .. } => vec![
                "Answers files use KEY=value lines".into(),
            ],
            Self::ScriptLoad { path, .. } => vec![format!("Check {}", path.display())],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingTool { .. }
            | Self::MissingPredecessor { .. }
            | Self::VerificationFailed { .. }
            | Self::BackupFailed { .. } => ErrorCategory::Dependency,
            Self::CommandFailed { .. } | Self::CommandTimedOut { .. } => ErrorCategory::Execution,
            Self::TargetDirectory { .. } | Self::NoRollback { .. } => ErrorCategory::Validation,
            Self::RenderingFailed { .. }
            | Self::ConfigStorage { .. }
            | Self::ConfigKeyClash { .. }
            | Self::AnswersFile { .. }
            | Self::ScriptLoad { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_message_includes_status() {
        let err = ApplicationError::CommandFailed {
            command: "git init".into(),
            status: Some(128),
            stderr: "fatal".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command `git init` failed with exit code 128: fatal"
        );
    }

    #[test]
    fn dependency_failures_share_a_category() {
        let err = ApplicationError::MissingTool {
            script: "docker".into(),
            tool: "doesnotexist123".into(),
            reason: "not found on PATH".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Dependency);
        assert!(err.to_string().contains("doesnotexist123"));
    }
}
