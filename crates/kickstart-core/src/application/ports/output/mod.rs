//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kickstart-adapters` crate provides implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use semver::Version;

use crate::domain::{ConfigEntry, RenderContext, ScriptDefinition, ToolRequirement};
use crate::error::KickstartResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kickstart_adapters::filesystem::LocalFilesystem` (production)
/// - `kickstart_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> KickstartResult<String>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> KickstartResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KickstartResult<()>;

    /// Copy a file's bytes to a new path.
    fn copy_file(&self, from: &Path, to: &Path) -> KickstartResult<()>;

    /// Set file permissions.
    fn set_permissions(&self, path: &Path, executable: bool) -> KickstartResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> KickstartResult<()>;
}

/// Port for the persisted project configuration.
///
/// Implemented by:
/// - `kickstart_adapters::config_storage::TomlConfigStorage`
/// - `kickstart_adapters::config_storage::MemoryConfigStorage`
pub trait ConfigStorage: Send + Sync {
    /// Load every persisted entry. A missing store is empty, not an error.
    fn load(&self) -> KickstartResult<Vec<ConfigEntry>>;

    /// Replace the persisted entries.
    fn save(&self, entries: &[ConfigEntry]) -> KickstartResult<()>;

    /// Where the store lives, for display.
    fn location(&self) -> PathBuf;
}

/// What a probe found for a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub path: PathBuf,
    /// Only probed when the requirement carries a version range.
    pub version: Option<Version>,
}

/// Port for locating external executables.
#[cfg_attr(test, mockall::automock)]
pub trait ToolProbe: Send + Sync {
    /// `None` when the tool cannot be found.
    fn probe(&self, tool: &ToolRequirement) -> Option<ToolInfo>;
}

/// An external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandInvocation {
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was ended by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Port for running external commands with a time bound.
///
/// Implementations kill the child and return `CommandTimedOut` when the
/// timeout elapses. A non-zero exit is returned as output, not as an error.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &CommandInvocation) -> KickstartResult<CommandOutput>;
}

/// Port for wall-clock time (backup names, `YEAR`).
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `kickstart_adapters::renderer::StrictRenderer`
pub trait TemplateRenderer: Send + Sync {
    /// Render one body. Fails if any placeholder has no value.
    fn render(&self, body: &str, context: &RenderContext) -> KickstartResult<String>;
}

/// Port for script storage and retrieval.
///
/// Implemented by:
/// - `kickstart_adapters::script_store::InMemoryStore`
pub trait ScriptStore: Send + Sync {
    /// Get a script by name. Unknown names are `DomainError::UnknownScript`.
    fn get(&self, name: &str) -> KickstartResult<ScriptDefinition>;

    /// All scripts in registration order.
    fn list(&self) -> KickstartResult<Vec<ScriptDefinition>>;

    /// Register a script. Names must be unique.
    fn insert(&self, definition: ScriptDefinition) -> KickstartResult<()>;

    fn contains(&self, name: &str) -> bool;
}
