//! Application layer for Kickstart.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScriptOrchestrator, ConfigStore, ...)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer. Ordering rules, the
//! artifact state machine and rendering live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main services
pub use services::{
    CheckStatus, ConfigStore, DependencyValidator, FileOperationTracker, RunFailure, RunSummary,
    ScriptCheck, ScriptOrchestrator, ScriptRun, ScriptStatus, Session, ValidationOutcome,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    Clock, CommandInvocation, CommandOutput, CommandRunner, ConfigStorage, Filesystem,
    ScriptStore, TemplateRenderer, ToolInfo, ToolProbe,
};

pub use error::ApplicationError;
