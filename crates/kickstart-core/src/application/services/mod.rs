//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! bootstrap use cases: resolve configuration, gate scripts on their
//! requirements, write artifacts idempotently, and sequence the whole run.

pub mod config_store;
pub mod dependency_validator;
pub mod file_tracker;
pub mod orchestrator;
pub mod session;

pub use config_store::ConfigStore;
pub use dependency_validator::{DependencyValidator, ValidationOutcome};
pub use file_tracker::FileOperationTracker;
pub use orchestrator::{
    CheckStatus, DEFAULT_COMMAND_TIMEOUT, RunFailure, RunSummary, ScriptCheck, ScriptOrchestrator,
    ScriptRun, ScriptStatus,
};
pub use session::Session;
