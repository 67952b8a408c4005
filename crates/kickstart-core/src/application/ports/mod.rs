//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kickstart-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `ConfigStorage`: Persisted project configuration
//!   - `ToolProbe`: Locating external executables
//!   - `CommandRunner`: Running post-commands with a timeout
//!   - `Clock`: Wall-clock time
//!   - `TemplateRenderer`: Placeholder rendering
//!   - `ScriptStore`: Script catalogue

pub mod output;

pub use output::{
    Clock, CommandInvocation, CommandOutput, CommandRunner, ConfigStorage, Filesystem,
    ScriptStore, TemplateRenderer, ToolInfo, ToolProbe,
};

#[cfg(test)]
pub use output::MockToolProbe;
