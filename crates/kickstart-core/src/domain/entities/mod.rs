pub mod answers;
pub mod common;
pub mod definition;
pub mod manifest;
pub mod plan;
pub mod render;
pub mod report;

pub use crate::domain::DomainError;
pub use answers::{AnswersOverride, ConfigEntry};
pub use definition::ScriptDefinition;
pub use manifest::ScriptManifest;
pub use plan::ExecutionPlan;
pub use report::ExecutionReport;
