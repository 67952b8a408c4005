//! Core domain layer for Kickstart.
//!
//! Pure data and rules: manifests, the artifact state machine, placeholder
//! rendering and plan ordering. All I/O goes through ports defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, process, or environment access
//! - **Immutable entities**: Manifests are never mutated after construction
//! - **Rich domain model**: Behavior lives in entities, not services
pub mod entities;
pub mod error;
pub mod value_objects;

mod validation;

pub use entities::{
    answers::{AnswersOverride, ConfigEntry},
    common::{Permissions, RelativePath},
    definition::{CommandSpec, FileSpec, ScriptDefinition, VariableBinding},
    manifest::{
        ArtifactKind, ArtifactPath, DependencyRequirement, ScriptManifest, ScriptManifestBuilder,
    },
    plan::{ExecutionPlan, PlannedScript, order_scripts},
    render::{ProjectFields, RenderContext},
    report::{
        ArtifactOutcome, ArtifactRecord, ArtifactState, ExecutionReport, ReconcileAction,
        ReportCounts, WritePolicy, reconcile,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{Category, ConfigKey, Phase, ToolRequirement};

pub use validation::DomainValidator;
