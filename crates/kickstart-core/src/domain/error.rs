// ============================================================================
// domain/error.rs - DOMAIN RULE VIOLATIONS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports keep them around)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Manifest / Definition Errors
    // ========================================================================
    #[error("Invalid manifest for '{script}': {reason}")]
    InvalidManifest { script: String, reason: String },

    #[error("Invalid script definition '{script}': {reason}")]
    InvalidDefinition { script: String, reason: String },

    #[error("Duplicate artifact path in '{script}': {path}")]
    DuplicatePath { script: String, path: String },

    #[error("Artifact path must be relative and stay inside the project: {path}")]
    PathEscapesRoot { path: String },

    #[error("Invalid tool requirement '{spec}': {reason}")]
    InvalidToolRequirement { spec: String, reason: String },

    // ========================================================================
    // Plan Errors
    // ========================================================================
    #[error("Dependency cycle between scripts: {}", .members.join(" -> "))]
    DependencyCycle { members: Vec<String> },

    #[error(
        "Script '{script}' (phase {phase}) depends on '{dependency}' which runs later (phase {dependency_phase})"
    )]
    PhaseInversion {
        script: String,
        phase: u32,
        dependency: String,
        dependency_phase: u32,
    },

    #[error("Scripts '{first}' and '{second}' conflict and cannot run together")]
    ConflictingScripts { first: String, second: String },

    #[error("Unknown script '{name}'")]
    UnknownScript { name: String },

    // ========================================================================
    // Configuration / Rendering
    // ========================================================================
    #[error("Invalid config key '{key}': {reason}")]
    InvalidConfigKey { key: String, reason: String },

    #[error("Unresolved placeholders: {}", .names.join(", "))]
    UnresolvedPlaceholders { names: Vec<String> },

    #[error("Malformed template: {reason}")]
    MalformedTemplate { reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DependencyCycle { members } => vec![
                format!("These scripts depend on each other: {}", members.join(", ")),
                "Remove one of the 'depends' edges to break the cycle".into(),
            ],
            Self::PhaseInversion { dependency, .. } => vec![
                format!("Move '{dependency}' to an earlier phase"),
                "Or drop the dependency edge".into(),
            ],
            Self::ConflictingScripts { first, second } => vec![
                format!("Select only one of '{first}' and '{second}'"),
                "Use --skip to exclude one of them".into(),
            ],
            Self::UnknownScript { .. } => vec![
                "List the available scripts: kickstart list".into(),
            ],
            Self::UnresolvedPlaceholders { names } => vec![
                format!("Provide values for: {}", names.join(", ")),
                "Set them in the project config store or the answers file".into(),
            ],
            Self::InvalidConfigKey { .. } => vec![
                "Config keys are dotted lowercase names, e.g. cicd.provider".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidManifest { .. }
            | Self::InvalidDefinition { .. }
            | Self::DuplicatePath { .. }
            | Self::PathEscapesRoot { .. }
            | Self::InvalidToolRequirement { .. }
            | Self::MalformedTemplate { .. } => ErrorCategory::Validation,
            Self::DependencyCycle { .. }
            | Self::PhaseInversion { .. }
            | Self::ConflictingScripts { .. } => ErrorCategory::Configuration,
            Self::InvalidConfigKey { .. } | Self::UnresolvedPlaceholders { .. } => {
                ErrorCategory::Configuration
            }
            Self::UnknownScript { .. } => ErrorCategory::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_names_members() {
        let err = DomainError::DependencyCycle {
            members: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Dependency cycle between scripts: a -> b -> a");
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn unresolved_placeholder_suggestions_list_names() {
        let err = DomainError::UnresolvedPlaceholders {
            names: vec!["REGISTRY".into()],
        };
        assert!(err.suggestions().iter().any(|s| s.contains("REGISTRY")));
    }
}
