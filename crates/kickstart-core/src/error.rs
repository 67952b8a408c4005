//! Root error type for the core crate.
//!
//! Domain rule violations and runtime failures meet here so callers handle a
//! single type. Each error knows its [`ErrorCategory`] and a list of
//! suggestions a person can act on.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError};

#[derive(Debug, Error, Clone)]
pub enum KickstartError {
    /// A manifest, plan, key or template broke a rule.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Something went wrong while touching the machine.
    #[error("{0}")]
    Application(#[from] ApplicationError),
}

impl KickstartError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                domain::ErrorCategory::Validation => ErrorCategory::Validation,
                domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
        }
    }
}

/// Error categories for UI display and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    /// A script's gate failed: missing tool or predecessor, failed verification.
    Dependency,
    /// An external command failed or timed out.
    Execution,
    Internal,
}

pub type KickstartResult<T> = Result<T, KickstartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_categories_map_through() {
        let err: KickstartError = DomainError::UnknownScript { name: "x".into() }.into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "Unknown script 'x'");
    }

    #[test]
    fn application_errors_keep_their_category() {
        let err: KickstartError = ApplicationError::NoRollback {
            script: "docker".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.suggestions().is_empty());
    }
}
