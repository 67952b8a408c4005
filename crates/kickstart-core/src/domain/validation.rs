use std::collections::HashSet;

use crate::domain::{
    entities::{ScriptDefinition, ScriptManifest},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Per-entity rules live on the entities; this adds the rules that span a
/// whole catalogue of scripts.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_manifest(manifest: &ScriptManifest) -> Result<(), DomainError> {
        manifest.validate()
    }

    pub fn validate_definition(definition: &ScriptDefinition) -> Result<(), DomainError> {
        definition.validate()
    }

    /// Names must be unique across a catalogue.
    pub fn validate_catalogue<'a, I>(definitions: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = &'a ScriptDefinition>,
    {
        let mut seen = HashSet::new();
        for definition in definitions {
            definition.validate()?;
            if !seen.insert(definition.name()) {
                return Err(DomainError::InvalidDefinition {
                    script: definition.name().to_string(),
                    reason: "a script with this name is already registered".into(),
                });
            }
        }
        Ok(())
    }
}
