//! In-memory script store with built-in scripts.

use std::sync::{Arc, RwLock};

use kickstart_core::{
    application::{ApplicationError, ports::ScriptStore},
    domain::{DomainError, DomainValidator as validator, ScriptDefinition},
    error::{KickstartError, KickstartResult},
};

use crate::builtin_scripts;

/// Thread-safe in-memory script store. Keeps registration order.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Vec<ScriptDefinition>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a store with built-in scripts loaded.
    pub fn with_builtin() -> KickstartResult<Self> {
        let store = Self::new();
        store.load_builtin()?;
        Ok(store)
    }

    /// Load built-in scripts.
    pub fn load_builtin(&self) -> KickstartResult<()> {
        for script in builtin_scripts::all_scripts()? {
            self.insert(script)?;
        }
        Ok(())
    }

    /// Get the number of scripts.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptStore for InMemoryStore {
    fn get(&self, name: &str) -> KickstartResult<ScriptDefinition> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner
            .iter()
            .find(|d| d.name() == name)
            .cloned()
            .ok_or_else(|| {
                DomainError::UnknownScript {
                    name: name.to_string(),
                }
                .into()
            })
    }

    fn list(&self) -> KickstartResult<Vec<ScriptDefinition>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.clone())
    }

    fn insert(&self, definition: ScriptDefinition) -> KickstartResult<()> {
        // Validate before insertion
        validator::validate_definition(&definition).map_err(KickstartError::Domain)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if inner.iter().any(|d| d.name() == definition.name()) {
            return Err(DomainError::InvalidDefinition {
                script: definition.name().to_string(),
                reason: "a script with this name is already registered".into(),
            }
            .into());
        }

        inner.push(definition);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.iter().any(|d| d.name() == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_core::domain::{ArtifactPath, FileSpec, ScriptManifest};

    fn script(name: &str, file: &str) -> ScriptDefinition {
        let manifest = ScriptManifest::builder(name)
            .creates(ArtifactPath::file(file))
            .build()
            .unwrap();
        ScriptDefinition::new(manifest).with_file(FileSpec::new(file, "x"))
    }

    #[test]
    fn keeps_registration_order() {
        let store = InMemoryStore::new();
        store.insert(script("zeta", "z.txt")).unwrap();
        store.insert(script("alpha", "a.txt")).unwrap();

        let names: Vec<_> = store
            .list()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(store.contains("alpha"));
        assert_eq!(store.get("zeta").unwrap().name(), "zeta");
    }

    #[test]
    fn unknown_name_is_unknown_script() {
        let err = InMemoryStore::new().get("nope").unwrap_err();
        assert!(matches!(
            err,
            KickstartError::Domain(DomainError::UnknownScript { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let store = InMemoryStore::new();
        store.insert(script("a", "a.txt")).unwrap();
        assert!(store.insert(script("a", "b.txt")).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn undeclared_payload_is_rejected() {
        let manifest = ScriptManifest::builder("a").build().unwrap();
        let def = ScriptDefinition::new(manifest).with_file(FileSpec::new("a.txt", "x"));
        assert!(InMemoryStore::new().insert(def).is_err());
    }

    #[test]
    fn builtin_scripts_load() {
        let store = InMemoryStore::with_builtin().unwrap();
        assert!(!store.is_empty());
        assert!(store.contains("bootstrap-git"));
    }
}
