//! Script manifest: the static metadata every generator declares.
//!
//! A manifest is built once (from source or a `script.toml`) and never
//! mutated afterwards. The validator and the orchestrator only read it.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::domain::{
    entities::common::RelativePath,
    error::DomainError,
    value_objects::{Category, Phase, ToolRequirement},
};

/// Whether an artifact is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    File,
    Directory,
}

/// A path a script is responsible for creating.
///
/// Declared as a string; a trailing `/` marks a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactPath {
    pub path: RelativePath,
    pub kind: ArtifactKind,
}

impl ArtifactPath {
    pub fn file(path: impl Into<RelativePath>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::File,
        }
    }

    pub fn directory(path: impl Into<RelativePath>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::Directory,
        }
    }

    /// Parse the `creates` spelling used in manifests.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim().replace('\\', "/");
        match raw.strip_suffix('/') {
            Some(dir) => Ok(Self {
                path: RelativePath::try_new(dir)?,
                kind: ArtifactKind::Directory,
            }),
            None => Ok(Self {
                path: RelativePath::try_new(raw.as_str())?,
                kind: ArtifactKind::File,
            }),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ArtifactKind::Directory
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArtifactKind::File => write!(f, "{}", self.path),
            ArtifactKind::Directory => write!(f, "{}/", self.path),
        }
    }
}

/// What a script needs before it may run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRequirement {
    /// Executables that must be reachable. Missing ones are fatal.
    pub tools: BTreeSet<ToolRequirement>,
    /// Predecessor scripts that must have completed. Missing ones are fatal.
    pub scripts: BTreeSet<String>,
    /// Executables that are nice to have. Missing ones only warn.
    pub optional: BTreeSet<ToolRequirement>,
}

impl DependencyRequirement {
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.scripts.is_empty() && self.optional.is_empty()
    }
}

/// Static metadata attached to each generator script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptManifest {
    pub name: String,
    pub phase: Phase,
    pub category: Category,
    pub description: String,
    pub creates: Vec<ArtifactPath>,
    pub requires: DependencyRequirement,
    pub conflicts: BTreeSet<String>,
    pub idempotent: bool,
    pub safe: bool,
    pub rollback: Option<String>,
}

impl ScriptManifest {
    /// Start building a manifest.
    pub fn builder(name: impl Into<String>) -> ScriptManifestBuilder {
        ScriptManifestBuilder::new(name)
    }

    /// Check the manifest's internal consistency.
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidManifest {
            script: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(invalid(format!(
                "name '{}' must be lowercase kebab-case",
                self.name
            )));
        }
        if self.requires.scripts.contains(&self.name) {
            return Err(invalid("script depends on itself".into()));
        }
        if self.conflicts.contains(&self.name) {
            return Err(invalid("script conflicts with itself".into()));
        }
        if let Some(dep) = self
            .requires
            .scripts
            .iter()
            .find(|d| self.conflicts.contains(*d))
        {
            return Err(invalid(format!("'{dep}' is both a dependency and a conflict")));
        }

        let mut seen = HashSet::new();
        for artifact in &self.creates {
            if !seen.insert(artifact.path.as_path()) {
                return Err(DomainError::DuplicatePath {
                    script: self.name.clone(),
                    path: artifact.path.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Declared file artifacts.
    pub fn files(&self) -> impl Iterator<Item = &ArtifactPath> {
        self.creates.iter().filter(|a| !a.is_directory())
    }
}

/// Fluent builder for [`ScriptManifest`].
#[derive(Debug, Clone)]
pub struct ScriptManifestBuilder {
    manifest: ScriptManifest,
}

impl ScriptManifestBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            manifest: ScriptManifest {
                name: name.into(),
                phase: Phase::default(),
                category: Category::Other,
                description: String::new(),
                creates: Vec::new(),
                requires: DependencyRequirement::default(),
                conflicts: BTreeSet::new(),
                idempotent: true,
                safe: true,
                rollback: None,
            },
        }
    }

    pub fn phase(mut self, phase: u32) -> Self {
        self.manifest.phase = Phase(phase);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.manifest.category = category;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.manifest.description = description.into();
        self
    }

    pub fn creates(mut self, artifact: ArtifactPath) -> Self {
        self.manifest.creates.push(artifact);
        self
    }

    pub fn tool(mut self, tool: ToolRequirement) -> Self {
        self.manifest.requires.tools.insert(tool);
        self
    }

    pub fn optional_tool(mut self, tool: ToolRequirement) -> Self {
        self.manifest.requires.optional.insert(tool);
        self
    }

    pub fn depends_on(mut self, script: impl Into<String>) -> Self {
        self.manifest.requires.scripts.insert(script.into());
        self
    }

    pub fn conflicts_with(mut self, script: impl Into<String>) -> Self {
        self.manifest.conflicts.insert(script.into());
        self
    }

    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.manifest.idempotent = idempotent;
        self
    }

    pub fn safe(mut self, safe: bool) -> Self {
        self.manifest.safe = safe;
        self
    }

    pub fn rollback(mut self, command: impl Into<String>) -> Self {
        self.manifest.rollback = Some(command.into());
        self
    }

    /// Validate and return the manifest.
    pub fn build(self) -> Result<ScriptManifest, DomainError> {
        self.manifest.validate()?;
        Ok(self.manifest)
    }
}
