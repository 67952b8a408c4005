//! Script definitions: a manifest plus the payload it writes.
//!
//! Payload bodies are opaque. The runtime only renders placeholders in them,
//! writes them through the file tracker, and then runs any post-commands.

use std::collections::HashSet;

use crate::domain::{
    entities::{
        common::{Permissions, RelativePath},
        manifest::{ArtifactKind, ScriptManifest},
    },
    error::DomainError,
    value_objects::ConfigKey,
};

/// One file a script writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: RelativePath,
    pub body: String,
    pub permissions: Permissions,
}

impl FileSpec {
    pub fn new(path: impl Into<RelativePath>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            permissions: Permissions::default(),
        }
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }
}

/// Binds a template placeholder to a config key with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    /// Placeholder name as written in bodies, e.g. `CI_PROVIDER`.
    pub name: String,
    pub key: ConfigKey,
    /// `None` means the value must come from config or answers.
    pub default: Option<String>,
}

impl VariableBinding {
    pub fn new(name: impl Into<String>, key: ConfigKey, default: Option<&str>) -> Self {
        Self {
            name: name.into(),
            key,
            default: default.map(str::to_string),
        }
    }
}

/// An external command run after the script's files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Skip the command when this path already exists under the root.
    pub unless_exists: Option<RelativePath>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            unless_exists: None,
        }
    }

    /// Wrap a shell command line (rollback commands are declared this way).
    pub fn shell(command_line: impl Into<String>) -> Self {
        Self::new("sh", ["-c".to_string(), command_line.into()])
    }

    pub fn unless_exists(mut self, path: impl Into<RelativePath>) -> Self {
        self.unless_exists = Some(path.into());
        self
    }

    /// Printable command line for logs and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A complete generator unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDefinition {
    pub manifest: ScriptManifest,
    pub files: Vec<FileSpec>,
    pub directories: Vec<RelativePath>,
    pub variables: Vec<VariableBinding>,
    pub commands: Vec<CommandSpec>,
}

impl ScriptDefinition {
    pub fn new(manifest: ScriptManifest) -> Self {
        Self {
            manifest,
            files: Vec::new(),
            directories: Vec::new(),
            variables: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn with_file(mut self, file: FileSpec) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_directory(mut self, dir: impl Into<RelativePath>) -> Self {
        self.directories.push(dir.into());
        self
    }

    pub fn with_variable(mut self, binding: VariableBinding) -> Self {
        self.variables.push(binding);
        self
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    /// Declared artifacts must be exactly what the payload writes.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.manifest.validate()?;

        let invalid = |reason: String| DomainError::InvalidDefinition {
            script: self.manifest.name.clone(),
            reason,
        };

        let declared: HashSet<(&std::path::Path, ArtifactKind)> = self
            .manifest
            .creates
            .iter()
            .map(|a| (a.path.as_path(), a.kind))
            .collect();

        let mut written = HashSet::new();
        for file in &self.files {
            if !written.insert((file.path.as_path(), ArtifactKind::File)) {
                return Err(DomainError::DuplicatePath {
                    script: self.manifest.name.clone(),
                    path: file.path.to_string(),
                });
            }
        }
        for dir in &self.directories {
            if !written.insert((dir.as_path(), ArtifactKind::Directory)) {
                return Err(DomainError::DuplicatePath {
                    script: self.manifest.name.clone(),
                    path: dir.to_string(),
                });
            }
        }

        if let Some((path, _)) = written.difference(&declared).next() {
            return Err(invalid(format!(
                "'{}' is written but not declared in creates",
                path.display()
            )));
        }
        if let Some((path, _)) = declared.difference(&written).next() {
            return Err(invalid(format!(
                "'{}' is declared in creates but has no payload",
                path.display()
            )));
        }

        let mut names = HashSet::new();
        for binding in &self.variables {
            if !names.insert(binding.name.as_str()) {
                return Err(invalid(format!("variable '{}' bound twice", binding.name)));
            }
        }

        Ok(())
    }
}
