//! Filesystem-based script loader.
//!
//! Discovers `script.toml` manifests under a directory tree and turns each
//! into a [`ScriptDefinition`].
//!
//! # Directory layout expected
//!
//! ```text
//! scripts/
//! ├── bootstrap-ci/
//! │   ├── script.toml          ← manifest (required)
//! │   └── ci.yml.tmpl          ← template body referenced by [[files]]
//! └── docker/
//!     └── script.toml
//! ```
//!
//! # `script.toml` format
//!
//! ```toml
//! [script]
//! name        = "bootstrap-ci"
//! phase       = 3
//! category    = "ci"                 # project | git | ci | container | database | ...
//! description = "CI workflow"
//! creates     = [".github/", ".github/workflows/ci.yml"]   # trailing / = directory
//! conflicts   = ["bootstrap-gitlab"]
//! idempotent  = true                 # default true
//! safe        = true                 # default true
//! rollback    = "rm -rf .github"     # optional shell command
//!
//! [requires]
//! tools    = ["git", "node >=18"]
//! optional = ["gh"]
//! scripts  = ["bootstrap-git"]
//!
//! [[files]]
//! path       = ".github/workflows/ci.yml"
//! template   = "ci.yml.tmpl"          # relative to this directory, or:
//! # content  = "inline body"
//! executable = false
//!
//! [[variables]]
//! name    = "CI_PROVIDER"
//! key     = "cicd.provider"
//! default = "github"                  # optional
//!
//! [[commands]]
//! program       = "git"
//! args          = ["init"]
//! unless_exists = ".git"              # optional
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use kickstart_core::{
    application::ApplicationError,
    domain::{
        ArtifactKind, ArtifactPath, Category, CommandSpec, FileSpec, RelativePath,
        ScriptDefinition, ScriptManifest, ToolRequirement, VariableBinding,
    },
    error::{KickstartError, KickstartResult},
};
use serde::Deserialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

const MANIFEST_FILE: &str = "script.toml";

// ── Manifest schema ───────────────────────────────────────────────────────────

/// Raw deserialized form of a `script.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct ScriptFile {
    pub script: ScriptSection,
    #[serde(default)]
    pub requires: RequiresSection,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub variables: Vec<VariableEntry>,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

/// `[script]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct ScriptSection {
    pub name: String,
    #[serde(default)]
    pub phase: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub creates: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default = "default_true")]
    pub idempotent: bool,
    #[serde(default = "default_true")]
    pub safe: bool,
    pub rollback: Option<String>,
}

/// `[requires]` section.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RequiresSection {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub scripts: Vec<String>,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    pub path: String,
    /// Body file next to `script.toml`.
    pub template: Option<String>,
    /// Inline body.
    pub content: Option<String>,
    #[serde(default)]
    pub executable: bool,
}

/// One entry under `[[variables]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct VariableEntry {
    pub name: String,
    pub key: String,
    pub default: Option<String>,
}

/// One entry under `[[commands]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct CommandEntry {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub unless_exists: Option<String>,
}

fn default_true() -> bool {
    true
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`ScriptDefinition`]s from every `script.toml` under a directory.
///
/// Scripts are returned sorted by manifest path. A manifest that fails to
/// parse or validate fails the whole load, so a broken script never drops
/// silently out of a plan.
pub struct FilesystemScriptLoader {
    scripts_dir: PathBuf,
}

impl FilesystemScriptLoader {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    /// Load every script under the directory.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::ScriptLoad`] if the directory is missing or
    /// cannot be walked, or naming the first manifest that is invalid.
    #[instrument(skip(self), fields(dir = %self.scripts_dir.display()))]
    pub fn load_all(&self) -> KickstartResult<Vec<ScriptDefinition>> {
        if !self.scripts_dir.is_dir() {
            return Err(load_error(&self.scripts_dir, "scripts directory not found"));
        }

        let mut scripts = Vec::new();
        for entry in WalkDir::new(&self.scripts_dir)
            .max_depth(3)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| load_error(&self.scripts_dir, e.to_string()))?;
            if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
                continue;
            }

            let definition = self.load_file(entry.path())?;
            debug!(script = definition.name(), "loaded script");
            scripts.push(definition);
        }

        debug!(count = scripts.len(), "finished loading scripts");
        Ok(scripts)
    }

    /// Load a single `script.toml`.
    #[instrument(skip(self))]
    pub fn load_file(&self, manifest_path: &Path) -> KickstartResult<ScriptDefinition> {
        let raw = fs::read_to_string(manifest_path)
            .map_err(|e| load_error(manifest_path, format!("failed to read: {e}")))?;
        let parsed: ScriptFile = toml::from_str(&raw)
            .map_err(|e| load_error(manifest_path, format!("failed to parse: {e}")))?;
        let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

        let definition = build_definition(parsed, base)
            .map_err(|e| load_error(manifest_path, e.to_string()))?;
        definition
            .validate()
            .map_err(|e| load_error(manifest_path, e.to_string()))?;
        Ok(definition)
    }
}

fn build_definition(parsed: ScriptFile, base: &Path) -> KickstartResult<ScriptDefinition> {
    let section = parsed.script;
    let mut builder = ScriptManifest::builder(section.name)
        .phase(section.phase)
        .category(
            section
                .category
                .as_deref()
                .map_or(Category::Other, Category::parse_lenient),
        )
        .description(section.description)
        .idempotent(section.idempotent)
        .safe(section.safe);

    let mut directories = Vec::new();
    for raw in &section.creates {
        let artifact = ArtifactPath::parse(raw)?;
        if artifact.kind == ArtifactKind::Directory {
            directories.push(artifact.path.clone());
        }
        builder = builder.creates(artifact);
    }
    for conflict in section.conflicts {
        builder = builder.conflicts_with(conflict);
    }
    for tool in &parsed.requires.tools {
        builder = builder.tool(tool.parse::<ToolRequirement>()?);
    }
    for tool in &parsed.requires.optional {
        builder = builder.optional_tool(tool.parse::<ToolRequirement>()?);
    }
    for script in parsed.requires.scripts {
        builder = builder.depends_on(script);
    }
    if let Some(rollback) = section.rollback {
        builder = builder.rollback(rollback);
    }

    let mut definition = ScriptDefinition::new(builder.build()?);
    for dir in directories {
        definition = definition.with_directory(dir);
    }
    for file in parsed.files {
        definition = definition.with_file(load_file_entry(file, base)?);
    }
    for variable in parsed.variables {
        definition = definition.with_variable(VariableBinding::new(
            variable.name,
            variable.key.parse()?,
            variable.default.as_deref(),
        ));
    }
    for command in parsed.commands {
        let mut spec = CommandSpec::new(command.program, command.args);
        if let Some(path) = command.unless_exists {
            spec = spec.unless_exists(RelativePath::try_new(path)?);
        }
        definition = definition.with_command(spec);
    }

    Ok(definition)
}

fn load_file_entry(entry: FileEntry, base: &Path) -> KickstartResult<FileSpec> {
    let path = RelativePath::try_new(&entry.path)?;
    let body = match (entry.template, entry.content) {
        (Some(template), None) => {
            let template = RelativePath::try_new(template)?;
            let full = base.join(template.as_path());
            fs::read_to_string(&full)
                .map_err(|e| load_error(&full, format!("failed to read template: {e}")))?
        }
        (None, Some(content)) => content,
        _ => {
            return Err(load_error(
                base,
                format!("file '{}' needs exactly one of template or content", entry.path),
            ));
        }
    };

    let spec = FileSpec::new(path, body);
    Ok(if entry.executable { spec.executable() } else { spec })
}

fn load_error(path: &Path, reason: impl Into<String>) -> KickstartError {
    ApplicationError::ScriptLoad {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_core::error::ErrorCategory;
    use tempfile::TempDir;

    const CI_MANIFEST: &str = r#"
[script]
name = "bootstrap-ci"
phase = 3
category = "ci"
creates = [".github/", ".github/workflows/ci.yml"]
rollback = "rm -rf .github"

[requires]
tools = ["git"]
optional = ["gh"]
scripts = ["bootstrap-git"]

[[files]]
path = ".github/workflows/ci.yml"
template = "ci.yml.tmpl"

[[variables]]
name = "CI_PROVIDER"
key = "cicd.provider"
default = "github"

[[commands]]
program = "git"
args = ["add", "."]
unless_exists = ".github/workflows/ci.yml"
"#;

    fn write_script(root: &Path, dir: &str, manifest: &str, files: &[(&str, &str)]) {
        let script_dir = root.join(dir);
        fs::create_dir_all(&script_dir).unwrap();
        fs::write(script_dir.join(MANIFEST_FILE), manifest).unwrap();
        for (name, body) in files {
            fs::write(script_dir.join(name), body).unwrap();
        }
    }

    #[test]
    fn loads_full_manifest() {
        let temp = TempDir::new().unwrap();
        write_script(
            temp.path(),
            "ci",
            CI_MANIFEST,
            &[("ci.yml.tmpl", "provider: {{CI_PROVIDER}}\n")],
        );

        let scripts = FilesystemScriptLoader::new(temp.path()).load_all().unwrap();
        assert_eq!(scripts.len(), 1);

        let ci = &scripts[0];
        assert_eq!(ci.name(), "bootstrap-ci");
        assert_eq!(ci.manifest.phase.value(), 3);
        assert_eq!(ci.manifest.category, Category::Ci);
        assert_eq!(ci.manifest.rollback.as_deref(), Some("rm -rf .github"));
        assert!(ci.manifest.requires.scripts.contains("bootstrap-git"));
        assert_eq!(ci.files[0].body, "provider: {{CI_PROVIDER}}\n");
        assert_eq!(ci.directories, vec![RelativePath::new(".github")]);
        assert_eq!(ci.variables[0].default.as_deref(), Some("github"));
        assert_eq!(ci.commands[0].display(), "git add .");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = FilesystemScriptLoader::new("/absolutely/does/not/exist")
            .load_all()
            .unwrap_err();
        assert!(matches!(
            err,
            KickstartError::Application(ApplicationError::ScriptLoad { .. })
        ));
    }

    #[test]
    fn invalid_script_fails_the_load() {
        let temp = TempDir::new().unwrap();
        write_script(
            temp.path(),
            "good",
            "[script]\nname = \"good\"\ncreates = [\"a.txt\"]\n[[files]]\npath = \"a.txt\"\ncontent = \"a\"\n",
            &[],
        );
        write_script(
            temp.path(),
            "loop",
            "[script]\nname = \"loop\"\n[requires]\nscripts = [\"loop\"]\n",
            &[],
        );

        let err = FilesystemScriptLoader::new(temp.path())
            .load_all()
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        match err {
            KickstartError::Application(ApplicationError::ScriptLoad { path, reason }) => {
                assert_eq!(path, temp.path().join("loop").join(MANIFEST_FILE));
                assert!(reason.contains("depends on itself"), "{reason}");
            }
            other => panic!("expected a load error, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_manifest_fails_the_load() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "broken", "[script\nname=", &[]);

        let err = FilesystemScriptLoader::new(temp.path())
            .load_all()
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "{err}");
    }

    #[test]
    fn file_needs_exactly_one_body_source() {
        let temp = TempDir::new().unwrap();
        write_script(
            temp.path(),
            "x",
            "[script]\nname = \"x\"\ncreates = [\"x.txt\"]\n[[files]]\npath = \"x.txt\"\n",
            &[],
        );
        let err = FilesystemScriptLoader::new(temp.path())
            .load_file(&temp.path().join("x").join(MANIFEST_FILE))
            .unwrap_err();
        assert!(err.to_string().contains("exactly one of template or content"));
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let temp = TempDir::new().unwrap();
        write_script(
            temp.path(),
            "evil",
            "[script]\nname = \"evil\"\ncreates = [\"../x.txt\"]\n[[files]]\npath = \"../x.txt\"\ncontent = \"x\"\n",
            &[],
        );
        assert!(
            FilesystemScriptLoader::new(temp.path())
                .load_file(&temp.path().join("evil").join(MANIFEST_FILE))
                .is_err()
        );
    }
}
