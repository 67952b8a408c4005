//! Built-in script catalogue.
//!
//! These ship inside the binary. Their payloads are deliberately short
//! starting points; projects that need more load their own scripts with
//! [`FilesystemScriptLoader`](crate::script_loader::FilesystemScriptLoader).
//!
//! | Script             | Phase | Needs                 |
//! |--------------------|-------|-----------------------|
//! | `bootstrap-project`| 1     |                       |
//! | `editorconfig`     | 1     |                       |
//! | `bootstrap-git`    | 2     | `git`                 |
//! | `bootstrap-github` | 3     | `bootstrap-git`       |
//! | `docker`           | 4     | (`docker` optional)   |
//! | `postgres`         | 5     | conflicts `mysql`     |
//! | `mysql`            | 5     | conflicts `postgres`  |

use kickstart_core::{
    domain::{
        ArtifactPath, Category, CommandSpec, ConfigKey, DomainError, FileSpec, ScriptDefinition,
        ScriptManifest, ToolRequirement, VariableBinding,
    },
    error::KickstartResult,
};
use tracing::{debug, instrument};

/// Every built-in script, in registration order.
#[instrument]
pub fn all_scripts() -> KickstartResult<Vec<ScriptDefinition>> {
    let scripts = vec![
        bootstrap_project()?,
        editorconfig()?,
        bootstrap_git()?,
        bootstrap_github()?,
        docker()?,
        postgres()?,
        mysql()?,
    ];
    debug!(count = scripts.len(), "built-in scripts ready");
    Ok(scripts)
}

fn key(raw: &str) -> Result<ConfigKey, DomainError> {
    raw.parse()
}

fn bootstrap_project() -> Result<ScriptDefinition, DomainError> {
    let manifest = ScriptManifest::builder("bootstrap-project")
        .phase(1)
        .category(Category::Project)
        .description("README, changelog and license")
        .creates(ArtifactPath::file("README.md"))
        .creates(ArtifactPath::file("CHANGELOG.md"))
        .creates(ArtifactPath::file("LICENSE"))
        .build()?;

    Ok(ScriptDefinition::new(manifest)
        .with_file(FileSpec::new(
            "README.md",
            "# {{PROJECT_NAME}}\n\n{{DESCRIPTION}}\n",
        ))
        .with_file(FileSpec::new(
            "CHANGELOG.md",
            "# Changelog\n\n## Unreleased\n\n- Initial {{PROJECT_NAME_KEBAB}} layout\n",
        ))
        .with_file(FileSpec::new(
            "LICENSE",
            "MIT License\n\nCopyright (c) {{YEAR}} {{AUTHOR}}\n",
        ))
        .with_variable(VariableBinding::new(
            "DESCRIPTION",
            key("project.description")?,
            Some("A new project."),
        ))
        .with_variable(VariableBinding::new(
            "AUTHOR",
            key("project.author")?,
            Some("The project authors"),
        )))
}

fn editorconfig() -> Result<ScriptDefinition, DomainError> {
    let manifest = ScriptManifest::builder("editorconfig")
        .phase(1)
        .category(Category::Quality)
        .description("Shared editor settings")
        .creates(ArtifactPath::file(".editorconfig"))
        .build()?;

    Ok(ScriptDefinition::new(manifest)
        .with_file(FileSpec::new(
            ".editorconfig",
            "root = true\n\n[*]\nend_of_line = lf\ninsert_final_newline = true\n\
             indent_style = space\nindent_size = {{INDENT_SIZE}}\n",
        ))
        .with_variable(VariableBinding::new(
            "INDENT_SIZE",
            key("editor.indent_size")?,
            Some("4"),
        )))
}

fn bootstrap_git() -> Result<ScriptDefinition, DomainError> {
    let manifest = ScriptManifest::builder("bootstrap-git")
        .phase(2)
        .category(Category::Git)
        .description("Initialise a git repository with a .gitignore")
        .tool(ToolRequirement::binary("git"))
        .creates(ArtifactPath::file(".gitignore"))
        .rollback("rm -rf .git")
        .build()?;

    Ok(ScriptDefinition::new(manifest)
        .with_file(FileSpec::new(
            ".gitignore",
            "# Generated for {{PROJECT_NAME}}\n/target/\n/dist/\n.env\n*.log\n",
        ))
        .with_command(CommandSpec::new("git", ["init", "--quiet"]).unless_exists(".git")))
}

fn bootstrap_github() -> Result<ScriptDefinition, DomainError> {
    let manifest = ScriptManifest::builder("bootstrap-github")
        .phase(3)
        .category(Category::Ci)
        .description("GitHub Actions workflow")
        .depends_on("bootstrap-git")
        .optional_tool(ToolRequirement::binary("gh"))
        .creates(ArtifactPath::directory(".github"))
        .creates(ArtifactPath::directory(".github/workflows"))
        .creates(ArtifactPath::file(".github/workflows/ci.yml"))
        .rollback("rm -rf .github")
        .build()?;

    Ok(ScriptDefinition::new(manifest)
        .with_directory(".github")
        .with_directory(".github/workflows")
        .with_file(FileSpec::new(
            ".github/workflows/ci.yml",
            "# provider: {{CI_PROVIDER}}\nname: {{PROJECT_NAME}} CI\n\
             on: [push, pull_request]\n\
             jobs:\n  build:\n    runs-on: {{CI_RUNNER}}\n    steps:\n\
             \x20     - uses: actions/checkout@v4\n\
             \x20     - run: echo \"building ${{ github.sha }}\"\n",
        ))
        .with_variable(VariableBinding::new(
            "CI_PROVIDER",
            key("cicd.provider")?,
            Some("github"),
        ))
        .with_variable(VariableBinding::new(
            "CI_RUNNER",
            key("cicd.runner")?,
            Some("ubuntu-latest"),
        )))
}

fn docker() -> Result<ScriptDefinition, DomainError> {
    let manifest = ScriptManifest::builder("docker")
        .phase(4)
        .category(Category::Container)
        .description("Dockerfile and compose file")
        .optional_tool(ToolRequirement::binary("docker"))
        .creates(ArtifactPath::file("Dockerfile"))
        .creates(ArtifactPath::file("compose.yaml"))
        .build()?;

    Ok(ScriptDefinition::new(manifest)
        .with_file(FileSpec::new(
            "Dockerfile",
            "FROM {{BASE_IMAGE}}\nWORKDIR /app\nCOPY . .\n",
        ))
        .with_file(FileSpec::new(
            "compose.yaml",
            "services:\n  {{PROJECT_NAME_KEBAB}}:\n    build: .\n",
        ))
        .with_variable(VariableBinding::new(
            "BASE_IMAGE",
            key("docker.base_image")?,
            Some("debian:bookworm-slim"),
        )))
}

fn database(
    name: &str,
    other: &str,
    image: &str,
    port: &str,
) -> Result<ScriptDefinition, DomainError> {
    let env_file = format!("db/{name}.env");
    let manifest = ScriptManifest::builder(name)
        .phase(5)
        .category(Category::Database)
        .description(format!("{name} connection settings"))
        .conflicts_with(other)
        .creates(ArtifactPath::directory("db"))
        .creates(ArtifactPath::file(env_file.as_str()))
        .build()?;

    Ok(ScriptDefinition::new(manifest)
        .with_directory("db")
        .with_file(FileSpec::new(
            env_file.as_str(),
            format!(
                "# {image}\nDATABASE_NAME={{{{DB_NAME}}}}\nDATABASE_PORT={{{{DB_PORT}}}}\n"
            ),
        ))
        .with_variable(VariableBinding::new(
            "DB_NAME",
            key("database.name")?,
            Some("app"),
        ))
        .with_variable(VariableBinding::new(
            "DB_PORT",
            key("database.port")?,
            Some(port),
        )))
}

fn postgres() -> Result<ScriptDefinition, DomainError> {
    database("postgres", "mysql", "postgres:16", "5432")
}

fn mysql() -> Result<ScriptDefinition, DomainError> {
    database("mysql", "postgres", "mysql:8", "3306")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_core::domain::{DomainValidator, ProjectFields, RenderContext};

    #[test]
    fn catalogue_is_valid() {
        let scripts = all_scripts().unwrap();
        DomainValidator::validate_catalogue(scripts.iter()).unwrap();
        for script in &scripts {
            script.validate().unwrap();
        }
    }

    #[test]
    fn bodies_render_with_defaults() {
        for script in all_scripts().unwrap() {
            let mut ctx = RenderContext::from_fields(&ProjectFields::new("demo", 2026)).unwrap();
            for binding in &script.variables {
                if let Some(default) = &binding.default {
                    ctx = ctx.with_variable(binding.name.clone(), default.clone());
                }
            }
            for file in &script.files {
                ctx.render(&file.body)
                    .unwrap_or_else(|e| panic!("{} / {}: {e}", script.name(), file.path));
            }
        }
    }

    #[test]
    fn github_workflow_keeps_ci_expressions() {
        let github = bootstrap_github().unwrap();
        let ctx = RenderContext::from_fields(&ProjectFields::new("demo", 2026))
            .unwrap()
            .with_variable("CI_PROVIDER", "github")
            .with_variable("CI_RUNNER", "ubuntu-latest");
        let out = ctx.render(&github.files[0].body).unwrap();
        assert!(out.contains("${{ github.sha }}"));
        assert!(out.contains("runs-on: ubuntu-latest"));
    }

    #[test]
    fn databases_conflict_both_ways() {
        let pg = postgres().unwrap();
        let my = mysql().unwrap();
        assert!(pg.manifest.conflicts.contains("mysql"));
        assert!(my.manifest.conflicts.contains("postgres"));
    }
}
