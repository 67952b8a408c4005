//! Implementation of the `kickstart list` command.

use kickstart_core::{application::ports::ScriptStore, domain::ScriptDefinition};

use crate::{
    cli::{ListArgs, ListFormat},
    commands::context,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let mut scripts = context::script_store(&config)?.list()?;
    scripts.sort_by_key(|s| s.manifest.phase);

    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            output.header("Available scripts:")?;
            for script in &scripts {
                output.print(&table_row(script))?;
            }
        }

        ListFormat::List => {
            for script in &scripts {
                output.print(script.name())?;
            }
        }

        ListFormat::Json => {
            let rows: Vec<_> = scripts.iter().map(json_row).collect();
            output.json(&rows)?;
        }
    }

    Ok(())
}

fn table_row(script: &ScriptDefinition) -> String {
    let manifest = &script.manifest;
    let mut row = format!(
        "  {:<20} phase {:<2} {:<10} {}",
        manifest.name, manifest.phase, manifest.category, manifest.description
    );
    if !manifest.requires.tools.is_empty() {
        let tools: Vec<String> = manifest.requires.tools.iter().map(|t| t.to_string()).collect();
        row.push_str(&format!(" [needs {}]", tools.join(", ")));
    }
    row
}

fn json_row(script: &ScriptDefinition) -> serde_json::Value {
    let manifest = &script.manifest;
    serde_json::json!({
        "name": manifest.name,
        "phase": manifest.phase,
        "category": manifest.category,
        "description": manifest.description,
        "tools": manifest.requires.tools.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
        "depends": manifest.requires.scripts,
        "conflicts": manifest.conflicts,
        "rollback": manifest.rollback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickstart_core::domain::{ScriptManifest, ToolRequirement};

    fn git() -> ScriptDefinition {
        ScriptDefinition::new(
            ScriptManifest::builder("bootstrap-git")
                .phase(2)
                .description("git repo")
                .tool(ToolRequirement::binary("git"))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn table_row_names_tools() {
        let row = table_row(&git());
        assert!(row.contains("bootstrap-git"));
        assert!(row.contains("[needs git]"));
    }

    #[test]
    fn json_row_carries_phase() {
        let row = json_row(&git());
        assert_eq!(row["phase"], 2);
        assert_eq!(row["tools"][0], "git");
    }
}
