//! End-to-end runs through the orchestrator with in-memory adapters.

use std::{path::Path, sync::Arc};

use chrono::NaiveDate;
use kickstart_adapters::{
    FakeToolProbe, FixedClock, InMemoryStore, MemoryConfigStorage, MemoryFilesystem,
    RecordingRunner, StrictRenderer,
};
use kickstart_core::prelude::*;
use kickstart_core::{
    application::{ApplicationError, ScriptStatus},
    domain::{
        ArtifactOutcome, ArtifactPath, CommandSpec, DomainError, FileSpec, ToolRequirement,
        VariableBinding,
    },
};

const ROOT: &str = "/work/demo";

struct Pipeline {
    fs: MemoryFilesystem,
    runner: RecordingRunner,
    orchestrator: ScriptOrchestrator,
}

fn pipeline(scripts: Vec<ScriptDefinition>, probe: FakeToolProbe) -> Pipeline {
    let store = InMemoryStore::new();
    for script in scripts {
        store.insert(script).unwrap();
    }
    let fs = MemoryFilesystem::with_root(ROOT);
    let runner = RecordingRunner::new();
    let clock = FixedClock(
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap(),
    );
    let orchestrator = ScriptOrchestrator::new(
        Arc::new(store),
        Arc::new(fs.clone()),
        Box::new(probe),
        Box::new(runner.clone()),
        Box::new(StrictRenderer::new()),
        Arc::new(clock),
    );
    Pipeline {
        fs,
        runner,
        orchestrator,
    }
}

fn config(storage: &MemoryConfigStorage, answers: AnswersOverride) -> ConfigStore {
    ConfigStore::load(Box::new(storage.clone()), answers).unwrap()
}

fn x_yml() -> ScriptDefinition {
    ScriptDefinition::new(
        ScriptManifest::builder("x")
            .phase(1)
            .creates(ArtifactPath::file("x.yml"))
            .build()
            .unwrap(),
    )
    .with_file(FileSpec::new("x.yml", "name: {{PROJECT_NAME}}\n"))
}

fn ci() -> ScriptDefinition {
    ScriptDefinition::new(
        ScriptManifest::builder("bootstrap-ci")
            .phase(2)
            .tool(ToolRequirement::binary("git"))
            .creates(ArtifactPath::directory(".ci"))
            .creates(ArtifactPath::file(".ci/provider"))
            .build()
            .unwrap(),
    )
    .with_directory(".ci")
    .with_file(FileSpec::new(".ci/provider", "{{CI_PROVIDER}}\n"))
    .with_variable(VariableBinding::new(
        "CI_PROVIDER",
        "cicd.provider".parse().unwrap(),
        Some("github"),
    ))
    .with_command(CommandSpec::new("git", ["init"]).unless_exists(".git"))
}

fn file(fs: &MemoryFilesystem, rel: &str) -> Option<String> {
    fs.read_file(Path::new(ROOT).join(rel))
}

#[test]
fn second_run_skips_everything() {
    let p = pipeline(vec![x_yml()], FakeToolProbe::new());
    let storage = MemoryConfigStorage::new();
    let plan = p.orchestrator.plan(&[], &[]).unwrap();

    let first = p
        .orchestrator
        .run(Path::new(ROOT), &plan, &config(&storage, AnswersOverride::new()))
        .unwrap();
    assert_eq!(first.totals().created, 1);
    assert_eq!(file(&p.fs, "x.yml").as_deref(), Some("name: demo\n"));

    let second = p
        .orchestrator
        .run(Path::new(ROOT), &plan, &config(&storage, AnswersOverride::new()))
        .unwrap();
    assert_eq!(second.totals().created, 0);
    assert_eq!(second.totals().skipped, 1);
    assert_eq!(p.fs.list_files().len(), 1);
}

#[test]
fn stale_file_is_backed_up_before_overwrite() {
    let p = pipeline(vec![x_yml()], FakeToolProbe::new());
    p.fs
        .write_file(&Path::new(ROOT).join("x.yml"), "hand edited\n")
        .unwrap();
    let storage =
        MemoryConfigStorage::with_entries(&[("bootstrap.backup_existing_files", "true")]).unwrap();
    let plan = p.orchestrator.plan(&[], &[]).unwrap();

    let summary = p
        .orchestrator
        .run(Path::new(ROOT), &plan, &config(&storage, AnswersOverride::new()))
        .unwrap();

    let record = &summary.scripts[0].report.records()[0];
    assert_eq!(record.outcome, ArtifactOutcome::SkippedBackedUp);
    let backup = record.backup.as_ref().unwrap();
    assert_eq!(backup, Path::new("x.yml.backup-20260314-092653"));
    assert_eq!(
        p.fs.read_file(Path::new(ROOT).join(backup)).as_deref(),
        Some("hand edited\n")
    );
    assert_eq!(file(&p.fs, "x.yml").as_deref(), Some("name: demo\n"));
}

#[test]
fn stale_file_is_kept_without_backup_policy() {
    let p = pipeline(vec![x_yml()], FakeToolProbe::new());
    p.fs
        .write_file(&Path::new(ROOT).join("x.yml"), "hand edited\n")
        .unwrap();
    let plan = p.orchestrator.plan(&[], &[]).unwrap();

    let summary = p
        .orchestrator
        .run(
            Path::new(ROOT),
            &plan,
            &config(&MemoryConfigStorage::new(), AnswersOverride::new()),
        )
        .unwrap();

    assert_eq!(summary.totals().skipped, 1);
    assert_eq!(file(&p.fs, "x.yml").as_deref(), Some("hand edited\n"));
}

#[test]
fn missing_tool_fails_fast_without_writing() {
    let p = pipeline(vec![ci()], FakeToolProbe::new());
    let plan = p.orchestrator.plan(&[], &[]).unwrap();

    let failure = p
        .orchestrator
        .run(
            Path::new(ROOT),
            &plan,
            &config(&MemoryConfigStorage::new(), AnswersOverride::new()),
        )
        .unwrap_err();

    assert!(matches!(
        failure.error,
        KickstartError::Application(ApplicationError::MissingTool { .. })
    ));
    assert_eq!(failure.summary.scripts[0].status, ScriptStatus::Failed);
    assert!(p.fs.list_files().is_empty());
    assert!(p.runner.calls().is_empty());
}

#[test]
fn binding_default_then_store_then_answers() {
    let p = pipeline(vec![ci()], FakeToolProbe::new().with_tool("git", None));
    let plan = p.orchestrator.plan(&[], &[]).unwrap();
    let provider = || file(&p.fs, ".ci/provider");

    let empty = MemoryConfigStorage::new();
    p.orchestrator
        .run(Path::new(ROOT), &plan, &config(&empty, AnswersOverride::new()))
        .unwrap();
    assert_eq!(provider().as_deref(), Some("github\n"));
    assert_eq!(p.runner.calls()[0].display(), "git init");

    // Stored value wins over the default; backups make the change visible.
    let stored = MemoryConfigStorage::with_entries(&[
        ("cicd.provider", "gitlab"),
        ("bootstrap.backup_existing_files", "true"),
    ])
    .unwrap();
    p.orchestrator
        .run(Path::new(ROOT), &plan, &config(&stored, AnswersOverride::new()))
        .unwrap();
    assert_eq!(provider().as_deref(), Some("gitlab\n"));

    // Answers win over the store, and are not persisted.
    let answers = AnswersOverride::from_pairs([("CI_PROVIDER", "jenkins")]);
    let cfg = config(&stored, answers);
    p.orchestrator.run(Path::new(ROOT), &plan, &cfg).unwrap();
    assert_eq!(provider().as_deref(), Some("jenkins\n"));
    assert!(
        stored
            .load()
            .unwrap()
            .iter()
            .all(|e| e.value != "jenkins")
    );
}

#[test]
fn unknown_selection_is_rejected() {
    let p = pipeline(vec![x_yml()], FakeToolProbe::new());
    let err = p.orchestrator.plan(&["nope".into()], &[]).unwrap_err();
    assert!(matches!(
        err,
        KickstartError::Domain(DomainError::UnknownScript { .. })
    ));
}

#[test]
fn builtin_catalogue_plans_in_phase_order() {
    let store = InMemoryStore::with_builtin().unwrap();
    let p = pipeline(store.list().unwrap(), FakeToolProbe::new());
    let plan = p.orchestrator.plan(&[], &[]).unwrap();
    let names: Vec<_> = plan.names().collect();

    assert_eq!(
        names,
        vec![
            "bootstrap-project",
            "editorconfig",
            "bootstrap-git",
            "bootstrap-github",
            "docker",
            "postgres",
        ]
    );
}
