//! Per-artifact outcomes and the report that accumulates them.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// What is on disk at an artifact path before a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Absent,
    /// Present with exactly the content we would write.
    PresentCurrent,
    /// Present with different content.
    PresentStale,
}

/// The decision taken for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Write,
    Keep,
    BackupAndWrite,
}

/// How the tracker treats existing artifacts and verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WritePolicy {
    /// Back up and overwrite stale artifacts instead of leaving them alone.
    pub auto_backup: bool,
    /// Downgrade post-write verification failures to warnings.
    pub tolerant: bool,
}

/// The artifact state machine. Pure; the tracker performs the action.
pub fn reconcile(state: ArtifactState, policy: WritePolicy) -> ReconcileAction {
    match state {
        ArtifactState::Absent => ReconcileAction::Write,
        ArtifactState::PresentCurrent => ReconcileAction::Keep,
        ArtifactState::PresentStale if policy.auto_backup => ReconcileAction::BackupAndWrite,
        ArtifactState::PresentStale => ReconcileAction::Keep,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOutcome {
    Created,
    SkippedExists,
    SkippedBackedUp,
    Warning,
}

impl ArtifactOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::SkippedExists => "skipped (exists)",
            Self::SkippedBackedUp => "replaced (backed up)",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ArtifactOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub target: PathBuf,
    pub outcome: ArtifactOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ArtifactRecord {
    pub fn new(target: impl Into<PathBuf>, outcome: ArtifactOutcome) -> Self {
        Self {
            target: target.into(),
            outcome,
            backup: None,
            message: None,
        }
    }

    pub fn with_backup(mut self, backup: impl Into<PathBuf>) -> Self {
        self.backup = Some(backup.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Totals per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub created: usize,
    pub skipped: usize,
    pub backed_up: usize,
    pub warnings: usize,
}

/// Ordered outcomes of one or more scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    records: Vec<ArtifactRecord>,
    /// Warnings not tied to a single artifact (optional tools, conflicts).
    notes: Vec<String>,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: ArtifactRecord) {
        self.records.push(record);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn records(&self) -> &[ArtifactRecord] {
        &self.records
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    fn with_outcome(&self, outcome: ArtifactOutcome) -> impl Iterator<Item = &ArtifactRecord> {
        self.records.iter().filter(move |r| r.outcome == outcome)
    }

    pub fn created(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.with_outcome(ArtifactOutcome::Created)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.with_outcome(ArtifactOutcome::SkippedExists)
    }

    pub fn backed_up(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.with_outcome(ArtifactOutcome::SkippedBackedUp)
    }

    /// Warning records followed by free-standing notes.
    pub fn warnings(&self) -> Vec<String> {
        self.with_outcome(ArtifactOutcome::Warning)
            .map(|r| match &r.message {
                Some(m) => format!("{}: {m}", r.target.display()),
                None => r.target.display().to_string(),
            })
            .chain(self.notes.iter().cloned())
            .collect()
    }

    pub fn counts(&self) -> ReportCounts {
        let mut counts = ReportCounts {
            warnings: self.notes.len(),
            ..ReportCounts::default()
        };
        for record in &self.records {
            match record.outcome {
                ArtifactOutcome::Created => counts.created += 1,
                ArtifactOutcome::SkippedExists => counts.skipped += 1,
                ArtifactOutcome::SkippedBackedUp => counts.backed_up += 1,
                ArtifactOutcome::Warning => counts.warnings += 1,
            }
        }
        counts
    }

    /// Artifacts whose content changed on disk.
    pub fn written_count(&self) -> usize {
        let counts = self.counts();
        counts.created + counts.backed_up
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.notes.is_empty()
    }

    pub fn merge(&mut self, other: ExecutionReport) {
        self.records.extend(other.records);
        self.notes.extend(other.notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_transitions() {
        let keep = WritePolicy::default();
        let backup = WritePolicy {
            auto_backup: true,
            tolerant: false,
        };

        assert_eq!(reconcile(ArtifactState::Absent, keep), ReconcileAction::Write);
        assert_eq!(reconcile(ArtifactState::PresentStale, keep), ReconcileAction::Keep);
        assert_eq!(
            reconcile(ArtifactState::PresentStale, backup),
            ReconcileAction::BackupAndWrite
        );
        // identical content is never backed up
        assert_eq!(
            reconcile(ArtifactState::PresentCurrent, backup),
            ReconcileAction::Keep
        );
    }

    #[test]
    fn counts_and_warnings() {
        let mut report = ExecutionReport::new();
        report.record(ArtifactRecord::new("a.yml", ArtifactOutcome::Created));
        report.record(ArtifactRecord::new("b.yml", ArtifactOutcome::SkippedExists));
        report.record(
            ArtifactRecord::new("c.yml", ArtifactOutcome::SkippedBackedUp)
                .with_backup("c.yml.backup-20260101-000000"),
        );
        report.record(
            ArtifactRecord::new("d.yml", ArtifactOutcome::Warning).with_message("verify failed"),
        );
        report.warn("optional tool 'shellcheck' not found");

        let counts = report.counts();
        assert_eq!(counts.created, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.backed_up, 1);
        assert_eq!(counts.warnings, 2);
        assert_eq!(report.written_count(), 2);
        assert_eq!(
            report.warnings(),
            vec![
                "d.yml: verify failed".to_string(),
                "optional tool 'shellcheck' not found".to_string()
            ]
        );
    }

    #[test]
    fn merge_preserves_order() {
        let mut first = ExecutionReport::new();
        first.record(ArtifactRecord::new("a", ArtifactOutcome::Created));
        let mut second = ExecutionReport::new();
        second.record(ArtifactRecord::new("b", ArtifactOutcome::Created));
        first.merge(second);

        let targets: Vec<_> = first.records().iter().map(|r| r.target.clone()).collect();
        assert_eq!(targets, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn serializes_outcomes_in_snake_case() {
        let mut report = ExecutionReport::new();
        report.record(ArtifactRecord::new("x.yml", ArtifactOutcome::SkippedExists));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"skipped_exists\""));
        assert!(!json.contains("backup"));
    }
}
