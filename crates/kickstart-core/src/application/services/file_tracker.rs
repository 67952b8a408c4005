//! Idempotent artifact writes.
//!
//! Every write is classified against what is already on disk and resolved by
//! [`reconcile`]. Existing content is never lost: it is either kept as is or
//! copied to a verified backup before being replaced.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Clock, Filesystem},
    },
    domain::{
        ArtifactOutcome, ArtifactRecord, ArtifactState, ExecutionReport, Permissions,
        ReconcileAction, RelativePath, WritePolicy, reconcile,
    },
    error::KickstartResult,
};

pub struct FileOperationTracker {
    filesystem: Arc<dyn Filesystem>,
    clock: Arc<dyn Clock>,
}

impl FileOperationTracker {
    pub fn new(filesystem: Arc<dyn Filesystem>, clock: Arc<dyn Clock>) -> Self {
        Self { filesystem, clock }
    }

    /// The project root must exist and be a directory.
    pub fn ensure_root(&self, root: &Path) -> KickstartResult<()> {
        if !self.filesystem.exists(root) {
            return Err(ApplicationError::TargetDirectory {
                path: root.to_path_buf(),
                reason: "does not exist".into(),
            }
            .into());
        }
        if !self.filesystem.is_dir(root) {
            return Err(ApplicationError::TargetDirectory {
                path: root.to_path_buf(),
                reason: "is not a directory".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Write one file according to the policy and record the outcome.
    #[instrument(skip(self, content, report), fields(path = %rel))]
    pub fn write_file(
        &self,
        root: &Path,
        rel: &RelativePath,
        content: &str,
        permissions: Permissions,
        policy: WritePolicy,
        report: &mut ExecutionReport,
    ) -> KickstartResult<()> {
        self.ensure_root(root)?;
        let target = root.join(rel.as_path());
        let (state, existing) = self.classify(&target, content)?;

        match reconcile(state, policy) {
            ReconcileAction::Keep => {
                debug!(?state, "Keeping existing file");
                report.record(ArtifactRecord::new(rel.as_path(), ArtifactOutcome::SkippedExists));
                Ok(())
            }
            ReconcileAction::Write => {
                match self.write_and_verify(&target, content, permissions, policy)? {
                    None => {
                        info!("Created");
                        report.record(ArtifactRecord::new(rel.as_path(), ArtifactOutcome::Created));
                    }
                    Some(problem) => report.record(problem.relative_to(rel)),
                }
                Ok(())
            }
            ReconcileAction::BackupAndWrite => {
                let backup = self.backup(&target, existing.as_deref())?;
                let backup_rel = backup
                    .strip_prefix(root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| backup.clone());
                match self.write_and_verify(&target, content, permissions, policy)? {
                    None => {
                        info!(backup = %backup_rel.display(), "Replaced after backup");
                        report.record(
                            ArtifactRecord::new(rel.as_path(), ArtifactOutcome::SkippedBackedUp)
                                .with_backup(backup_rel),
                        );
                    }
                    Some(problem) => {
                        report.record(problem.relative_to(rel).with_backup(backup_rel));
                    }
                }
                Ok(())
            }
        }
    }

    /// Create a directory unless it exists.
    #[instrument(skip(self, report), fields(path = %rel))]
    pub fn ensure_dir(
        &self,
        root: &Path,
        rel: &RelativePath,
        policy: WritePolicy,
        report: &mut ExecutionReport,
    ) -> KickstartResult<()> {
        self.ensure_root(root)?;
        let target = root.join(rel.as_path());

        if self.filesystem.is_dir(&target) {
            report.record(ArtifactRecord::new(rel.as_path(), ArtifactOutcome::SkippedExists));
            return Ok(());
        }
        if self.filesystem.exists(&target) {
            return Err(ApplicationError::FilesystemError {
                path: target,
                reason: "a file is in the way of a directory".into(),
            }
            .into());
        }

        self.filesystem.create_dir_all(&target)?;
        if self.filesystem.is_dir(&target) {
            info!("Created directory");
            report.record(ArtifactRecord::new(rel.as_path(), ArtifactOutcome::Created));
            return Ok(());
        }

        let reason = "directory missing after creation".to_string();
        if policy.tolerant {
            warn!(%reason, "Verification failed, continuing");
            report.record(
                ArtifactRecord::new(rel.as_path(), ArtifactOutcome::Warning).with_message(reason),
            );
            Ok(())
        } else {
            Err(ApplicationError::VerificationFailed {
                path: target,
                reason,
            }
            .into())
        }
    }

    /// Work out the artifact state, returning the current content if any.
    fn classify(
        &self,
        target: &Path,
        content: &str,
    ) -> KickstartResult<(ArtifactState, Option<String>)> {
        if !self.filesystem.exists(target) {
            return Ok((ArtifactState::Absent, None));
        }
        if self.filesystem.is_dir(target) {
            return Err(ApplicationError::FilesystemError {
                path: target.to_path_buf(),
                reason: "a directory is in the way of a file".into(),
            }
            .into());
        }
        match self.filesystem.read_to_string(target) {
            Ok(existing) if existing == content => Ok((ArtifactState::PresentCurrent, Some(existing))),
            Ok(existing) => Ok((ArtifactState::PresentStale, Some(existing))),
            Err(e) => {
                debug!(error = %e, "Existing file unreadable, treating as stale");
                Ok((ArtifactState::PresentStale, None))
            }
        }
    }

    /// Copy the target aside and confirm the copy. Any failure is fatal and
    /// leaves the original untouched.
    fn backup(&self, target: &Path, original: Option<&str>) -> KickstartResult<PathBuf> {
        let backup = self.backup_path(target);
        let failed = |reason: String| ApplicationError::BackupFailed {
            path: target.to_path_buf(),
            reason,
        };

        self.filesystem
            .copy_file(target, &backup)
            .map_err(|e| failed(e.to_string()))?;

        if !self.filesystem.exists(&backup) {
            return Err(failed(format!("{} missing after copy", backup.display())).into());
        }
        if let Some(original) = original {
            let copied = self
                .filesystem
                .read_to_string(&backup)
                .map_err(|e| failed(e.to_string()))?;
            if copied != original {
                return Err(failed(format!("{} differs from the original", backup.display())).into());
            }
        }
        debug!(backup = %backup.display(), "Backup verified");
        Ok(backup)
    }

    /// `<file>.backup-YYYYMMDD-HHMMSS`, with `.1`, `.2`… when taken.
    fn backup_path(&self, target: &Path) -> PathBuf {
        let stamp = self.clock.now().format("%Y%m%d-%H%M%S");
        let base = format!("{}.backup-{stamp}", target.display());
        let mut candidate = PathBuf::from(&base);
        let mut n = 1;
        while self.filesystem.exists(&candidate) {
            candidate = PathBuf::from(format!("{base}.{n}"));
            n += 1;
        }
        candidate
    }

    /// Write, set permissions and read back.
    ///
    /// Returns `Some(record)` when verification failed under a tolerant
    /// policy; a non-tolerant policy turns that into an error.
    fn write_and_verify(
        &self,
        target: &Path,
        content: &str,
        permissions: Permissions,
        policy: WritePolicy,
    ) -> KickstartResult<Option<PendingWarning>> {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !self.filesystem.is_dir(parent) {
                self.filesystem.create_dir_all(parent)?;
            }
        }
        self.filesystem.write_file(target, content)?;
        if permissions.executable_flag() {
            self.filesystem.set_permissions(target, true)?;
        }

        let problem = match self.filesystem.read_to_string(target) {
            Ok(written) if written == content => return Ok(None),
            Ok(_) => "content differs after write".to_string(),
            Err(e) => format!("cannot read back: {e}"),
        };

        if policy.tolerant {
            warn!(path = %target.display(), %problem, "Verification failed, continuing");
            Ok(Some(PendingWarning { message: problem }))
        } else {
            Err(ApplicationError::VerificationFailed {
                path: target.to_path_buf(),
                reason: problem,
            }
            .into())
        }
    }
}

/// A verification problem waiting for its record.
struct PendingWarning {
    message: String,
}

impl PendingWarning {
    fn relative_to(self, rel: &RelativePath) -> ArtifactRecord {
        ArtifactRecord::new(rel.as_path(), ArtifactOutcome::Warning).with_message(self.message)
    }
}
