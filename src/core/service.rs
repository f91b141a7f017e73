//! The operations exposed to the session layer, keyed by project directory.
//!
//! [`SnapshotService`] resolves a directory (or a session id) to the shared
//! repository handle, runs the operation, and logs failures once at this
//! boundary. Every method returns a [`Result`]; callers match on
//! [`SnapshotError::kind`](crate::core::error::SnapshotError::kind) to decide
//! what to show.

use crate::core::{
    cleanup::CleanupReport,
    config::SnapshotConfig,
    error::{ErrorKind, Result, SnapshotError},
    export::ExportReport,
    git::{short_hash, ProjectRepo, RepositoryInfo},
    git_status::RepoStatus,
    lifecycle::InitReport,
    manifest::ProjectManifest,
    registry::{resolve_session, RepoRegistry, SessionDirectory},
    snapshot::{CreatedSnapshot, RestoreReport, Snapshot, SnapshotContent, SnapshotOutcome},
    view::{ForceRecovery, ViewEntered, ViewExited, ViewStatus},
};
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rollback result plus the reloaded manifest
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub report: RestoreReport,
    /// Snapshot of the pre-rollback state, when one was needed
    pub backup: Option<CreatedSnapshot>,
    pub manifest: Option<ProjectManifest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExitOutcome {
    pub exited: ViewExited,
    pub manifest: Option<ProjectManifest>,
}

pub fn backup_message(target: &str) -> String {
    format!("Backup before rollback - Target: {}", short_hash(target))
}

pub struct SnapshotService {
    config: SnapshotConfig,
    registry: RepoRegistry,
    sessions: Option<Arc<dyn SessionDirectory>>,
}

impl SnapshotService {
    pub fn new(config: SnapshotConfig) -> Self {
        let registry = RepoRegistry::new(config.command_timeout());
        Self {
            config,
            registry,
            sessions: None,
        }
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionDirectory>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Project directory of a session
    pub fn session_dir(&self, session_id: &str) -> Result<PathBuf> {
        match &self.sessions {
            Some(sessions) => resolve_session(sessions.as_ref(), session_id),
            None => Err(SnapshotError::session_not_found(session_id)),
        }
    }

    pub fn repo(&self, dir: &Path) -> Result<Arc<ProjectRepo>> {
        self.registry.handle(dir)
    }

    pub fn init_repository(&self, dir: &Path, force: bool) -> Result<InitReport> {
        boundary("init", self.repo(dir).and_then(|repo| repo.initialize(force)))
    }

    pub fn create_snapshot(
        &self,
        dir: &Path,
        message: &str,
        user: Option<&str>,
    ) -> Result<SnapshotOutcome> {
        boundary(
            "snapshot",
            self.repo(dir)
                .and_then(|repo| repo.create_snapshot(message, user)),
        )
    }

    /// Newest-first history; `None` uses the configured limit
    pub fn list_snapshots(&self, dir: &Path, limit: Option<usize>) -> Result<Vec<Snapshot>> {
        let limit = limit.unwrap_or(self.config.history_limit);
        boundary(
            "list",
            self.repo(dir).and_then(|repo| repo.list_snapshots(limit)),
        )
    }

    pub fn snapshot_content(&self, dir: &Path, hash: &str) -> Result<SnapshotContent> {
        boundary(
            "content",
            self.repo(dir).and_then(|repo| repo.snapshot_content(hash)),
        )
    }

    /// Roll back to `hash`, first snapshotting the current state when `backup` is set.
    ///
    /// Lossy: uncommitted changes not captured by the backup are discarded.
    pub fn restore_snapshot(&self, dir: &Path, hash: &str, backup: bool) -> Result<RestoreOutcome> {
        boundary("restore", self.restore_inner(dir, hash, backup))
    }

    fn restore_inner(&self, dir: &Path, hash: &str, backup: bool) -> Result<RestoreOutcome> {
        let repo = self.repo(dir)?;
        repo.require_initialized()?;
        let target = repo.resolve_commit(hash)?;

        let backup = if backup {
            match repo.create_snapshot(&backup_message(&target), None)? {
                SnapshotOutcome::Created(created) => {
                    info!("Backup snapshot {} taken before rollback", created.short_hash);
                    Some(created)
                }
                SnapshotOutcome::NoChanges => None,
            }
        } else {
            None
        };

        let report = repo.restore_snapshot(&target)?;
        Ok(RestoreOutcome {
            report,
            backup,
            manifest: reload_manifest(repo.root()),
        })
    }

    pub fn repository_status(&self, dir: &Path) -> Result<RepoStatus> {
        boundary("status", self.repo(dir).and_then(|repo| repo.status()))
    }

    pub fn has_changes(&self, dir: &Path) -> Result<bool> {
        boundary("has-changes", self.repo(dir).and_then(|repo| repo.has_changes()))
    }

    pub fn repository_info(&self, dir: &Path) -> Result<RepositoryInfo> {
        boundary("info", self.repo(dir).map(|repo| repo.info()))
    }

    pub fn enter_view(&self, dir: &Path, hash: &str) -> Result<ViewEntered> {
        boundary("view", self.repo(dir).and_then(|repo| repo.enter_view(hash)))
    }

    pub fn exit_view(&self, dir: &Path) -> Result<ExitOutcome> {
        let result = self.repo(dir).and_then(|repo| {
            let exited = repo.exit_view()?;
            Ok(ExitOutcome {
                exited,
                manifest: reload_manifest(repo.root()),
            })
        });
        boundary("exit-view", result)
    }

    pub fn view_status(&self, dir: &Path) -> Result<ViewStatus> {
        boundary("view-status", self.repo(dir).and_then(|repo| repo.view_status()))
    }

    pub fn force_recover(&self, dir: &Path) -> Result<ForceRecovery> {
        boundary("recover", self.repo(dir).and_then(|repo| repo.force_recover()))
    }

    pub fn ensure_not_in_view(&self, dir: &Path) -> Result<bool> {
        boundary(
            "ensure-not-in-view",
            self.repo(dir).and_then(|repo| repo.ensure_not_in_view()),
        )
    }

    /// Bare clone of the project history; `None` exports to a temp directory
    pub fn export_repository(&self, dir: &Path, dest: Option<&Path>) -> Result<ExportReport> {
        boundary(
            "export",
            self.repo(dir).and_then(|repo| repo.export_repository(dest)),
        )
    }

    /// Clean the repository and drop its handle
    pub fn cleanup(&self, dir: &Path) -> Result<CleanupReport> {
        let repo = boundary("cleanup", self.repo(dir))?;
        let report = repo.cleanup();
        drop(repo);
        self.registry.release(dir);
        Ok(report)
    }
}

impl Default for SnapshotService {
    fn default() -> Self {
        Self::new(SnapshotConfig::default())
    }
}

/// Log a failed operation once, at the level its kind deserves
fn boundary<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_expected() {
            info!("{operation}: {e}");
        } else if e.kind() == ErrorKind::Unknown {
            error!("{operation} failed unexpectedly: {e}");
        } else {
            warn!("{operation} failed: {e}");
        }
    }
    result
}

/// The working copy changed underneath any cached manifest
fn reload_manifest(root: &Path) -> Option<ProjectManifest> {
    match ProjectManifest::load(root) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("Could not reload project manifest: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::SessionMap;
    use tempfile::TempDir;

    #[test]
    fn test_backup_message_uses_short_hash() {
        let message = backup_message("0123456789abcdef0123456789abcdef01234567");
        assert_eq!(message, "Backup before rollback - Target: 01234567");
    }

    #[test]
    fn test_session_without_directory_table() {
        let service = SnapshotService::default();
        assert!(matches!(
            service.session_dir("abc"),
            Err(SnapshotError::SessionNotFound { .. })
        ));
    }

    #[test]
    fn test_session_lookup() {
        let sessions = Arc::new(SessionMap::new());
        sessions.insert("abc", "/projects/deck");
        let service = SnapshotService::default().with_sessions(sessions);
        assert_eq!(
            service.session_dir("abc").ok(),
            Some(PathBuf::from("/projects/deck"))
        );
    }

    #[test]
    fn test_operations_on_uninitialized_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let service = SnapshotService::default();

        let err = service.list_snapshots(temp_dir.path(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RepoNotInitialized);

        let err = service.repository_status(temp_dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotARepository);

        let report = service.cleanup(temp_dir.path())?;
        assert!(!report.was_repo);
        Ok(())
    }
}
