//! Read-only time travel: detach the working copy onto a past snapshot and back.
//!
//! The controller has two states. `Normal` means no view record is present;
//! `Viewing(hash)` means a record names the snapshot currently checked out. The
//! record is written only after the checkout succeeds and removed only after
//! the original state has been restored, so a crash in between leaves a record
//! that [`ProjectRepo::view_status`] flags and [`ProjectRepo::force_recover`]
//! repairs.

use crate::core::{
    error::{Result, SnapshotError},
    git::{short_hash, ProjectRepo},
    state::{OriginalState, StateKind, ViewRecord, ViewRecordStore},
};
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use serde::Serialize;

/// Branches tried in order by [`ProjectRepo::force_recover`]
pub const RECOVERY_BRANCHES: &[&str] = &["main", "master", "HEAD"];

#[derive(Debug, Clone, Serialize)]
pub struct ViewEntered {
    pub hash: String,
    pub short_hash: String,
    pub message: String,
    pub date: String,
    pub original_state: OriginalState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewExited {
    pub hash: String,
    pub restored: OriginalState,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewStatus {
    /// A record exists and HEAD still points at the recorded snapshot
    pub in_view: bool,
    /// A record exists, whether or not HEAD agrees with it
    pub record_present: bool,
    pub hash: Option<String>,
    pub short_hash: Option<String>,
    pub original_state: Option<OriginalState>,
    pub switched_at: Option<DateTime<Local>>,
}

impl ViewStatus {
    /// Record and working copy disagree; offer a forced recovery
    pub fn is_inconsistent(&self) -> bool {
        self.record_present && !self.in_view
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ForceRecovery {
    /// Branch that was checked out, if any attempt succeeded
    pub checked_out: Option<String>,
    pub record_cleared: bool,
    pub worktrees_pruned: bool,
}

impl ProjectRepo {
    pub fn view_store(&self) -> ViewRecordStore {
        ViewRecordStore::new(self.root())
    }

    /// Detach the working copy onto `hash` for read-only inspection
    pub fn enter_view(&self, hash: &str) -> Result<ViewEntered> {
        self.require_initialized()?;
        let store = self.view_store();
        if let Some(record) = store.load()? {
            return Err(SnapshotError::AlreadyInView {
                hash: record.commit_hash,
            });
        }

        let full = self.resolve_commit(hash)?;
        let (message, date) = self.commit_summary(&full);
        let original = self.capture_original_state();
        debug!("Captured original state: {original:?}");

        if let Err(e) = self.git(&["checkout", "--quiet", "--detach", &full]) {
            warn!("Checkout of {} failed: {e}", short_hash(&full));
            self.rollback_to(&original);
            return Err(SnapshotError::checkout_failed(&full, e.to_string()));
        }

        let record = ViewRecord::new(&full, original.clone(), self.root());
        if let Err(e) = store.save(&record) {
            error!("Could not persist view record {}: {e}", store.path().display());
            self.rollback_to(&original);
            return Err(e);
        }

        info!("Viewing snapshot {}", short_hash(&full));
        Ok(ViewEntered {
            short_hash: short_hash(&full).to_string(),
            hash: full,
            message,
            date,
            original_state: original,
        })
    }

    /// Return to the state captured when the view was entered
    pub fn exit_view(&self) -> Result<ViewExited> {
        self.require_initialized()?;
        let store = self.view_store();
        let record = store.load()?.ok_or(SnapshotError::NotInView)?;
        let original = record
            .original_state
            .ok_or(SnapshotError::MissingOriginalState)?;

        self.restore_original_state(&original)?;
        store.clear()?;

        info!("Left snapshot view of {}", short_hash(&record.commit_hash));
        Ok(ViewExited {
            hash: record.commit_hash,
            restored: original,
        })
    }

    /// Read the view record and check it against the live HEAD
    pub fn view_status(&self) -> Result<ViewStatus> {
        let Some(record) = self.view_store().load()? else {
            return Ok(ViewStatus::default());
        };

        let head = if self.is_initialized() {
            self.head_commit().unwrap_or_else(|e| {
                warn!("Could not read HEAD: {e}");
                None
            })
        } else {
            None
        };
        let in_view =
            record.is_snapshot_view && head.as_deref() == Some(record.commit_hash.as_str());
        if !in_view {
            debug!(
                "View record names {} but HEAD is {:?}",
                short_hash(&record.commit_hash),
                head
            );
        }

        Ok(ViewStatus {
            in_view,
            record_present: true,
            short_hash: Some(short_hash(&record.commit_hash).to_string()),
            hash: Some(record.commit_hash),
            original_state: record.original_state,
            switched_at: Some(record.switched_at),
        })
    }

    /// Unconditionally leave view mode.
    ///
    /// Tries the recorded branch, then each of [`RECOVERY_BRANCHES`], and deletes
    /// the view record whatever the outcome. Only a failure to delete the record
    /// itself is reported as an error.
    pub fn force_recover(&self) -> Result<ForceRecovery> {
        let store = self.view_store();
        let recorded_branch = match store.load() {
            Ok(Some(record)) => record
                .original_state
                .filter(|state| state.kind == StateKind::Branch)
                .and_then(|state| state.reference),
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read view record: {e}");
                None
            }
        };

        let mut report = ForceRecovery::default();

        if self.is_initialized() {
            let candidates = recorded_branch
                .iter()
                .map(String::as_str)
                .chain(RECOVERY_BRANCHES.iter().copied());
            for branch in candidates {
                match self.git(&["checkout", "--quiet", branch]) {
                    Ok(_) => {
                        info!("Recovered onto {branch}");
                        report.checked_out = Some(branch.to_string());
                        break;
                    }
                    Err(e) => debug!("Recovery checkout of {branch} failed: {e}"),
                }
            }
            if report.checked_out.is_none() {
                warn!("No recovery branch could be checked out");
            }
        }

        store.clear().map_err(|e| {
            SnapshotError::recover_failed(format!("could not remove view record: {e}"))
        })?;
        report.record_cleared = true;

        if self.is_initialized() {
            match self.git(&["worktree", "prune"]) {
                Ok(_) => report.worktrees_pruned = true,
                Err(e) => warn!("Worktree prune failed: {e}"),
            }
        }

        Ok(report)
    }

    /// Leave view mode if active; returns whether a view was exited
    pub fn ensure_not_in_view(&self) -> Result<bool> {
        if !self.view_store().exists() {
            return Ok(false);
        }
        match self.exit_view() {
            Ok(_) => Ok(true),
            Err(SnapshotError::NotInView) => Ok(false),
            Err(e) => {
                warn!("Exiting view failed, forcing recovery: {e}");
                self.force_recover()?;
                Ok(true)
            }
        }
    }

    fn capture_original_state(&self) -> OriginalState {
        let dirty = self.has_uncommitted_changes().unwrap_or_else(|e| {
            warn!("Could not check for uncommitted changes: {e}");
            false
        });
        let head = self.head_commit().unwrap_or_default();

        match (self.current_branch(), head) {
            (Ok(Some(branch)), Some(commit)) => OriginalState::branch(branch, commit, dirty),
            (Ok(None), Some(commit)) => OriginalState::detached(commit, dirty),
            _ => OriginalState::unknown(),
        }
    }

    fn restore_original_state(&self, original: &OriginalState) -> Result<()> {
        let result = match (original.kind, original.reference.as_deref()) {
            (StateKind::Branch, Some(branch)) => self.git(&["checkout", "--quiet", branch]),
            (StateKind::Commit, Some(commit)) => {
                self.git(&["checkout", "--quiet", "--detach", commit])
            }
            _ => self.git(&["checkout", "--", "."]),
        };
        result.map(|_| ()).map_err(|e| {
            warn!("Restoring original state failed: {e}");
            SnapshotError::recover_failed(e.to_string())
        })
    }

    fn rollback_to(&self, original: &OriginalState) {
        if original.kind == StateKind::Unknown {
            return;
        }
        if let Err(e) = self.restore_original_state(original) {
            error!("Rollback after failed view entry also failed: {e}");
        }
    }

    fn commit_summary(&self, hash: &str) -> (String, String) {
        match self.git(&["log", "-n", "1", "--format=%s%x1f%aI", hash]) {
            Ok(output) => {
                let output = output.trim();
                let (message, date) = output.split_once('\u{1f}').unwrap_or((output, ""));
                (message.to_string(), date.to_string())
            }
            Err(e) => {
                warn!("Could not read commit {}: {e}", short_hash(hash));
                (String::new(), String::new())
            }
        }
    }
}
