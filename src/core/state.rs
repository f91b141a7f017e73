//! Durable detached-view state.
//!
//! While a historical snapshot is checked out for inspection, a small JSON record
//! next to the project manifest remembers where the working copy came from. The
//! record lives outside the repository control directory on purpose: entering a
//! view moves exactly the refs stored there.
//!
//! # Public API
//! - [`OriginalState`]: Where the working copy was before entering a view
//! - [`ViewRecord`]: The persisted detached-view record
//! - [`ViewRecordStore`]: Load/save/clear for one project directory
//!
//! # Validation
//! A record names the project directory it was written for. A record found in a
//! different directory (for example after the project folder was copied) is
//! ignored on load.

use crate::core::error::Result;
use chrono::{DateTime, Local};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the detached-view record inside the project directory
pub const VIEW_RECORD_FILE: &str = ".snapshot_view_info.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Branch,
    Commit,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalState {
    #[serde(rename = "type")]
    pub kind: StateKind,
    /// Branch name for `branch`, commit hash for `commit`
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub has_uncommitted_changes: bool,
    pub saved_at: DateTime<Local>,
}

impl OriginalState {
    pub fn branch(name: impl Into<String>, commit: impl Into<String>, dirty: bool) -> Self {
        Self {
            kind: StateKind::Branch,
            reference: Some(name.into()),
            commit: Some(commit.into()),
            has_uncommitted_changes: dirty,
            saved_at: Local::now(),
        }
    }

    pub fn detached(commit: impl Into<String>, dirty: bool) -> Self {
        let commit = commit.into();
        Self {
            kind: StateKind::Commit,
            reference: Some(commit.clone()),
            commit: Some(commit),
            has_uncommitted_changes: dirty,
            saved_at: Local::now(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: StateKind::Unknown,
            reference: None,
            commit: None,
            has_uncommitted_changes: false,
            saved_at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub is_snapshot_view: bool,
    pub commit_hash: String,
    #[serde(default)]
    pub original_state: Option<OriginalState>,
    pub switched_at: DateTime<Local>,
    pub project_dir: PathBuf,
}

impl ViewRecord {
    pub fn new(commit_hash: impl Into<String>, original: OriginalState, project_dir: &Path) -> Self {
        Self {
            is_snapshot_view: true,
            commit_hash: commit_hash.into(),
            original_state: Some(original),
            switched_at: Local::now(),
            project_dir: project_dir.to_path_buf(),
        }
    }
}

pub struct ViewRecordStore {
    path: PathBuf,
    project_dir: PathBuf,
}

impl ViewRecordStore {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            path: project_dir.join(VIEW_RECORD_FILE),
            project_dir: project_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the record for this project; unreadable or foreign records yield None
    pub fn load(&self) -> Result<Option<ViewRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: ViewRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable view record {}: {e}", self.path.display());
                return Ok(None);
            }
        };

        if record.project_dir != self.project_dir {
            warn!(
                "Ignoring view record written for {} (found in {})",
                record.project_dir.display(),
                self.project_dir.display()
            );
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Persist the record, replacing any previous one atomically
    pub fn save(&self, record: &ViewRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;
        debug!("Saved view record to {}", self.path.display());
        Ok(())
    }

    /// Delete the record; returns whether one was present
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed view record {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
