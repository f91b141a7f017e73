//! Repository initialization for a project directory.

use crate::core::{
    error::Result,
    git::ProjectRepo,
    tracked::write_ignore_list,
};
use chrono::Local;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit: Project files";

#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub already_existed: bool,
    pub control_dir: PathBuf,
    /// Hash of the initial commit, when one was made
    pub initial_commit: Option<String>,
    /// Where a replaced control directory was moved by a forced init
    pub backup_dir: Option<PathBuf>,
}

impl ProjectRepo {
    /// Create the project repository, or report that it already exists.
    ///
    /// With `force`, an existing control directory is moved aside to a timestamped
    /// backup before reinitializing; it is never deleted. Identity, ignore-list and
    /// initial commit are applied independently, so a failure in one of them is
    /// logged and does not abort initialization. An empty repository is a valid
    /// result when there are no trackable files yet.
    pub fn initialize(&self, force: bool) -> Result<InitReport> {
        let mut backup_dir = None;

        if self.is_initialized() {
            if !force {
                info!("Repository already exists: {}", self.control_dir().display());
                return Ok(InitReport {
                    already_existed: true,
                    control_dir: self.control_dir().to_path_buf(),
                    initial_commit: None,
                    backup_dir: None,
                });
            }

            let backup = self.control_dir().with_file_name(format!(
                ".git.backup-{}",
                Local::now().format("%Y%m%dT%H%M%S%.3f")
            ));
            fs::rename(self.control_dir(), &backup)?;
            info!("Moved existing repository aside to {}", backup.display());
            backup_dir = Some(backup);
        }

        info!("Initializing repository in {}", self.root().display());
        self.git(&["init"])?;

        if let Err(e) = self.apply_identity() {
            warn!("Failed to set commit identity: {e}");
        }

        if let Err(e) = write_ignore_list(self.root()) {
            warn!("Failed to write ignore list: {e}");
        }

        let initial_commit = match self.commit_initial_files() {
            Ok(Some(hash)) => Some(hash),
            Ok(None) => {
                info!("No trackable files yet; repository left empty");
                None
            }
            Err(e) => {
                warn!("Initial commit failed: {e}");
                None
            }
        };

        Ok(InitReport {
            already_existed: false,
            control_dir: self.control_dir().to_path_buf(),
            initial_commit,
            backup_dir,
        })
    }

    fn commit_initial_files(&self) -> Result<Option<String>> {
        let tracked = self.scan_tracked()?;
        if tracked.is_empty() {
            return Ok(None);
        }

        self.stage(&tracked.staging_paths())?;
        self.commit_staged(INITIAL_COMMIT_MESSAGE)?;
        info!("Initial commit created with {} files", tracked.len());
        self.head_commit()
    }
}
