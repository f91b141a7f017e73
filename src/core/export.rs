//! Standalone copy of a project's history that can be cloned elsewhere.

use crate::core::{
    error::{Result, SnapshotError},
    git::{short_hash, ProjectRepo},
};
use chrono::Local;
use log::info;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of export directories created under the system temp directory
pub const EXPORT_DIR_PREFIX: &str = "deck-snapshot-export-";

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub export_path: PathBuf,
    /// The export lives under the system temp directory
    pub is_temp: bool,
    /// HEAD of the exported history; None for a repository without commits
    pub head: Option<String>,
}

impl ProjectRepo {
    /// Write a bare clone of the project repository.
    ///
    /// `dest` is resolved against the project directory when relative. Without
    /// one, a fresh directory under the system temp directory is used. An
    /// existing non-empty destination is refused, never overwritten.
    pub fn export_repository(&self, dest: Option<&Path>) -> Result<ExportReport> {
        self.require_initialized()?;

        let target = match dest {
            Some(dest) => self.root().join(dest),
            None => std::env::temp_dir().join(format!(
                "{EXPORT_DIR_PREFIX}{}",
                Local::now().format("%Y%m%dT%H%M%S%.3f")
            )),
        };
        if !is_free_destination(&target)? {
            return Err(SnapshotError::ExportTargetExists { path: target });
        }

        let args = [
            OsStr::new("clone"),
            OsStr::new("--bare"),
            OsStr::new("--quiet"),
            OsStr::new("--"),
            self.root().as_os_str(),
            target.as_os_str(),
        ];
        self.executor().run(&args)?;

        let head = self.head_commit()?;
        info!(
            "Exported repository at {} to {}",
            head.as_deref().map(short_hash).unwrap_or("(empty)"),
            target.display()
        );

        Ok(ExportReport {
            is_temp: target.starts_with(std::env::temp_dir()),
            export_path: target,
            head,
        })
    }
}

/// Missing, or an empty directory
fn is_free_destination(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_free_destination() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(is_free_destination(&temp_dir.path().join("missing"))?);
        assert!(is_free_destination(temp_dir.path())?);

        fs::write(temp_dir.path().join("file"), "x")?;
        assert!(!is_free_destination(temp_dir.path())?);
        assert!(!is_free_destination(&temp_dir.path().join("file"))?);
        Ok(())
    }

    #[test]
    fn test_export_requires_repository() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo = ProjectRepo::open(temp_dir.path())?;
        assert!(matches!(
            repo.export_repository(None),
            Err(SnapshotError::RepoNotInitialized { .. })
        ));
        Ok(())
    }
}
