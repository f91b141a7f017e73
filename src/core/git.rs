//! Repository handle bound to one project directory.
//!
//! [`ProjectRepo`] wraps the on-disk repository of a single project. It owns the
//! [`CommandExecutor`] through which every version-control command for that
//! project runs, and provides the small queries the lifecycle, snapshot and
//! detached-view operations share (resolving commits, reading HEAD, checking for
//! uncommitted work). The operations themselves live in their own modules as
//! further `impl ProjectRepo` blocks.

use crate::core::{
    error::{Result, SnapshotError},
    executor::CommandExecutor,
    tracked::{TrackedFiles, IGNORE_FILE},
};
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the repository control directory inside a project
pub const CONTROL_DIR: &str = ".git";

/// Fixed commit identity, scoped to each project repository
pub const COMMIT_AUTHOR_NAME: &str = "Deck Snapshot";
pub const COMMIT_AUTHOR_EMAIL: &str = "snapshots@deck-snapshot.local";

/// First 8 characters of a commit hash, used for display
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

/// Diagnostics about a repository handle
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryInfo {
    pub project_dir: PathBuf,
    pub control_dir: PathBuf,
    pub control_dir_exists: bool,
    pub ignore_list_exists: bool,
    pub tracked_files_count: usize,
    pub git_available: bool,
    pub is_operating: bool,
    pub last_error: Option<String>,
}

pub struct ProjectRepo {
    root: PathBuf,
    control_dir: PathBuf,
    executor: CommandExecutor,
}

impl ProjectRepo {
    /// Bind a handle to an existing project directory
    pub fn open<P: AsRef<Path>>(project_dir: P) -> Result<Self> {
        let root = project_dir.as_ref().canonicalize()?;
        Ok(Self::from_root(root))
    }

    fn from_root(root: PathBuf) -> Self {
        let control_dir = root.join(CONTROL_DIR);
        let executor = CommandExecutor::new(&root);
        Self {
            root,
            control_dir,
            executor,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn control_dir(&self) -> &Path {
        &self.control_dir
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn is_initialized(&self) -> bool {
        self.control_dir.is_dir()
    }

    pub fn is_operating(&self) -> bool {
        self.executor.is_operating()
    }

    pub fn last_error(&self) -> Option<String> {
        self.executor.last_error()
    }

    /// Run git with paths printed verbatim rather than C-quoted
    pub(crate) fn git(&self, args: &[&str]) -> Result<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        full.extend_from_slice(&["-c", "core.quotePath=false"]);
        full.extend_from_slice(args);
        self.executor.run(&full)
    }

    pub(crate) fn require_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(SnapshotError::repo_not_initialized(&self.root))
        }
    }

    /// Set the fixed commit identity for this repository only
    pub fn apply_identity(&self) -> Result<()> {
        self.git(&["config", "user.name", COMMIT_AUTHOR_NAME])?;
        self.git(&["config", "user.email", COMMIT_AUTHOR_EMAIL])?;
        Ok(())
    }

    /// Commit whatever is staged with a single-line message
    pub(crate) fn commit_staged(&self, message: &str) -> Result<()> {
        self.git(&["-c", "commit.gpgsign=false", "commit", "-m", message])?;
        Ok(())
    }

    /// Stage exactly the given project-relative paths
    pub(crate) fn stage(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.git(&args)?;
        Ok(())
    }

    /// The subset of `paths` excluded by the ignore-list, which `git add` refuses.
    ///
    /// Paths already in the index are never reported, matching what `git add`
    /// accepts.
    pub(crate) fn ignored_paths(&self, paths: &[String]) -> Result<Vec<String>> {
        if paths.is_empty() || !self.is_initialized() {
            return Ok(Vec::new());
        }
        let mut args = vec!["check-ignore", "--"];
        args.extend(paths.iter().map(String::as_str));
        match self.git(&args) {
            Ok(output) => Ok(output
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            // exit status 1 means none of the paths is ignored
            Err(SnapshotError::CommandFailed { message, .. })
                if message.ends_with("exit code 1") =>
            {
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// The tracked set on disk minus anything the ignore-list excludes
    pub fn scan_tracked(&self) -> Result<TrackedFiles> {
        let mut tracked = TrackedFiles::scan(&self.root)?;
        let ignored = self.ignored_paths(tracked.content())?;
        if !ignored.is_empty() {
            warn!("Skipping ignored files: {}", ignored.join(", "));
            tracked.exclude(&ignored);
        }
        Ok(tracked)
    }

    /// Resolve a full or abbreviated commit reference to its full hash
    pub fn resolve_commit(&self, rev: &str) -> Result<String> {
        let rev = rev.trim();
        if rev.is_empty() || rev.starts_with('-') {
            return Err(SnapshotError::commit_not_found(rev));
        }

        let spec = format!("{rev}^{{commit}}");
        match self.git(&["rev-parse", "--verify", "--quiet", &spec]) {
            Ok(output) => Ok(output.trim().to_string()),
            Err(SnapshotError::CommandFailed { .. }) => Err(SnapshotError::commit_not_found(rev)),
            Err(e) => Err(e),
        }
    }

    /// Full hash of HEAD, or None on an unborn branch
    pub fn head_commit(&self) -> Result<Option<String>> {
        optional(self.git(&["rev-parse", "--verify", "--quiet", "HEAD"]))
    }

    /// Name of the checked-out branch, or None when HEAD is detached
    pub fn current_branch(&self) -> Result<Option<String>> {
        optional(self.git(&["symbolic-ref", "--quiet", "--short", "HEAD"]))
    }

    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let output = self.git(&["status", "--porcelain"])?;
        Ok(!output.trim().is_empty())
    }

    pub fn info(&self) -> RepositoryInfo {
        let is_operating = self.is_operating();
        let last_error = self.last_error();
        let tracked_files_count = match self.scan_tracked() {
            Ok(tracked) => tracked.len(),
            Err(e) => {
                warn!("Failed to scan tracked files: {e}");
                0
            }
        };

        RepositoryInfo {
            project_dir: self.root.clone(),
            control_dir: self.control_dir.clone(),
            control_dir_exists: self.is_initialized(),
            ignore_list_exists: self.root.join(IGNORE_FILE).is_file(),
            tracked_files_count,
            git_available: self.git(&["--version"]).is_ok(),
            is_operating,
            last_error,
        }
    }
}

/// Treat a failed query as "no value" while still surfacing busy/timeout errors
fn optional(result: Result<String>) -> Result<Option<String>> {
    match result {
        Ok(output) => {
            let value = output.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Err(SnapshotError::CommandFailed { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_short_hash() {
        assert_eq!(
            short_hash("0123456789abcdef0123456789abcdef01234567"),
            "01234567"
        );
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn test_open_uninitialized_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo = ProjectRepo::open(temp_dir.path())?;
        assert!(!repo.is_initialized());
        assert!(repo.control_dir().ends_with(CONTROL_DIR));
        assert!(matches!(
            repo.require_initialized(),
            Err(SnapshotError::RepoNotInitialized { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let result = ProjectRepo::open("/definitely/not/a/project/dir");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_rejects_option_like_revisions() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo = ProjectRepo::open(temp_dir.path())?;
        assert!(matches!(
            repo.resolve_commit("--all"),
            Err(SnapshotError::CommitNotFound { .. })
        ));
        assert!(matches!(
            repo.resolve_commit("  "),
            Err(SnapshotError::CommitNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_optional_maps_command_failure_to_none() {
        let failed: Result<String> = Err(SnapshotError::command_failed("rev-parse", "fatal"));
        assert!(matches!(optional(failed), Ok(None)));

        let busy: Result<String> = Err(SnapshotError::CommandBusy);
        assert!(matches!(optional(busy), Err(SnapshotError::CommandBusy)));

        assert_eq!(
            optional(Ok("main\n".to_string())).unwrap(),
            Some("main".to_string())
        );
    }
}
