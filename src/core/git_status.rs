//! Working copy status read through libgit2.
//!
//! This module defines [`GitStatus`], the typed status of a changed file, and
//! [`RepoStatus`], the summary the UI shows next to the snapshot controls.
//! Reads go through `git2` directly; they never take the executor's in-flight
//! guard, so status can be polled while a snapshot command runs.
//!
//! # Public API
//! - [`GitStatus`]: Status of one changed path
//! - [`FileChange`]: A path with its status and staged flag
//! - [`RepoStatus`]: Changes, counts, branch and history size
//! - [`ProjectRepo::status`]: Read the status of a project repository
//! - [`ProjectRepo::has_changes`]: Whether tracked content differs from HEAD

use crate::core::{
    error::{Result, SnapshotError},
    git::ProjectRepo,
    tracked::{is_tracked_path, IGNORE_FILE},
};
use git2::{ErrorCode, Repository, StatusOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GitStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    TypeChanged,
    Untracked,
    Conflicted,
}

impl GitStatus {
    /// Index-side status, if the path has staged changes
    pub fn from_git2_staged(flags: git2::Status) -> Option<GitStatus> {
        if flags.contains(git2::Status::INDEX_NEW) {
            return Some(GitStatus::Added);
        }
        if flags.contains(git2::Status::INDEX_MODIFIED) {
            return Some(GitStatus::Modified);
        }
        if flags.contains(git2::Status::INDEX_DELETED) {
            return Some(GitStatus::Deleted);
        }
        if flags.contains(git2::Status::INDEX_RENAMED) {
            return Some(GitStatus::Renamed);
        }
        if flags.contains(git2::Status::INDEX_TYPECHANGE) {
            return Some(GitStatus::TypeChanged);
        }
        None
    }

    /// Working-tree-side status, if the path has unstaged changes
    pub fn from_git2_unstaged(flags: git2::Status) -> Option<GitStatus> {
        if flags.contains(git2::Status::CONFLICTED) {
            return Some(GitStatus::Conflicted);
        }
        if flags.contains(git2::Status::WT_NEW) {
            return Some(GitStatus::Untracked);
        }
        if flags.contains(git2::Status::WT_MODIFIED) {
            return Some(GitStatus::Modified);
        }
        if flags.contains(git2::Status::WT_DELETED) {
            return Some(GitStatus::Deleted);
        }
        if flags.contains(git2::Status::WT_RENAMED) {
            return Some(GitStatus::Renamed);
        }
        if flags.contains(git2::Status::WT_TYPECHANGE) {
            return Some(GitStatus::TypeChanged);
        }
        None
    }

    /// Short porcelain-style code
    pub fn as_str(&self) -> &'static str {
        match self {
            GitStatus::Modified => "M",
            GitStatus::Added => "A",
            GitStatus::Deleted => "D",
            GitStatus::Renamed => "R",
            GitStatus::TypeChanged => "T",
            GitStatus::Untracked => "??",
            GitStatus::Conflicted => "UU",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GitStatus::Modified => "modified",
            GitStatus::Added => "new",
            GitStatus::Deleted => "deleted",
            GitStatus::Renamed => "renamed",
            GitStatus::TypeChanged => "type changed",
            GitStatus::Untracked => "untracked",
            GitStatus::Conflicted => "conflicted",
        }
    }

    /// Display order: conflicts, then staged, then unstaged, then untracked
    pub fn sort_priority(&self, staged: bool) -> u8 {
        match (self, staged) {
            (GitStatus::Conflicted, _) => 0,
            (GitStatus::Untracked, _) => 3,
            (_, true) => 1,
            (_, false) => 2,
        }
    }
}

impl fmt::Display for GitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub status: GitStatus,
    pub staged: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RepoStatus {
    pub changes: Vec<FileChange>,
    pub staged_count: usize,
    pub unstaged_count: usize,
    /// None when HEAD is detached or unborn
    pub current_branch: Option<String>,
    pub head: Option<String>,
    pub commit_count: usize,
}

impl RepoStatus {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Whether any change touches a tracked content file or the ignore-list
    pub fn has_tracked_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.path == IGNORE_FILE || is_tracked_path(&change.path))
    }
}

impl ProjectRepo {
    pub fn status(&self) -> Result<RepoStatus> {
        if !self.is_initialized() {
            return Err(SnapshotError::NotARepository {
                path: self.root().to_path_buf(),
            });
        }

        let repo = Repository::open(self.root())?;
        let mut status = RepoStatus {
            changes: read_changes(&repo)?,
            ..Default::default()
        };
        status.staged_count = status.changes.iter().filter(|c| c.staged).count();
        status.unstaged_count = status.changes.len() - status.staged_count;

        match repo.head() {
            Ok(head) => {
                if head.is_branch() {
                    status.current_branch = head.shorthand().map(str::to_string);
                }
                status.head = head.target().map(|oid| oid.to_string());

                let mut walk = repo.revwalk()?;
                walk.push_head()?;
                status.commit_count = walk.count();
            }
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        Ok(status)
    }

    /// Whether a snapshot taken now would record anything
    pub fn has_changes(&self) -> Result<bool> {
        Ok(self.status()?.has_tracked_changes())
    }
}

fn read_changes(repo: &Repository) -> Result<Vec<FileChange>> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true);
    opts.recurse_untracked_dirs(true);
    opts.include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts))?;
    let mut changes = Vec::new();

    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            continue;
        };
        let flags = entry.status();

        if let Some(status) = GitStatus::from_git2_staged(flags) {
            changes.push(FileChange {
                path: path.to_string(),
                status,
                staged: true,
            });
        }
        if let Some(status) = GitStatus::from_git2_unstaged(flags) {
            changes.push(FileChange {
                path: path.to_string(),
                status,
                staged: false,
            });
        }
    }

    changes.sort_by(|a, b| {
        a.status
            .sort_priority(a.staged)
            .cmp(&b.status.sort_priority(b.staged))
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_git2_flags() {
        assert_eq!(
            GitStatus::from_git2_staged(git2::Status::INDEX_NEW),
            Some(GitStatus::Added)
        );
        assert_eq!(
            GitStatus::from_git2_unstaged(git2::Status::WT_NEW),
            Some(GitStatus::Untracked)
        );
        assert_eq!(
            GitStatus::from_git2_unstaged(git2::Status::CONFLICTED),
            Some(GitStatus::Conflicted)
        );
        assert_eq!(GitStatus::from_git2_staged(git2::Status::WT_MODIFIED), None);
    }

    #[test]
    fn test_both_sides_of_a_path_are_reported() {
        let flags = git2::Status::INDEX_MODIFIED | git2::Status::WT_MODIFIED;
        assert_eq!(GitStatus::from_git2_staged(flags), Some(GitStatus::Modified));
        assert_eq!(GitStatus::from_git2_unstaged(flags), Some(GitStatus::Modified));
    }

    #[test]
    fn test_sort_priority() {
        assert!(GitStatus::Conflicted.sort_priority(false) < GitStatus::Added.sort_priority(true));
        assert!(GitStatus::Added.sort_priority(true) < GitStatus::Modified.sort_priority(false));
        assert!(
            GitStatus::Modified.sort_priority(false) < GitStatus::Untracked.sort_priority(false)
        );
    }

    #[test]
    fn test_tracked_changes_ignore_untracked_binaries() {
        let mut status = RepoStatus::default();
        status.changes.push(FileChange {
            path: "template.pptx".to_string(),
            status: GitStatus::Untracked,
            staged: false,
        });
        assert!(status.has_changes());
        assert!(!status.has_tracked_changes());

        status.changes.push(FileChange {
            path: "slides/slide_2.json".to_string(),
            status: GitStatus::Modified,
            staged: false,
        });
        assert!(status.has_tracked_changes());
    }

    #[test]
    fn test_display_and_description() {
        assert_eq!(GitStatus::Untracked.to_string(), "??");
        assert_eq!(GitStatus::Added.description(), "new");
    }
}
