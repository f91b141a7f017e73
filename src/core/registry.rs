//! Session lookup and one repository handle per project directory.
//!
//! The executor's in-flight guard only serializes commands issued through the
//! same handle. [`RepoRegistry`] hands out a shared handle per canonical
//! project directory so concurrent requests for one project contend on the
//! same guard instead of racing on the file system.

use crate::core::{
    error::{Result, SnapshotError},
    git::ProjectRepo,
};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Resolves a session id to the project directory it edits
pub trait SessionDirectory: Send + Sync {
    fn resolve_project_directory(&self, session_id: &str) -> Option<PathBuf>;
}

/// In-memory session table
#[derive(Default)]
pub struct SessionMap {
    sessions: RwLock<HashMap<String, PathBuf>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: impl Into<String>, project_dir: impl Into<PathBuf>) {
        let mut guard = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(session_id.into(), project_dir.into());
    }

    pub fn remove(&self, session_id: &str) -> Option<PathBuf> {
        let mut guard = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(session_id)
    }
}

impl SessionDirectory for SessionMap {
    fn resolve_project_directory(&self, session_id: &str) -> Option<PathBuf> {
        let guard = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        guard.get(session_id).cloned()
    }
}

/// Resolve a session id or fail with `session-not-found`
pub fn resolve_session(sessions: &dyn SessionDirectory, session_id: &str) -> Result<PathBuf> {
    sessions
        .resolve_project_directory(session_id)
        .ok_or_else(|| SnapshotError::session_not_found(session_id))
}

pub struct RepoRegistry {
    timeout: Duration,
    repos: Mutex<HashMap<PathBuf, Arc<ProjectRepo>>>,
}

impl RepoRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            repos: Mutex::new(HashMap::new()),
        }
    }

    /// The shared handle for `project_dir`, created on first use
    pub fn handle(&self, project_dir: &Path) -> Result<Arc<ProjectRepo>> {
        let root = project_dir.canonicalize()?;
        let mut guard = self.repos.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(repo) = guard.get(&root) {
            return Ok(Arc::clone(repo));
        }

        let repo = Arc::new(ProjectRepo::open(&root)?.with_timeout(self.timeout));
        debug!("Opened repository handle for {}", root.display());
        guard.insert(root, Arc::clone(&repo));
        Ok(repo)
    }

    /// Drop the handle for `project_dir`; returns whether one was held
    pub fn release(&self, project_dir: &Path) -> bool {
        let root = project_dir
            .canonicalize()
            .unwrap_or_else(|_| project_dir.to_path_buf());
        let mut guard = self.repos.lock().unwrap_or_else(|e| e.into_inner());
        guard.remove(&root).is_some()
    }

    pub fn len(&self) -> usize {
        self.repos.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_directory_shares_one_handle() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let registry = RepoRegistry::new(Duration::from_secs(5));

        let first = registry.handle(temp_dir.path())?;
        let second = registry.handle(&temp_dir.path().join("."))?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.executor().timeout(), Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn test_release_drops_handle() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let registry = RepoRegistry::new(Duration::from_secs(5));
        registry.handle(temp_dir.path())?;

        assert!(registry.release(temp_dir.path()));
        assert!(!registry.release(temp_dir.path()));
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_session_resolution() {
        let sessions = SessionMap::new();
        sessions.insert("abc", "/projects/deck");

        assert_eq!(
            resolve_session(&sessions, "abc").ok(),
            Some(PathBuf::from("/projects/deck"))
        );
        assert!(matches!(
            resolve_session(&sessions, "missing"),
            Err(SnapshotError::SessionNotFound { .. })
        ));

        assert_eq!(sessions.remove("abc"), Some(PathBuf::from("/projects/deck")));
        assert!(resolve_session(&sessions, "abc").is_err());
    }
}
