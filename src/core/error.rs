//! Domain-specific error types and error classification.
//!
//! This module defines [`SnapshotError`], the single error type returned by every
//! snapshot subsystem operation, and [`ErrorKind`], the stable classification the
//! boundary layer reports to users. Errors never cross the module boundary as
//! panics: every operation returns a [`Result`].
//!
//! # Public API
//! - [`SnapshotError`]: Main error enum covering all failure modes
//! - [`ErrorKind`]: Serializable failure category (`validation`, `no-changes`, ...)
//! - [`Result<T>`]: Type alias for `std::result::Result<T, SnapshotError>`
//!
//! # Error Categories
//! - **Validation**: Empty snapshot descriptions, unconfirmed destructive commands,
//!   occupied export destinations
//! - **Repository state**: Not initialized, no trackable files, unknown commits
//! - **Detached view**: Not in view, already in view, missing original state
//! - **Command execution**: Timeouts, busy handles, failed git invocations
//! - **Unexpected**: I/O, serialization and libgit2 failures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure category reported across the module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    RepoNotInitialized,
    NotARepository,
    NoTrackableFiles,
    NoChanges,
    CommitFailed,
    CommitNotFound,
    CheckoutFailed,
    NotInView,
    AlreadyInView,
    ViewActive,
    MissingOriginalState,
    RecoverFailed,
    Timeout,
    CommandBusy,
    SessionNotFound,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::RepoNotInitialized => "repo-not-initialized",
            ErrorKind::NotARepository => "not-a-repository",
            ErrorKind::NoTrackableFiles => "no-trackable-files",
            ErrorKind::NoChanges => "no-changes",
            ErrorKind::CommitFailed => "commit-failed",
            ErrorKind::CommitNotFound => "commit-not-found",
            ErrorKind::CheckoutFailed => "checkout-failed",
            ErrorKind::NotInView => "not-in-view",
            ErrorKind::AlreadyInView => "already-in-view",
            ErrorKind::ViewActive => "view-active",
            ErrorKind::MissingOriginalState => "missing-original-state",
            ErrorKind::RecoverFailed => "recover-failed",
            ErrorKind::Timeout => "timeout",
            ErrorKind::CommandBusy => "command-busy",
            ErrorKind::SessionNotFound => "session-not-found",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-specific error types for the snapshot subsystem
#[derive(Error, Debug)]
pub enum SnapshotError {
    // Validation errors
    #[error("Snapshot description cannot be empty")]
    EmptyMessage,

    #[error("{operation} discards uncommitted changes; pass --yes to confirm")]
    ConfirmationRequired { operation: String },

    #[error("Export destination {path} exists and is not empty")]
    ExportTargetExists { path: PathBuf },

    // Repository state errors
    #[error("Repository is not initialized in {path}")]
    RepoNotInitialized { path: PathBuf },

    #[error("Not a repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("No trackable text files found in {path}")]
    NoTrackableFiles { path: PathBuf },

    #[error("Commit does not exist: {hash}")]
    CommitNotFound { hash: String },

    #[error("Commit failed: {message}")]
    CommitFailed { message: String },

    // Command execution errors
    #[error("Nothing to commit: {message}")]
    NothingToCommit { message: String },

    #[error("git {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("git {command} timed out after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },

    #[error("Another git operation is in progress")]
    CommandBusy,

    #[error("Failed to run git {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    // Detached view errors
    #[error("Switching to snapshot {hash} failed: {message}")]
    CheckoutFailed { hash: String, message: String },

    #[error("Not currently in snapshot view mode")]
    NotInView,

    #[error("Already viewing snapshot {hash}; exit the view first")]
    AlreadyInView { hash: String },

    #[error("Snapshot view of {hash} is active; exit the view first")]
    ViewActive { hash: String },

    #[error("Snapshot view record has no original state")]
    MissingOriginalState,

    #[error("Restoring the original state failed: {message}")]
    RecoverFailed { message: String },

    // Session errors
    #[error("No project directory for session {session_id}")]
    SessionNotFound { session_id: String },

    // Unexpected errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Convenience type alias for Results using SnapshotError
pub type Result<T> = std::result::Result<T, SnapshotError>;

impl SnapshotError {
    /// Classify this error for reporting across the module boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::EmptyMessage
            | SnapshotError::ConfirmationRequired { .. }
            | SnapshotError::ExportTargetExists { .. } => ErrorKind::Validation,
            SnapshotError::RepoNotInitialized { .. } => ErrorKind::RepoNotInitialized,
            SnapshotError::NotARepository { .. } => ErrorKind::NotARepository,
            SnapshotError::NoTrackableFiles { .. } => ErrorKind::NoTrackableFiles,
            SnapshotError::NothingToCommit { .. } => ErrorKind::NoChanges,
            SnapshotError::CommitFailed { .. } => ErrorKind::CommitFailed,
            SnapshotError::CommitNotFound { .. } => ErrorKind::CommitNotFound,
            SnapshotError::CheckoutFailed { .. } => ErrorKind::CheckoutFailed,
            SnapshotError::NotInView => ErrorKind::NotInView,
            SnapshotError::AlreadyInView { .. } => ErrorKind::AlreadyInView,
            SnapshotError::ViewActive { .. } => ErrorKind::ViewActive,
            SnapshotError::MissingOriginalState => ErrorKind::MissingOriginalState,
            SnapshotError::RecoverFailed { .. } => ErrorKind::RecoverFailed,
            SnapshotError::Timeout { .. } => ErrorKind::Timeout,
            SnapshotError::CommandBusy => ErrorKind::CommandBusy,
            SnapshotError::SessionNotFound { .. } => ErrorKind::SessionNotFound,
            SnapshotError::CommandFailed { .. }
            | SnapshotError::Spawn { .. }
            | SnapshotError::Io(_)
            | SnapshotError::Json(_)
            | SnapshotError::Yaml(_)
            | SnapshotError::Git(_)
            | SnapshotError::Pattern(_) => ErrorKind::Unknown,
        }
    }

    /// Whether this outcome is informational rather than a failure
    pub fn is_expected(&self) -> bool {
        self.kind() == ErrorKind::NoChanges
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a confirmation required error
    pub fn confirmation_required(operation: impl Into<String>) -> Self {
        Self::ConfirmationRequired {
            operation: operation.into(),
        }
    }

    /// Create a commit not found error
    pub fn commit_not_found(hash: impl Into<String>) -> Self {
        Self::CommitNotFound { hash: hash.into() }
    }

    /// Create a checkout failed error
    pub fn checkout_failed(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckoutFailed {
            hash: hash.into(),
            message: message.into(),
        }
    }

    /// Create a recover failed error
    pub fn recover_failed(message: impl Into<String>) -> Self {
        Self::RecoverFailed {
            message: message.into(),
        }
    }

    /// Create a repository not initialized error
    pub fn repo_not_initialized(path: impl Into<PathBuf>) -> Self {
        Self::RepoNotInitialized { path: path.into() }
    }

    /// Create a session not found error
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapshotError::EmptyMessage;
        assert_eq!(err.to_string(), "Snapshot description cannot be empty");
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(SnapshotError::EmptyMessage.kind(), ErrorKind::Validation);
        assert_eq!(SnapshotError::CommandBusy.kind(), ErrorKind::CommandBusy);
        assert_eq!(
            SnapshotError::commit_not_found("abc").kind(),
            ErrorKind::CommitNotFound
        );
        assert_eq!(
            SnapshotError::command_failed("status", "fatal").kind(),
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_nothing_to_commit_is_expected() {
        let err = SnapshotError::NothingToCommit {
            message: "nothing to commit, working tree clean".to_string(),
        };
        assert!(err.is_expected());
        assert!(!SnapshotError::MissingOriginalState.is_expected());
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::RepoNotInitialized).unwrap();
        assert_eq!(json, "\"repo-not-initialized\"");
        assert_eq!(ErrorKind::MissingOriginalState.to_string(), "missing-original-state");
    }

    #[test]
    fn test_timeout_error_mentions_seconds() {
        let err = SnapshotError::Timeout {
            command: "commit".to_string(),
            seconds: 30,
        };
        assert!(err.to_string().contains("30 seconds"));
    }

    #[test]
    fn test_io_error_converts_to_unknown() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SnapshotError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.to_string().contains("denied"));
    }
}
