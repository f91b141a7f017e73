//! Core functionality for deck-snapshot.
//!
//! This module provides the snapshot subsystem: command execution, repository
//! lifecycle, snapshots, detached snapshot views, export, cleanup and the service
//! layer that ties them to project directories.

pub mod cleanup;
pub mod config;
pub mod dirs;
pub mod error;
pub mod executor;
pub mod export;
pub mod git;
pub mod git_status;
pub mod lifecycle;
pub mod manifest;
pub mod output;
pub mod registry;
pub mod service;
pub mod snapshot;
pub mod state;
pub mod tracked;
pub mod view;

// === Error handling ===
// Single error type and the category reported across the boundary
pub use error::{ErrorKind, Result, SnapshotError};

// === Command execution ===
// Single-flight git invocation with timeout
pub use executor::{CommandExecutor, DEFAULT_COMMAND_TIMEOUT};

// === Repository handle ===
pub use git::{short_hash, ProjectRepo, RepositoryInfo};
pub use lifecycle::InitReport;
pub use tracked::TrackedFiles;

// === Snapshots ===
pub use manifest::ProjectManifest;
pub use snapshot::{
    CreatedSnapshot, FileContent, RestoreReport, Snapshot, SnapshotContent, SnapshotOutcome,
};

// === Snapshot view ===
// Durable view record and the time-travel controller results
pub use state::{OriginalState, StateKind, ViewRecord, ViewRecordStore};
pub use view::{ForceRecovery, ViewEntered, ViewExited, ViewStatus};

// === Status, export and cleanup ===
pub use cleanup::CleanupReport;
pub use export::ExportReport;
pub use git_status::{FileChange, GitStatus, RepoStatus};

// === Service layer ===
pub use config::SnapshotConfig;
pub use registry::{RepoRegistry, SessionDirectory, SessionMap};
pub use service::{ExitOutcome, RestoreOutcome, SnapshotService};

// === Output formatting ===
pub use output::{
    format_hash, print_error, print_error_with_hint, print_field, print_info,
    print_section_header, print_success, print_warning,
};
