//! Deck Snapshot - git-backed snapshots and read-only time travel for slide-deck projects.
//!
//! A project directory holds a manifest (`project.yaml`), an image manifest and one
//! JSON file per slide. This library versions those text files in a per-project git
//! repository: it initializes the repository, commits snapshots on demand, lists
//! and reads history, rolls back, and temporarily detaches the working copy onto a
//! past snapshot with a durable record of how to get back.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - [`SnapshotService`]: Every operation keyed by project directory
//! - [`ProjectRepo`]: The repository handle the operations run on
//! - [`SnapshotError`] and [`ErrorKind`]: Failures and their categories

pub mod commands;
pub mod core;

pub use core::{
    // Error handling
    ErrorKind,
    Result,
    SnapshotError,

    // Repository and operations
    ProjectRepo,
    SnapshotConfig,
    SnapshotOutcome,
    SnapshotService,

    // Sessions
    SessionDirectory,
    SessionMap,
};
