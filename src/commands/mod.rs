//! One module per subcommand. Each `execute_*` function runs a single service
//! operation against the project directory and prints the result.

pub mod cleanup;
pub mod export;
pub mod history;
pub mod info;
pub mod init;
pub mod recover;
pub mod restore;
pub mod show;
pub mod snapshot;
pub mod status;
pub mod view;

pub use cleanup::*;
pub use export::*;
pub use history::*;
pub use info::*;
pub use init::*;
pub use recover::*;
pub use restore::*;
pub use show::*;
pub use snapshot::*;
pub use status::*;
pub use view::*;

use crate::core::SnapshotService;
use std::path::{Path, PathBuf};

/// What every subcommand needs: the service and the project it acts on
pub struct CommandContext {
    pub service: SnapshotService,
    pub project_dir: PathBuf,
}

impl CommandContext {
    pub fn new(service: SnapshotService, project_dir: PathBuf) -> Self {
        Self {
            service,
            project_dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.project_dir
    }
}
