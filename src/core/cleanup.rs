//! Best-effort teardown before a project directory is deleted or moved.

use crate::core::git::ProjectRepo;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind};

/// Commands run in order; each failure is logged and skipped
const CLEANUP_STEPS: &[&[&str]] = &[
    &["reset", "--hard", "HEAD"],
    &["clean", "-fd"],
    &["gc", "--auto"],
    &["config", "--unset-all", "core.fileMode"],
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub was_repo: bool,
    /// A detached view was left (normally or by force) before cleaning
    pub left_view: bool,
    pub failed_steps: Vec<String>,
    pub terminated_processes: Vec<u32>,
}

impl ProjectRepo {
    /// Release everything the repository holds open.
    ///
    /// Never fails: the report only says whether a repository was present and
    /// which steps were skipped.
    pub fn cleanup(&self) -> CleanupReport {
        if !self.is_initialized() {
            debug!("No repository in {}; nothing to clean", self.root().display());
            return CleanupReport::default();
        }

        let mut report = CleanupReport {
            was_repo: true,
            ..Default::default()
        };

        match self.ensure_not_in_view() {
            Ok(left) => report.left_view = left,
            Err(e) => {
                warn!("Could not leave snapshot view during cleanup: {e}");
                report.failed_steps.push("leave-view".to_string());
            }
        }

        for step in CLEANUP_STEPS {
            if let Err(e) = self.git(step) {
                // core.fileMode is usually unset, which git reports as failure
                debug!("Cleanup step `git {}` failed: {e}", step.join(" "));
                report.failed_steps.push(step.join(" "));
            }
        }

        report.terminated_processes = terminate_git_processes(self.root());
        info!(
            "Cleaned repository in {} ({} steps skipped)",
            self.root().display(),
            report.failed_steps.len()
        );
        report
    }
}

/// Send SIGTERM to git processes working inside `root`, excluding ourselves
fn terminate_git_processes(root: &Path) -> Vec<u32> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::new().with_cwd(UpdateKind::Always),
    );
    let own_pid = sysinfo::get_current_pid().ok();

    let mut terminated = Vec::new();
    for (pid, process) in system.processes() {
        if Some(*pid) == own_pid || !is_git_process(&process.name().to_string_lossy()) {
            continue;
        }
        if !process.cwd().is_some_and(|cwd| cwd.starts_with(root)) {
            continue;
        }
        match process.kill_with(Signal::Term) {
            Some(true) => {
                info!("Terminated git process {pid} in {}", root.display());
                terminated.push(pid.as_u32());
            }
            Some(false) => warn!("Could not terminate git process {pid}"),
            None => debug!("SIGTERM unsupported on this platform"),
        }
    }
    terminated
}

fn is_git_process(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "git" || name == "git.exe" || name.starts_with("git-")
}
