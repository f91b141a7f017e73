//! Snapshot creation, history, content retrieval and rollback.
//!
//! A snapshot is an ordinary commit over the tracked file set whose subject is
//! the first line of the user's description followed by an ISO-8601 timestamp:
//! `Reworked intro slides [2024-05-01T10:00:00.123+02:00]`.
//!
//! # Public API
//! - [`ProjectRepo::create_snapshot`]: Commit the tracked files
//! - [`ProjectRepo::list_snapshots`]: Newest-first history following HEAD
//! - [`ProjectRepo::snapshot_content`]: Read text files of a past snapshot
//! - [`ProjectRepo::restore_snapshot`]: Hard reset to a past snapshot (lossy)

use crate::core::{
    error::{Result, SnapshotError},
    git::{short_hash, ProjectRepo},
    manifest::ProjectManifest,
    tracked::{is_tracked_path, IGNORE_FILE, IMAGE_MANIFEST_FILE, MANIFEST_FILE},
};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';
const LOG_FORMAT: &str = "--pretty=format:%H%x1f%aI%x1f%B%x1e";

const METADATA_HEADER: &str = "[metadata]";

/// Extensions whose content is returned by [`ProjectRepo::snapshot_content`]
const TEXT_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".json", ".txt", ".md"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSnapshot {
    pub hash: String,
    pub short_hash: String,
    pub description: String,
    pub files_count: usize,
}

/// Result of a snapshot request; `NoChanges` is informational, not a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SnapshotOutcome {
    Created(CreatedSnapshot),
    NoChanges,
}

impl SnapshotOutcome {
    pub fn created(&self) -> Option<&CreatedSnapshot> {
        match self {
            SnapshotOutcome::Created(snapshot) => Some(snapshot),
            SnapshotOutcome::NoChanges => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub hash: String,
    pub short_hash: String,
    /// Author date, ISO 8601
    pub date: String,
    /// First line of the commit message
    pub description: String,
    pub full_message: String,
    pub metadata: BTreeMap<String, String>,
    pub files: Vec<String>,
    pub file_count: usize,
}

impl Snapshot {
    /// The description without its trailing ` [timestamp]` suffix
    pub fn label(&self) -> &str {
        strip_timestamp(&self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub content: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotContent {
    pub hash: String,
    pub short_hash: String,
    pub files: BTreeMap<String, FileContent>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub hash: String,
    pub short_hash: String,
    pub restored: bool,
}

impl ProjectRepo {
    /// Commit the current tracked file set.
    ///
    /// Only the tracked set is staged, never the whole tree. `user` is accepted for
    /// attribution in logs; commits always carry the fixed repository identity.
    pub fn create_snapshot(&self, message: &str, user: Option<&str>) -> Result<SnapshotOutcome> {
        if message.trim().is_empty() {
            return Err(SnapshotError::EmptyMessage);
        }
        self.require_initialized()?;
        self.reject_while_viewing()?;

        if let Err(e) = self.apply_identity() {
            debug!("Could not reapply commit identity: {e}");
        }

        let tracked = self.scan_tracked()?;
        if tracked.is_empty() {
            return Err(SnapshotError::NoTrackableFiles {
                path: self.root().to_path_buf(),
            });
        }

        let mut paths = tracked.staging_paths();
        paths.extend(self.deleted_tracked_paths()?);
        paths.sort();
        paths.dedup();
        if let Err(e) = self.stage(&paths) {
            self.unstage_all();
            return Err(match e {
                SnapshotError::CommandFailed { message, .. } => {
                    warn!("Staging snapshot files failed: {message}");
                    SnapshotError::CommitFailed { message }
                }
                other => other,
            });
        }

        let description = compose_commit_message(message, Local::now());
        match self.commit_staged(&description) {
            Ok(()) => {}
            Err(SnapshotError::NothingToCommit { .. }) => {
                info!("No file changes; snapshot skipped");
                return Ok(SnapshotOutcome::NoChanges);
            }
            Err(SnapshotError::CommandFailed { message, .. }) => {
                warn!("Snapshot commit failed: {message}");
                return Err(SnapshotError::CommitFailed { message });
            }
            Err(e) => return Err(e),
        }

        let hash = self
            .head_commit()?
            .ok_or_else(|| SnapshotError::CommitFailed {
                message: "commit succeeded but HEAD does not resolve".to_string(),
            })?;

        info!(
            "Snapshot {} created by {}: {}",
            short_hash(&hash),
            user.unwrap_or("unknown user"),
            description
        );

        Ok(SnapshotOutcome::Created(CreatedSnapshot {
            short_hash: short_hash(&hash).to_string(),
            hash,
            description,
            files_count: tracked.len(),
        }))
    }

    /// Up to `limit` most recent non-merge snapshots reachable from HEAD, newest first
    pub fn list_snapshots(&self, limit: usize) -> Result<Vec<Snapshot>> {
        self.require_initialized()?;
        if self.head_commit()?.is_none() || limit == 0 {
            return Ok(Vec::new());
        }

        let max_count = format!("--max-count={limit}");
        let output = self.git(&["log", &max_count, "--no-merges", LOG_FORMAT])?;

        let mut snapshots = Vec::new();
        for (hash, date, message) in parse_log(&output) {
            let files = self.commit_files(&hash)?;
            let description = message.lines().next().unwrap_or_default().to_string();
            snapshots.push(Snapshot {
                short_hash: short_hash(&hash).to_string(),
                metadata: parse_metadata(&message),
                file_count: files.len(),
                hash,
                date,
                description,
                full_message: message,
                files,
            });
        }

        debug!("Listed {} snapshots", snapshots.len());
        Ok(snapshots)
    }

    /// Read the text files of a past snapshot without touching the working copy
    pub fn snapshot_content(&self, hash: &str) -> Result<SnapshotContent> {
        self.require_initialized()?;
        let full = self.resolve_commit(hash)?;

        let listing = self.git(&["ls-tree", "-r", "--name-only", &full])?;
        let mut files = BTreeMap::new();
        let mut metadata = BTreeMap::new();

        for path in listing.lines().map(str::trim).filter(|p| !p.is_empty()) {
            if !is_text_like(path) {
                continue;
            }

            let object = format!("{full}:{path}");
            let content = match self.git(&["show", &object]) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping {path} in {}: {e}", short_hash(&full));
                    continue;
                }
            };

            if path == MANIFEST_FILE {
                match ProjectManifest::from_yaml(&content) {
                    Ok(manifest) => {
                        for (key, value) in manifest.metadata() {
                            metadata.insert(key.to_string(), value);
                        }
                    }
                    Err(e) => debug!("Manifest in {} did not parse: {e}", short_hash(&full)),
                }
            }

            files.insert(
                path.to_string(),
                FileContent {
                    size: content.len(),
                    content,
                },
            );
        }

        if let Ok(subject) = self.git(&["log", "--format=%s", "-n", "1", &full]) {
            metadata.insert("commit_message".to_string(), subject.trim().to_string());
        }

        Ok(SnapshotContent {
            short_hash: short_hash(&full).to_string(),
            hash: full,
            files,
            metadata,
        })
    }

    /// Hard reset the working copy and branch to `hash`.
    ///
    /// Discards every uncommitted change. Callers must confirm with the user and
    /// should offer to snapshot the current state first.
    pub fn restore_snapshot(&self, hash: &str) -> Result<RestoreReport> {
        self.require_initialized()?;
        self.reject_while_viewing()?;
        let full = self.resolve_commit(hash)?;

        warn!(
            "Resetting {} to {}; uncommitted changes will be lost",
            self.root().display(),
            short_hash(&full)
        );
        self.git(&["reset", "--hard", &full])?;
        info!("Rolled back to snapshot {}", short_hash(&full));

        Ok(RestoreReport {
            short_hash: short_hash(&full).to_string(),
            hash: full,
            restored: true,
        })
    }

    fn commit_files(&self, hash: &str) -> Result<Vec<String>> {
        match self.git(&["show", "--name-only", "--format=", hash]) {
            Ok(output) => Ok(output
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(SnapshotError::CommandFailed { message, .. }) => {
                warn!("Could not list files of {}: {message}", short_hash(hash));
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Committed files of the tracked categories that no longer exist on disk
    fn deleted_tracked_paths(&self) -> Result<Vec<String>> {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }
        let output = self.git(&["ls-files", "--deleted"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|path| is_tracked_path(path))
            .map(str::to_string)
            .collect())
    }

    /// Leave the index matching HEAD after a partial stage
    fn unstage_all(&self) {
        match self.head_commit() {
            Ok(Some(_)) => {
                if let Err(e) = self.git(&["reset", "--quiet"]) {
                    debug!("Could not reset the index: {e}");
                }
            }
            Ok(None) => {
                let args = ["rm", "-r", "--cached", "--quiet", "--ignore-unmatch", "."];
                if let Err(e) = self.git(&args) {
                    debug!("Could not clear the index: {e}");
                }
            }
            Err(e) => debug!("Could not read HEAD to reset the index: {e}"),
        }
    }

    fn reject_while_viewing(&self) -> Result<()> {
        let status = self.view_status()?;
        match status.hash {
            Some(hash) if status.in_view => Err(SnapshotError::ViewActive { hash }),
            _ => Ok(()),
        }
    }
}

/// Build the single-line commit subject: `<first line> [<timestamp>]`
pub fn compose_commit_message(message: &str, timestamp: DateTime<Local>) -> String {
    let first_line = message
        .trim()
        .lines()
        .next()
        .map(str::trim)
        .unwrap_or_default();
    format!("{first_line} [{}]", timestamp.to_rfc3339())
}

/// Strip a trailing ` [...]` timestamp from a description
pub fn strip_timestamp(description: &str) -> &str {
    match description.rfind(" [") {
        Some(index) if description.ends_with(']') => &description[..index],
        _ => description,
    }
}

/// Parse `key: value` lines following a `[metadata]` header
pub fn parse_metadata(message: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let mut in_section = false;

    for line in message.lines().map(str::trim) {
        if line == METADATA_HEADER {
            in_section = true;
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = false;
            continue;
        }
        if in_section {
            if let Some((key, value)) = line.split_once(':') {
                metadata.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    metadata
}

/// Parse `git log` output in [`LOG_FORMAT`]; malformed records are skipped
fn parse_log(output: &str) -> Vec<(String, String, String)> {
    output
        .split(RECORD_SEPARATOR)
        .filter_map(|record| {
            let record = record.trim_start_matches(['\n', '\r']);
            if record.trim().is_empty() {
                return None;
            }
            let mut fields = record.splitn(3, FIELD_SEPARATOR);
            let hash = fields.next()?.trim();
            let date = fields.next()?.trim();
            let message = fields.next()?.trim_end();
            if hash.len() < 8 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                debug!("Skipping unparseable log record");
                return None;
            }
            Some((hash.to_string(), date.to_string(), message.to_string()))
        })
        .collect()
}

fn is_text_like(path: &str) -> bool {
    path == MANIFEST_FILE
        || path == IMAGE_MANIFEST_FILE
        || path == IGNORE_FILE
        || TEXT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_compose_keeps_only_first_line() {
        let timestamp = Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let message = compose_commit_message("  Title line\nsecond line\nthird", timestamp);
        assert!(message.starts_with("Title line ["));
        assert!(message.ends_with(']'));
        assert!(!message.contains('\n'));
    }

    #[test]
    fn test_strip_timestamp() {
        assert_eq!(strip_timestamp("v1 [2024-05-01T10:00:00+00:00]"), "v1");
        assert_eq!(strip_timestamp("no suffix"), "no suffix");
        assert_eq!(strip_timestamp("a [b] c"), "a [b] c");
    }

    #[test]
    fn test_parse_metadata_section() {
        let message = "Snapshot\n\n[metadata]\nauthor: alice\nslides: 12\n[other]\nignored: yes\n";
        let metadata = parse_metadata(message);
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["author"], "alice");
        assert_eq!(metadata["slides"], "12");
    }

    #[test]
    fn test_parse_metadata_without_section() {
        assert!(parse_metadata("plain: message").is_empty());
    }

    #[test]
    fn test_parse_log_skips_malformed_records() {
        let hash_a = "a".repeat(40);
        let hash_b = "b".repeat(40);
        let output = format!(
            "{hash_a}\u{1f}2024-05-01T10:00:00+00:00\u{1f}second [t]\n\u{1e}\ngarbage line\u{1e}\n{hash_b}\u{1f}2024-04-30T09:00:00+00:00\u{1f}first [t]\n\nbody\u{1e}"
        );
        let records = parse_log(&output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, hash_a);
        assert_eq!(records[0].2, "second [t]");
        assert_eq!(records[1].2, "first [t]\n\nbody");
    }

    #[test]
    fn test_is_text_like() {
        assert!(is_text_like("project.yaml"));
        assert!(is_text_like(".gitignore"));
        assert!(is_text_like("slides/slide_1.json"));
        assert!(is_text_like("notes.md"));
        assert!(!is_text_like("template.pptx"));
        assert!(!is_text_like("LICENSE"));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(SnapshotOutcome::NoChanges).unwrap();
        assert_eq!(json["outcome"], "no-changes");
    }
}
