mod common;
use common::{fixtures::*, repository::*};
use deck_snapshot::core::{
    error::{ErrorKind, Result},
    service::backup_message,
    SessionMap, SnapshotConfig, SnapshotOutcome, SnapshotService,
};
use std::sync::Arc;

fn service() -> SnapshotService {
    SnapshotService::new(SnapshotConfig::default())
}

#[cfg(test)]
mod service_tests {
    use super::*;

    #[test]
    fn test_restore_with_backup_keeps_pending_work() -> Result<()> {
        let (project, repo) = create_initialized_deck()?;
        let v1 = snapshot_with_title(&repo, "v1")?;
        snapshot_with_title(&repo, "v2")?;
        write_slide(&project.path, 2, "unsaved work")?;

        let service = service();
        let outcome = service.restore_snapshot(&project.path, &v1, true)?;
        assert_eq!(head_commit(&project.path), v1);
        assert_eq!(
            outcome.manifest.and_then(|m| m.name).as_deref(),
            Some("Quarterly Review")
        );

        let backup = outcome.backup.expect("pending work should be backed up");
        assert!(backup.description.starts_with(&backup_message(&v1)));
        let content = service.snapshot_content(&project.path, &backup.hash)?;
        assert!(content.files["slides/slide_2.json"]
            .content
            .contains("unsaved work"));
        Ok(())
    }

    #[test]
    fn test_restore_of_clean_tree_needs_no_backup() -> Result<()> {
        let (project, repo) = create_initialized_deck()?;
        let v1 = snapshot_with_title(&repo, "v1")?;
        snapshot_with_title(&repo, "v2")?;

        let outcome = service().restore_snapshot(&project.path, &v1, true)?;
        assert!(outcome.backup.is_none());
        assert!(outcome.report.restored);
        Ok(())
    }

    #[test]
    fn test_restore_of_unknown_commit_takes_no_backup() -> Result<()> {
        let (project, _repo) = create_initialized_deck()?;
        write_slide(&project.path, 2, "unsaved work")?;
        let count = commit_count(&project.path);

        let err = service()
            .restore_snapshot(&project.path, "feedface", true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommitNotFound);
        assert_eq!(commit_count(&project.path), count);
        Ok(())
    }

    #[test]
    fn test_exit_view_reloads_manifest() -> Result<()> {
        let (project, repo) = create_initialized_deck()?;
        write_manifest(&project.path, "Renamed Deck")?;
        repo.create_snapshot("rename", None)?;
        let first = git_output(&project.path, &["rev-list", "--max-parents=0", "HEAD"]);

        let service = service();
        service.enter_view(&project.path, &first)?;
        assert!(read_file(&project.path, "project.yaml")?.contains("Quarterly Review"));

        let outcome = service.exit_view(&project.path)?;
        assert_eq!(
            outcome.manifest.and_then(|m| m.name).as_deref(),
            Some("Renamed Deck")
        );
        Ok(())
    }

    #[test]
    fn test_one_handle_per_project_directory() -> Result<()> {
        let (project, _repo) = create_initialized_deck()?;
        let service = service();
        let first = service.repo(&project.path)?;
        let second = service.repo(&project.path.join("slides").join(".."))?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn test_operations_by_session_id() -> Result<()> {
        let (project, _repo) = create_initialized_deck()?;
        let sessions = Arc::new(SessionMap::new());
        sessions.insert("session-1", project.path.clone());
        let service = service().with_sessions(sessions);

        let dir = service.session_dir("session-1")?;
        write_slide(&dir, 1, "from session")?;
        let outcome = service.create_snapshot(&dir, "session edit", Some("bob"))?;
        assert!(matches!(outcome, SnapshotOutcome::Created(_)));
        assert!(!service.has_changes(&dir)?);

        let err = service.session_dir("session-2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotFound);
        Ok(())
    }

    #[test]
    fn test_history_uses_configured_limit() -> Result<()> {
        let (project, repo) = create_initialized_deck()?;
        for title in ["a", "b", "c"] {
            snapshot_with_title(&repo, title)?;
        }
        let service = SnapshotService::new(SnapshotConfig {
            history_limit: 2,
            ..SnapshotConfig::default()
        });
        assert_eq!(service.list_snapshots(&project.path, None)?.len(), 2);
        assert_eq!(service.list_snapshots(&project.path, Some(10))?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_cleanup_resets_working_copy() -> Result<()> {
        let (project, repo) = create_initialized_deck()?;
        let committed = read_file(&project.path, "slides/slide_1.json")?;
        write_slide(&project.path, 1, "dirty")?;
        write_file(&project.path, "notes.txt", "scratch")?;

        let report = service().cleanup(&project.path)?;
        assert!(report.was_repo);
        assert!(!report.left_view);
        assert_eq!(read_file(&project.path, "slides/slide_1.json")?, committed);
        assert!(!project.path.join("notes.txt").exists());
        assert!(project.path.join("template.pptx").exists());
        assert!(git_output(&project.path, &["config", "--local", "core.fileMode"]).is_empty());
        assert!(repo.is_initialized());
        Ok(())
    }

    #[test]
    fn test_cleanup_leaves_active_view() -> Result<()> {
        let (project, repo) = create_initialized_deck()?;
        let v1 = snapshot_with_title(&repo, "v1")?;
        let head = snapshot_with_title(&repo, "v2")?;
        repo.enter_view(&v1)?;

        let report = service().cleanup(&project.path)?;
        assert!(report.was_repo);
        assert!(report.left_view);
        assert_eq!(head_commit(&project.path), head);
        assert!(!repo.view_status()?.record_present);
        Ok(())
    }

    #[test]
    fn test_cleanup_without_repository() -> Result<()> {
        let project = setup_empty_project()?;
        let report = service().cleanup(&project.path)?;
        assert!(!report.was_repo);
        Ok(())
    }
}
