//! Ready-made project states for integration tests

#![allow(dead_code)]

use super::repository::*;
use deck_snapshot::core::{error::Result, ProjectRepo, SnapshotOutcome};

/// A project with a manifest, an image manifest, two slides and a binary template
pub fn create_deck_project() -> Result<TestProject> {
    let project = setup_empty_project()?;
    write_manifest(&project.path, "Quarterly Review")?;
    write_file(&project.path, "images.json", "{ \"images\": [] }\n")?;
    write_slide(&project.path, 1, "Intro")?;
    write_slide(&project.path, 2, "Numbers")?;
    write_file(&project.path, "template.pptx", "PK\u{3}\u{4} binary")?;
    Ok(project)
}

/// The deck project, initialized: one initial commit holding the text files
pub fn create_initialized_deck() -> Result<(TestProject, ProjectRepo)> {
    let project = create_deck_project()?;
    let repo = ProjectRepo::open(&project.path)?;
    repo.initialize(false)?;
    Ok((project, repo))
}

/// Change slide 1 and take a snapshot, returning the new commit hash
pub fn snapshot_with_title(repo: &ProjectRepo, title: &str) -> Result<String> {
    write_slide(repo.root(), 1, title)?;
    match repo.create_snapshot(title, None)? {
        SnapshotOutcome::Created(created) => Ok(created.hash),
        SnapshotOutcome::NoChanges => panic!("expected a snapshot for {title}"),
    }
}
