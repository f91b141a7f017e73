//! Project directory setup and raw git inspection
//!
//! Provides functions for creating project directories with slide files and for
//! reading repository state directly with git, independent of the code under test.

#![allow(dead_code)]

use deck_snapshot::core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A project directory that lives as long as this value. The path is
/// canonical so it compares equal to paths reported by the library.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestProject {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates an empty project directory with no repository
pub fn setup_empty_project() -> Result<TestProject> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().canonicalize()?;
    Ok(TestProject { temp_dir, path })
}

/// Writes a file relative to the project root, creating parent directories
pub fn write_file(project: &Path, relative: &str, content: &str) -> Result<()> {
    let path = project.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn read_file(project: &Path, relative: &str) -> Result<String> {
    Ok(fs::read_to_string(project.join(relative))?)
}

pub fn remove_file(project: &Path, relative: &str) -> Result<()> {
    fs::remove_file(project.join(relative))?;
    Ok(())
}

/// Writes the project manifest
pub fn write_manifest(project: &Path, name: &str) -> Result<()> {
    let content = format!(
        "project:\n  name: {name}\n  id: deck-001\n  created_at: '2024-05-01T10:00:00'\ntemplate:\n  file: template.pptx\n"
    );
    write_file(project, "project.yaml", &content)
}

/// Writes `slides/slide_<number>.json` with a title
pub fn write_slide(project: &Path, number: usize, title: &str) -> Result<()> {
    let content = format!("{{\n  \"index\": {number},\n  \"title\": \"{title}\"\n}}\n");
    write_file(project, &format!("slides/slide_{number}.json"), &content)
}

/// Runs git in the project and returns trimmed stdout, or an empty string on failure
pub fn git_output(project: &Path, args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .current_dir(project)
        .env("LC_ALL", "C")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_default()
}

/// Full hash of HEAD as git reports it
pub fn head_commit(project: &Path) -> String {
    git_output(project, &["rev-parse", "HEAD"])
}

/// Current branch name, empty when detached
pub fn current_branch(project: &Path) -> String {
    git_output(project, &["symbolic-ref", "--quiet", "--short", "HEAD"])
}

pub fn commit_count(project: &Path) -> usize {
    git_output(project, &["rev-list", "--count", "HEAD"])
        .parse()
        .unwrap_or(0)
}

/// Files recorded in a commit
pub fn committed_files(project: &Path, rev: &str) -> Vec<String> {
    git_output(
        project,
        &["-c", "core.quotePath=false", "ls-tree", "-r", "--name-only", rev],
    )
        .lines()
        .map(str::to_string)
        .collect()
}
