//! The tracked file set and the fixed ignore-list.
//!
//! Only text files are version controlled: the project manifest, the image
//! reference manifest, per-slide JSON files and a few optional docs. Binary
//! assets never enter history. The set is recomputed from disk on every scan
//! because slides come and go while the user edits.

use crate::core::error::Result;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "project.yaml";
pub const IMAGE_MANIFEST_FILE: &str = "images.json";
pub const IGNORE_FILE: &str = ".gitignore";
pub const SLIDES_DIR: &str = "slides";

/// Optional documentation tracked when present
pub const AUX_DOCS: &[&str] = &["README.md", "CHANGELOG.md", "LICENSE"];

/// Written verbatim at init time; not user-configurable.
pub const IGNORE_TEMPLATE: &str = "\
# Deck project ignore list (generated, do not edit)

# Documents and archives
*.pptx
*.pdf
*.zip
*.tar
*.gz
*.7z

# Images
*.png
*.jpg
*.jpeg
*.gif
*.bmp
*.tiff
*.ico
*.svg

# Image assets
assets/images/*
!assets/images/README.md
!assets/images/.gitkeep

# Snapshot view state and replaced repositories
.snapshot_view_info.json
.git.backup-*/

# OS files
.DS_Store
Thumbs.db
*.swp
*.swo
*~
~*

# Temporary files
*.tmp
*.temp
*.log
*.cache
*.pid
*.lock

# Environment
.env
.env.*

# Editors
.vscode/
.idea/
*.sublime-*

# Build output
__pycache__/
*.py[cod]
node_modules/
dist/
build/
target/

# Databases
*.db
*.sqlite
*.sqlite3
";

/// Write the fixed ignore-list into the project root
pub fn write_ignore_list(root: &Path) -> Result<PathBuf> {
    let path = root.join(IGNORE_FILE);
    fs::write(&path, IGNORE_TEMPLATE)?;
    Ok(path)
}

/// Whether a project-relative path belongs to the tracked content categories
pub fn is_tracked_path(relative: &str) -> bool {
    let relative = relative.replace('\\', "/");
    if relative == MANIFEST_FILE || relative == IMAGE_MANIFEST_FILE {
        return true;
    }
    if AUX_DOCS.contains(&relative.as_str()) {
        return true;
    }
    relative
        .strip_prefix(SLIDES_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty() && rest.ends_with(".json"))
}

/// Snapshot of which text files are eligible for version control right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedFiles {
    content: Vec<String>,
    ignore_list: bool,
}

impl TrackedFiles {
    pub fn scan(root: &Path) -> Result<Self> {
        let mut content = Vec::new();

        for name in [MANIFEST_FILE, IMAGE_MANIFEST_FILE] {
            if root.join(name).is_file() {
                content.push(name.to_string());
            }
        }

        let slides_dir = root.join(SLIDES_DIR);
        if slides_dir.is_dir() {
            let pattern = format!(
                "{}/**/*.json",
                glob::Pattern::escape(&slides_dir.to_string_lossy())
            );
            for entry in glob::glob(&pattern)? {
                match entry {
                    Ok(path) if path.is_file() => {
                        if let Some(relative) = relative_path(root, &path) {
                            content.push(relative);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable slide path: {e}"),
                }
            }
        }

        for name in AUX_DOCS {
            if root.join(name).is_file() {
                content.push(name.to_string());
            }
        }

        content.sort();
        content.dedup();

        Ok(Self {
            content,
            ignore_list: root.join(IGNORE_FILE).is_file(),
        })
    }

    /// Content files, excluding the ignore-list
    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_ignore_list(&self) -> bool {
        self.ignore_list
    }

    /// Drop the given content paths, e.g. those the ignore-list excludes
    pub fn exclude(&mut self, paths: &[String]) {
        self.content.retain(|path| !paths.contains(path));
    }

    /// Paths to stage: the content files plus the ignore-list when present
    pub fn staging_paths(&self) -> Vec<String> {
        let mut paths = self.content.clone();
        if self.ignore_list {
            paths.push(IGNORE_FILE.to_string());
            paths.sort();
        }
        paths
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}
