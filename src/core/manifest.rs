//! Read-only view of the project manifest (`project.yaml`).
//!
//! The manifest is owned by the project layer; the snapshot subsystem only reads
//! the handful of identifying fields it reports alongside snapshot content, and
//! reloads it after operations that rewrite the working copy.

use crate::core::{error::Result, tracked::MANIFEST_FILE};
use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectManifest {
    pub name: Option<String>,
    pub id: Option<String>,
    pub created_at: Option<String>,
    pub template: Option<String>,
}

impl ProjectManifest {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(text)?;
        Ok(Self {
            name: lookup(&document, "project", "name"),
            id: lookup(&document, "project", "id"),
            created_at: lookup(&document, "project", "created_at"),
            template: lookup(&document, "template", "file"),
        })
    }

    /// Load the manifest from a project directory, if it exists
    pub fn load(project_dir: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(project_dir.join(MANIFEST_FILE)) {
            Ok(text) => Self::from_yaml(&text).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Metadata entries reported with snapshot content; missing fields are empty
    pub fn metadata(&self) -> [(&'static str, String); 4] {
        [
            ("project_name", self.name.clone().unwrap_or_default()),
            ("project_id", self.id.clone().unwrap_or_default()),
            ("created_at", self.created_at.clone().unwrap_or_default()),
            ("template", self.template.clone().unwrap_or_default()),
        ]
    }
}

fn lookup(document: &Value, section: &str, key: &str) -> Option<String> {
    match document.get(section)?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_manifest_fields() -> Result<()> {
        let manifest = ProjectManifest::from_yaml(
            "project:\n  name: Quarterly Review\n  id: 42\n  created_at: '2024-05-01T10:00:00'\ntemplate:\n  file: template.pptx\n",
        )?;
        assert_eq!(manifest.name.as_deref(), Some("Quarterly Review"));
        assert_eq!(manifest.id.as_deref(), Some("42"));
        assert_eq!(manifest.created_at.as_deref(), Some("2024-05-01T10:00:00"));
        assert_eq!(manifest.template.as_deref(), Some("template.pptx"));
        Ok(())
    }

    #[test]
    fn test_missing_sections_are_empty() -> Result<()> {
        let manifest = ProjectManifest::from_yaml("other: value\n")?;
        assert_eq!(manifest, ProjectManifest::default());
        assert!(manifest.metadata().iter().all(|(_, value)| value.is_empty()));
        Ok(())
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(ProjectManifest::from_yaml("project: [unclosed").is_err());
    }

    #[test]
    fn test_load_missing_manifest() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(ProjectManifest::load(temp_dir.path())?.is_none());
        Ok(())
    }
}
