//! File whose full content is computed by the caller.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{ensure_parent_dir, metadata_opt};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file that must hold exactly `content`.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Destination path.
    pub path: PathBuf,
    /// Desired bytes.
    pub content: Vec<u8>,
}

impl GeneratedFile {
    /// Create a new generated file resource.
    #[must_use]
    pub fn new(path: PathBuf, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }
}

impl Applicable for GeneratedFile {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, &self.content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GeneratedFile {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(meta) = metadata_opt(&self.path)? else {
            return Ok(ResourceState::Missing);
        };
        if meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.path.display()),
            });
        }
        let current = std::fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if current == self.content {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn write_then_correct() {
        let dir = tempfile::tempdir().unwrap();
        let f = GeneratedFile::new(dir.path().join("a/.yarnrc"), "x\n");
        assert_eq!(f.current_state().unwrap(), ResourceState::Missing);
        f.apply().unwrap();
        assert_eq!(f.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn differing_content_is_incorrect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".yarnrc"), "old").unwrap();
        let f = GeneratedFile::new(dir.path().join(".yarnrc"), "new");
        assert!(f.needs_change().unwrap());
    }
}
