//! Directory mirrored from a source tree.
//!
//! Creation and metadata are separate steps: the tree walker creates the
//! directory, fills it, and only then copies permissions and timestamps so
//! that writing children does not disturb the copied mtime (and a read-only
//! source directory does not block its own contents).
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{copy_metadata, kind_name, metadata_matches, symlink_metadata_opt};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A destination directory carrying its source's permissions and times.
#[derive(Debug, Clone)]
pub struct MirroredDir {
    /// Source directory.
    pub source: PathBuf,
    /// Destination directory.
    pub target: PathBuf,
}

impl MirroredDir {
    /// Create a new mirrored directory resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Create the destination directory if it is absent.
    ///
    /// Returns `true` when the directory was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.target.is_dir() {
            return Ok(false);
        }
        std::fs::create_dir_all(&self.target)
            .with_context(|| format!("creating directory {}", self.target.display()))?;
        Ok(true)
    }

    /// Copy the source's permissions and times when they differ.
    ///
    /// Returns `true` when metadata was written.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be inspected or updated.
    pub fn sync_metadata(&self) -> Result<bool> {
        let src_meta = std::fs::metadata(&self.source)
            .with_context(|| format!("stat {}", self.source.display()))?;
        let dst_meta = std::fs::metadata(&self.target)
            .with_context(|| format!("stat {}", self.target.display()))?;
        if metadata_matches(&src_meta, &dst_meta) {
            return Ok(false);
        }
        copy_metadata(&src_meta, &self.target)?;
        Ok(true)
    }
}

impl Applicable for MirroredDir {
    fn description(&self) -> String {
        format!("{}/", self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let created = self.ensure_exists()?;
        let updated = self.sync_metadata()?;
        if created || updated {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for MirroredDir {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(dst_meta) = symlink_metadata_opt(&self.target)? else {
            return Ok(ResourceState::Missing);
        };
        if !dst_meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: kind_name(&dst_meta).to_string(),
            });
        }
        let src_meta = std::fs::metadata(&self.source)
            .with_context(|| format!("stat {}", self.source.display()))?;
        if metadata_matches(&src_meta, &dst_meta) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "metadata differs".to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use filetime::FileTime;

    #[test]
    fn missing_then_created() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let d = MirroredDir::new(dir.path().join("src"), dir.path().join("dst"));
        assert_eq!(d.current_state().unwrap(), ResourceState::Missing);

        assert_eq!(d.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(d.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(d.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn sync_metadata_copies_mtime_once() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::create_dir(dir.path().join("dst")).unwrap();
        filetime::set_file_mtime(&src, FileTime::from_unix_time(5_000, 0)).unwrap();

        let d = MirroredDir::new(src, dir.path().join("dst"));
        assert!(d.sync_metadata().unwrap());
        assert!(!d.sync_metadata().unwrap());

        let meta = std::fs::metadata(dir.path().join("dst")).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&meta),
            FileTime::from_unix_time(5_000, 0)
        );
    }

    #[test]
    fn file_at_target_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("dst"), "x").unwrap();
        let d = MirroredDir::new(dir.path().join("src"), dir.path().join("dst"));
        assert_eq!(
            d.current_state().unwrap(),
            ResourceState::Invalid {
                reason: "file".to_string()
            }
        );
    }
}
