//! Regular file mirrored from a source tree, refreshed by modification time.
use anyhow::{Context as _, Result};
use filetime::FileTime;
use std::path::PathBuf;

use super::helpers::fs::{
    copy_metadata, ensure_parent_dir, kind_name, metadata_opt, remove_existing,
    symlink_metadata_opt,
};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A destination file kept at least as new as its source.
#[derive(Debug, Clone)]
pub struct MirroredFile {
    /// Source file.
    pub source: PathBuf,
    /// Destination file.
    pub target: PathBuf,
}

impl MirroredFile {
    /// Create a new mirrored file resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for MirroredFile {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        let src_meta = std::fs::metadata(&self.source)
            .with_context(|| format!("stat {}", self.source.display()))?;

        ensure_parent_dir(&self.target)?;
        // Never write through a link, and replace read-only files.
        if let Some(meta) = symlink_metadata_opt(&self.target)?
            && (meta.file_type().is_symlink() || meta.permissions().readonly())
        {
            remove_existing(&self.target)?;
        }

        std::fs::copy(&self.source, &self.target).with_context(|| {
            format!(
                "copying {} to {}",
                self.source.display(),
                self.target.display()
            )
        })?;
        copy_metadata(&src_meta, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for MirroredFile {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(link_meta) = symlink_metadata_opt(&self.target)? else {
            return Ok(ResourceState::Missing);
        };
        if link_meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: kind_name(&link_meta).to_string(),
            });
        }

        // Freshness follows links, like a plain stat of the destination.
        let Some(dst_meta) = metadata_opt(&self.target)? else {
            return Ok(ResourceState::Incorrect {
                current: "dangling symlink".to_string(),
            });
        };
        if dst_meta.is_dir() {
            return Ok(ResourceState::Incorrect {
                current: "symlink to a directory".to_string(),
            });
        }

        let src_meta = std::fs::metadata(&self.source)
            .with_context(|| format!("stat {}", self.source.display()))?;
        let src_mtime = FileTime::from_last_modification_time(&src_meta);
        let dst_mtime = FileTime::from_last_modification_time(&dst_meta);

        if dst_mtime >= src_mtime {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "older than source".to_string(),
            })
        }
    }
}
