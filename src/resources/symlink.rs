//! Symbolic link recreated verbatim from a source tree.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::symlink_metadata_opt;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A destination link whose target string equals the source link's.
///
/// The target is never resolved: relative targets stay relative and broken
/// links are recreated as-is.
#[derive(Debug, Clone)]
pub struct MirroredSymlink {
    /// Where the link is created.
    pub link: PathBuf,
    /// Link target, exactly as read from the source link.
    pub target: PathBuf,
}

impl MirroredSymlink {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(link: PathBuf, target: PathBuf) -> Self {
        Self { link, target }
    }

    /// Build the resource from an existing source link.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not a readable symlink.
    pub fn from_source(source: &Path, link: PathBuf) -> Result<Self> {
        let target = std::fs::read_link(source)
            .with_context(|| format!("reading link {}", source.display()))?;
        Ok(Self::new(link, target))
    }
}

impl Applicable for MirroredSymlink {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if symlink_metadata_opt(&self.link)?.is_some() {
            remove_symlink(&self.link)?;
        }
        create_symlink(&self.target, &self.link)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for MirroredSymlink {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(meta) = symlink_metadata_opt(&self.link)? else {
            return Ok(ResourceState::Missing);
        };

        if meta.file_type().is_symlink() {
            let current = std::fs::read_link(&self.link)
                .with_context(|| format!("reading link {}", self.link.display()))?;
            if current == self.target {
                return Ok(ResourceState::Correct);
            }
            return Ok(ResourceState::Incorrect {
                current: current.display().to_string(),
            });
        }

        if meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: "directory".to_string(),
            });
        }

        Ok(ResourceState::Incorrect {
            current: "regular file".to_string(),
        })
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        // Windows needs to know the link flavour; resolve relative targets
        // against the link's directory only to pick it.
        let resolved = link
            .parent()
            .map_or_else(|| target.to_path_buf(), |p| p.join(target));
        let result = if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

/// Remove an existing link (or file) at `path`.
///
/// On Windows, directory symlinks must be removed with `remove_dir`.
fn remove_symlink(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
            .with_context(|| format!("removing directory link: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("removing file: {}", path.display()))?;
    }
    Ok(())
}

/// `symlink_metadata().is_dir()` is `false` for directory symlinks on
/// Windows, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked there.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
