//! Dependency artifact written from a `data:` payload or a network download.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, metadata_opt, partial_path};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::FetchError;
use crate::fetch::{Fetcher, Payload, file_sha256, sha256_hex};

/// A file materialized from a manifest `file` entry.
#[derive(Debug)]
pub struct ArtifactFile<'a> {
    /// Destination path.
    pub path: PathBuf,
    /// Where the bytes come from.
    pub payload: Payload,
    /// Expected lowercase hex SHA-256, when declared.
    pub sha256: Option<String>,
    fetcher: &'a dyn Fetcher,
}

impl<'a> ArtifactFile<'a> {
    /// Create a new artifact resource.
    #[must_use]
    pub fn new(
        path: PathBuf,
        payload: Payload,
        sha256: Option<String>,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Self {
            path,
            payload,
            sha256: sha256.map(|s| s.to_ascii_lowercase()),
            fetcher,
        }
    }

    /// Write the payload into `tmp`, returning once the data is flushed.
    fn write_payload(&self, tmp: &Path) -> Result<()> {
        let mut file = std::fs::File::create(tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        match &self.payload {
            Payload::Inline(bytes) => file
                .write_all(bytes)
                .with_context(|| format!("writing {}", tmp.display()))?,
            Payload::Remote(url) => {
                self.fetcher.fetch(url, &mut file)?;
            }
        }
        file.flush()
            .with_context(|| format!("flushing {}", tmp.display()))?;
        Ok(())
    }

    fn verify(&self, tmp: &Path) -> Result<()> {
        let Some(expected) = &self.sha256 else {
            return Ok(());
        };
        let actual = file_sha256(tmp)?;
        if &actual != expected {
            return Err(FetchError::ChecksumMismatch {
                path: self.path.clone(),
                expected: expected.clone(),
                actual,
            }
            .into());
        }
        Ok(())
    }
}

impl Applicable for ArtifactFile<'_> {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.path)?;
        let tmp = partial_path(&self.path);

        if let Err(e) = self.write_payload(&tmp).and_then(|()| self.verify(&tmp)) {
            std::fs::remove_file(&tmp).ok(); // best effort
            return Err(e);
        }

        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("moving {} into place", self.path.display())
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ArtifactFile<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(meta) = metadata_opt(&self.path)? else {
            return Ok(ResourceState::Missing);
        };
        if meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.path.display()),
            });
        }

        let matches = match (&self.payload, &self.sha256) {
            (Payload::Inline(bytes), None) => {
                let current = std::fs::read(&self.path)
                    .with_context(|| format!("reading {}", self.path.display()))?;
                &current == bytes
            }
            (Payload::Inline(bytes), Some(expected)) => {
                &sha256_hex(bytes) == expected && &file_sha256(&self.path)? == expected
            }
            (Payload::Remote(_), Some(expected)) => &file_sha256(&self.path)? == expected,
            // Nothing to compare against; always fetch again.
            (Payload::Remote(_), None) => false,
        };

        if matches {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs or is unverified".to_string(),
            })
        }
    }
}
