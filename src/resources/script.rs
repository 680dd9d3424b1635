//! Executable script generated from a manifest `script` entry.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{ensure_parent_dir, make_executable, metadata_opt};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A script whose body is one line per command.
#[derive(Debug, Clone)]
pub struct ScriptFile {
    /// Destination path.
    pub path: PathBuf,
    /// Script lines, in order.
    pub commands: Vec<String>,
}

impl ScriptFile {
    /// Create a new script resource.
    #[must_use]
    pub const fn new(path: PathBuf, commands: Vec<String>) -> Self {
        Self { path, commands }
    }

    /// Full file content: every command followed by a newline.
    #[must_use]
    pub fn content(&self) -> String {
        self.commands.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
    }
}

impl Applicable for ScriptFile {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, self.content())
            .with_context(|| format!("writing script {}", self.path.display()))?;
        make_executable(&self.path)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ScriptFile {
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
            .with_context(|| format!("reading script {}", self.path.display()))?;
        if current != self.content().as_bytes() {
            return Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            });
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = meta.permissions().mode() & 0o777;
            if mode != 0o755 {
                return Ok(ResourceState::Incorrect {
                    current: format!("mode {mode:o}"),
                });
            }
        }

        Ok(ResourceState::Correct)
    }
}
