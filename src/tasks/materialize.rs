//! Dependency materialization from a JSON manifest.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Context, Task, TaskResult, TaskStats, process_resource};
use crate::config::DEPS_DIR;
use crate::config::manifest::{self, ManifestEntry};
use crate::fetch::Payload;
use crate::resources::artifact::ArtifactFile;
use crate::resources::script::ScriptFile;

/// Realise every manifest entry, in order, relative to a base directory.
#[derive(Debug, Clone)]
pub struct MaterializeManifest {
    manifest: PathBuf,
    base: PathBuf,
}

impl MaterializeManifest {
    /// Materialize `manifest` with relative destinations resolved against `base`.
    #[must_use]
    pub const fn new(manifest: PathBuf, base: PathBuf) -> Self {
        Self { manifest, base }
    }
}

impl Task for MaterializeManifest {
    fn name(&self) -> &'static str {
        "Fetch dependencies"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let entries = manifest::load(&self.manifest)?;
        ctx.log.info(&format!(
            "{} entries in {}",
            entries.len(),
            self.manifest.display()
        ));

        let deps = self.base.join(DEPS_DIR);
        if ctx.dry_run {
            if !deps.is_dir() {
                ctx.log.dry_run(&format!("would create {}", deps.display()));
            }
        } else {
            std::fs::create_dir_all(&deps)
                .with_context(|| format!("creating {}", deps.display()))?;
        }

        let mut stats = TaskStats::new();
        for (index, entry) in entries.iter().enumerate() {
            stats += realise(ctx, entry, &self.base)
                .with_context(|| format!("manifest entry {index} ({})", entry.kind()))?;
        }
        Ok(stats.finish(ctx))
    }
}

/// Realise one entry.
///
/// # Errors
///
/// Returns an error if a download, checksum, write or shell command fails.
pub fn realise(ctx: &Context, entry: &ManifestEntry, base: &Path) -> Result<TaskStats> {
    match entry {
        ManifestEntry::File { url, sha256, .. } => {
            let path = resolve(base, entry)?;
            let payload = Payload::from_url(url)?;
            let artifact =
                ArtifactFile::new(path, payload, sha256.clone(), ctx.fetcher.as_ref());
            process_resource(ctx, &artifact, "fetch")
        }
        ManifestEntry::Script { commands, .. } => {
            let script = ScriptFile::new(resolve(base, entry)?, commands.clone());
            process_resource(ctx, &script, "write")
        }
        ManifestEntry::Shell { commands } => {
            let mut stats = TaskStats::new();
            for command in commands {
                if ctx.dry_run {
                    ctx.log.dry_run(&format!("would run: {command}"));
                } else {
                    ctx.log.debug(&format!("running: {command}"));
                    let result = ctx.executor.run_shell(base, command)?;
                    super::log_output(ctx, &result);
                }
                stats.changed += 1;
            }
            Ok(stats)
        }
    }
}

fn resolve(base: &Path, entry: &ManifestEntry) -> Result<PathBuf> {
    let relative = entry
        .dest_path()
        .with_context(|| format!("{} entry has no destination", entry.kind()))?;
    Ok(base.join(relative))
}
