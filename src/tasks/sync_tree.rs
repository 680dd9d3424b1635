//! Standalone tree mirroring task.
use anyhow::Result;
use std::path::PathBuf;

use super::{Context, Task, TaskResult};
use crate::sync::{Excludes, sync_tree};

/// Mirror an arbitrary source directory into a destination.
#[derive(Debug, Clone)]
pub struct MirrorTree {
    source: PathBuf,
    dest: PathBuf,
    excludes: Excludes,
}

impl MirrorTree {
    /// Mirror `source` into `dest`, skipping `excludes`.
    #[must_use]
    pub const fn new(source: PathBuf, dest: PathBuf, excludes: Excludes) -> Self {
        Self {
            source,
            dest,
            excludes,
        }
    }
}

impl Task for MirrorTree {
    fn name(&self) -> &'static str {
        "Mirror tree"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let stats = sync_tree(ctx, &self.source, &self.dest, &self.excludes)?;
        Ok(stats.finish(ctx))
    }
}
