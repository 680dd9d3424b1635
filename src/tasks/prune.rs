//! Removal of the temporary dependency mirror.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Context, Task, TaskResult};

/// Deletes the offline mirror directory once dependencies are installed.
#[derive(Debug, Clone)]
pub struct PruneDependencyMirror {
    mirror: PathBuf,
}

impl PruneDependencyMirror {
    /// Prune `mirror`.
    #[must_use]
    pub const fn new(mirror: PathBuf) -> Self {
        Self { mirror }
    }
}

impl Task for PruneDependencyMirror {
    fn name(&self) -> &'static str {
        "Prune dependency mirror"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if std::fs::symlink_metadata(&self.mirror).is_err() {
            return Ok(TaskResult::Skipped(format!(
                "{} does not exist",
                self.mirror.display()
            )));
        }
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would remove {}", self.mirror.display()));
            return Ok(TaskResult::DryRun);
        }
        std::fs::remove_dir_all(&self.mirror)
            .with_context(|| format!("removing {}", self.mirror.display()))?;
        ctx.log.info(&format!("removed {}", self.mirror.display()));
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{make_context, make_dry_run_context};

    #[test]
    fn removes_mirror_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = tmp.path().join("deps");
        std::fs::create_dir_all(mirror.join("nested")).unwrap();
        std::fs::write(mirror.join("nested/a.tgz"), "x").unwrap();
        let (ctx, _log) = make_context();

        let result = PruneDependencyMirror::new(mirror.clone()).run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::Ok));
        assert!(!mirror.exists());
    }

    #[test]
    fn absent_mirror_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context();
        let result = PruneDependencyMirror::new(tmp.path().join("deps"))
            .run(&ctx)
            .unwrap();
        assert!(matches!(result, TaskResult::Skipped(_)));
    }

    #[test]
    fn dry_run_keeps_mirror() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = tmp.path().join("deps");
        std::fs::create_dir(&mirror).unwrap();
        let (ctx, _log) = make_dry_run_context();
        let result = PruneDependencyMirror::new(mirror.clone()).run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::DryRun));
        assert!(mirror.exists());
    }
}
