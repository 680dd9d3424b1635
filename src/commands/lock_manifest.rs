//! Command: regenerate a dependency manifest from a lock file.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, LockManifestOpts};
use crate::logging::Logger;
use crate::tasks::Task;
use crate::tasks::lock_manifest::GenerateManifest;

/// Run the lock-manifest command.
///
/// # Errors
///
/// Returns an error if the lock file cannot be parsed or an archive is missing.
pub fn run(global: &GlobalOpts, opts: &LockManifestOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::system_context(global, log);
    let task = GenerateManifest {
        lockfile: opts.lockfile.clone(),
        deps_dir: opts.deps_dir.clone(),
        dest: opts.dest.clone(),
        output: opts.output.clone(),
    };
    super::run_tasks([&task as &dyn Task], &ctx, log)
}
