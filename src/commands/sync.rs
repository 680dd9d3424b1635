//! Command: mirror one directory tree into another.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, SyncOpts};
use crate::logging::Logger;
use crate::sync::Excludes;
use crate::tasks::Task;
use crate::tasks::sync_tree::MirrorTree;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if the tree cannot be mirrored.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &Arc<Logger>) -> Result<()> {
    let ctx = super::system_context(global, log);
    log.debug(&format!("excluding: {}", opts.exclude.join(", ")));
    let task = MirrorTree::new(
        opts.source.clone(),
        opts.dest.clone(),
        Excludes::new(&opts.exclude),
    );
    super::run_tasks([&task as &dyn Task], &ctx, log)
}
