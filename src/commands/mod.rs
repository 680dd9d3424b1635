//! Top-level subcommand orchestration.
pub mod fetch_deps;
pub mod lock_manifest;
pub mod post_install;
pub mod stage_service;
pub mod sync;
pub mod version;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::exec::SystemExecutor;
use crate::fetch::HttpFetcher;
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Task};

/// Build a [`Context`] that spawns real processes and talks to the network.
#[must_use]
pub fn system_context(global: &GlobalOpts, log: &Arc<Logger>) -> Context {
    Context::new(
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        Arc::new(SystemExecutor),
        Arc::new(HttpFetcher::new()),
    )
}

/// Execute tasks in order until one fails, print the summary, and bail if
/// anything failed.
///
/// # Errors
///
/// Returns an error naming the failed task count when any task failed.
pub fn run_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    tasks::execute_in_order(tasks, ctx);

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
