//! Command: assemble the service in a build directory.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, StageServiceOpts};
use crate::config::{BuildEnv, ServiceLayout};
use crate::logging::Logger;
use crate::tasks;

/// Run the stage-service command.
///
/// # Errors
///
/// Returns an error if the layout cannot be resolved or any task fails.
pub fn run(
    global: &GlobalOpts,
    opts: &StageServiceOpts,
    env: &BuildEnv,
    log: &Arc<Logger>,
) -> Result<()> {
    let layout = ServiceLayout::for_build_dir(&opts.source_indicator, &opts.build_dir)?;
    log.info(&format!("source root: {}", layout.source_root.display()));
    log.info(&format!("build directory: {}", layout.target.display()));

    let ctx = super::system_context(global, log);
    let all = tasks::stage_service_tasks(&layout, &env.package_manager);
    super::run_tasks(all.iter().map(AsRef::as_ref), &ctx, log)
}
