//! Command: post-install hooks.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, PostInstallOpts};
use crate::config::{BuildEnv, InstallLayout, ServiceLayout};
use crate::logging::Logger;
use crate::tasks::{self, Task};

/// Resolve the install layout and build the post-install task list.
///
/// # Errors
///
/// Returns an error if the install prefix is not set.
pub fn plan(opts: &PostInstallOpts, env: &BuildEnv) -> Result<Vec<Box<dyn Task>>> {
    let install = InstallLayout::resolve(env, &opts.app_id)?;
    let service = opts
        .service_source
        .as_deref()
        .map(|root| ServiceLayout::for_install(root, &install));
    Ok(tasks::post_install_tasks(
        &install,
        service,
        &env.package_manager,
    ))
}

/// Run the post-install command.
///
/// # Errors
///
/// Returns an error if the environment is incomplete or any task fails.
pub fn run(
    global: &GlobalOpts,
    opts: &PostInstallOpts,
    env: &BuildEnv,
    log: &Arc<Logger>,
) -> Result<()> {
    let all = plan(opts, env)?;
    if env.staged {
        log.info("staged install: system caches are left alone");
    }
    let ctx = super::system_context(global, log);
    super::run_tasks(all.iter().map(AsRef::as_ref), &ctx, log)
}
