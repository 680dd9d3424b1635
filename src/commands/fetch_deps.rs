//! Command: materialize a dependency manifest.
use anyhow::{Context as _, Result};
use std::sync::Arc;

use crate::cli::{FetchDepsOpts, GlobalOpts};
use crate::logging::Logger;
use crate::tasks::Task;
use crate::tasks::materialize::MaterializeManifest;

/// Run the fetch-deps command.
///
/// # Errors
///
/// Returns an error if the working directory is unavailable, the manifest is
/// invalid, or any entry fails.
pub fn run(global: &GlobalOpts, opts: &FetchDepsOpts, log: &Arc<Logger>) -> Result<()> {
    let base = match &opts.base {
        Some(base) => base.clone(),
        None => std::env::current_dir().context("determining current directory")?,
    };
    log.debug(&format!("manifest: {}", opts.manifest.display()));
    log.debug(&format!("base: {}", base.display()));

    let ctx = super::system_context(global, log);
    let task = MaterializeManifest::new(opts.manifest.clone(), base);
    super::run_tasks([&task as &dyn Task], &ctx, log)
}
