//! Command-line entry point for buildaux.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use buildaux::cli::{Cli, Command};
use buildaux::commands;
use buildaux::config::BuildEnv;
use buildaux::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let log_file = logging::init_subscriber(
        args.verbose,
        args.command.log_name(),
        args.command.reserves_stdout(),
    );
    let log = Arc::new(Logger::with_log_file(log_file));
    let env = BuildEnv::from_env();
    log.debug(&format!("buildaux {}", commands::version::version()));

    match &args.command {
        Command::Sync(opts) => commands::sync::run(&args.global, opts, &log),
        Command::StageService(opts) => {
            commands::stage_service::run(&args.global, opts, &env, &log)
        }
        Command::FetchDeps(opts) => commands::fetch_deps::run(&args.global, opts, &log),
        Command::PostInstall(opts) => {
            commands::post_install::run(&args.global, opts, &env, &log)
        }
        Command::LockManifest(opts) => commands::lock_manifest::run(&args.global, opts, &log),
        Command::Version => Ok(()),
    }
}
