//! Command-line interface definition.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_APP_ID, DEPS_DIR};

/// Top-level CLI entry point for the build helpers.
#[derive(Parser, Debug)]
#[command(
    name = "buildaux",
    about = "Build and packaging helpers: tree mirroring, dependency fetching, post-install hooks",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mirror a directory tree, skipping excluded names
    Sync(SyncOpts),
    /// Copy the service into a build directory and install its dependencies offline
    StageService(StageServiceOpts),
    /// Download or generate the artifacts declared in a dependency manifest
    FetchDeps(FetchDepsOpts),
    /// Run the post-install hooks
    PostInstall(PostInstallOpts),
    /// Regenerate a dependency manifest from a yarn lock file
    LockManifest(LockManifestOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::StageService(_) => "stage-service",
            Self::FetchDeps(_) => "fetch-deps",
            Self::PostInstall(_) => "post-install",
            Self::LockManifest(_) => "lock-manifest",
            Self::Version => "version",
        }
    }

    /// Whether stdout carries the command's own output instead of log lines.
    #[must_use]
    pub const fn reserves_stdout(&self) -> bool {
        matches!(self, Self::LockManifest(opts) if opts.output.is_none())
    }
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory (created if absent)
    pub dest: PathBuf,

    /// Entry names to skip at any depth
    #[arg(long, value_delimiter = ',', default_value = "node_modules")]
    pub exclude: Vec<String>,
}

/// Options for the `stage-service` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct StageServiceOpts {
    /// A file at the top of the source tree; its directory is the source root
    pub source_indicator: PathBuf,

    /// Build directory receiving the service
    pub build_dir: PathBuf,
}

/// Options for the `fetch-deps` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct FetchDepsOpts {
    /// Manifest to materialize
    #[arg(long, default_value = "build-data/npm.json")]
    pub manifest: PathBuf,

    /// Directory relative destinations are resolved against (default: current directory)
    #[arg(long)]
    pub base: Option<PathBuf>,
}

/// Options for the `post-install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PostInstallOpts {
    /// Application identifier used in the service install path
    #[arg(long, default_value = DEFAULT_APP_ID)]
    pub app_id: String,

    /// Source root whose `service/` tree is installed (enables the service tasks)
    #[arg(long)]
    pub service_source: Option<PathBuf>,
}

/// Options for the `lock-manifest` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct LockManifestOpts {
    /// Lock file to read
    #[arg(long, default_value = "yarn.lock")]
    pub lockfile: PathBuf,

    /// Directory holding the downloaded archives
    #[arg(long, default_value = "deps")]
    pub deps_dir: PathBuf,

    /// `dest` value written into every entry (the offline mirror, relative to the source root)
    #[arg(long, default_value = DEPS_DIR)]
    pub dest: PathBuf,

    /// Output file (default: stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}
