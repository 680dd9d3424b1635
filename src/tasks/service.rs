//! Service staging: mirror the service tree, point the package manager at
//! the offline mirror, and install production dependencies.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats, process_resource};
use crate::config::ServiceLayout;
use crate::resources::file::MirroredFile;
use crate::resources::generated::GeneratedFile;
use crate::sync::{Excludes, sync_tree};

/// Package-manager files copied next to the service.
const PACKAGE_FILES: &[&str] = &["package.json", "yarn.lock"];

/// Package-manager configuration file that receives the mirror setting.
const RC_FILE: &str = ".yarnrc";

/// Arguments for an offline, production-only install.
const INSTALL_ARGS: &[&str] = &[
    "install",
    "--offline",
    "--only=production",
    "--frozen-lockfile",
    "--noprogress",
];

/// Mirror `<root>/service` into the target directory.
#[derive(Debug, Clone)]
pub struct SyncServiceTree {
    layout: Option<ServiceLayout>,
    excludes: Excludes,
}

impl SyncServiceTree {
    /// Create the task; `None` makes it not applicable.
    #[must_use]
    pub const fn new(layout: Option<ServiceLayout>, excludes: Excludes) -> Self {
        Self { layout, excludes }
    }
}

impl Task for SyncServiceTree {
    fn name(&self) -> &'static str {
        "Sync service tree"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        self.layout.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(layout) = &self.layout else {
            return Ok(TaskResult::Skipped("no service source".to_string()));
        };
        let stats = sync_tree(ctx, &layout.service_source(), &layout.target, &self.excludes)?;
        Ok(stats.finish(ctx))
    }
}

/// Copy the package-manager files and append the offline mirror setting.
#[derive(Debug, Clone)]
pub struct ConfigureOfflineMirror {
    layout: Option<ServiceLayout>,
}

impl ConfigureOfflineMirror {
    /// Create the task; `None` makes it not applicable.
    #[must_use]
    pub const fn new(layout: Option<ServiceLayout>) -> Self {
        Self { layout }
    }
}

/// Contents of the rewritten rc file: the source file plus the mirror line.
#[must_use]
pub fn offline_rc_content(source_rc: &str, mirror: &std::path::Path) -> String {
    let mut content = source_rc.to_string();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&format!("yarn-offline-mirror \"{}\"\n", mirror.display()));
    content
}

impl Task for ConfigureOfflineMirror {
    fn name(&self) -> &'static str {
        "Configure offline mirror"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        self.layout.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(layout) = &self.layout else {
            return Ok(TaskResult::Skipped("no service source".to_string()));
        };

        let mut stats = TaskStats::new();
        for name in PACKAGE_FILES {
            let file = MirroredFile::new(layout.source_root.join(name), layout.target.join(name));
            stats += process_resource(ctx, &file, "copy")?;
        }

        let rc_source = layout.source_root.join(RC_FILE);
        let source_rc = match std::fs::read_to_string(&rc_source) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ctx.log
                    .debug(&format!("{} absent, starting empty", rc_source.display()));
                String::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", rc_source.display()));
            }
        };
        let rc = GeneratedFile::new(
            layout.target.join(RC_FILE),
            offline_rc_content(&source_rc, &layout.mirror),
        );
        stats += process_resource(ctx, &rc, "write")?;

        Ok(stats.finish(ctx))
    }
}

/// Run the package manager's offline production install in the target.
#[derive(Debug, Clone)]
pub struct InstallProductionDependencies {
    layout: Option<ServiceLayout>,
    package_manager: String,
}

impl InstallProductionDependencies {
    /// Create the task; `None` makes it not applicable.
    #[must_use]
    pub fn new(layout: Option<ServiceLayout>, package_manager: &str) -> Self {
        Self {
            layout,
            package_manager: package_manager.to_string(),
        }
    }
}

impl Task for InstallProductionDependencies {
    fn name(&self) -> &'static str {
        "Install production dependencies"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        self.layout.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(layout) = &self.layout else {
            return Ok(TaskResult::Skipped("no service source".to_string()));
        };
        let command_line = format!("{} {}", self.package_manager, INSTALL_ARGS.join(" "));

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would run in {}: {command_line}",
                layout.target.display()
            ));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info(&layout.target.display().to_string());
        ctx.log.debug(&format!("running: {command_line}"));
        let result = ctx
            .executor
            .run_in(&layout.target, &self.package_manager, INSTALL_ARGS)?;
        super::log_output(ctx, &result);
        Ok(TaskResult::Ok)
    }
}
