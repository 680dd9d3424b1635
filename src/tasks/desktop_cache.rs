//! Desktop-integration cache refresh after a final install.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::InstallLayout;

/// Runs one cache-refresh tool over a directory under the data dir.
///
/// These tools are advisory: a non-zero exit is logged as a warning and the
/// sequence continues. A tool that is not installed skips the task.
#[derive(Debug, Clone)]
pub struct RefreshCache {
    name: &'static str,
    program: &'static str,
    args: Vec<String>,
    staged: bool,
}

impl RefreshCache {
    fn new(
        name: &'static str,
        program: &'static str,
        flags: &[&str],
        target: &std::path::Path,
        install: &InstallLayout,
    ) -> Self {
        let mut args: Vec<String> = flags.iter().map(|f| (*f).to_string()).collect();
        args.push(target.display().to_string());
        Self {
            name,
            program,
            args,
            staged: install.staged,
        }
    }

    /// `glib-compile-schemas <datadir>/glib-2.0/schemas`
    #[must_use]
    pub fn compile_schemas(install: &InstallLayout) -> Self {
        Self::new(
            "Compile GSettings schemas",
            "glib-compile-schemas",
            &[],
            &install.datadir.join("glib-2.0").join("schemas"),
            install,
        )
    }

    /// `gtk-update-icon-cache -qtf <datadir>/icons/hicolor`
    #[must_use]
    pub fn icon_cache(install: &InstallLayout) -> Self {
        Self::new(
            "Update icon cache",
            "gtk-update-icon-cache",
            &["-qtf"],
            &install.datadir.join("icons").join("hicolor"),
            install,
        )
    }

    /// `update-desktop-database -q <datadir>/applications`
    #[must_use]
    pub fn desktop_database(install: &InstallLayout) -> Self {
        Self::new(
            "Update desktop database",
            "update-desktop-database",
            &["-q"],
            &install.datadir.join("applications"),
            install,
        )
    }

    fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

impl Task for RefreshCache {
    fn name(&self) -> &str {
        self.name
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        !self.staged
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which(self.program) {
            return Ok(TaskResult::Skipped(format!("{} not found", self.program)));
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would run: {}", self.command_line()));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.debug(&format!("running: {}", self.command_line()));
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let result = ctx.executor.run_unchecked(self.program, &args)?;
        if !result.success {
            let code = result
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            ctx.log.warn(&format!(
                "{} exited with {code}: {}",
                self.program,
                result.stderr.trim()
            ));
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::Executor;
    use crate::logging::TaskStatus;
    use crate::tasks::execute;
    use crate::tasks::test_helpers::{MockExecutor, context_with};
    use crate::fetch::test_helpers::MockFetcher;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn layout(staged: bool) -> InstallLayout {
        InstallLayout {
            datadir: PathBuf::from("/usr/share"),
            service_dir: PathBuf::from("/usr/lib/app/service"),
            staged,
        }
    }

    #[test]
    fn commands_target_the_data_dir() {
        let l = layout(false);
        assert_eq!(
            RefreshCache::compile_schemas(&l).command_line(),
            "glib-compile-schemas /usr/share/glib-2.0/schemas"
        );
        assert_eq!(
            RefreshCache::icon_cache(&l).command_line(),
            "gtk-update-icon-cache -qtf /usr/share/icons/hicolor"
        );
        assert_eq!(
            RefreshCache::desktop_database(&l).command_line(),
            "update-desktop-database -q /usr/share/applications"
        );
    }

    #[test]
    fn staged_install_runs_nothing() {
        let exec = Arc::new(MockExecutor::new());
        let (ctx, log) = context_with(
            Arc::clone(&exec) as Arc<dyn Executor>,
            Arc::new(MockFetcher::new()),
            false,
        );

        let status = execute(&RefreshCache::icon_cache(&layout(true)), &ctx);

        assert_eq!(status, TaskStatus::NotApplicable);
        assert!(exec.calls().is_empty());
        assert_eq!(log.task_entries()[0].status, TaskStatus::NotApplicable);
    }

    #[test]
    fn non_zero_exit_is_only_a_warning() {
        let exec = Arc::new(MockExecutor::new().failing_on("update-desktop-database"));
        let (ctx, _log) = context_with(
            Arc::clone(&exec) as Arc<dyn Executor>,
            Arc::new(MockFetcher::new()),
            false,
        );

        let status = execute(&RefreshCache::desktop_database(&layout(false)), &ctx);

        assert_eq!(status, TaskStatus::Ok);
        assert_eq!(
            exec.commands(),
            vec!["update-desktop-database -q /usr/share/applications"]
        );
    }

    #[test]
    fn dry_run_issues_no_command() {
        let exec = Arc::new(MockExecutor::new());
        let (ctx, _log) = context_with(
            Arc::clone(&exec) as Arc<dyn Executor>,
            Arc::new(MockFetcher::new()),
            true,
        );
        assert_eq!(
            execute(&RefreshCache::compile_schemas(&layout(false)), &ctx),
            TaskStatus::DryRun
        );
        assert!(exec.calls().is_empty());
    }
}
