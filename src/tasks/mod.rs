//! Named, sequential tasks that orchestrate resource changes.
pub mod context;
pub mod desktop_cache;
pub mod lock_manifest;
pub mod materialize;
mod processing;
pub mod prune;
pub mod service;
pub mod sync_tree;

pub use context::Context;
pub use processing::{TaskResult, TaskStats, process_resource, process_state};

use anyhow::Result;

use crate::config::{InstallLayout, ServiceLayout};
use crate::exec::ExecResult;
use crate::logging::TaskStatus;
use crate::sync::Excludes;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current invocation.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when a command
    /// exits non-zero, a download fails, or a file cannot be written.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Tasks run after files have been installed, in execution order.
///
/// Without a `service` layout the service tasks report not applicable.
#[must_use]
pub fn post_install_tasks(
    install: &InstallLayout,
    service: Option<ServiceLayout>,
    package_manager: &str,
) -> Vec<Box<dyn Task>> {
    vec![
        Box::new(desktop_cache::RefreshCache::compile_schemas(install)),
        Box::new(desktop_cache::RefreshCache::icon_cache(install)),
        Box::new(desktop_cache::RefreshCache::desktop_database(install)),
        Box::new(service::SyncServiceTree::new(
            service.clone(),
            Excludes::new(crate::config::DEFAULT_EXCLUDES),
        )),
        Box::new(service::ConfigureOfflineMirror::new(service.clone())),
        Box::new(service::InstallProductionDependencies::new(
            service,
            package_manager,
        )),
        Box::new(prune::PruneDependencyMirror::new(install.deps_dir())),
    ]
}

/// Tasks that prepare the service in a build directory, in execution order.
#[must_use]
pub fn stage_service_tasks(layout: &ServiceLayout, package_manager: &str) -> Vec<Box<dyn Task>> {
    vec![
        Box::new(service::SyncServiceTree::new(
            Some(layout.clone()),
            Excludes::new(crate::config::DEFAULT_EXCLUDES),
        )),
        Box::new(service::ConfigureOfflineMirror::new(Some(layout.clone()))),
        Box::new(service::InstallProductionDependencies::new(
            Some(layout.clone()),
            package_manager,
        )),
    ]
}

/// Forward a command's captured stdout to the debug log, one line at a time.
pub(crate) fn log_output(ctx: &Context, result: &ExecResult) {
    for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
        ctx.log.debug(line);
    }
}

/// Execute a task, recording the result in the logger.
///
/// Returns the recorded status.
pub fn execute(task: &dyn Task, ctx: &Context) -> TaskStatus {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return TaskStatus::NotApplicable;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            TaskStatus::Ok
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            TaskStatus::Skipped
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            TaskStatus::DryRun
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            TaskStatus::Failed
        }
    }
}

/// Execute tasks in order, stopping at the first failure.
///
/// Returns the number of tasks that were started or evaluated.
pub fn execute_in_order<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
) -> usize {
    let mut evaluated = 0;
    for task in tasks {
        evaluated += 1;
        if execute(task, ctx) == TaskStatus::Failed {
            ctx.log.debug("aborting remaining tasks");
            break;
        }
    }
    evaluated
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_helpers::make_context;

    /// A mock task for testing `execute()`.
    struct MockTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
        runs: AtomicUsize,
    }

    impl MockTask {
        fn new(name: &'static str, result: Result<TaskResult, String>) -> Self {
            Self {
                name,
                should_run: true,
                result,
                runs: AtomicUsize::new(0),
            }
        }
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    #[test]
    fn execute_skips_non_applicable_task() {
        let (ctx, log) = make_context();
        let mut task = MockTask::new("n/a", Ok(TaskResult::Ok));
        task.should_run = false;

        assert_eq!(execute(&task, &ctx), TaskStatus::NotApplicable);
        assert_eq!(task.runs.load(Ordering::SeqCst), 0);
        assert_eq!(log.task_entries()[0].status, TaskStatus::NotApplicable);
    }

    #[test]
    fn execute_records_failed_task() {
        let (ctx, log) = make_context();
        let task = MockTask::new("fail-task", Err("kaboom".to_string()));

        assert_eq!(execute(&task, &ctx), TaskStatus::Failed);
        assert_eq!(log.failure_count(), 1);
        assert_eq!(log.task_entries()[0].message.as_deref(), Some("kaboom"));
    }

    #[test]
    fn execute_records_skipped_and_dry_run() {
        let (ctx, log) = make_context();
        execute(
            &MockTask::new("skip", Ok(TaskResult::Skipped("nothing".to_string()))),
            &ctx,
        );
        execute(&MockTask::new("dry", Ok(TaskResult::DryRun)), &ctx);
        let statuses: Vec<_> = log.task_entries().iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![TaskStatus::Skipped, TaskStatus::DryRun]);
    }

    #[test]
    fn execute_in_order_stops_at_first_failure() {
        let (ctx, log) = make_context();
        let first = MockTask::new("first", Ok(TaskResult::Ok));
        let second = MockTask::new("second", Err("boom".to_string()));
        let third = MockTask::new("third", Ok(TaskResult::Ok));
        let tasks: Vec<&dyn Task> = vec![&first, &second, &third];

        assert_eq!(execute_in_order(tasks, &ctx), 2);
        assert_eq!(third.runs.load(Ordering::SeqCst), 0);
        assert_eq!(log.task_entries().len(), 2);
    }

    #[test]
    fn post_install_task_order() {
        let install = InstallLayout {
            datadir: PathBuf::from("/usr/share"),
            service_dir: PathBuf::from("/usr/lib/app/service"),
            staged: false,
        };
        let names: Vec<String> = post_install_tasks(&install, None, "yarn")
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Compile GSettings schemas",
                "Update icon cache",
                "Update desktop database",
                "Sync service tree",
                "Configure offline mirror",
                "Install production dependencies",
                "Prune dependency mirror",
            ]
        );
    }
}
