//! Core logging types: task entries, status, and the [`Log`] trait.

/// Task execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name as shown in the summary.
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Skip reason or error description.
    pub message: Option<String>,
}

/// Status of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed successfully.
    Ok,
    /// Task does not apply to this invocation (staged install, no service source).
    NotApplicable,
    /// Task ran but had nothing to do (tool not installed, mirror already gone).
    Skipped,
    /// Task ran in dry-run mode; no changes were applied.
    DryRun,
    /// Task failed and stopped the sequence.
    Failed,
}

impl TaskStatus {
    /// Summary marker and the ANSI colour it is printed in.
    #[must_use]
    pub const fn marker(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::NotApplicable => ("·", "\x1b[2m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

/// Per-status task counts for the summary footer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusTally {
    /// [`TaskStatus::Ok`]
    pub ok: usize,
    /// [`TaskStatus::NotApplicable`]
    pub not_applicable: usize,
    /// [`TaskStatus::Skipped`]
    pub skipped: usize,
    /// [`TaskStatus::DryRun`]
    pub dry_run: usize,
    /// [`TaskStatus::Failed`]
    pub failed: usize,
}

impl StatusTally {
    /// Count the statuses of `entries`.
    #[must_use]
    pub fn of(entries: &[TaskEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut tally, entry| {
            match entry.status {
                TaskStatus::Ok => tally.ok += 1,
                TaskStatus::NotApplicable => tally.not_applicable += 1,
                TaskStatus::Skipped => tally.skipped += 1,
                TaskStatus::DryRun => tally.dry_run += 1,
                TaskStatus::Failed => tally.failed += 1,
            }
            tally
        })
    }

    /// Number of tasks counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.ok + self.not_applicable + self.skipped + self.dry_run + self.failed
    }
}

/// Logging sink used by tasks.
///
/// Tasks log through `Arc<dyn Log>`; tests hand them a
/// [`Logger`](super::logger::Logger) that writes to a temporary file.
pub trait Log: Send + Sync {
    /// Section header.
    fn stage(&self, msg: &str);
    /// Progress line.
    fn info(&self, msg: &str);
    /// Detail that only reaches the console with `--verbose`.
    fn debug(&self, msg: &str);
    /// Non-fatal problem.
    fn warn(&self, msg: &str);
    /// Failure.
    fn error(&self, msg: &str);
    /// A change that would have been made without `--dry-run`.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: TaskStatus) -> TaskEntry {
        TaskEntry {
            name: "t".to_string(),
            status,
            message: None,
        }
    }

    #[test]
    fn tally_counts_each_status() {
        let entries = [
            entry(TaskStatus::Ok),
            entry(TaskStatus::Ok),
            entry(TaskStatus::NotApplicable),
            entry(TaskStatus::Failed),
        ];
        let tally = StatusTally::of(&entries);
        assert_eq!(tally.ok, 2);
        assert_eq!(tally.not_applicable, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn markers_are_distinct() {
        let statuses = [
            TaskStatus::Ok,
            TaskStatus::NotApplicable,
            TaskStatus::Skipped,
            TaskStatus::DryRun,
            TaskStatus::Failed,
        ];
        let mut icons: Vec<&str> = statuses.iter().map(|s| s.marker().0).collect();
        icons.dedup();
        assert_eq!(icons.len(), statuses.len());
    }
}
