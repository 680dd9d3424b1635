//! Shared execution context for tasks.
use std::sync::Arc;

use crate::exec::Executor;
use crate::fetch::Fetcher;
use crate::logging::Log;

/// Capabilities and flags every task runs with.
pub struct Context {
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Network fetcher for remote artifacts.
    pub fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("executor", &self.executor)
            .field("fetcher", &self.fetcher)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            log,
            dry_run,
            executor,
            fetcher,
        }
    }
}
