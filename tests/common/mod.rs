// Shared helpers for integration tests.
//
// Provides a recording executor and a context builder so each integration
// test can drive tasks without spawning real processes.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use buildaux::config::BuildEnv;
use buildaux::error::CommandError;
use buildaux::exec::{ExecResult, Executor};
use buildaux::fetch::HttpFetcher;
use buildaux::logging::{Log, Logger};
use buildaux::tasks::Context;

/// Executor that records every command line and never spawns a process.
///
/// Shell commands that are exactly `exit <n>` fail with code `n`.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command line seen so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, line: String) {
        self.calls.lock().expect("calls lock").push(line);
    }
}

fn ok() -> ExecResult {
    ExecResult {
        stdout: String::new(),
        stderr: String::new(),
        success: true,
        code: Some(0),
    }
}

fn join(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Executor for RecordingExecutor {
    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.record(join(program, args));
        Ok(ok())
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.record(join(program, args));
        Ok(ok())
    }

    fn run_shell(&self, _dir: &Path, command_line: &str) -> anyhow::Result<ExecResult> {
        self.record(command_line.to_string());
        match command_line.strip_prefix("exit ").map(str::parse::<i32>) {
            Some(Ok(code)) if code != 0 => Err(CommandError::ExecutionFailed {
                program: command_line.to_string(),
                exit_code: code,
                stderr: String::new(),
            }
            .into()),
            _ => Ok(ok()),
        }
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}

/// A context over `executor` with an HTTP fetcher and a logger that keeps no
/// log file.
pub fn context(executor: &Arc<RecordingExecutor>, dry_run: bool) -> (Context, Arc<Logger>) {
    let log = Arc::new(Logger::with_log_file(None));
    let ctx = Context::new(
        Arc::clone(&log) as Arc<dyn Log>,
        dry_run,
        Arc::clone(executor) as Arc<dyn Executor>,
        Arc::new(HttpFetcher::new()),
    );
    (ctx, log)
}

/// A build environment installing under `prefix`, optionally staged.
pub fn build_env(prefix: &Path, staged: bool) -> BuildEnv {
    let prefix = prefix.to_string_lossy().into_owned();
    BuildEnv::from_lookup(|key| match key {
        "MESON_INSTALL_PREFIX" => Some(prefix.clone()),
        "DESTDIR" if staged => Some("/tmp/stage".to_string()),
        _ => None,
    })
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(&path, content).expect("write file");
    path
}

/// Relative paths of every entry below `root`, sorted.
pub fn list_tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            let rel = path
                .strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/");
            out.push(rel);
            if path.is_dir() && !path.is_symlink() {
                walk(root, &path, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
