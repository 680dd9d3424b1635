//! Selective tree mirroring.
//!
//! Copies a source tree into a destination tree, skipping every entry whose
//! name is excluded (at any depth). Files are only rewritten when the
//! destination copy is older than the source, symlinks are recreated with
//! their literal target, and directory metadata is copied after the
//! directory's children so repeated runs perform no writes.
use anyhow::{Context as _, Result};
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::error::{ConfigError, SyncError};
use crate::resources::directory::MirroredDir;
use crate::resources::file::MirroredFile;
use crate::resources::helpers::fs::kind_name;
use crate::resources::symlink::MirroredSymlink;
use crate::resources::{Applicable as _, Resource as _, ResourceState};
use crate::tasks::{Context, TaskStats, process_state};

/// Entry names skipped during a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Excludes(BTreeSet<OsString>);

impl Excludes {
    /// Build an exclusion set from names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self(names.into_iter().map(|n| n.as_ref().to_os_string()).collect())
    }

    /// Whether an entry called `name` is skipped.
    #[must_use]
    pub fn contains(&self, name: &OsStr) -> bool {
        self.0.contains(name)
    }
}

/// Mirror `source` into `dest`, skipping excluded names.
///
/// The destination root is created when absent. In dry-run mode nothing is
/// written; pending changes are logged and counted instead.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPath`] if `source` is not a directory,
/// [`SyncError::TypeConflict`] if a destination entry has the wrong kind,
/// and any I/O failure with the offending path attached.
pub fn sync_tree(ctx: &Context, source: &Path, dest: &Path, excludes: &Excludes) -> Result<TaskStats> {
    let meta = std::fs::metadata(source)
        .with_context(|| format!("reading source tree {}", source.display()))?;
    if !meta.is_dir() {
        return Err(ConfigError::InvalidPath {
            path: source.to_path_buf(),
            reason: "not a directory".to_string(),
        }
        .into());
    }

    ctx.log.debug(&format!(
        "mirroring {} -> {}",
        source.display(),
        dest.display()
    ));
    let mut stats = TaskStats::new();
    sync_dir(ctx, source, dest, excludes, &mut stats)?;
    Ok(stats)
}

fn sync_dir(
    ctx: &Context,
    source: &Path,
    dest: &Path,
    excludes: &Excludes,
    stats: &mut TaskStats,
) -> Result<()> {
    let dir = MirroredDir::new(source.to_path_buf(), dest.to_path_buf());
    let state = dir.current_state()?;
    if matches!(state, ResourceState::Invalid { .. }) {
        return Err(type_conflict(dest, "directory"));
    }
    if state == ResourceState::Missing && !ctx.dry_run {
        dir.ensure_exists()?;
    }

    let mut entries = std::fs::read_dir(source)
        .with_context(|| format!("reading directory {}", source.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("reading directory {}", source.display()))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        let src_path = entry.path();
        if excludes.contains(&name) {
            ctx.log.debug(&format!("excluded: {}", src_path.display()));
            continue;
        }
        let dst_path = dest.join(&name);
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", src_path.display()))?;

        if file_type.is_symlink() {
            let link = MirroredSymlink::from_source(&src_path, dst_path)?;
            let link_state = link.current_state()?;
            if matches!(link_state, ResourceState::Invalid { .. }) {
                return Err(type_conflict(&link.link, "symlink"));
            }
            *stats += process_state(ctx, &link, link_state, "link")?;
        } else if file_type.is_dir() {
            sync_dir(ctx, &src_path, &dst_path, excludes, stats)?;
        } else if file_type.is_file() {
            let file = MirroredFile::new(src_path, dst_path);
            let file_state = file.current_state()?;
            if matches!(file_state, ResourceState::Invalid { .. }) {
                return Err(type_conflict(&file.target, "file"));
            }
            *stats += process_state(ctx, &file, file_state, "copy")?;
        } else {
            ctx.log
                .warn(&format!("skipping special file {}", src_path.display()));
            stats.skipped += 1;
        }
    }

    finish_dir(ctx, &dir, state, stats)
}

/// Copy directory metadata once its children are in place.
fn finish_dir(
    ctx: &Context,
    dir: &MirroredDir,
    state: ResourceState,
    stats: &mut TaskStats,
) -> Result<()> {
    if ctx.dry_run {
        match state {
            ResourceState::Correct => stats.already_ok += 1,
            ResourceState::Incorrect { current } => {
                ctx.log
                    .dry_run(&format!("would update {} ({current})", dir.description()));
                stats.changed += 1;
            }
            _ => {
                ctx.log.dry_run(&format!("would create: {}", dir.description()));
                stats.changed += 1;
            }
        }
        return Ok(());
    }

    let updated = dir.sync_metadata()?;
    if updated || state == ResourceState::Missing {
        ctx.log.debug(&format!("sync: {}", dir.description()));
        stats.changed += 1;
    } else {
        stats.already_ok += 1;
    }
    Ok(())
}

fn type_conflict(path: &Path, expected: &'static str) -> anyhow::Error {
    let found = std::fs::symlink_metadata(path).map_or("nothing", |m| kind_name(&m));
    SyncError::TypeConflict {
        path: path.to_path_buf(),
        expected,
        found,
    }
    .into()
}
