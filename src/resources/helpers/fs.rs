//! File-system resource helpers.
use anyhow::{Context as _, Result};
use filetime::FileTime;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
///
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// `lstat` that maps "not found" to `None` and propagates everything else.
///
/// # Errors
///
/// Returns an error for any failure other than [`io::ErrorKind::NotFound`].
pub fn symlink_metadata_opt(path: &Path) -> Result<Option<Metadata>> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("stat {}", path.display())),
    }
}

/// `stat` (following links) that maps "not found" to `None`.
///
/// # Errors
///
/// Returns an error for any failure other than [`io::ErrorKind::NotFound`].
pub fn metadata_opt(path: &Path) -> Result<Option<Metadata>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("stat {}", path.display())),
    }
}

/// Short name of the file type in `meta`, for messages.
#[must_use]
pub fn kind_name(meta: &Metadata) -> &'static str {
    let ft = meta.file_type();
    if ft.is_symlink() {
        "symlink"
    } else if ft.is_dir() {
        "directory"
    } else if ft.is_file() {
        "file"
    } else {
        "special file"
    }
}

/// Copy permission bits and access/modification times from `src` to `dst`.
///
/// # Errors
///
/// Returns an error if either attribute cannot be set.
pub fn copy_metadata(src: &Metadata, dst: &Path) -> Result<()> {
    std::fs::set_permissions(dst, src.permissions())
        .with_context(|| format!("set permissions: {}", dst.display()))?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(src),
        FileTime::from_last_modification_time(src),
    )
    .with_context(|| format!("set times: {}", dst.display()))?;
    Ok(())
}

/// Whether `dst` already carries `src`'s permission bits and mtime.
#[must_use]
pub fn metadata_matches(src: &Metadata, dst: &Metadata) -> bool {
    src.permissions() == dst.permissions()
        && FileTime::from_last_modification_time(src) == FileTime::from_last_modification_time(dst)
}

/// Sibling path used while a file is being written.
#[must_use]
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| "download".into(), std::ffi::OsStr::to_os_string);
    name.push(".part");
    path.with_file_name(name)
}

/// Mark `path` as executable (`0755`) on Unix; no-op elsewhere.
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("setting permissions: {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
