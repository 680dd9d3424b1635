//! Domain-specific error types for the build hooks.
//!
//! Internal modules return typed errors where a caller (or a test) needs to
//! tell failures apart, and [`anyhow::Error`] with path context everywhere
//! else. Command handlers at the CLI boundary receive both through `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! BuildError
//! ├── Config(ConfigError)     : missing environment, bad paths
//! ├── Manifest(ManifestError) : unreadable or malformed dependency manifest
//! ├── Fetch(FetchError)       : network retrieval, data URLs, checksums
//! ├── Sync(SyncError)         : destination tree conflicts
//! └── Command(CommandError)   : external processes exiting non-zero
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the build hooks.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Configuration error (environment lookup, path resolution).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dependency manifest error.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Retrieval or payload decoding error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Tree synchronization error.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// External command error.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors that arise while building the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),

    /// A path argument cannot be used as given.
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors that arise while loading a dependency manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest {path}: {source}")]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid JSON.
    #[error("cannot parse manifest {path}: {source}")]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The top-level JSON value is not an array.
    #[error("manifest must be a JSON array of entries")]
    NotAnArray,

    /// An entry has no `type` field.
    #[error("entry {index}: missing 'type' field")]
    MissingKind {
        /// Zero-based entry position.
        index: usize,
    },

    /// An entry's `type` is not one of `file`, `script`, `shell`.
    #[error("entry {index}: invalid module type '{kind}'")]
    UnknownKind {
        /// Zero-based entry position.
        index: usize,
        /// The unrecognized type string.
        kind: String,
    },

    /// An entry of a known kind has missing or mistyped fields.
    #[error("entry {index} ({kind}): {message}")]
    InvalidEntry {
        /// Zero-based entry position.
        index: usize,
        /// Entry kind.
        kind: String,
        /// Deserializer message.
        message: String,
    },
}

/// Errors that arise while retrieving or decoding artifact payloads.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The network request failed or returned a non-success status.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport or status message.
        message: String,
    },

    /// An inline `data:` URL could not be decoded.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Downloaded bytes do not match the declared digest.
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Destination path of the artifact.
        path: PathBuf,
        /// Digest declared in the manifest.
        expected: String,
        /// Digest of the retrieved bytes.
        actual: String,
    },
}

/// Errors that arise while mirroring a tree.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A destination entry exists with a different file type than the source.
    #[error("{path}: expected {expected} at destination, found {found}")]
    TypeConflict {
        /// Destination path.
        path: PathBuf,
        /// Kind required by the source entry.
        expected: &'static str,
        /// Kind found at the destination.
        found: &'static str,
    },
}

/// Errors from external processes.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A process exited with a non-zero status.
    #[error("command '{program}' failed (exit {exit_code}): {stderr}")]
    ExecutionFailed {
        /// Program or command line that was run.
        program: String,
        /// Exit code, or `-1` when terminated by a signal.
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_missing_variable_display() {
        let e = ConfigError::MissingVariable("MESON_INSTALL_PREFIX");
        assert_eq!(
            e.to_string(),
            "environment variable MESON_INSTALL_PREFIX is not set"
        );
    }

    #[test]
    fn manifest_error_unknown_kind_display() {
        let e = ManifestError::UnknownKind {
            index: 3,
            kind: "archive".to_string(),
        };
        assert_eq!(e.to_string(), "entry 3: invalid module type 'archive'");
    }

    #[test]
    fn manifest_error_read_has_source() {
        use std::error::Error as StdError;
        let e = ManifestError::Read {
            path: PathBuf::from("build-data/npm.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("build-data/npm.json"));
    }

    #[test]
    fn fetch_error_checksum_display() {
        let e = FetchError::ChecksumMismatch {
            path: PathBuf::from("deps/a.tgz"),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "checksum mismatch for deps/a.tgz: expected aa, got bb"
        );
    }

    #[test]
    fn sync_error_type_conflict_display() {
        let e = SyncError::TypeConflict {
            path: PathBuf::from("/out/lib"),
            expected: "directory",
            found: "file",
        };
        assert_eq!(
            e.to_string(),
            "/out/lib: expected directory at destination, found file"
        );
    }

    #[test]
    fn command_error_display() {
        let e = CommandError::ExecutionFailed {
            program: "yarn".to_string(),
            exit_code: 1,
            stderr: "lockfile out of date".to_string(),
        };
        assert!(e.to_string().contains("yarn"));
        assert!(e.to_string().contains("exit 1"));
        assert!(e.to_string().contains("lockfile out of date"));
    }

    #[test]
    fn build_error_wraps_sub_errors() {
        let e: BuildError = ConfigError::MissingVariable("YARN").into();
        assert!(e.to_string().starts_with("Configuration error"));
        let e: BuildError = ManifestError::NotAnArray.into();
        assert!(e.to_string().starts_with("Manifest error"));
        let e: BuildError = FetchError::InvalidDataUrl("bad".to_string()).into();
        assert!(e.to_string().starts_with("Fetch error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<BuildError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ManifestError>();
        assert_send_sync::<FetchError>();
        assert_send_sync::<SyncError>();
        assert_send_sync::<CommandError>();
    }

    #[test]
    fn typed_errors_downcast_from_anyhow() {
        let err: anyhow::Error = ManifestError::MissingKind { index: 0 }.into();
        assert!(matches!(
            err.downcast_ref::<ManifestError>(),
            Some(ManifestError::MissingKind { index: 0 })
        ));
    }
}
