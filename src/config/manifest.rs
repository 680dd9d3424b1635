//! Dependency manifest: a JSON array of `file`, `script` and `shell` entries.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

/// Entry kinds accepted in a manifest, in their on-disk spelling.
pub const KNOWN_KINDS: &[&str] = &["file", "script", "shell"];

/// One artifact to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestEntry {
    /// A file retrieved from a URL or decoded from an inline `data:` URL.
    File {
        /// Directory the file is written into.
        dest: PathBuf,
        /// File name inside `dest`.
        #[serde(rename = "dest-filename")]
        dest_filename: String,
        /// Remote URL or `data:` URL.
        url: String,
        /// Expected lowercase hex SHA-256 of the content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
    /// An executable script assembled from command lines.
    Script {
        /// Directory the script is written into.
        dest: PathBuf,
        /// File name inside `dest`.
        #[serde(rename = "dest-filename")]
        dest_filename: String,
        /// Lines written verbatim, one per line.
        commands: Vec<String>,
    },
    /// Command lines executed through the shell.
    Shell {
        /// Commands run in order.
        commands: Vec<String>,
    },
}

impl ManifestEntry {
    /// On-disk `type` string of this entry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Script { .. } => "script",
            Self::Shell { .. } => "shell",
        }
    }

    /// Output path for `file` and `script` entries.
    #[must_use]
    pub fn dest_path(&self) -> Option<PathBuf> {
        match self {
            Self::File {
                dest,
                dest_filename,
                ..
            }
            | Self::Script {
                dest,
                dest_filename,
                ..
            } => Some(dest.join(dest_filename)),
            Self::Shell { .. } => None,
        }
    }
}

/// Read and validate the manifest at `path`.
///
/// # Errors
///
/// Returns [`ManifestError`] if the file cannot be read, is not a JSON array,
/// or contains an invalid entry.
pub fn load(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    parse_entries(value)
}

/// Validate an already-parsed JSON value into manifest entries.
///
/// Every entry is checked before any is returned, so a malformed manifest is
/// rejected as a whole.
///
/// # Errors
///
/// Returns [`ManifestError::NotAnArray`], [`ManifestError::MissingKind`],
/// [`ManifestError::UnknownKind`] or [`ManifestError::InvalidEntry`].
pub fn parse_entries(value: Value) -> Result<Vec<ManifestEntry>, ManifestError> {
    let Value::Array(items) = value else {
        return Err(ManifestError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_entry(index, item))
        .collect()
}

fn parse_entry(index: usize, item: Value) -> Result<ManifestEntry, ManifestError> {
    let kind = match item.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        Some(other) => {
            return Err(ManifestError::UnknownKind {
                index,
                kind: other.to_string(),
            });
        }
        None => return Err(ManifestError::MissingKind { index }),
    };

    if !KNOWN_KINDS.contains(&kind.as_str()) {
        return Err(ManifestError::UnknownKind { index, kind });
    }

    serde_json::from_value(item).map_err(|e| ManifestError::InvalidEntry {
        index,
        kind,
        message: e.to_string(),
    })
}

/// Serialize entries as pretty JSON with a four-space indent.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_pretty_json(entries: &[ManifestEntry]) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_kinds() {
        let entries = parse_entries(json!([
            {"type": "file", "dest": "out", "dest-filename": "x.bin", "url": "data:Zm9v"},
            {"type": "script", "dest": "bin", "dest-filename": "run.sh", "commands": ["echo hi"]},
            {"type": "shell", "commands": ["true"]}
        ]))
        .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            ManifestEntry::File {
                dest: PathBuf::from("out"),
                dest_filename: "x.bin".to_string(),
                url: "data:Zm9v".to_string(),
                sha256: None,
            }
        );
        assert_eq!(entries[1].kind(), "script");
        assert_eq!(entries[2].kind(), "shell");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let entries = parse_entries(json!([
            {"type": "file", "dest": "deps", "dest-filename": "a.tgz",
             "url": "https://example.invalid/a.tgz", "sha256": "ab", "only-arches": ["x86_64"]}
        ]))
        .unwrap();
        assert!(matches!(
            &entries[0],
            ManifestEntry::File { sha256: Some(s), .. } if s == "ab"
        ));
    }

    #[test]
    fn unknown_kind_reports_index() {
        let err = parse_entries(json!([
            {"type": "shell", "commands": []},
            {"type": "archive", "url": "x"}
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::UnknownKind { index: 1, ref kind } if kind == "archive"
        ));
    }

    #[test]
    fn missing_kind_is_rejected() {
        let err = parse_entries(json!([{"commands": ["true"]}])).unwrap_err();
        assert!(matches!(err, ManifestError::MissingKind { index: 0 }));
    }

    #[test]
    fn missing_field_is_invalid_entry() {
        let err = parse_entries(json!([{"type": "file", "dest": "out"}])).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::InvalidEntry { index: 0, ref kind, .. } if kind == "file"
        ));
    }

    #[test]
    fn non_array_is_rejected() {
        let err = parse_entries(json!({"type": "file"})).unwrap_err();
        assert!(matches!(err, ManifestError::NotAnArray));
    }

    #[test]
    fn dest_path_joins_filename() {
        let entry = ManifestEntry::Script {
            dest: PathBuf::from("bin"),
            dest_filename: "run.sh".to_string(),
            commands: vec![],
        };
        assert_eq!(entry.dest_path(), Some(PathBuf::from("bin/run.sh")));
        let shell = ManifestEntry::Shell { commands: vec![] };
        assert_eq!(shell.dest_path(), None);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn pretty_json_uses_four_spaces_and_wire_names() {
        let json = to_pretty_json(&[ManifestEntry::File {
            dest: PathBuf::from("deps"),
            dest_filename: "a.tgz".to_string(),
            url: "https://example.invalid/a.tgz".to_string(),
            sha256: Some("00".to_string()),
        }])
        .unwrap();
        assert!(json.contains("\n    {\n        \"type\": \"file\""));
        assert!(json.contains("\"dest-filename\": \"a.tgz\""));
        let back = parse_entries(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(back.len(), 1);
    }
}
