//! Minimal reader for yarn v1 lock files.
//!
//! Only the pieces needed to rebuild a dependency manifest are extracted:
//! the package name of each block and its `resolved` URL.
use anyhow::{Context as _, Result};
use std::path::Path;

/// A lock-file block with a resolved download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackage {
    /// Package name, including the `@scope/` prefix for scoped packages.
    pub name: String,
    /// Resolved tarball URL, possibly carrying a `#<sha1>` fragment.
    pub resolved: String,
}

impl LockedPackage {
    /// File name the archive is stored under in the offline mirror.
    ///
    /// This is the last path segment of the URL; scoped packages get their
    /// scope prepended (`@scope-name-1.0.0.tgz`) to avoid collisions.
    #[must_use]
    pub fn archive_name(&self) -> String {
        let basename = url_basename(&self.resolved);
        match self.name.split_once('/') {
            Some((scope, _)) if self.name.starts_with('@') => format!("{scope}-{basename}"),
            _ => basename.to_string(),
        }
    }
}

/// Read and parse the lock file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load(path: &Path) -> Result<Vec<LockedPackage>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading lock file {}", path.display()))?;
    Ok(parse(&content))
}

/// Parse lock-file text into packages, in file order.
///
/// Blocks without a `resolved` field (e.g. workspace links) are omitted.
#[must_use]
pub fn parse(content: &str) -> Vec<LockedPackage> {
    let mut packages = Vec::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if !line.starts_with(' ') {
            current = line.strip_suffix(':').map(package_name_from_key);
            continue;
        }
        let Some(name) = current.as_ref() else {
            continue;
        };
        // Fields of the block sit at exactly two spaces of indentation.
        let Some(field) = line.strip_prefix("  ").filter(|f| !f.starts_with(' ')) else {
            continue;
        };
        if let Some(value) = field.strip_prefix("resolved ") {
            packages.push(LockedPackage {
                name: name.clone(),
                resolved: unquote(value.trim()).to_string(),
            });
        }
    }
    packages
}

/// Extract the package name from a block key such as
/// `"@babel/core@^7.0.0", "@babel/core@^7.1.0"`.
fn package_name_from_key(key: &str) -> String {
    let first = key.split(", ").next().unwrap_or(key);
    let spec = unquote(first.trim());
    // The version range follows the last '@' that is not the scope marker.
    match spec.get(1..).and_then(|rest| rest.rfind('@')) {
        Some(at) => spec.get(..=at).unwrap_or(spec).to_string(),
        None => spec.to_string(),
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Last path segment of `url`, ignoring any query or fragment.
fn url_basename(url: &str) -> &str {
    let end = url.find(['#', '?']).unwrap_or(url.len());
    let path = url.get(..end).unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const LOCK: &str = r#"# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.
# yarn lockfile v1


"@babel/code-frame@^7.0.0", "@babel/code-frame@^7.8.3":
  version "7.8.3"
  resolved "https://registry.yarnpkg.com/@babel/code-frame/-/code-frame-7.8.3.tgz#33e25903d7481181534e12ec0a25f16b6fcf419e"
  integrity sha512-a9gxpmdXtZEInkCSHUJDLHZVBgb1QS0jhss4cPP93EW7s+uC5bikET2twEF3KV+7rDblJcmNvTR7VJejqd2C2g==
  dependencies:
    "@babel/highlight" "^7.8.3"

abbrev@1:
  version "1.1.1"
  resolved "https://registry.yarnpkg.com/abbrev/-/abbrev-1.1.1.tgz#f8f2c887ad10bf67f634f005b6987fed3179aac8"

local-pkg@file:../local:
  version "0.0.0"
"#;

    #[test]
    fn parses_resolved_urls_in_order() {
        let packages = parse(LOCK);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "@babel/code-frame");
        assert!(packages[0].resolved.starts_with("https://registry.yarnpkg.com/@babel/"));
        assert_eq!(packages[1].name, "abbrev");
    }

    #[test]
    fn nested_dependency_lines_are_not_fields() {
        let packages = parse(LOCK);
        assert!(packages.iter().all(|p| p.resolved.starts_with("https://")));
    }

    #[test]
    fn archive_name_strips_fragment() {
        let packages = parse(LOCK);
        assert_eq!(packages[1].archive_name(), "abbrev-1.1.1.tgz");
    }

    #[test]
    fn archive_name_prefixes_scope() {
        let packages = parse(LOCK);
        assert_eq!(packages[0].archive_name(), "@babel-code-frame-7.8.3.tgz");
    }

    #[test]
    fn package_name_handles_unquoted_and_scoped_keys() {
        assert_eq!(package_name_from_key("abbrev@1"), "abbrev");
        assert_eq!(package_name_from_key("\"@scope/pkg@^1.0.0\""), "@scope/pkg");
        assert_eq!(package_name_from_key("bare"), "bare");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("yarn.lock")).is_err());
    }
}
