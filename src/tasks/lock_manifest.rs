//! Dependency manifest generation from a yarn lock file.
use anyhow::{Context as _, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{Context, Task, TaskResult, TaskStats, process_resource};
use crate::config::manifest::{ManifestEntry, to_pretty_json};
use crate::config::yarn_lock::{self, LockedPackage};
use crate::fetch::file_sha256;
use crate::resources::generated::GeneratedFile;

/// Rebuild the `file` entries for every archive referenced by a lock file.
#[derive(Debug, Clone)]
pub struct GenerateManifest {
    /// Lock file to read.
    pub lockfile: PathBuf,
    /// Directory holding the downloaded archives, used for checksums.
    pub deps_dir: PathBuf,
    /// `dest` written into every entry.
    pub dest: PathBuf,
    /// Output file; `None` prints to stdout.
    pub output: Option<PathBuf>,
}

/// Build one `file` entry per distinct resolved URL, in lock-file order.
///
/// # Errors
///
/// Returns an error if an archive is missing from `deps_dir`.
pub fn entries_for(
    packages: &[LockedPackage],
    deps_dir: &Path,
    dest: &Path,
) -> Result<Vec<ManifestEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for package in packages {
        if !seen.insert(package.resolved.as_str()) {
            continue;
        }
        let archive = package.archive_name();
        let path = deps_dir.join(&archive);
        let sha256 = file_sha256(&path)
            .with_context(|| format!("checksumming archive for {}", package.name))?;
        entries.push(ManifestEntry::File {
            dest: dest.to_path_buf(),
            dest_filename: archive,
            url: package.resolved.clone(),
            sha256: Some(sha256),
        });
    }
    Ok(entries)
}

impl Task for GenerateManifest {
    fn name(&self) -> &'static str {
        "Generate dependency manifest"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = yarn_lock::load(&self.lockfile)?;
        let entries = entries_for(&packages, &self.deps_dir, &self.dest)?;
        ctx.log.info(&format!(
            "{} archives from {} lock entries",
            entries.len(),
            packages.len()
        ));
        let mut json = to_pretty_json(&entries).context("serializing manifest")?;
        json.push('\n');

        let Some(output) = &self.output else {
            #[allow(clippy::print_stdout)]
            {
                print!("{json}");
            }
            return Ok(TaskResult::Ok);
        };
        let mut stats = TaskStats::new();
        stats += process_resource(ctx, &GeneratedFile::new(output.clone(), json), "write")?;
        Ok(stats.finish(ctx))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::manifest;
    use crate::fetch::sha256_hex;
    use crate::tasks::test_helpers::make_context;
    use std::fs;

    const LOCK: &str = r#"# yarn lockfile v1


"@yarnpkg/lockfile@^1.1.0":
  version "1.1.0"
  resolved "https://registry.yarnpkg.com/@yarnpkg/lockfile/-/lockfile-1.1.0.tgz#e77a97fbd345b76d83245edcd17d393b1b41fb31"

left-pad@^1.3.0, left-pad@~1.3.0:
  version "1.3.0"
  resolved "https://registry.yarnpkg.com/left-pad/-/left-pad-1.3.0.tgz#5b8a3a7765dfe001261dde915589e782f8c94d1e"

left-pad@1.3.0:
  version "1.3.0"
  resolved "https://registry.yarnpkg.com/left-pad/-/left-pad-1.3.0.tgz#5b8a3a7765dfe001261dde915589e782f8c94d1e"
"#;

    fn fixture(root: &Path) {
        fs::write(root.join("yarn.lock"), LOCK).unwrap();
        fs::create_dir_all(root.join("deps")).unwrap();
        fs::write(root.join("deps/@yarnpkg-lockfile-1.1.0.tgz"), "lockfile").unwrap();
        fs::write(root.join("deps/left-pad-1.3.0.tgz"), "left-pad").unwrap();
    }

    #[test]
    fn entries_are_deduplicated_and_checksummed() {
        let tmp = tempfile::tempdir().unwrap();
        fixture(tmp.path());
        let packages = yarn_lock::load(&tmp.path().join("yarn.lock")).unwrap();

        let entries =
            entries_for(&packages, &tmp.path().join("deps"), Path::new("service/deps")).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            ManifestEntry::File {
                dest: PathBuf::from("service/deps"),
                dest_filename: "@yarnpkg-lockfile-1.1.0.tgz".to_string(),
                url: "https://registry.yarnpkg.com/@yarnpkg/lockfile/-/lockfile-1.1.0.tgz#e77a97fbd345b76d83245edcd17d393b1b41fb31".to_string(),
                sha256: Some(sha256_hex(b"lockfile")),
            }
        );
        assert_eq!(entries[1].dest_path(), Some(PathBuf::from("service/deps/left-pad-1.3.0.tgz")));
    }

    #[test]
    fn missing_archive_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fixture(tmp.path());
        fs::remove_file(tmp.path().join("deps/left-pad-1.3.0.tgz")).unwrap();
        let packages = yarn_lock::load(&tmp.path().join("yarn.lock")).unwrap();
        assert!(entries_for(&packages, &tmp.path().join("deps"), Path::new("deps")).is_err());
    }

    #[test]
    fn written_manifest_loads_back() {
        let tmp = tempfile::tempdir().unwrap();
        fixture(tmp.path());
        let (ctx, _log) = make_context();
        let output = tmp.path().join("build-data/npm.json");
        let task = GenerateManifest {
            lockfile: tmp.path().join("yarn.lock"),
            deps_dir: tmp.path().join("deps"),
            dest: PathBuf::from("service/deps"),
            output: Some(output.clone()),
        };

        task.run(&ctx).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("\n    {\n        \"type\": \"file\""));
        assert_eq!(manifest::load(&output).unwrap().len(), 2);
    }

    #[test]
    fn default_destination_is_the_staging_mirror() {
        use crate::cli::{Cli, Command};
        use crate::config::ServiceLayout;
        use clap::Parser as _;

        let Command::LockManifest(opts) = Cli::parse_from(["buildaux", "lock-manifest"]).command
        else {
            panic!("expected lock-manifest");
        };
        let root = tempfile::tempdir().unwrap();
        fixture(root.path());
        fs::write(root.path().join("meson.build"), "").unwrap();
        let packages = yarn_lock::load(&root.path().join(&opts.lockfile)).unwrap();

        let entries = entries_for(&packages, &root.path().join(&opts.deps_dir), &opts.dest).unwrap();

        let layout = ServiceLayout::for_build_dir(
            &root.path().join("meson.build"),
            &root.path().join("build/service"),
        )
        .unwrap();
        for entry in &entries {
            let written = root.path().join(entry.dest_path().unwrap());
            assert_eq!(written.parent(), Some(layout.mirror.as_path()));
        }
    }
}
