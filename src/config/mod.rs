//! Explicit configuration for the build hooks.
//!
//! The process environment is read exactly once, in `main`, through
//! [`BuildEnv::from_env`]. Everything downstream receives plain values.
pub mod manifest;
pub mod yarn_lock;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Install prefix chosen at configure time.
pub const VAR_INSTALL_PREFIX: &str = "MESON_INSTALL_PREFIX";
/// Set (non-empty) during a staged install.
pub const VAR_DESTDIR: &str = "DESTDIR";
/// Install prefix with the staging root prepended.
pub const VAR_DESTDIR_INSTALL_PREFIX: &str = "MESON_DESTDIR_INSTALL_PREFIX";
/// Package manager executable override.
pub const VAR_PACKAGE_MANAGER: &str = "YARN";

/// Package manager used when [`VAR_PACKAGE_MANAGER`] is unset.
pub const DEFAULT_PACKAGE_MANAGER: &str = "yarn";

/// Application id used to locate the bundled service below `lib/`.
pub const DEFAULT_APP_ID: &str = "edu.stanford.Almond";

/// Directory names never mirrored by the tree copier.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules"];

/// Name of the offline dependency mirror directory.
pub const DEPS_DIR: &str = "deps";

/// Configuration derived from the build system's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
    /// Final install prefix (`MESON_INSTALL_PREFIX`).
    pub install_prefix: Option<PathBuf>,
    /// Whether this is a staged install into an intermediate root (`DESTDIR`).
    pub staged: bool,
    /// Prefix as seen from the staging root (`MESON_DESTDIR_INSTALL_PREFIX`).
    pub destdir_prefix: Option<PathBuf>,
    /// Package manager executable (`YARN`, default `yarn`).
    pub package_manager: String,
}

impl Default for BuildEnv {
    fn default() -> Self {
        Self {
            install_prefix: None,
            staged: false,
            destdir_prefix: None,
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
        }
    }
}

impl BuildEnv {
    /// Build the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            install_prefix: get(VAR_INSTALL_PREFIX).map(PathBuf::from),
            staged: get(VAR_DESTDIR).is_some(),
            destdir_prefix: get(VAR_DESTDIR_INSTALL_PREFIX).map(PathBuf::from),
            package_manager: get(VAR_PACKAGE_MANAGER)
                .unwrap_or_else(|| DEFAULT_PACKAGE_MANAGER.to_string()),
        }
    }

    /// The install prefix, required by post-install steps.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] when the prefix is unset.
    pub fn require_prefix(&self) -> Result<&Path, ConfigError> {
        self.install_prefix
            .as_deref()
            .ok_or(ConfigError::MissingVariable(VAR_INSTALL_PREFIX))
    }

    /// The prefix files are actually written below: the staged prefix when
    /// present, otherwise the install prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] when neither is set.
    pub fn effective_dest_prefix(&self) -> Result<&Path, ConfigError> {
        match self.destdir_prefix.as_deref() {
            Some(prefix) => Ok(prefix),
            None => self.require_prefix(),
        }
    }
}

/// Paths used by the post-install sequence, resolved from a [`BuildEnv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// `<prefix>/share`.
    pub datadir: PathBuf,
    /// `<dest-prefix>/lib/<app-id>/service`.
    pub service_dir: PathBuf,
    /// Skip system-wide cache refreshes.
    pub staged: bool,
}

impl InstallLayout {
    /// Resolve the layout for `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] when the install prefix is unset.
    pub fn resolve(env: &BuildEnv, app_id: &str) -> Result<Self, ConfigError> {
        let prefix = env.require_prefix()?;
        let dest_prefix = env.effective_dest_prefix()?;
        Ok(Self {
            datadir: prefix.join("share"),
            service_dir: dest_prefix.join("lib").join(app_id).join("service"),
            staged: env.staged,
        })
    }

    /// Offline dependency mirror that is pruned after install.
    #[must_use]
    pub fn deps_dir(&self) -> PathBuf {
        self.service_dir.join(DEPS_DIR)
    }
}

/// Source and destination of a service staging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayout {
    /// Top of the source tree (holds `package.json`, `yarn.lock`, `.yarnrc`).
    pub source_root: PathBuf,
    /// Directory where the service is assembled.
    pub target: PathBuf,
    /// Directory recorded as the package manager's offline mirror.
    pub mirror: PathBuf,
}

impl ServiceLayout {
    /// Layout for a build-directory staging run.
    ///
    /// `indicator` names a file at the top of the source tree; its parent is
    /// the source root. The offline mirror is `<root>/deps`, made absolute
    /// so the package manager can resolve it from the build directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if the indicator has no parent or
    /// the working directory cannot be determined.
    pub fn for_build_dir(indicator: &Path, build_dir: &Path) -> Result<Self, ConfigError> {
        let root = indicator
            .parent()
            .ok_or_else(|| ConfigError::InvalidPath {
                path: indicator.to_path_buf(),
                reason: "has no parent directory".to_string(),
            })?;
        let root = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root
        };
        let root = absolute(root)?;
        Ok(Self {
            mirror: root.join(DEPS_DIR),
            source_root: root,
            target: absolute(build_dir)?,
        })
    }

    /// Layout for installing the service into its final location, with the
    /// mirror shipped alongside it.
    #[must_use]
    pub fn for_install(source_root: &Path, install: &InstallLayout) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            target: install.service_dir.clone(),
            mirror: install.deps_dir(),
        }
    }

    /// `<root>/service`, the tree that gets mirrored.
    #[must_use]
    pub fn service_source(&self) -> PathBuf {
        self.source_root.join("service")
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|e| ConfigError::InvalidPath {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
