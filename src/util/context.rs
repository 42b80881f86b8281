//! Addon context: the well-known paths the pipeline works in.
//!
//! Every stage receives its paths from an [`AddonContext`] instead of
//! computing them itself, so the prebuilt download, the native build and the
//! packager always agree on where things live.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::project::PACKAGE_JSON;
use crate::util::config::{project_config_path, Config};

/// Directory node-gyp and electron-rebuild write into, relative to the addon root.
pub const BUILD_DIR: &str = "build";

/// Build output directory, relative to [`BUILD_DIR`].
pub const RELEASE_DIR: &str = "Release";

/// Directory packaged archives are written to, relative to the addon root.
pub const PACKAGES_DIR: &str = "packages";

/// Paths for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct AddonContext {
    /// Directory containing the addon's own `package.json`
    addon_root: PathBuf,

    /// Directory of the project that triggered the install (npm's INIT_CWD)
    project_root: PathBuf,

    /// SDK extraction directory
    include_dir: PathBuf,

    /// Scratch download directory
    temp_dir: PathBuf,
}

impl AddonContext {
    /// Create a context rooted at `addon_root`.
    ///
    /// The consuming project defaults to the addon itself.
    pub fn new(addon_root: impl Into<PathBuf>) -> Self {
        let addon_root = addon_root.into();
        AddonContext {
            project_root: addon_root.clone(),
            include_dir: addon_root.join("nertc_sdk"),
            temp_dir: addon_root.join("temporary"),
            addon_root,
        }
    }

    /// Locate the addon root by searching upward from `start` for `package.json`.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        loop {
            if current.join(PACKAGE_JSON).is_file() {
                return Ok(Self::new(current));
            }
            if !current.pop() {
                bail!(
                    "could not find `{}` in {} or any parent directory",
                    PACKAGE_JSON,
                    start.display()
                );
            }
        }
    }

    /// Locate the addon root from the current directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::discover(&cwd)
    }

    /// Set the consuming project's root.
    pub fn with_project_root(mut self, project_root: impl Into<PathBuf>) -> Self {
        self.project_root = project_root.into();
        self
    }

    /// Apply directory settings from a loaded config.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.include_dir = self.addon_root.join(config.include_dir());
        self.temp_dir = self.addon_root.join(config.temp_dir());
        self
    }

    pub fn addon_root(&self) -> &Path {
        &self.addon_root
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Where the vendor SDK is extracted. Fixed, not versioned.
    pub fn include_dir(&self) -> &Path {
        &self.include_dir
    }

    /// Scratch directory for raw downloads.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Toolchain build directory (`build/`).
    pub fn build_dir(&self) -> PathBuf {
        self.addon_root.join(BUILD_DIR)
    }

    /// Native build output (`build/Release/`).
    pub fn build_output_dir(&self) -> PathBuf {
        self.build_dir().join(RELEASE_DIR)
    }

    /// Directory packaged archives are written to.
    pub fn packages_dir(&self) -> PathBuf {
        self.addon_root.join(PACKAGES_DIR)
    }

    /// Project-level config file (`.addonkit/config.toml`).
    pub fn project_config_path(&self) -> PathBuf {
        project_config_path(&self.addon_root)
    }
}
