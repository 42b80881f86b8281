//! Configuration file support for addonkit.
//!
//! addonkit supports two configuration file locations:
//! - Global: `~/.addonkit/config.toml` - User-wide defaults
//! - Project: `.addonkit/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags and
//! npm-style environment variables take precedence over both; they are applied
//! by the binary when it assembles the [`PipelineConfig`](crate::ops::PipelineConfig).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Platform, Runtime};

/// Host serving prebuilt addon archives.
pub const DEFAULT_REMOTE_HOST: &str = "https://yx-web-nosdn.netease.im";

/// Path under [`DEFAULT_REMOTE_HOST`] where prebuilt archives live.
pub const DEFAULT_REMOTE_PATH: &str = "package";

/// Vendor SDK archive for Windows builds.
pub const DEFAULT_WIN32_SDK_URL: &str = "https://yx-web-nosdn.netease.im/package/1628698699/NERtc_Windows_SDK_v4.1.110.zip?download=NERtc_Windows_SDK_v4.1.110.zip";

/// Vendor SDK archive for macOS builds.
pub const DEFAULT_DARWIN_SDK_URL: &str = "https://yx-web-nosdn.netease.im/package/1628698786/NERTC_Mac_SDK_v4.1.110.zip?download=NERTC_Mac_SDK_v4.1.110.zip";

/// Headers mirror used by node-gyp for electron targets.
pub const ELECTRON_DIST_URL: &str = "https://electronjs.org/headers";

/// Headers mirror used by node-gyp for plain node targets.
pub const NODE_DIST_URL: &str = "https://nodejs.org/dist";

/// Visual Studio version passed to node-gyp on Windows.
pub const DEFAULT_MSVS_VERSION: &str = "2015";

const DEFAULT_INCLUDE_DIR: &str = "nertc_sdk";
const DEFAULT_TEMP_DIR: &str = "temporary";
const DEFAULT_NET_TIMEOUT_SECS: u64 = 300;

/// addonkit configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prebuilt artifact location
    pub remote: RemoteConfig,

    /// Vendor SDK settings
    pub sdk: SdkConfig,

    /// Network settings
    pub net: NetConfig,

    /// Toolchain settings
    pub build: BuildSettings,
}

/// Where prebuilt archives are published.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL (e.g., https://downloads.example.com)
    pub host: Option<String>,

    /// Path segment between the host and the archive name
    pub path: Option<String>,
}

/// Vendor SDK download and extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Default SDK archive for win32 targets
    pub win32_url: Option<String>,

    /// Default SDK archive for darwin targets
    pub darwin_url: Option<String>,

    /// Directory (relative to the addon root) the SDK is extracted into
    pub include_dir: Option<PathBuf>,

    /// Scratch directory (relative to the addon root) for raw downloads
    pub temp_dir: Option<PathBuf>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Native toolchain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Visual Studio version for node-gyp on Windows
    pub msvs_version: Option<String>,

    /// Headers mirror passed to node-gyp as `--dist-url`
    pub dist_url: Option<String>,

    /// Deadline for each toolchain subprocess, in seconds (unset = no deadline)
    pub stage_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.remote.host.is_some() {
            self.remote.host = other.remote.host;
        }
        if other.remote.path.is_some() {
            self.remote.path = other.remote.path;
        }

        if other.sdk.win32_url.is_some() {
            self.sdk.win32_url = other.sdk.win32_url;
        }
        if other.sdk.darwin_url.is_some() {
            self.sdk.darwin_url = other.sdk.darwin_url;
        }
        if other.sdk.include_dir.is_some() {
            self.sdk.include_dir = other.sdk.include_dir;
        }
        if other.sdk.temp_dir.is_some() {
            self.sdk.temp_dir = other.sdk.temp_dir;
        }

        if other.net.timeout_secs.is_some() {
            self.net.timeout_secs = other.net.timeout_secs;
        }

        if other.build.msvs_version.is_some() {
            self.build.msvs_version = other.build.msvs_version;
        }
        if other.build.dist_url.is_some() {
            self.build.dist_url = other.build.dist_url;
        }
        if other.build.stage_timeout_secs.is_some() {
            self.build.stage_timeout_secs = other.build.stage_timeout_secs;
        }
    }

    /// Host serving prebuilt archives.
    pub fn remote_host(&self) -> &str {
        self.remote.host.as_deref().unwrap_or(DEFAULT_REMOTE_HOST)
    }

    /// Remote path segment for prebuilt archives.
    pub fn remote_path(&self) -> &str {
        self.remote.path.as_deref().unwrap_or(DEFAULT_REMOTE_PATH)
    }

    /// Built-in vendor SDK URL for a platform, if one exists.
    ///
    /// Only the desktop platforms the vendor ships SDKs for have a default.
    pub fn default_sdk_url(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Win32 => Some(
                self.sdk
                    .win32_url
                    .as_deref()
                    .unwrap_or(DEFAULT_WIN32_SDK_URL),
            ),
            Platform::Darwin => Some(
                self.sdk
                    .darwin_url
                    .as_deref()
                    .unwrap_or(DEFAULT_DARWIN_SDK_URL),
            ),
            Platform::Linux => None,
        }
    }

    /// SDK extraction directory, relative to the addon root.
    pub fn include_dir(&self) -> &Path {
        self.sdk
            .include_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_INCLUDE_DIR))
    }

    /// Scratch download directory, relative to the addon root.
    pub fn temp_dir(&self) -> &Path {
        self.sdk
            .temp_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TEMP_DIR))
    }

    /// HTTP request timeout.
    pub fn net_timeout(&self) -> Duration {
        Duration::from_secs(self.net.timeout_secs.unwrap_or(DEFAULT_NET_TIMEOUT_SECS))
    }

    /// Deadline applied to each toolchain subprocess.
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.build.stage_timeout_secs.map(Duration::from_secs)
    }

    /// Visual Studio version for node-gyp.
    pub fn msvs_version(&self) -> &str {
        self.build
            .msvs_version
            .as_deref()
            .unwrap_or(DEFAULT_MSVS_VERSION)
    }

    /// Headers mirror for node-gyp, defaulting per runtime.
    pub fn dist_url(&self, runtime: Runtime) -> &str {
        match self.build.dist_url.as_deref() {
            Some(url) => url,
            None => match runtime {
                Runtime::Electron => ELECTRON_DIST_URL,
                Runtime::Node => NODE_DIST_URL,
            },
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.addonkit/config.toml)
/// 2. Global config (~/.addonkit/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global addonkit config directory (~/.addonkit).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".addonkit"))
}

/// Get the global config path (~/.addonkit/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.addonkit/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".addonkit").join("config.toml")
}
