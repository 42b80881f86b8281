//! Resolved invocation options.

use serde::Serialize;

use crate::builder::{CommandRunner, ToolLocator};
use crate::core::{Arch, HostRuntime, PinnedVersionSource, Platform, Runtime};
use crate::fetch::Downloader;
use crate::util::config::Config;

/// Every option one invocation runs with.
///
/// Built once by the front end from CLI flags, npm environment variables and
/// config files. Library code reads nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub platform: Platform,
    pub arch: Arch,
    pub runtime: Runtime,

    /// Explicit runtime version, overriding pins and host detection
    pub target: Option<String>,

    pub debug: bool,
    pub silent: bool,

    /// Vendor SDK archive overriding the platform default
    pub download_url: Option<String>,

    pub skip_install: bool,

    #[serde(skip)]
    pub settings: Config,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            platform: Platform::host(),
            arch: Arch::host(),
            runtime: Runtime::default(),
            target: None,
            debug: false,
            silent: false,
            download_url: None,
            skip_install: false,
            settings: Config::default(),
        }
    }
}

impl PipelineConfig {
    /// The explicit target paired with the configured runtime, if one was given.
    pub fn explicit_target(&self) -> Option<(Runtime, &str)> {
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| (self.runtime, t))
    }

    /// The SDK override URL, ignoring empty values.
    pub fn download_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Effective options as a single JSON line, for logs.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// The outside world, as seen by the pipeline.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub downloader: &'a dyn Downloader,
    pub runner: &'a dyn CommandRunner,
    pub pins: &'a dyn PinnedVersionSource,
    pub host: &'a dyn HostRuntime,
    pub tools: &'a ToolLocator,
}
