//! Artifact identity: the tuple that names every build output.
//!
//! An [`ArtifactIdentity`] is built once per invocation. Everything derived
//! from it (remote archive names, local package paths, the node ABI tag) goes
//! through the same template so that the prebuilt download, the packager and
//! the publishing side always agree on names.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

use crate::core::error::{PipelineError, PipelineResult};
use crate::core::runtime::RuntimeTarget;

/// Target operating system, using node's `process.platform` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Win32,
    Darwin,
    Linux,
}

impl Platform {
    /// Platform of the running host.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Win32 => "win32",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win32" => Ok(Platform::Win32),
            "darwin" => Ok(Platform::Darwin),
            "linux" => Ok(Platform::Linux),
            _ => Err(format!(
                "invalid platform '{}'; expected 'win32', 'darwin', or 'linux'",
                s
            )),
        }
    }
}

/// Target CPU architecture, using node's `process.arch` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Ia32,
    X64,
    Arm64,
    Arm,
}

impl Arch {
    /// Architecture of the running host.
    pub fn host() -> Self {
        if cfg!(target_arch = "x86") {
            Arch::Ia32
        } else if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else if cfg!(target_arch = "arm") {
            Arch::Arm
        } else {
            Arch::X64
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Ia32 => "ia32",
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ia32" => Ok(Arch::Ia32),
            "x64" => Ok(Arch::X64),
            "arm64" => Ok(Arch::Arm64),
            "arm" => Ok(Arch::Arm),
            _ => Err(format!(
                "invalid arch '{}'; expected 'ia32', 'x64', 'arm64', or 'arm'",
                s
            )),
        }
    }
}

/// Host runtime whose ABI the addon is compiled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    #[default]
    Electron,
    Node,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Electron => "electron",
            Runtime::Node => "node",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electron" => Ok(Runtime::Electron),
            "node" => Ok(Runtime::Node),
            _ => Err(format!(
                "invalid runtime '{}'; expected 'electron' or 'node'",
                s
            )),
        }
    }
}

/// Canonical identity of one build of the addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactIdentity {
    package_name: String,
    version: semver::Version,
    platform: Platform,
    arch: Arch,
    runtime: RuntimeTarget,
}

impl ArtifactIdentity {
    pub fn new(
        package_name: impl Into<String>,
        version: semver::Version,
        platform: Platform,
        arch: Arch,
        runtime: RuntimeTarget,
    ) -> Self {
        ArtifactIdentity {
            package_name: package_name.into(),
            version,
            platform,
            arch,
            runtime,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn runtime(&self) -> &RuntimeTarget {
        &self.runtime
    }

    /// ABI tag embedded in archive names, e.g. `electron-v13.1`.
    pub fn node_abi(&self) -> String {
        self.runtime.node_abi()
    }

    /// Archive file name shared by the remote store and the local packager.
    ///
    /// `<name>-v<version>-<runtime>-v<major.minor>-<platform>-<arch>.tar.gz`
    pub fn archive_file_name(&self) -> String {
        format!(
            "{}-v{}-{}-{}-{}.tar.gz",
            self.package_name,
            self.version,
            self.node_abi(),
            self.platform,
            self.arch
        )
    }

    /// Location of this identity's prebuilt archive on a remote host.
    pub fn remote_ref(&self, host: &str, remote_path: &str) -> PipelineResult<RemoteArtifactRef> {
        let host = Url::parse(host)
            .map_err(|e| PipelineError::config(format!("invalid remote host `{}`: {}", host, e)))?;

        Ok(RemoteArtifactRef {
            host,
            path: remote_path.trim_matches('/').to_string(),
            file_name: self.archive_file_name(),
        })
    }
}

impl fmt::Display for ArtifactIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} ({}, {}-{})",
            self.package_name,
            self.version,
            self.node_abi(),
            self.platform,
            self.arch
        )
    }
}

/// A prebuilt archive on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArtifactRef {
    host: Url,
    path: String,
    file_name: String,
}

impl RemoteArtifactRef {
    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full download URL: `<host>/<path>/<file name>`.
    pub fn url(&self) -> String {
        let host = self.host.as_str().trim_end_matches('/');
        if self.path.is_empty() {
            format!("{}/{}", host, self.file_name)
        } else {
            format!("{}/{}/{}", host, self.path, self.file_name)
        }
    }
}

impl fmt::Display for RemoteArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
