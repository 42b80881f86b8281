//! Runtime version resolution.
//!
//! The runtime an addon is compiled against is chosen in this order:
//!
//! 1. An explicit target version supplied by the caller
//! 2. An `electron` pin declared by the consuming project
//! 3. The `major.minor` version of the host node runtime
//! 4. [`FALLBACK_ELECTRON_VERSION`]
//!
//! An electron pin always wins over the host runtime.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::error::{PipelineError, PipelineResult};
use crate::core::identity::Runtime;
use crate::core::project::PinnedVersionSource;
use crate::util::process::{find_executable, ProcessBuilder};

/// Electron version used when nothing else can be determined.
pub const FALLBACK_ELECTRON_VERSION: &str = "5.0.8";

/// First digit through last digit, dropping range operators and `v` prefixes.
static DIGIT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D*(\d(?:.*\d)?)\D*$").expect("static regex"));

static MAJOR_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)").expect("static regex"));

/// A runtime version string, normalized so that `major.minor` is always known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct RuntimeVersion {
    full: String,
    major: u64,
    minor: u64,
}

impl RuntimeVersion {
    /// Parse a version string such as `^13.1.2`, `v16.14.0` or `18.2`.
    ///
    /// Leading non-digit characters are stripped. The remainder must start
    /// with two dot-separated numeric components.
    pub fn parse(raw: &str) -> PipelineResult<Self> {
        let trimmed = raw.trim();
        let full = DIGIT_SPAN
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| PipelineError::config(format!("malformed runtime version `{}`", raw)))?;

        let caps = MAJOR_MINOR.captures(&full).ok_or_else(|| {
            PipelineError::config(format!(
                "malformed runtime version `{}`: expected at least `major.minor`",
                raw
            ))
        })?;

        let component = |i: usize| -> PipelineResult<u64> {
            caps[i].parse::<u64>().map_err(|e| {
                PipelineError::config(format!("malformed runtime version `{}`: {}", raw, e))
            })
        };
        let major = component(1)?;
        let minor = component(2)?;

        Ok(RuntimeVersion { full, major, minor })
    }

    /// The normalized version, e.g. `13.1.2` for a `^13.1.2` pin.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// `major.minor`, the precision embedded in artifact names.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl From<RuntimeVersion> for String {
    fn from(v: RuntimeVersion) -> String {
        v.full
    }
}

/// A runtime flavor paired with the version the addon targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeTarget {
    pub runtime: Runtime,
    pub version: RuntimeVersion,
}

impl RuntimeTarget {
    pub fn new(runtime: Runtime, version: RuntimeVersion) -> Self {
        RuntimeTarget { runtime, version }
    }

    /// ABI tag such as `electron-v13.1` or `node-v16.14`.
    pub fn node_abi(&self) -> String {
        format!("{}-v{}", self.runtime, self.version.major_minor())
    }
}

/// Introspection of the host node runtime.
pub trait HostRuntime {
    /// Raw version string reported by the host (e.g. `v16.14.0`), if any.
    fn version(&self) -> Option<String>;
}

/// Asks the `node` executable on PATH for its version.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeHost;

impl HostRuntime for NodeHost {
    fn version(&self) -> Option<String> {
        let node = find_executable("node")?;
        match ProcessBuilder::new(node).arg("--version").exec() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                (!version.is_empty()).then_some(version)
            }
            Ok(output) => {
                tracing::debug!("`node --version` exited with {:?}", output.status.code());
                None
            }
            Err(e) => {
                tracing::debug!("failed to query node version: {:#}", e);
                None
            }
        }
    }
}

/// Decide which runtime and version to build for.
///
/// `explicit` is a caller-supplied target version (from `--target` or
/// `npm_config_target`) paired with the configured runtime.
pub fn resolve_runtime(
    explicit: Option<(Runtime, &str)>,
    project_root: &Path,
    pins: &dyn PinnedVersionSource,
    host: &dyn HostRuntime,
) -> PipelineResult<RuntimeTarget> {
    if let Some((runtime, version)) = explicit {
        let version = RuntimeVersion::parse(version)?;
        tracing::debug!("Using explicit target {} {}", runtime, version);
        return Ok(RuntimeTarget::new(runtime, version));
    }

    if let Some(pin) = pins.resolve_pinned_runtime_version(project_root)? {
        let version = RuntimeVersion::parse(&pin)?;
        tracing::debug!("Using electron {} pinned by {}", version, project_root.display());
        return Ok(RuntimeTarget::new(Runtime::Electron, version));
    }

    if let Some(raw) = host.version() {
        let parsed = RuntimeVersion::parse(&raw)?;
        let version = RuntimeVersion::parse(&parsed.major_minor())?;
        tracing::debug!("Using host node runtime {}", version);
        return Ok(RuntimeTarget::new(Runtime::Node, version));
    }

    tracing::warn!(
        "No electron pin and no node runtime found; assuming electron {}",
        FALLBACK_ELECTRON_VERSION
    );
    Ok(RuntimeTarget::new(
        Runtime::Electron,
        RuntimeVersion::parse(FALLBACK_ELECTRON_VERSION)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedHost, FixedPins};

    #[test]
    fn test_parse_strips_prefix() {
        let v = RuntimeVersion::parse("^13.1.2").unwrap();
        assert_eq!(v.as_str(), "13.1.2");
        assert_eq!(v.major_minor(), "13.1");

        let v = RuntimeVersion::parse("v16.14.0").unwrap();
        assert_eq!(v.as_str(), "16.14.0");
        assert_eq!(v.major_minor(), "16.14");

        let v = RuntimeVersion::parse("~22.3.27-beta.1").unwrap();
        assert_eq!(v.as_str(), "22.3.27-beta.1");
        assert_eq!(v.major_minor(), "22.3");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["", "latest", "13", "v13", "x.y.z", "^"] {
            let err = RuntimeVersion::parse(raw).unwrap_err();
            assert!(
                matches!(err, PipelineError::Configuration { .. }),
                "expected configuration error for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_node_abi() {
        let target = RuntimeTarget::new(
            Runtime::Electron,
            RuntimeVersion::parse("13.1.2").unwrap(),
        );
        assert_eq!(target.node_abi(), "electron-v13.1");
    }

    #[test]
    fn test_electron_pin_wins_over_host() {
        let pins = FixedPins::some("^13.1.2");
        let host = FixedHost::some("v20.11.1");

        let target = resolve_runtime(None, Path::new("/project"), &pins, &host).unwrap();
        assert_eq!(target.runtime, Runtime::Electron);
        assert_eq!(target.version.as_str(), "13.1.2");
        assert_eq!(target.node_abi(), "electron-v13.1");
    }

    #[test]
    fn test_host_runtime_reduced_to_major_minor() {
        let pins = FixedPins::none();
        let host = FixedHost::some("v16.14.0");

        let target = resolve_runtime(None, Path::new("/project"), &pins, &host).unwrap();
        assert_eq!(target.runtime, Runtime::Node);
        assert_eq!(target.version.as_str(), "16.14");
    }

    #[test]
    fn test_fallback_without_host() {
        let target =
            resolve_runtime(None, Path::new("/project"), &FixedPins::none(), &FixedHost::none())
                .unwrap();
        assert_eq!(target.runtime, Runtime::Electron);
        assert_eq!(target.version.as_str(), FALLBACK_ELECTRON_VERSION);
    }

    #[test]
    fn test_explicit_target_wins() {
        let target = resolve_runtime(
            Some((Runtime::Node, "18.2.0")),
            Path::new("/project"),
            &FixedPins::some("13.1.2"),
            &FixedHost::some("v20.0.0"),
        )
        .unwrap();
        assert_eq!(target.runtime, Runtime::Node);
        assert_eq!(target.version.as_str(), "18.2.0");
    }

    #[test]
    fn test_malformed_pin_is_configuration_error() {
        let err = resolve_runtime(
            None,
            Path::new("/project"),
            &FixedPins::some("latest"),
            &FixedHost::none(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration { .. }));
    }
}
