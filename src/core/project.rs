//! `package.json` metadata.
//!
//! Two manifests matter to the pipeline: the addon's own (name and version,
//! which feed the artifact identity) and the consuming project's (which may
//! pin an electron version).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::{PipelineError, PipelineResult};

/// Manifest file name.
pub const PACKAGE_JSON: &str = "package.json";

/// The subset of `package.json` the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: Option<String>,

    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Load and parse `<dir>/package.json`.
    pub fn load(dir: &Path) -> PipelineResult<Self> {
        let path = dir.join(PACKAGE_JSON);
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| PipelineError::io(format!("failed to read {}", path.display()), e))?;
        Self::parse(&contents, &path)
    }

    fn parse(contents: &str, path: &Path) -> PipelineResult<Self> {
        serde_json::from_str(contents).map_err(|e| {
            PipelineError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Declared electron requirement, preferring `devDependencies`.
    pub fn electron_requirement(&self) -> Option<&str> {
        self.dev_dependencies
            .get("electron")
            .or_else(|| self.dependencies.get("electron"))
            .map(String::as_str)
    }
}

/// Name and version of the addon being acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMeta {
    pub name: String,
    pub version: semver::Version,
}

impl PackageMeta {
    /// Read the addon's own `package.json`.
    pub fn load(root: &Path) -> PipelineResult<Self> {
        let manifest = PackageManifest::load(root)?;
        let path = root.join(PACKAGE_JSON);

        let name = manifest
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| PipelineError::config(format!("{} has no `name`", path.display())))?;

        let raw_version = manifest
            .version
            .ok_or_else(|| PipelineError::config(format!("{} has no `version`", path.display())))?;
        let version = semver::Version::parse(raw_version.trim()).map_err(|e| {
            PipelineError::config(format!(
                "invalid version `{}` in {}: {}",
                raw_version,
                path.display(),
                e
            ))
        })?;

        Ok(PackageMeta { name, version })
    }
}

/// Looks up a pinned electron version declared by a project.
pub trait PinnedVersionSource {
    /// The raw pin (e.g. `^13.1.2`), or `None` when the project declares none.
    fn resolve_pinned_runtime_version(&self, project_root: &Path) -> PipelineResult<Option<String>>;
}

/// Reads the pin from the project's `package.json`.
///
/// A project without a `package.json` has no pin.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageJsonPins;

impl PinnedVersionSource for PackageJsonPins {
    fn resolve_pinned_runtime_version(&self, project_root: &Path) -> PipelineResult<Option<String>> {
        if !project_root.join(PACKAGE_JSON).is_file() {
            tracing::debug!("No {} in {}", PACKAGE_JSON, project_root.display());
            return Ok(None);
        }

        let manifest = PackageManifest::load(project_root)?;
        Ok(manifest.electron_requirement().map(str::to_string))
    }
}
