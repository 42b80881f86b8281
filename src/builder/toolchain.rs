//! Toolchain discovery.
//!
//! The addon is normally installed as a dependency, so its build tools are
//! hoisted next to it (`<project>/node_modules/.bin`). When the addon is
//! built from its own checkout they live in its local `node_modules`
//! instead. Both locations are probed, hoisted first.

use std::path::{Path, PathBuf};

use crate::core::{PipelineError, PipelineResult, Platform};
use crate::util::process::{find_executable, ProcessBuilder};

const ELECTRON_REBUILD: &str = "electron-rebuild";
const NODE_GYP: &str = "node-gyp";

/// Finds electron-rebuild and node-gyp for an addon.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    addon_root: PathBuf,
    host: Platform,
    node: Option<PathBuf>,
}

impl ToolLocator {
    /// Locator for the current host, using `node` from PATH.
    pub fn new(addon_root: impl Into<PathBuf>) -> Self {
        ToolLocator {
            addon_root: addon_root.into(),
            host: Platform::host(),
            node: find_executable("node"),
        }
    }

    /// Probe as if running on `host` (decides the `.cmd` shim suffix).
    pub fn with_host(mut self, host: Platform) -> Self {
        self.host = host;
        self
    }

    /// Use a specific node executable.
    pub fn with_node(mut self, node: impl Into<PathBuf>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn addon_root(&self) -> &Path {
        &self.addon_root
    }

    /// Candidate paths for the electron-rebuild shim, in probe order.
    pub fn electron_rebuild_candidates(&self) -> Vec<PathBuf> {
        let shim = match self.host {
            Platform::Win32 => format!("{}.cmd", ELECTRON_REBUILD),
            _ => ELECTRON_REBUILD.to_string(),
        };

        let mut candidates = Vec::with_capacity(2);
        if let Some(parent) = self.addon_root.parent() {
            candidates.push(parent.join(".bin").join(&shim));
        }
        candidates.push(self.addon_root.join("node_modules").join(".bin").join(&shim));
        candidates
    }

    /// Candidate paths for node-gyp's entry script, in probe order.
    pub fn node_gyp_candidates(&self) -> Vec<PathBuf> {
        let script = Path::new(NODE_GYP).join("bin").join("node-gyp.js");

        let mut candidates = Vec::with_capacity(2);
        if let Some(parent) = self.addon_root.parent() {
            candidates.push(parent.join(&script));
        }
        candidates.push(self.addon_root.join("node_modules").join(&script));
        candidates
    }

    /// Command prefix that runs electron-rebuild.
    pub fn electron_rebuild(&self) -> PipelineResult<ProcessBuilder> {
        let candidates = self.electron_rebuild_candidates();
        let found = probe(&candidates).ok_or_else(|| PipelineError::ToolchainNotFound {
            tool: ELECTRON_REBUILD.to_string(),
            searched: candidates.clone(),
        })?;

        tracing::debug!("Using electron-rebuild at {}", found.display());
        Ok(ProcessBuilder::new(found).cwd(&self.addon_root))
    }

    /// Command prefix that runs node-gyp (`node <path>/node-gyp.js`).
    pub fn node_gyp(&self) -> PipelineResult<ProcessBuilder> {
        let candidates = self.node_gyp_candidates();
        let script = probe(&candidates).ok_or_else(|| PipelineError::ToolchainNotFound {
            tool: NODE_GYP.to_string(),
            searched: candidates.clone(),
        })?;

        let node = self.node.clone().ok_or_else(|| PipelineError::ToolchainNotFound {
            tool: "node".to_string(),
            searched: Vec::new(),
        })?;

        tracing::debug!("Using node-gyp at {}", script.display());
        Ok(ProcessBuilder::new(node).arg(script).cwd(&self.addon_root))
    }
}

fn probe(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}
