//! Core data structures for addonkit.
//!
//! This module contains the foundational types used throughout the pipeline:
//! - Artifact identity (platform, arch, runtime, naming template)
//! - Runtime version resolution
//! - `package.json` metadata
//! - The pipeline error taxonomy

pub mod error;
pub mod identity;
pub mod project;
pub mod runtime;

pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use identity::{Arch, ArtifactIdentity, Platform, RemoteArtifactRef, Runtime};
pub use project::{PackageJsonPins, PackageManifest, PackageMeta, PinnedVersionSource};
pub use runtime::{
    resolve_runtime, HostRuntime, NodeHost, RuntimeTarget, RuntimeVersion,
    FALLBACK_ELECTRON_VERSION,
};
