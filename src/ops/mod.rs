//! High-level operations.
//!
//! This module contains the implementation of addonkit commands.

pub mod addon_build;
pub mod fetch_sdk;
pub mod identity;
pub mod install;
pub mod options;
pub mod pack;
pub mod pipeline;

pub use addon_build::{build_and_pack, build_config, compile, BuildReport};
pub use fetch_sdk::fetch_sdk;
pub use identity::{remote_ref, resolve_identity};
pub use install::{install, InstallReport};
pub use options::{Collaborators, PipelineConfig};
pub use pack::{create_tarball, pack, PackageArtifact};
pub use pipeline::{Fallback, FnStage, Outcome, Pipeline, Resolution, Stage};
