//! addonkit - acquire, build and package native Node/Electron addons
//!
//! This crate provides the library behind the `addonkit` binary: artifact
//! identity resolution, prebuilt and vendor SDK downloads, native toolchain
//! invocation and packaging, tied together by the install pipeline.

pub mod builder;
pub mod core;
pub mod fetch;
pub mod ops;
pub mod util;

/// Test doubles for addonkit unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides fakes for the downloader, the toolchain
/// runner, the consuming project and the host runtime.
#[cfg(test)]
pub mod test_support;

pub use core::{ArtifactIdentity, PipelineError, PipelineResult};
pub use ops::PipelineConfig;
pub use util::context::AddonContext;
