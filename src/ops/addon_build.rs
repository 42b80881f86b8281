//! The `build` operation: compile the addon, then package it.

use crate::builder::{BuildConfig, BuildOutcome, NativeBuilder};
use crate::core::{ArtifactIdentity, PipelineResult};
use crate::ops::identity::resolve_identity;
use crate::ops::options::{Collaborators, PipelineConfig};
use crate::ops::pack::{pack, PackageArtifact};
use crate::ops::pipeline::Outcome;
use crate::util::context::AddonContext;

/// Result of a `build` run.
#[derive(Debug)]
pub struct BuildReport {
    pub identity: ArtifactIdentity,
    pub outcome: Outcome,
    /// `None` when the build stopped before producing binaries
    pub artifact: Option<PackageArtifact>,
}

/// Assemble the native build settings for `identity`.
pub fn build_config(identity: &ArtifactIdentity, config: &PipelineConfig) -> BuildConfig {
    let runtime = identity.runtime().clone();
    BuildConfig {
        dist_url: config.settings.dist_url(runtime.runtime).to_string(),
        msvs_version: config.settings.msvs_version().to_string(),
        stage_timeout: config.settings.stage_timeout(),
        runtime,
        platform: identity.platform(),
        arch: identity.arch(),
        debug: config.debug,
        silent: config.silent,
    }
}

/// Compile the addon for `identity`.
pub fn compile(
    identity: &ArtifactIdentity,
    config: &PipelineConfig,
    deps: &Collaborators<'_>,
) -> PipelineResult<Outcome> {
    let outcome = NativeBuilder::new(deps.tools, deps.runner).build(&build_config(identity, config))?;
    Ok(match outcome {
        BuildOutcome::Complete => Outcome::Completed,
        BuildOutcome::ManualBuildRequired => Outcome::ManualBuildRequired,
    })
}

/// Compile and package the addon at `ctx`.
///
/// A debug node build only generates project files, so nothing is packaged.
pub fn build_and_pack(
    ctx: &AddonContext,
    config: &PipelineConfig,
    deps: &Collaborators<'_>,
) -> PipelineResult<BuildReport> {
    tracing::info!("{}", config.to_json());

    let identity = resolve_identity(ctx, config, deps.pins, deps.host)?;
    let outcome = compile(&identity, config, deps)?;

    let artifact = match outcome {
        Outcome::Completed => Some(pack(ctx, &identity)?),
        Outcome::ManualBuildRequired => None,
    };

    Ok(BuildReport {
        identity,
        outcome,
        artifact,
    })
}
