//! The `install` operation.
//!
//! Downloads the prebuilt archive matching the resolved identity into the
//! build output directory. When that fails with a fetch error the vendor SDK
//! is fetched and the addon is compiled locally instead.

use std::path::Path;

use crate::core::{ArtifactIdentity, PipelineError, PipelineResult};
use crate::fetch::DownloadOptions;
use crate::ops::addon_build::compile;
use crate::ops::fetch_sdk::fetch_sdk;
use crate::ops::identity::{remote_ref, resolve_identity};
use crate::ops::options::{Collaborators, PipelineConfig};
use crate::ops::pipeline::{Fallback, FnStage, Outcome, Pipeline, Resolution};
use crate::util::context::AddonContext;
use crate::util::fs::remove_dir_all_if_exists;

/// How `install` obtained the addon.
#[derive(Debug)]
pub enum InstallReport {
    /// Installation was skipped on request; nothing was touched
    Skipped,
    /// The prebuilt archive was downloaded
    Prebuilt {
        identity: ArtifactIdentity,
        url: String,
    },
    /// The prebuilt archive was unavailable and the addon was built locally
    Built {
        identity: ArtifactIdentity,
        url: String,
        reason: PipelineError,
        outcome: Outcome,
    },
}

/// Install the addon at `ctx`.
pub fn install(
    ctx: &AddonContext,
    config: &PipelineConfig,
    deps: &Collaborators<'_>,
) -> PipelineResult<InstallReport> {
    if config.skip_install {
        tracing::info!("Skipping download of prebuilt binaries");
        return Ok(InstallReport::Skipped);
    }

    let identity = resolve_identity(ctx, config, deps.pins, deps.host)?;
    let url = remote_ref(&identity, config)?.url();
    let output_dir = ctx.build_output_dir();

    let prebuilt = FnStage::new("download of prebuilt binaries", || {
        download_prebuilt(&url, &output_dir, deps)
    });

    let chain = Pipeline::new()
        .then("fetch sdk", || {
            tracing::info!("Building from local sources");
            fetch_sdk(ctx, config, deps.downloader).map(|_| Outcome::Completed)
        })
        .then("build", || compile(&identity, config, deps));

    let report = match Fallback::new(prebuilt, chain).run()? {
        Resolution::Primary(_) => {
            tracing::info!("Downloaded prebuilt binaries from {}", url);
            InstallReport::Prebuilt { identity, url }
        }
        Resolution::Fallback { reason, outcome } => InstallReport::Built {
            identity,
            url,
            reason,
            outcome,
        },
    };
    Ok(report)
}

fn download_prebuilt(
    url: &str,
    output_dir: &Path,
    deps: &Collaborators<'_>,
) -> PipelineResult<Outcome> {
    let clear = |dir: &Path| {
        remove_dir_all_if_exists(dir)
            .map_err(|e| PipelineError::io_from(format!("failed to remove {}", dir.display()), e))
    };

    clear(output_dir)?;
    tracing::info!("Downloading {}", url);

    match deps
        .downloader
        .download(url, output_dir, DownloadOptions::extract())
    {
        Ok(_) => Ok(Outcome::Completed),
        Err(err) => {
            // Partially extracted files must not be mistaken for a build.
            clear(output_dir)?;
            Err(err)
        }
    }
}
