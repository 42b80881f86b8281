//! The `package` operation.
//!
//! Archives the build output directory into
//! `packages/<archive file name>`. The archive is reproducible: entries are
//! sorted and carry no timestamps or ownership, so packing unchanged output
//! twice yields byte-identical files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::{Compression, GzBuilder};
use serde::Serialize;

use crate::core::{ArtifactIdentity, PipelineError, PipelineResult};
use crate::util::context::AddonContext;
use crate::util::fs::{list_files_sorted, write_atomic};
use crate::util::hash::sha256_bytes;

/// A written package archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageArtifact {
    pub path: PathBuf,
    pub sha256: String,
    pub file_count: usize,
}

/// Package the build output of the addon at `ctx`.
pub fn pack(ctx: &AddonContext, identity: &ArtifactIdentity) -> PipelineResult<PackageArtifact> {
    let source = ctx.build_output_dir();
    let dest = ctx.packages_dir().join(identity.archive_file_name());

    if !source.is_dir() {
        return Err(PipelineError::pack(
            &dest,
            format!("build output {} does not exist", source.display()),
        ));
    }

    let files = list_files_sorted(&source).map_err(|e| PipelineError::pack(&dest, format!("{:#}", e)))?;
    if files.is_empty() {
        return Err(PipelineError::pack(
            &dest,
            format!("build output {} is empty", source.display()),
        ));
    }

    tracing::info!("Packing {} file(s) from {}", files.len(), source.display());

    let data = create_tarball(&source, &files).map_err(|e| PipelineError::pack(&dest, format!("{:#}", e)))?;
    write_atomic(&dest, &data).map_err(|e| PipelineError::pack(&dest, format!("{:#}", e)))?;

    let artifact = PackageArtifact {
        path: dest,
        sha256: sha256_bytes(&data),
        file_count: files.len(),
    };
    tracing::info!("Wrote {} (sha256 {})", artifact.path.display(), artifact.sha256);
    Ok(artifact)
}

/// Build a reproducible `.tar.gz` of `files` (relative to `root`).
pub fn create_tarball(root: &Path, files: &[PathBuf]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let encoder = GzBuilder::new().mtime(0).write(&mut out, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for rel in files {
            let path = root.join(rel);
            let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
            let metadata = file
                .metadata()
                .with_context(|| format!("failed to stat {}", path.display()))?;

            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(metadata.len());
            header.set_mode(file_mode(&metadata));
            header.set_mtime(0);
            header.set_uid(0);
            header.set_gid(0);

            builder
                .append_data(&mut header, rel, BufReader::new(file))
                .with_context(|| format!("failed to add {} to archive", rel.display()))?;
        }

        builder
            .into_inner()
            .context("failed to finish tar stream")?
            .finish()
            .context("failed to finish gzip stream")?;
    }
    Ok(out)
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    if metadata.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn file_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}
