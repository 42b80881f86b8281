//! Archive extraction.
//!
//! Prebuilt addons are published as `.tar.gz`; vendor SDKs ship as `.zip`.
//! The format is detected from the leading magic bytes rather than the URL,
//! since SDK download links carry query strings instead of file extensions.

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from the first bytes of an archive.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&GZIP_MAGIC) {
            Some(ArchiveFormat::TarGz)
        } else if data.starts_with(&ZIP_MAGIC) {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }
}

/// Extract an archive held in memory into `dest`.
///
/// `dest` is created if needed. Existing files in `dest` are not removed;
/// callers wanting a clean directory must reset it first.
pub fn extract_archive(data: &[u8], dest: &Path) -> Result<ArchiveFormat> {
    let format = match ArchiveFormat::detect(data) {
        Some(format) => format,
        None => bail!("unrecognized archive format (expected .tar.gz or .zip)"),
    };

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    match format {
        ArchiveFormat::TarGz => extract_tarball(data, dest)?,
        ArchiveFormat::Zip => extract_zip(data, dest)?,
    }

    Ok(format)
}

/// Extract a gzip-compressed tarball.
pub fn extract_tarball(data: &[u8], dest: &Path) -> Result<()> {
    let decoder = GzDecoder::new(Cursor::new(data));
    let mut archive = Archive::new(decoder);

    for entry in archive
        .entries()
        .context("failed to read tarball entries")?
    {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry
            .path()
            .context("failed to get entry path")?
            .to_string_lossy()
            .into_owned();

        let entry_type = entry.header().entry_type();
        if !(entry_type.is_file() || entry_type.is_dir() || entry_type.is_symlink()) {
            tracing::debug!(
                "Skipping unsupported entry type {:?}: {}",
                entry_type,
                entry_path
            );
            continue;
        }

        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("failed to extract {}", entry_path))?;
        if !unpacked {
            bail!("tarball entry escapes destination directory: {}", entry_path);
        }
    }

    Ok(())
}

/// Extract a zip archive.
pub fn extract_zip(data: &[u8], dest: &Path) -> Result<()> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).context("failed to read zip archive")?;
    archive
        .extract(dest)
        .with_context(|| format!("failed to extract zip archive to {}", dest.display()))?;
    Ok(())
}
