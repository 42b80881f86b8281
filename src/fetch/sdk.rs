//! Vendor SDK acquisition.
//!
//! The SDK is downloaded into a scratch directory and then unpacked into a
//! fixed include directory. Extraction replaces the include directory
//! wholesale: files from a previously extracted SDK never survive.

use std::path::{Path, PathBuf};

use crate::core::{Arch, PipelineError, PipelineResult, Platform};
use crate::fetch::archive::extract_archive;
use crate::fetch::{DownloadOptions, Downloader};
use crate::util::config::Config;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};

/// Where a vendor SDK comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSdkRef {
    fetch_url: String,
    temporary_download_path: PathBuf,
    extracted_include_path: PathBuf,
}

impl VendorSdkRef {
    /// Build a reference from an explicit URL.
    pub fn new(
        fetch_url: impl Into<String>,
        temporary_download_path: impl Into<PathBuf>,
        extracted_include_path: impl Into<PathBuf>,
    ) -> Self {
        VendorSdkRef {
            fetch_url: fetch_url.into(),
            temporary_download_path: temporary_download_path.into(),
            extracted_include_path: extracted_include_path.into(),
        }
    }

    /// Pick the SDK URL for `platform`: the explicit override if given,
    /// otherwise the configured platform default.
    ///
    /// Platforms without a default require an explicit URL.
    pub fn for_platform(
        platform: Platform,
        fetch_url: Option<&str>,
        config: &Config,
        temporary_download_path: &Path,
        extracted_include_path: &Path,
    ) -> PipelineResult<Self> {
        let url = match fetch_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => url,
            None => config
                .default_sdk_url(platform)
                .ok_or(PipelineError::UnsupportedPlatform { platform })?,
        };

        Ok(Self::new(
            url,
            temporary_download_path,
            extracted_include_path,
        ))
    }

    pub fn fetch_url(&self) -> &str {
        &self.fetch_url
    }

    pub fn temporary_download_path(&self) -> &Path {
        &self.temporary_download_path
    }

    pub fn extracted_include_path(&self) -> &Path {
        &self.extracted_include_path
    }
}

/// Downloads and unpacks the vendor SDK.
pub struct WrapperFetcher<'a> {
    downloader: &'a dyn Downloader,
}

impl<'a> WrapperFetcher<'a> {
    pub fn new(downloader: &'a dyn Downloader) -> Self {
        WrapperFetcher { downloader }
    }

    /// Fetch the SDK described by `sdk` and extract it.
    ///
    /// The raw archive is left in the temporary download path. Returns the
    /// include path.
    pub fn fetch(&self, platform: Platform, arch: Arch, sdk: &VendorSdkRef) -> PipelineResult<PathBuf> {
        let url = sdk.fetch_url();
        let temp = sdk.temporary_download_path();
        let include = sdk.extracted_include_path();

        tracing::info!("Fetching {}-{} SDK from {}", platform, arch, url);

        ensure_dir(temp).map_err(|e| {
            PipelineError::io_from(format!("failed to create {}", temp.display()), e)
        })?;
        let archive_path = self
            .downloader
            .download(url, temp, DownloadOptions::save())?;

        let data = std::fs::read(&archive_path).map_err(|e| {
            PipelineError::io(format!("failed to read {}", archive_path.display()), e)
        })?;

        replace_with_archive(&data, include, url)?;

        tracing::info!("Extracted SDK into {}", include.display());
        Ok(include.to_path_buf())
    }
}

/// Extract into a staging directory next to `dest`, then swap it into place.
///
/// A malformed archive leaves `dest` untouched and is reported against `url`.
/// Failing to move the staged tree into place is a local I/O error.
fn replace_with_archive(data: &[u8], dest: &Path, url: &str) -> PipelineResult<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent).map_err(|e| {
        PipelineError::io_from(format!("failed to create {}", parent.display()), e)
    })?;

    let staging = tempfile::Builder::new()
        .prefix(".sdk-staging-")
        .tempdir_in(parent)
        .map_err(|e| {
            PipelineError::io(format!("failed to create staging dir in {}", parent.display()), e)
        })?;
    extract_archive(data, staging.path())
        .map_err(|e| PipelineError::fetch(url, None, format!("{:#}", e)))?;

    remove_dir_all_if_exists(dest).map_err(|e| {
        PipelineError::io_from(format!("failed to remove old SDK at {}", dest.display()), e)
    })?;
    // The staging guard's cleanup is a no-op once the directory has moved.
    std::fs::rename(staging.path(), dest).map_err(|e| {
        PipelineError::io(format!("failed to move SDK into {}", dest.display()), e)
    })?;
    Ok(())
}
