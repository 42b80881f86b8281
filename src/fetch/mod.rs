//! Remote artifact acquisition.
//!
//! Everything that touches the network goes through the [`Downloader`]
//! trait, so the orchestration logic can be exercised without a server.

pub mod archive;
pub mod http;
pub mod sdk;

use std::path::{Path, PathBuf};

use url::Url;

use crate::core::PipelineResult;

pub use archive::{extract_archive, ArchiveFormat};
pub use http::HttpDownloader;
pub use sdk::{VendorSdkRef, WrapperFetcher};

/// How a download should be stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Extract the archive into the destination instead of saving the file
    pub extract: bool,
}

impl DownloadOptions {
    pub fn extract() -> Self {
        DownloadOptions { extract: true }
    }

    pub fn save() -> Self {
        DownloadOptions { extract: false }
    }
}

/// Fetches a URL into a local directory.
pub trait Downloader {
    /// Download `url` into `dest_dir`.
    ///
    /// With `extract`, the archive's contents land in `dest_dir` and
    /// `dest_dir` is returned. Otherwise the raw file is saved under the name
    /// given by [`file_name_from_url`] and its path is returned.
    ///
    /// Transport errors, non-2xx responses and malformed archives are all
    /// reported as [`PipelineError::Fetch`](crate::core::PipelineError::Fetch).
    fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        options: DownloadOptions,
    ) -> PipelineResult<PathBuf>;
}

/// File name a saved download is stored under: the URL's last path segment.
pub fn file_name_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url(
                "https://yx-web-nosdn.netease.im/package/1628698786/NERTC_Mac_SDK_v4.1.110.zip?download=NERTC_Mac_SDK_v4.1.110.zip"
            ),
            "NERTC_Mac_SDK_v4.1.110.zip"
        );
        assert_eq!(file_name_from_url("https://example.com/"), "download");
        assert_eq!(file_name_from_url("not a url"), "download");
    }
}
