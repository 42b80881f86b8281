//! The `fetch-sdk` operation.

use std::path::PathBuf;

use crate::core::PipelineResult;
use crate::fetch::{Downloader, VendorSdkRef, WrapperFetcher};
use crate::ops::options::PipelineConfig;
use crate::util::context::AddonContext;

/// Download the vendor SDK for the configured platform and extract it into
/// the addon's include directory. Returns the include directory.
pub fn fetch_sdk(
    ctx: &AddonContext,
    config: &PipelineConfig,
    downloader: &dyn Downloader,
) -> PipelineResult<PathBuf> {
    let sdk = VendorSdkRef::for_platform(
        config.platform,
        config.download_url(),
        &config.settings,
        ctx.temp_dir(),
        ctx.include_dir(),
    )?;

    WrapperFetcher::new(downloader).fetch(config.platform, config.arch, &sdk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arch, Platform};
    use crate::test_support::{zip_archive, AddonFixture, FakeDownloader};
    use crate::util::config::DEFAULT_DARWIN_SDK_URL;

    #[test]
    fn test_fetch_sdk_uses_platform_default() {
        let fixture = AddonFixture::new();
        let downloader = FakeDownloader::new().serve(
            DEFAULT_DARWIN_SDK_URL,
            zip_archive(&[("NERtcSDK.framework/Headers/INERtcEngine.h", "")]),
        );
        let config = PipelineConfig {
            platform: Platform::Darwin,
            arch: Arch::X64,
            ..Default::default()
        };

        let include = fetch_sdk(&fixture.context(), &config, &downloader).unwrap();

        assert_eq!(include, fixture.addon_root().join("nertc_sdk"));
        assert!(include
            .join("NERtcSDK.framework/Headers/INERtcEngine.h")
            .is_file());
        assert_eq!(downloader.calls(), vec![DEFAULT_DARWIN_SDK_URL.to_string()]);
    }

    #[test]
    fn test_fetch_sdk_override_url() {
        let fixture = AddonFixture::new();
        let url = "https://mirror.example.com/linux-sdk.zip";
        let downloader = FakeDownloader::new().serve(url, zip_archive(&[("lib/libnertc.so", "")]));
        let config = PipelineConfig {
            platform: Platform::Linux,
            download_url: Some(url.to_string()),
            ..Default::default()
        };

        let include = fetch_sdk(&fixture.context(), &config, &downloader).unwrap();
        assert!(include.join("lib/libnertc.so").is_file());
    }
}
