//! Artifact identity resolution for an addon checkout.

use crate::core::{
    resolve_runtime, ArtifactIdentity, HostRuntime, PackageMeta, PinnedVersionSource,
    PipelineResult, RemoteArtifactRef,
};
use crate::ops::options::PipelineConfig;
use crate::util::context::AddonContext;

/// Resolve the identity of the addon at `ctx`.
pub fn resolve_identity(
    ctx: &AddonContext,
    config: &PipelineConfig,
    pins: &dyn PinnedVersionSource,
    host: &dyn HostRuntime,
) -> PipelineResult<ArtifactIdentity> {
    let meta = PackageMeta::load(ctx.addon_root())?;
    let runtime = resolve_runtime(config.explicit_target(), ctx.project_root(), pins, host)?;

    let identity = ArtifactIdentity::new(meta.name, meta.version, config.platform, config.arch, runtime);
    tracing::debug!("Resolved identity {}", identity);
    Ok(identity)
}

/// Where the prebuilt archive for `identity` is published.
pub fn remote_ref(
    identity: &ArtifactIdentity,
    config: &PipelineConfig,
) -> PipelineResult<RemoteArtifactRef> {
    identity.remote_ref(config.settings.remote_host(), config.settings.remote_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arch, Platform, Runtime};
    use crate::test_support::{AddonFixture, FixedHost, FixedPins};

    #[test]
    fn test_identity_from_pin() {
        let fixture = AddonFixture::new();
        let config = PipelineConfig {
            platform: Platform::Win32,
            arch: Arch::Ia32,
            ..Default::default()
        };

        let identity = resolve_identity(
            &fixture.context(),
            &config,
            &FixedPins::some("^13.1.2"),
            &FixedHost::some("v16.14.0"),
        )
        .unwrap();

        assert_eq!(identity.runtime().runtime, Runtime::Electron);
        assert_eq!(identity.node_abi(), "electron-v13.1");

        let remote = remote_ref(&identity, &config).unwrap();
        assert_eq!(
            remote.url(),
            "https://yx-web-nosdn.netease.im/package/nertc-electron-sdk-v4.1.110-electron-v13.1-win32-ia32.tar.gz"
        );
    }

    #[test]
    fn test_explicit_target_wins() {
        let fixture = AddonFixture::new();
        let config = PipelineConfig {
            platform: Platform::Darwin,
            arch: Arch::X64,
            runtime: Runtime::Node,
            target: Some("18.2.1".into()),
            ..Default::default()
        };

        let identity = resolve_identity(
            &fixture.context(),
            &config,
            &FixedPins::some("13.1.2"),
            &FixedHost::none(),
        )
        .unwrap();

        assert_eq!(
            identity.archive_file_name(),
            "nertc-electron-sdk-v4.1.110-node-v18.2-darwin-x64.tar.gz"
        );
    }

    #[test]
    fn test_missing_package_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ctx = AddonContext::new(tmp.path());

        let err = resolve_identity(
            &ctx,
            &PipelineConfig::default(),
            &FixedPins::none(),
            &FixedHost::none(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Io);
    }
}
