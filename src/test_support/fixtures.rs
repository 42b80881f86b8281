//! Test fixtures: addon checkouts and in-memory archives.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::builder::{CommandRunner, ToolLocator};
use crate::core::{PinnedVersionSource, Platform};
use crate::fetch::Downloader;
use crate::ops::Collaborators;
use crate::test_support::FixedHost;
use crate::util::context::AddonContext;

/// Package name of the fixture addon.
pub const FIXTURE_NAME: &str = "nertc-electron-sdk";

/// Version of the fixture addon.
pub const FIXTURE_VERSION: &str = "4.1.110";

/// An addon installed as a dependency:
/// `<tmp>/node_modules/nertc-electron-sdk` with its own `package.json`.
pub struct AddonFixture {
    tmp: TempDir,
    addon_root: PathBuf,
    host: FixedHost,
}

impl AddonFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let addon_root = tmp.path().join("node_modules").join(FIXTURE_NAME);
        std::fs::create_dir_all(&addon_root).expect("create addon root");
        std::fs::write(
            addon_root.join("package.json"),
            format!(
                r#"{{ "name": "{}", "version": "{}" }}"#,
                FIXTURE_NAME, FIXTURE_VERSION
            ),
        )
        .expect("write package.json");

        AddonFixture {
            tmp,
            addon_root,
            host: FixedHost::none(),
        }
    }

    /// Install an electron-rebuild shim (both unix and Windows names).
    pub fn with_electron_rebuild(self) -> Self {
        let bin = self.addon_root.join("node_modules").join(".bin");
        self.touch(&bin.join("electron-rebuild"), "");
        self.touch(&bin.join("electron-rebuild.cmd"), "");
        self
    }

    /// Install node-gyp into the addon's own `node_modules`.
    pub fn with_node_gyp(self) -> Self {
        let script = self
            .addon_root
            .join("node_modules/node-gyp/bin/node-gyp.js");
        self.touch(&script, "");
        self
    }

    /// Put a file into the build output directory.
    pub fn with_build_output(self, rel: &str, contents: &str) -> Self {
        let path = self.context().build_output_dir().join(rel);
        self.touch(&path, contents);
        self
    }

    pub fn addon_root(&self) -> &Path {
        &self.addon_root
    }

    pub fn context(&self) -> AddonContext {
        AddonContext::new(&self.addon_root)
    }

    /// A tool locator probing this fixture as if running on `host`.
    pub fn tools(&self, host: Platform) -> ToolLocator {
        ToolLocator::new(&self.addon_root)
            .with_host(host)
            .with_node("node")
    }

    /// Collaborators wired to fakes; the host runtime reports nothing.
    pub fn collaborators<'a>(
        &'a self,
        downloader: &'a dyn Downloader,
        runner: &'a dyn CommandRunner,
        tools: &'a ToolLocator,
        pins: &'a dyn PinnedVersionSource,
    ) -> Collaborators<'a> {
        Collaborators {
            downloader,
            runner,
            pins,
            host: &self.host,
            tools,
        }
    }

    /// Every path under the fixture root, sorted.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        WalkDir::new(self.tmp.path())
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    fn touch(&self, path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write fixture file");
    }
}

impl Default for AddonFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a `.tar.gz` in memory from `(path, contents)` pairs.
pub fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut data, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .expect("append tar entry");
        }
        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish gzip");
    }
    data
}

/// Build a `.zip` in memory from `(path, contents)` pairs.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (path, contents) in entries {
        writer.start_file(*path, options).expect("start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
