//! Test doubles for addonkit unit tests.
//!
//! Every collaborator the pipeline talks to (the network, the toolchain,
//! the consuming project and the host runtime) has an in-process fake here,
//! so the orchestration can be tested without a server or a compiler.
//!
//! # Example
//!
//! ```rust,ignore
//! use addonkit::test_support::{AddonFixture, FakeDownloader, FixedPins, RecordingRunner};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = AddonFixture::new().with_node_gyp();
//!     let runner = RecordingRunner::new().fail_on("clean", 1, "EACCES");
//!     let downloader = FakeDownloader::new().fail("https://host/a.tar.gz", 404);
//!     // ...
//!     assert_eq!(runner.subcommands(), vec!["clean"]);
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::bail;

use crate::builder::{CommandOutput, CommandRunner};
use crate::core::{HostRuntime, PinnedVersionSource, PipelineError, PipelineResult};
use crate::fetch::{extract_archive, file_name_from_url, DownloadOptions, Downloader};
use crate::util::process::ProcessBuilder;

pub use fixtures::*;

/// A consuming project with a fixed (or no) electron pin.
#[derive(Debug, Clone, Default)]
pub struct FixedPins {
    pin: Option<String>,
}

impl FixedPins {
    pub fn some(pin: &str) -> Self {
        FixedPins {
            pin: Some(pin.to_string()),
        }
    }

    pub fn none() -> Self {
        FixedPins { pin: None }
    }
}

impl PinnedVersionSource for FixedPins {
    fn resolve_pinned_runtime_version(&self, _project_root: &Path) -> PipelineResult<Option<String>> {
        Ok(self.pin.clone())
    }
}

/// A host runtime reporting a fixed version, or nothing.
#[derive(Debug, Clone, Default)]
pub struct FixedHost {
    version: Option<String>,
}

impl FixedHost {
    pub fn some(version: &str) -> Self {
        FixedHost {
            version: Some(version.to_string()),
        }
    }

    pub fn none() -> Self {
        FixedHost { version: None }
    }
}

impl HostRuntime for FixedHost {
    fn version(&self) -> Option<String> {
        self.version.clone()
    }
}

#[derive(Debug, Clone)]
enum FakeResponse {
    Body(Vec<u8>),
    Status(u16),
}

/// In-memory downloader.
///
/// URLs without a registered response answer 404.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    responses: HashMap<String, FakeResponse>,
    calls: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Body(body));
        self
    }

    /// Answer `url` with an HTTP error status.
    pub fn fail(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Status(status));
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Downloader for FakeDownloader {
    fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        options: DownloadOptions,
    ) -> PipelineResult<PathBuf> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }

        let body = match self.responses.get(url) {
            Some(FakeResponse::Body(body)) => body,
            Some(FakeResponse::Status(status)) => {
                return Err(PipelineError::fetch(url, Some(*status), format!("HTTP {}", status)))
            }
            None => return Err(PipelineError::fetch(url, Some(404), "HTTP 404")),
        };

        if options.extract {
            extract_archive(body, dest_dir)
                .map_err(|e| PipelineError::fetch(url, None, format!("{:#}", e)))?;
            return Ok(dest_dir.to_path_buf());
        }

        std::fs::create_dir_all(dest_dir)
            .map_err(|e| PipelineError::io(format!("failed to create {}", dest_dir.display()), e))?;
        let path = dest_dir.join(file_name_from_url(url));
        std::fs::write(&path, body)
            .map_err(|e| PipelineError::io(format!("failed to write {}", path.display()), e))?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
enum RunRule {
    Exit { code: i32, stderr: String },
    Error(String),
    Create(PathBuf),
}

/// Records commands instead of running them.
///
/// Rules are keyed by subcommand (`clean`, `configure`, `build`) or, for
/// tools without one, by executable name (`electron-rebuild`). Commands
/// without a matching exit rule succeed.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    rules: Vec<(String, RunRule)>,
    commands: Mutex<Vec<ProcessBuilder>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` and `stderr` when `key` runs.
    pub fn fail_on(mut self, key: &str, code: i32, stderr: &str) -> Self {
        self.rules.push((
            key.to_string(),
            RunRule::Exit {
                code,
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    /// Fail to run at all (as on a spawn failure or timeout) when `key` runs.
    pub fn error_on(mut self, key: &str, message: &str) -> Self {
        self.rules
            .push((key.to_string(), RunRule::Error(message.to_string())));
        self
    }

    /// Write a file at `path` when `key` runs, standing in for build output.
    pub fn create_on(mut self, key: &str, path: impl Into<PathBuf>) -> Self {
        self.rules.push((key.to_string(), RunRule::Create(path.into())));
        self
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<ProcessBuilder> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The subcommand (or executable name) of each command run so far.
    pub fn subcommands(&self) -> Vec<String> {
        self.commands().iter().map(subcommand).collect()
    }
}

fn subcommand(cmd: &ProcessBuilder) -> String {
    cmd.get_args()
        .iter()
        .find(|a| !a.starts_with('-') && !a.ends_with(".js"))
        .cloned()
        .unwrap_or_else(|| {
            cmd.get_program()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ProcessBuilder) -> anyhow::Result<CommandOutput> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(cmd.clone());
        }

        let name = subcommand(cmd);
        for (key, rule) in &self.rules {
            if !name.starts_with(key.as_str()) {
                continue;
            }
            match rule {
                RunRule::Exit { code, stderr } => {
                    return Ok(CommandOutput {
                        exit_code: Some(*code),
                        stdout: String::new(),
                        stderr: stderr.clone(),
                    })
                }
                RunRule::Error(message) => bail!("{}", message),
                RunRule::Create(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, name.as_bytes())?;
                }
            }
        }

        Ok(CommandOutput {
            exit_code: Some(0),
            stdout: format!("{} ok", name),
            stderr: String::new(),
        })
    }
}
