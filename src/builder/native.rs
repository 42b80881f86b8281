//! Native addon compilation.
//!
//! Electron addons are rebuilt with a single `electron-rebuild` call. Plain
//! node addons go through node-gyp's `clean`, `configure` and `build`
//! subcommands, stopping at the first failure.

use std::time::Duration;

use serde::Serialize;

use crate::builder::flags::{BuildFlag, FlagSet};
use crate::builder::toolchain::ToolLocator;
use crate::core::{Arch, PipelineError, PipelineResult, Platform, Runtime, RuntimeTarget};
use crate::util::process::ProcessBuilder;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs toolchain subprocesses.
pub trait CommandRunner {
    /// Run `cmd` to completion and capture its output.
    ///
    /// Errors are reserved for processes that could not be run at all
    /// (spawn failure, deadline exceeded). A non-zero exit is not an error.
    fn run(&self, cmd: &ProcessBuilder) -> anyhow::Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder) -> anyhow::Result<CommandOutput> {
        let output = cmd.exec()?;
        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Everything a native build needs to know. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    pub runtime: RuntimeTarget,
    pub platform: Platform,
    pub arch: Arch,
    pub debug: bool,
    pub silent: bool,
    pub dist_url: String,
    pub msvs_version: String,
    #[serde(skip)]
    pub stage_timeout: Option<Duration>,
}

impl BuildConfig {
    pub fn node_abi(&self) -> String {
        self.runtime.node_abi()
    }
}

/// How a successful build ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Binaries are in the build output directory
    Complete,
    /// Project files were generated for a debug build; compile them by hand
    ManualBuildRequired,
}

/// Drives electron-rebuild or node-gyp for one addon.
pub struct NativeBuilder<'a> {
    tools: &'a ToolLocator,
    runner: &'a dyn CommandRunner,
}

impl<'a> NativeBuilder<'a> {
    pub fn new(tools: &'a ToolLocator, runner: &'a dyn CommandRunner) -> Self {
        NativeBuilder { tools, runner }
    }

    /// Build the addon for `config`.
    pub fn build(&self, config: &BuildConfig) -> PipelineResult<BuildOutcome> {
        tracing::info!(
            "Building for {} {} ({}-{}{})",
            config.runtime.runtime,
            config.runtime.version,
            config.platform,
            config.arch,
            if config.debug { ", debug" } else { "" }
        );

        match config.runtime.runtime {
            Runtime::Electron => self.build_electron(config),
            Runtime::Node => self.build_node(config),
        }
    }

    fn build_electron(&self, config: &BuildConfig) -> PipelineResult<BuildOutcome> {
        let rebuild = self.tools.electron_rebuild()?;

        let mut flags = FlagSet::new();
        flags
            .push(BuildFlag::ModuleDir(self.tools.addon_root().to_path_buf()))
            .push_if(
                config.platform == Platform::Win32,
                BuildFlag::Arch(config.arch),
            )
            .push_if(config.debug, BuildFlag::Debug);

        self.run_stage("electron-rebuild", rebuild.args(flags.render()), config)?;

        tracing::info!("Build complete");
        Ok(BuildOutcome::Complete)
    }

    fn build_node(&self, config: &BuildConfig) -> PipelineResult<BuildOutcome> {
        let gyp = self.tools.node_gyp()?;
        let win32 = config.platform == Platform::Win32;

        self.run_stage("node-gyp clean", gyp.clone().arg("clean"), config)?;

        let mut flags = FlagSet::new();
        flags
            .push_if(win32, BuildFlag::Arch(config.arch))
            .push_if(win32, BuildFlag::MsvsVersion(config.msvs_version.clone()))
            .push(BuildFlag::Target(config.runtime.version.to_string()))
            .push(BuildFlag::DistUrl(config.dist_url.clone()))
            .push_if(config.debug, BuildFlag::Debug)
            .push_if(
                config.debug && config.platform == Platform::Darwin,
                BuildFlag::Generator("xcode".to_string()),
            );

        self.run_stage(
            "node-gyp configure",
            gyp.clone().arg("configure").args(flags.render()),
            config,
        )?;

        if config.debug {
            tracing::info!(
                "Configured debug build; open {} and build manually",
                self.tools.addon_root().join("build").display()
            );
            return Ok(BuildOutcome::ManualBuildRequired);
        }

        self.run_stage("node-gyp build", gyp.arg("build"), config)?;

        tracing::info!("Build complete");
        Ok(BuildOutcome::Complete)
    }

    fn run_stage(
        &self,
        stage: &str,
        cmd: ProcessBuilder,
        config: &BuildConfig,
    ) -> PipelineResult<CommandOutput> {
        let cmd = cmd.timeout(config.stage_timeout);
        tracing::info!("{}", cmd.display_command());

        let output = self.runner.run(&cmd).map_err(|e| PipelineError::Build {
            stage: stage.to_string(),
            exit_code: None,
            stderr: format!("{:#}", e),
        })?;

        if !config.silent && !output.stdout.trim().is_empty() {
            tracing::info!("{}", output.stdout.trim_end());
        }

        if !output.success() {
            tracing::error!("{} failed", stage);
            if !output.stderr.trim().is_empty() {
                tracing::error!("{}", output.stderr.trim_end());
            }
            return Err(PipelineError::Build {
                stage: stage.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}
