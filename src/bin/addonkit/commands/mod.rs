//! Command implementations

pub mod build;
pub mod completions;
pub mod fetch_sdk;
pub mod identity;
pub mod install;
pub mod package;

use anyhow::Result;

use crate::cli::TargetArgs;
use addonkit::builder::{SystemRunner, ToolLocator};
use addonkit::core::{Arch, NodeHost, PackageJsonPins, Platform};
use addonkit::fetch::HttpDownloader;
use addonkit::ops::{Collaborators, PipelineConfig};
use addonkit::util::config::{global_config_path, load_config, Config};
use addonkit::util::AddonContext;

/// Options that apply to every command.
pub struct GlobalArgs {
    pub silent: bool,
}

/// Paths, options and real collaborators for one invocation.
pub struct Session {
    pub ctx: AddonContext,
    pub config: PipelineConfig,
    downloader: HttpDownloader,
    runner: SystemRunner,
    pins: PackageJsonPins,
    host: NodeHost,
    tools: ToolLocator,
}

impl Session {
    /// Locate the addon, load config files and apply command-line options.
    pub fn open(args: &TargetArgs, global: &GlobalArgs) -> Result<Self> {
        let ctx = match &args.addon_dir {
            Some(dir) => AddonContext::discover(dir)?,
            None => AddonContext::from_cwd()?,
        };

        // Load configuration (global + project)
        let project_config = ctx.project_config_path();
        let settings = match global_config_path() {
            Some(global_path) => load_config(&global_path, &project_config),
            None => Config::load_or_default(&project_config),
        };

        let mut ctx = ctx.with_config(&settings);
        if let Some(project_dir) = &args.project_dir {
            ctx = ctx.with_project_root(project_dir);
        }

        let downloader =
            HttpDownloader::new(settings.net_timeout())?.with_progress(!global.silent);
        let tools = ToolLocator::new(ctx.addon_root());

        let config = PipelineConfig {
            platform: args.target_platform.unwrap_or_else(Platform::host),
            arch: args.target_arch.unwrap_or_else(Arch::host),
            runtime: args.runtime,
            target: args.target.clone(),
            debug: args.debug,
            silent: global.silent,
            download_url: args.download_url.clone(),
            skip_install: false,
            settings,
        };

        tracing::debug!(
            "Addon root {}, project root {}",
            ctx.addon_root().display(),
            ctx.project_root().display()
        );

        Ok(Session {
            ctx,
            config,
            downloader,
            runner: SystemRunner,
            pins: PackageJsonPins,
            host: NodeHost,
            tools,
        })
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            downloader: &self.downloader,
            runner: &self.runner,
            pins: &self.pins,
            host: &self.host,
            tools: &self.tools,
        }
    }
}
