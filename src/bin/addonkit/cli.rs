//! CLI definitions using clap.
//!
//! Every option that npm forwards to install scripts can also be given
//! through its `npm_config_*` environment variable.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use addonkit::core::{Arch, Platform, Runtime};

/// addonkit - acquire, build and package native Node/Electron addons
#[derive(Parser)]
#[command(name = "addonkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Don't echo toolchain output
    #[arg(short, long, global = true)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the prebuilt addon, building from source if none is published
    Install(InstallArgs),

    /// Download and extract the vendor SDK
    FetchSdk(TargetArgs),

    /// Compile the addon and package the result
    Build(TargetArgs),

    /// Package the existing build output
    Package(TargetArgs),

    /// Print the resolved artifact identity and its download URL
    Identity(IdentityArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Target selection shared by every pipeline command.
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Runtime version to build against (e.g. 13.1.2)
    #[arg(long, env = "npm_config_target")]
    pub target: Option<String>,

    /// Target platform [default: host]
    #[arg(long, env = "npm_config_target_platform")]
    pub target_platform: Option<Platform>,

    /// Target CPU architecture [default: host]
    #[arg(long, env = "npm_config_target_arch")]
    pub target_arch: Option<Arch>,

    /// Runtime flavor
    #[arg(long, env = "npm_config_runtime", default_value = "electron")]
    pub runtime: Runtime,

    /// Build with debug symbols
    #[arg(long)]
    pub debug: bool,

    /// Vendor SDK archive to use instead of the platform default
    #[arg(long, env = "npm_config_download_url")]
    pub download_url: Option<String>,

    /// Addon directory (defaults to the nearest package.json)
    #[arg(long)]
    pub addon_dir: Option<PathBuf>,

    /// Root of the project being installed into
    #[arg(long, env = "INIT_CWD")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Do nothing (npm's --skip-install)
    #[arg(long, env = "npm_config_skip_install", value_parser = FalseyValueParser::new())]
    pub skip_install: bool,
}

#[derive(Args)]
pub struct IdentityArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
