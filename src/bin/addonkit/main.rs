//! addonkit CLI - acquire, build and package native Node/Electron addons

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use addonkit::PipelineError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        report(&e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("addonkit=debug")
    } else {
        EnvFilter::new("addonkit=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = commands::GlobalArgs {
        silent: cli.silent,
    };

    match cli.command {
        Commands::Install(args) => commands::install::execute(args, &global),
        Commands::FetchSdk(args) => commands::fetch_sdk::execute(args, &global),
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Package(args) => commands::package::execute(args, &global),
        Commands::Identity(args) => commands::identity::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("error: {:#}", err);

    if let Some(pipeline) = err.downcast_ref::<PipelineError>() {
        if let Some(stderr) = pipeline.stderr() {
            eprintln!("\n{}", stderr.trim_end());
        }
        if let Some(help) = pipeline.help() {
            eprintln!("\nhelp: {}", help);
        }
    }
}
