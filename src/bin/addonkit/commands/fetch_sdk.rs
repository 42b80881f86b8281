//! `addonkit fetch-sdk` command

use anyhow::Result;

use super::{GlobalArgs, Session};
use crate::cli::TargetArgs;
use addonkit::ops::fetch_sdk;

pub fn execute(args: TargetArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args, global)?;

    let include = fetch_sdk(
        &session.ctx,
        &session.config,
        session.collaborators().downloader,
    )?;

    eprintln!("    Finished SDK -> {}", include.display());
    Ok(())
}
