//! `addonkit package` command

use anyhow::Result;

use super::{GlobalArgs, Session};
use crate::cli::TargetArgs;
use addonkit::ops::{pack, resolve_identity};

pub fn execute(args: TargetArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args, global)?;
    tracing::info!("{}", session.config.to_json());

    let deps = session.collaborators();
    let identity = resolve_identity(&session.ctx, &session.config, deps.pins, deps.host)?;
    let artifact = pack(&session.ctx, &identity)?;

    eprintln!(
        "    Finished `{}` -> {} ({} files)",
        identity.node_abi(),
        artifact.path.display(),
        artifact.file_count
    );
    eprintln!("      sha256 {}", artifact.sha256);
    Ok(())
}
