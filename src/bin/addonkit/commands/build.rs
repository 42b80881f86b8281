//! `addonkit build` command

use anyhow::Result;

use super::{GlobalArgs, Session};
use crate::cli::TargetArgs;
use addonkit::ops::build_and_pack;

pub fn execute(args: TargetArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args, global)?;

    let report = build_and_pack(&session.ctx, &session.config, &session.collaborators())?;

    match report.artifact {
        Some(artifact) => {
            eprintln!(
                "    Finished `{}` -> {}",
                report.identity.node_abi(),
                artifact.path.display()
            );
            eprintln!("      sha256 {}", artifact.sha256);
        }
        None => eprintln!(
            "    Configured {}; build manually in {}",
            report.identity,
            session.ctx.build_dir().display()
        ),
    }

    Ok(())
}
