//! `addonkit install` command

use anyhow::Result;

use super::{GlobalArgs, Session};
use crate::cli::InstallArgs;
use addonkit::ops::{install, InstallReport, Outcome};

pub fn execute(args: InstallArgs, global: &GlobalArgs) -> Result<()> {
    // npm runs install scripts from arbitrary directories; skipping must not
    // depend on finding the addon.
    if args.skip_install {
        tracing::info!("Skipping download of prebuilt binaries");
        return Ok(());
    }

    let session = Session::open(&args.target, global)?;

    match install(&session.ctx, &session.config, &session.collaborators())? {
        InstallReport::Skipped => {}
        InstallReport::Prebuilt { identity, url } => {
            eprintln!("    Finished {} (prebuilt from {})", identity, url);
        }
        InstallReport::Built {
            identity, outcome, ..
        } => match outcome {
            Outcome::Completed => eprintln!("    Finished {} (built from source)", identity),
            Outcome::ManualBuildRequired => eprintln!(
                "    Configured {}; build manually in {}",
                identity,
                session.ctx.build_dir().display()
            ),
        },
    }

    Ok(())
}
