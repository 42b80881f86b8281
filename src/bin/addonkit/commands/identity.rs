//! `addonkit identity` command
//!
//! Prints what `install` would download, for use in CI scripts.

use anyhow::Result;
use serde_json::json;

use super::{GlobalArgs, Session};
use crate::cli::IdentityArgs;
use addonkit::ops::{remote_ref, resolve_identity};

pub fn execute(args: IdentityArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(&args.target, global)?;

    let deps = session.collaborators();
    let identity = resolve_identity(&session.ctx, &session.config, deps.pins, deps.host)?;
    let remote = remote_ref(&identity, &session.config)?;

    if args.json {
        let value = json!({
            "name": identity.package_name(),
            "version": identity.version().to_string(),
            "platform": identity.platform(),
            "arch": identity.arch(),
            "runtime": identity.runtime().runtime,
            "runtime_version": identity.runtime().version,
            "node_abi": identity.node_abi(),
            "file_name": remote.file_name(),
            "url": remote.url(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", identity);
        println!("{}", remote.url());
    }

    Ok(())
}
