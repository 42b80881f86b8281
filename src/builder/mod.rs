//! Native addon build.
//!
//! Locates the node toolchain, assembles its command lines from typed flags
//! and runs the electron or node flavored build.

pub mod flags;
pub mod native;
pub mod toolchain;

pub use flags::{BuildFlag, FlagSet};
pub use native::{
    BuildConfig, BuildOutcome, CommandOutput, CommandRunner, NativeBuilder, SystemRunner,
};
pub use toolchain::ToolLocator;
