//! Typed toolchain flags.
//!
//! Command lines for electron-rebuild and node-gyp are assembled from
//! [`BuildFlag`] values and rendered in one place. Generator pass-through
//! arguments (`-- -f xcode`) must come last, so [`FlagSet::render`] always
//! emits them after every other flag regardless of insertion order.

use std::path::PathBuf;

use crate::core::Arch;

/// A single toolchain flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFlag {
    /// `--module-dir=<dir>` (electron-rebuild)
    ModuleDir(PathBuf),
    /// `--arch=<arch>`
    Arch(Arch),
    /// `--msvs_version=<version>` (node-gyp, Windows only)
    MsvsVersion(String),
    /// `--target=<runtime version>`
    Target(String),
    /// `--dist-url=<headers mirror>`
    DistUrl(String),
    /// `--debug`
    Debug,
    /// `-- -f <generator>`, forwarded to gyp
    Generator(String),
}

impl BuildFlag {
    fn is_passthrough(&self) -> bool {
        matches!(self, BuildFlag::Generator(_))
    }

    fn render_into(&self, out: &mut Vec<String>) {
        match self {
            BuildFlag::ModuleDir(dir) => out.push(format!("--module-dir={}", dir.display())),
            BuildFlag::Arch(arch) => out.push(format!("--arch={}", arch)),
            BuildFlag::MsvsVersion(v) => out.push(format!("--msvs_version={}", v)),
            BuildFlag::Target(v) => out.push(format!("--target={}", v)),
            BuildFlag::DistUrl(url) => out.push(format!("--dist-url={}", url)),
            BuildFlag::Debug => out.push("--debug".to_string()),
            BuildFlag::Generator(g) => {
                out.push("--".to_string());
                out.push("-f".to_string());
                out.push(g.clone());
            }
        }
    }
}

/// An ordered collection of flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<BuildFlag>,
}

impl FlagSet {
    pub fn new() -> Self {
        FlagSet { flags: Vec::new() }
    }

    /// Append a flag.
    pub fn push(&mut self, flag: BuildFlag) -> &mut Self {
        self.flags.push(flag);
        self
    }

    /// Append a flag only when `cond` holds.
    pub fn push_if(&mut self, cond: bool, flag: BuildFlag) -> &mut Self {
        if cond {
            self.flags.push(flag);
        }
        self
    }

    pub fn contains(&self, flag: &BuildFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Render to argv form, pass-through arguments last.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        for flag in self.flags.iter().filter(|f| !f.is_passthrough()) {
            flag.render_into(&mut out);
        }
        for flag in self.flags.iter().filter(|f| f.is_passthrough()) {
            flag.render_into(&mut out);
        }
        out
    }
}
