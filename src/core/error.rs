//! Pipeline error types.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::Platform;

/// Result alias used by pipeline stages.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Broad category of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Fetch,
    ToolchainNotFound,
    Build,
    Pack,
    Io,
}

/// Error raised by any stage of the acquisition pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(addonkit::config))]
    Configuration { message: String },

    #[error("no default vendor SDK for platform `{platform}`")]
    #[diagnostic(
        code(addonkit::config::unsupported_platform),
        help("pass --download-url (or set npm_config_download_url) to supply the SDK archive")
    )]
    UnsupportedPlatform { platform: Platform },

    #[error("failed to download {url}: {reason}")]
    #[diagnostic(
        code(addonkit::fetch),
        help("check your network connection or point --download-url at a reachable mirror")
    )]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("`{tool}` not found (searched {})", display_paths(.searched))]
    #[diagnostic(
        code(addonkit::toolchain),
        help("install `{tool}` as a dependency of the addon or of the consuming project")
    )]
    ToolchainNotFound { tool: String, searched: Vec<PathBuf> },

    #[error("`{stage}` failed with {}", display_exit(.exit_code))]
    #[diagnostic(code(addonkit::build))]
    Build {
        stage: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to package {}: {reason}", .path.display())]
    #[diagnostic(code(addonkit::pack))]
    Pack { path: PathBuf, reason: String },

    #[error("{context}")]
    #[diagnostic(code(addonkit::io))]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal or deadline)".to_string(),
    }
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Configuration {
            message: message.into(),
        }
    }

    /// Create a fetch error.
    pub fn fetch(url: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        PipelineError::Fetch {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a utility error, keeping the underlying I/O error when there is one.
    pub fn io_from(context: impl Into<String>, err: anyhow::Error) -> Self {
        let source = match err.downcast::<std::io::Error>() {
            Ok(io) => io,
            Err(other) => std::io::Error::other(format!("{:#}", other)),
        };
        PipelineError::io(context, source)
    }

    /// Create a packaging error.
    pub fn pack(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PipelineError::Pack {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The category this error belongs to.
    ///
    /// An unsupported platform is a configuration problem.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Configuration { .. } | PipelineError::UnsupportedPlatform { .. } => {
                ErrorKind::Configuration
            }
            PipelineError::Fetch { .. } => ErrorKind::Fetch,
            PipelineError::ToolchainNotFound { .. } => ErrorKind::ToolchainNotFound,
            PipelineError::Build { .. } => ErrorKind::Build,
            PipelineError::Pack { .. } => ErrorKind::Pack,
            PipelineError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Upstream HTTP status for fetch failures, when the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PipelineError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Captured stderr for build failures.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            PipelineError::Build { stderr, .. } if !stderr.trim().is_empty() => Some(stderr),
            _ => None,
        }
    }
}
