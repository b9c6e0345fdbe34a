use crate::config::ConfigError;
use crate::git::CommitRef;
use crate::manifest::ManifestError;
use crate::site::SiteConfigError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A version-control primitive exited unsuccessfully or could not be spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("git {op} failed: {cause}")]
pub struct GitError {
    pub op: String,
    pub cause: String,
}

impl GitError {
    pub fn new(op: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            cause: cause.into(),
        }
    }
}

/// Failure of a single conversion step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    SiteConfig(#[from] SiteConfigError),

    #[error("Expected path {} is missing", .0.display())]
    MissingPath(PathBuf),

    #[error("No working copy: the conversion branch was never created")]
    NoWorkingCopy,

    #[error("{context}: {cause}")]
    Io { context: String, cause: String },

    #[error("Command `{command}` failed: {cause}")]
    Command { command: String, cause: String },

    /// Some units of a multi-part step failed; `commits` holds what the
    /// others recorded.
    #[error("Failed to copy {}", .failures.join("; "))]
    Incomplete {
        failures: Vec<String>,
        commits: Vec<CommitRef>,
    },
}

impl StepError {
    pub fn io(context: impl Into<String>, err: anyhow::Error) -> Self {
        StepError::Io {
            context: context.into(),
            cause: format!("{:#}", err),
        }
    }
}

/// Failures that stop a conversion before any git mutation happened.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Site root {} does not exist", .0.display())]
    SiteRootMissing(PathBuf),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    SiteConfig(#[from] SiteConfigError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
