//! Error taxonomy for the packaging pipeline
//!
//! Every failure carries a [`Severity`]. Ignorable failures end the current
//! hook or target as a logged no-op; fatal failures propagate to the caller
//! and fail the deployment step. Callers dispatch on [`PackError::severity`],
//! never on message text.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ignorable,
    Fatal,
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("No `custom.{section}` section in the service configuration")]
    ConfigMissing { section: String },

    #[error("Invalid value for `{key}`: expected {expected}")]
    InvalidOption { key: String, expected: &'static str },

    #[error("Function `{function}` is not selected: {reason}")]
    SelectionInvalid { function: String, reason: String },

    #[error("Invalid handler reference `{handler}`: {reason}")]
    InvalidHandler { handler: String, reason: String },

    #[error("Requirements manifest not found: {}", path.display())]
    ManifestMissing { path: PathBuf },

    #[error("{what} is disabled")]
    Disabled { what: String },

    #[error("Both --{option} and --no-{option} were given")]
    ConflictingFlags { option: String },

    #[error("Container runtime preflight failed: {reason}")]
    ContainerPreflight { reason: String },

    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Installer for `{function}` failed (exit code {status_code}): {stderr}")]
    InstallerFailed {
        function: String,
        status_code: i32,
        stderr: String,
    },

    #[error("Failed to fix ownership of {}: {reason}", path.display())]
    OwnershipFailed { path: PathBuf, reason: String },

    #[error("Failed to remove {}: {reason}", path.display())]
    Removal { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to load service file {}: {reason}", path.display())]
    ServiceFile { path: PathBuf, reason: String },
}

impl PackError {
    pub fn severity(&self) -> Severity {
        match self {
            PackError::ConfigMissing { .. }
            | PackError::InvalidOption { .. }
            | PackError::SelectionInvalid { .. }
            | PackError::InvalidHandler { .. }
            | PackError::ManifestMissing { .. }
            | PackError::Disabled { .. } => Severity::Ignorable,
            PackError::ConflictingFlags { .. }
            | PackError::ContainerPreflight { .. }
            | PackError::Spawn { .. }
            | PackError::InstallerFailed { .. }
            | PackError::OwnershipFailed { .. }
            | PackError::Removal { .. }
            | PackError::Io { .. }
            | PackError::ServiceFile { .. } => Severity::Fatal,
        }
    }

    pub fn is_ignorable(&self) -> bool {
        self.severity() == Severity::Ignorable
    }

    pub(crate) fn io(context: impl Into<String>, source: anyhow::Error) -> Self {
        PackError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;
