use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Problems that stop a batch before any file is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchError {
    #[error("folder not usable: {folder}: {reason}")]
    Config { folder: PathBuf, reason: String },
    #[error("no files with .{extension} found in {folder}")]
    NoMatchingFiles { folder: PathBuf, extension: String },
}

/// Why a single file could not be renamed or copied. Never aborts the batch.
#[derive(Debug, Error)]
pub enum RenameFailure {
    #[error("file not found: {0}")]
    SourceMissing(PathBuf),
    #[error("target filename already exists: {0}")]
    TargetExists(PathBuf),
    #[error("target name is not a plain file name: {0:?}")]
    InvalidTarget(String),
    #[error("failed to transfer {from} to {to}: {source}")]
    TransferFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceMissing,
    TargetExists,
    InvalidTarget,
    TransferFailed,
}

impl RenameFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SourceMissing(_) => FailureKind::SourceMissing,
            Self::TargetExists(_) => FailureKind::TargetExists,
            Self::InvalidTarget(_) => FailureKind::InvalidTarget,
            Self::TransferFailed { .. } => FailureKind::TransferFailed,
        }
    }
}
