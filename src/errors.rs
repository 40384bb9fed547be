//! Typed error definitions for move_partition.
//! One variant per failure class so the orchestrator can report a single
//! descriptive outcome and logs can carry a stable code/kind pair.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::db::DbError;
use crate::fs_ops::describe_io;

/// Filesystem step an I/O error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsStage {
    OpeningSource,
    StatSource,
    OpeningDestination,
    Copying,
    SyncingDestination,
    RemovingSource,
    CreatingDirectory,
    Renaming,
    PreservingMetadata,
    InspectingPath,
}

impl fmt::Display for FsStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsStage::OpeningSource => "opening source",
            FsStage::StatSource => "stat source",
            FsStage::OpeningDestination => "opening destination",
            FsStage::Copying => "copying",
            FsStage::SyncingDestination => "syncing destination",
            FsStage::RemovingSource => "removing source",
            FsStage::CreatingDirectory => "creating destination directory",
            FsStage::Renaming => "renaming",
            FsStage::PreservingMetadata => "preserving metadata",
            FsStage::InspectingPath => "inspecting path",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("Expected {expected} parameters")]
    ArgumentCount { expected: usize, got: usize },

    #[error("Parameter {position} must be a string")]
    ArgumentType { position: usize },

    #[error("Invalid {name} '{value}': {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("'{}': {source}", .path.display())]
    TargetMissing { path: PathBuf, source: io::Error },

    #[error("'{}' is not a directory", .0.display())]
    TargetNotDirectory(PathBuf),

    #[error("'{}' is not writable", .0.display())]
    TargetNotWritable(PathBuf),

    #[error("Error connecting to MySQL: {0}")]
    Connect(#[source] DbError),

    #[error("Partition not found")]
    PartitionNotFound { table: String, partition: String },

    #[error("Error validating partition: {0}")]
    PartitionQuery(#[source] DbError),

    #[error("Variable '{0}' not found")]
    VariableNotFound(String),

    #[error("Error getting variable '{name}': {source}")]
    VariableQuery { name: String, source: DbError },

    #[error("Partition file not found at original location: '{}' is already a symbolic link", .0.display())]
    SourceAlreadyRelocated(PathBuf),

    #[error("Partition file not found at original location: '{}'", .0.display())]
    SourceMissing(PathBuf),

    #[error("Destination already exists: '{}'", .0.display())]
    DestinationExists(PathBuf),

    #[error("Error {stage}: {}", describe_io(.path, .source))]
    Filesystem {
        stage: FsStage,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Error getting write lock: {source}")]
    Lock { table: String, source: DbError },

    #[error("Partition moved to '{}' but creating symbolic link failed: {source}", .target.display())]
    LinkFailed {
        link: PathBuf,
        target: PathBuf,
        source: io::Error,
    },
}

impl RelocateError {
    /// Stable numeric code for logs and exit-status mapping.
    pub fn code(&self) -> i32 {
        match self {
            RelocateError::ArgumentCount { .. } => 10,
            RelocateError::ArgumentType { .. } => 11,
            RelocateError::InvalidArgument { .. } => 12,
            RelocateError::TargetMissing { .. } => 13,
            RelocateError::TargetNotDirectory(_) => 14,
            RelocateError::TargetNotWritable(_) => 15,
            RelocateError::Connect(_) => 20,
            RelocateError::PartitionNotFound { .. } => 30,
            RelocateError::PartitionQuery(_) => 31,
            RelocateError::VariableNotFound(_) => 32,
            RelocateError::VariableQuery { .. } => 33,
            RelocateError::SourceAlreadyRelocated(_) => 34,
            RelocateError::SourceMissing(_) => 35,
            RelocateError::DestinationExists(_) => 40,
            RelocateError::Filesystem { .. } => 41,
            RelocateError::Lock { .. } => 50,
            RelocateError::LinkFailed { .. } => 60,
        }
    }

    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            RelocateError::ArgumentCount { .. }
            | RelocateError::ArgumentType { .. }
            | RelocateError::InvalidArgument { .. }
            | RelocateError::TargetMissing { .. }
            | RelocateError::TargetNotDirectory(_)
            | RelocateError::TargetNotWritable(_) => "input",
            RelocateError::Connect(_) => "connect",
            RelocateError::PartitionNotFound { .. }
            | RelocateError::SourceAlreadyRelocated(_)
            | RelocateError::SourceMissing(_) => "not_found",
            RelocateError::PartitionQuery(_)
            | RelocateError::VariableNotFound(_)
            | RelocateError::VariableQuery { .. } => "metadata",
            RelocateError::DestinationExists(_) | RelocateError::Filesystem { .. } => "filesystem",
            RelocateError::Lock { .. } => "lock",
            RelocateError::LinkFailed { .. } => "link_missing",
        }
    }

    /// True when the data file is in its new home but the old path does not resolve to it.
    pub fn is_partial_success(&self) -> bool {
        matches!(self, RelocateError::LinkFailed { .. })
    }

    /// True for failures that mean the partition (or its file) is not where it is expected.
    pub fn is_not_found(&self) -> bool {
        self.kind() == "not_found"
    }

    pub(crate) fn fs(stage: FsStage, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| RelocateError::Filesystem {
            stage,
            path,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filesystem_error_names_stage_and_path() {
        let err = RelocateError::fs(FsStage::OpeningSource, "/data/db/t#P#p0.ibd")(
            io::Error::from_raw_os_error(libc::ENOENT),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("Error opening source:"), "msg was: {msg}");
        assert!(msg.contains("/data/db/t#P#p0.ibd"));
        assert_eq!(err.kind(), "filesystem");
    }

    #[test]
    fn link_failure_is_partial_success() {
        let err = RelocateError::LinkFailed {
            link: PathBuf::from("/a"),
            target: PathBuf::from("/b"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_partial_success());
        assert!(err.to_string().contains("symbolic link"));
        assert!(!RelocateError::VariableNotFound("datadir".into()).is_partial_success());
    }

    #[test]
    fn already_relocated_counts_as_not_found() {
        let err = RelocateError::SourceAlreadyRelocated(PathBuf::from("/x"));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("not found"));
        let gone = RelocateError::SourceMissing(PathBuf::from("/x"));
        assert!(gone.is_not_found());
        assert_eq!(gone.code(), 35);
    }
}
