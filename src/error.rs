//! Error types shared by the organizer pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a filesystem failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    CrossDevice,
    Io,
}

impl FsErrorKind {
    /// Classifies an I/O error.
    pub fn of(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::CrossesDevices => Self::CrossDevice,
            _ => Self::Io,
        }
    }
}

impl std::fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::AlreadyExists => "already exists",
            Self::CrossDevice => "cross-device move",
            Self::Io => "I/O error",
        };
        f.write_str(text)
    }
}

/// Errors that stop an organize run before anything is planned or moved.
///
/// Everything that can go wrong for a single file is collected into the
/// plan or the result instead.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source directory does not exist or cannot be resolved.
    #[error("Invalid source directory {}: {source}", path.display())]
    InvalidSource { path: PathBuf, source: io::Error },
    /// The source path exists but is not a directory.
    #[error("Source path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
    /// The target path cannot be resolved to an absolute path.
    #[error("Invalid target directory {}: {source}", path.display())]
    InvalidTarget { path: PathBuf, source: io::Error },
    /// The log file could not be opened.
    #[error("Failed to open log file in {}: {source}", path.display())]
    LogSetup { path: PathBuf, source: io::Error },
}
