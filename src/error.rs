//! Error types for the VeriArchive library
//!
//! This module defines every error that can abort a build, a verification
//! or an audit. Verification mismatches are *not* errors: they are reported
//! as [`VerificationOutcome`](crate::types::VerificationOutcome) values so the
//! caller can degrade to "not verified" instead of failing the process.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the VeriArchive library
pub type Result<T> = std::result::Result<T, VeriError>;

/// Main error type for all VeriArchive operations
#[derive(Debug, Error)]
pub enum VeriError {
    /// I/O errors while creating, reading or writing the container or checksum file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source directory does not exist
    #[error("Source directory not found: {0:?}")]
    SourceNotFound(PathBuf),

    /// The source path exists but is not a directory
    #[error("Source is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    /// Permission denied while walking or reading the source tree
    #[error("Permission denied: {path:?}")]
    PermissionDenied {
        /// Path where permission was denied
        path: PathBuf,
    },

    /// Walk directory error from walkdir crate
    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Hash algorithm identifier outside the supported set
    #[error("Unsupported hash algorithm: {0} (expected one of sha256, sha1, md5, fnv1a)")]
    UnsupportedAlgorithm(String),

    /// Checksum file does not exist
    #[error("Checksum file not found: {0:?}")]
    ChecksumNotFound(PathBuf),

    /// Checksum file exists but does not hold a valid record
    #[error("Malformed checksum record: {0}")]
    ChecksumParse(String),

    /// Errors raised by the ZIP writer or reader
    #[error("Container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The file cannot be opened as a container at all
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// A container entry failed to decompress
    #[error("Corrupt entry {name}: {reason}")]
    CorruptEntry {
        /// Entry name inside the container
        name: String,
        /// Decoder error message
        reason: String,
    },

    /// Path conversion error
    #[error("Path conversion error: {0:?}")]
    PathConversion(std::ffi::OsString),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VeriError {
    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        VeriError::Internal(msg.into())
    }

    /// Create a checksum parse error with a custom message
    pub fn checksum_parse(msg: impl Into<String>) -> Self {
        VeriError::ChecksumParse(msg.into())
    }

    /// Check if this error indicates a damaged container or record
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            VeriError::CorruptEntry { .. }
                | VeriError::InvalidArchive(_)
                | VeriError::ChecksumParse(_)
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            VeriError::SourceNotFound(path) => {
                format!("Source directory {:?} does not exist. Check the --dir argument.", path)
            }
            VeriError::PermissionDenied { path } => {
                format!("Permission denied for {:?}. Check file permissions or run with appropriate privileges.", path)
            }
            VeriError::ChecksumNotFound(path) => {
                format!("Checksum file {:?} not found. Pass the record written at build time with --checksum.", path)
            }
            VeriError::UnsupportedAlgorithm(name) => {
                format!("Unsupported hash algorithm '{}'. Use one of: sha256, sha1, md5, fnv1a.", name)
            }
            _ => self.to_string(),
        }
    }
}
