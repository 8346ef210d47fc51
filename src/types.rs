//! Core data types used throughout the VeriArchive library
//!
//! This module contains the data structures shared between the builder,
//! the checksum recorder, the verifier and the auditor.
//!
//! ## Overview
//!
//! - **Source tree**: [`FileEntry`] describes one regular file placed in the container
//! - **Digests**: [`DigestRecord`] binds an algorithm to the digest bytes it produced
//! - **Results**: [`BuildReport`], [`VerificationOutcome`], [`AuditReport`]
//!
//! ## Examples
//!
//! ```rust
//! use veriarchive::{DigestRecord, HashAlgorithm};
//!
//! let record = DigestRecord::new(HashAlgorithm::Fnv1a, vec![0xcb, 0xf2, 0x9c, 0xe4, 0x84, 0x22, 0x23, 0x25]);
//! assert_eq!(record.to_hex(), "cbf29ce484222325");
//! assert_eq!(record.to_string(), "FNV1A cbf29ce484222325");
//! ```

use crate::digest::HashAlgorithm;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A regular file written into the container
///
/// The `name` is the entry key inside the container: the path relative to
/// the source root, joined with `/` regardless of the host separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Container entry name (relative, `/`-separated)
    pub name: String,
    /// Absolute or caller-relative path the bytes were read from
    pub source: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Unix file permissions
    pub permissions: u32,
    /// Last modified timestamp
    pub modified: DateTime<Utc>,
}

/// A digest together with the algorithm that produced it
///
/// The two halves are kept private so a digest can never be re-labelled
/// with a different algorithm after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestRecord {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl DigestRecord {
    /// Pair an algorithm with digest bytes it produced
    pub fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Algorithm used to produce the digest
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hexadecimal form of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Formats the record as a checksum file line: `<ALGO> <hex>`
impl fmt::Display for DigestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm.record_name(), self.to_hex())
    }
}

/// Result of a successful archive build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Path of the finished container
    pub archive_path: PathBuf,
    /// Size of the container on disk
    pub archive_size: u64,
    /// Entries in the order they were written
    pub entries: Vec<FileEntry>,
    /// Sum of the uncompressed sizes of all entries
    pub total_source_bytes: u64,
    /// Digest over the container bytes as stored on disk
    pub digest: DigestRecord,
    /// Wall time spent building and digesting
    pub duration: Duration,
}

impl BuildReport {
    /// Number of entries written to the container
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Container size relative to the source bytes (1.0 when nothing was archived)
    pub fn compression_ratio(&self) -> f64 {
        if self.total_source_bytes == 0 {
            1.0
        } else {
            self.archive_size as f64 / self.total_source_bytes as f64
        }
    }
}

/// Outcome of comparing an archive against its checksum record
///
/// Mismatches are values rather than errors: a failed verification is a
/// normal, reportable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Recomputed digest equals the recorded one
    Match(DigestRecord),
    /// The record names a different algorithm than the one requested
    AlgorithmMismatch {
        /// Algorithm the caller asked to verify with
        expected: HashAlgorithm,
        /// Algorithm token found in the checksum record
        recorded: String,
    },
    /// Digest bytes differ
    HashMismatch {
        /// Digest recomputed over the archive
        computed: DigestRecord,
        /// Digest bytes read from the checksum record
        recorded: Vec<u8>,
    },
}

impl VerificationOutcome {
    /// Whether the archive matches its record
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Match(_))
    }

    /// Short reason for a mismatch, `None` on match
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            VerificationOutcome::Match(_) => None,
            VerificationOutcome::AlgorithmMismatch { .. } => Some("algorithm mismatch"),
            VerificationOutcome::HashMismatch { .. } => Some("hash mismatch"),
        }
    }

    /// Digest recomputed over the archive, if hashing took place
    pub fn computed(&self) -> Option<&DigestRecord> {
        match self {
            VerificationOutcome::Match(record) => Some(record),
            VerificationOutcome::HashMismatch { computed, .. } => Some(computed),
            VerificationOutcome::AlgorithmMismatch { .. } => None,
        }
    }

    /// Get a summary of the verification
    pub fn summary(&self) -> String {
        match self {
            VerificationOutcome::Match(record) => {
                format!("Checksum verified ({} {})", record.algorithm(), record.to_hex())
            }
            VerificationOutcome::AlgorithmMismatch { expected, recorded } => {
                format!(
                    "Hashing algorithm mismatch: expected {}, record holds {}",
                    expected.record_name(),
                    recorded
                )
            }
            VerificationOutcome::HashMismatch { computed, recorded } => {
                format!(
                    "Hash mismatch: computed: {}, read: {}",
                    computed.to_hex(),
                    hex::encode(recorded)
                )
            }
        }
    }
}

/// Result of decoding every entry of a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Number of entries decoded
    pub entries_checked: usize,
    /// Total decompressed bytes across all entries
    pub bytes_decoded: u64,
}
