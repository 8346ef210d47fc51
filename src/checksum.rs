//! Checksum record persistence
//!
//! A checksum file holds exactly one record on one line:
//!
//! ```text
//! SHA256 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! ```
//!
//! The algorithm token is written uppercase and the digest as lowercase hex.
//! Parsing splits on any whitespace and expects exactly two tokens; the
//! algorithm token is kept as text so the verifier can report a mismatch
//! even when it names an algorithm this build does not support.

use crate::digest::HashAlgorithm;
use crate::error::{Result, VeriError};
use crate::types::DigestRecord;
use crate::utils;

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Default checksum file name
pub const DEFAULT_CHECKSUM_FILE: &str = "checksum.txt";

/// A parsed checksum file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord {
    /// Algorithm token exactly as found in the file
    pub algorithm: String,
    /// Decoded digest bytes
    pub digest: Vec<u8>,
}

impl ChecksumRecord {
    /// Parse the textual form `<ALGO> <hex>`
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (algorithm, digest_hex) = match tokens.as_slice() {
            [algorithm, digest_hex] => (*algorithm, *digest_hex),
            _ => {
                return Err(VeriError::checksum_parse(format!(
                    "expected 2 whitespace-separated tokens, found {}",
                    tokens.len()
                )))
            }
        };

        if digest_hex.len() % 2 != 0 {
            return Err(VeriError::checksum_parse(format!(
                "digest has odd length {}",
                digest_hex.len()
            )));
        }
        let digest = hex::decode(digest_hex)
            .map_err(|e| VeriError::checksum_parse(format!("digest is not valid hex: {}", e)))?;

        Ok(Self {
            algorithm: algorithm.to_string(),
            digest,
        })
    }

    /// Resolve the algorithm token to a supported algorithm
    pub fn resolve_algorithm(&self) -> Result<HashAlgorithm> {
        self.algorithm.parse()
    }

    /// Whether the record's token names `algorithm` (case-insensitive)
    pub fn matches_algorithm(&self, algorithm: HashAlgorithm) -> bool {
        self.algorithm.eq_ignore_ascii_case(algorithm.as_str())
    }
}

impl FromStr for ChecksumRecord {
    type Err = VeriError;

    fn from_str(s: &str) -> Result<Self> {
        ChecksumRecord::parse(s)
    }
}

impl From<&DigestRecord> for ChecksumRecord {
    fn from(record: &DigestRecord) -> Self {
        Self {
            algorithm: record.algorithm().record_name().to_string(),
            digest: record.as_bytes().to_vec(),
        }
    }
}

/// Persist a digest record, replacing any existing file at `path`
pub fn write_checksum(record: &DigestRecord, path: &Path) -> Result<()> {
    let line = format!("{}\n", record);
    utils::atomic_write(path, line.as_bytes())?;
    debug!("Wrote checksum record to {:?}", path);
    Ok(())
}

/// Read and parse the checksum file at `path`
///
/// # Errors
///
/// - [`VeriError::ChecksumNotFound`] if the file does not exist
/// - [`VeriError::ChecksumParse`] if the content is not a valid record
pub fn read_checksum(path: &Path) -> Result<ChecksumRecord> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => VeriError::ChecksumNotFound(path.to_path_buf()),
        io::ErrorKind::InvalidData => {
            VeriError::checksum_parse("checksum file is not valid UTF-8")
        }
        _ => VeriError::Io(e),
    })?;

    ChecksumRecord::parse(&text)
}
