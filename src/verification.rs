//! Archive verification
//!
//! Recomputes a digest over an existing archive and compares it with a
//! persisted checksum record.
//!
//! ## Verification Process
//!
//! 1. Read the checksum record (a missing or malformed record is an error)
//! 2. Pick the algorithm: the expected one if the caller supplied it,
//!    otherwise the algorithm named by the record
//! 3. If an expected algorithm was supplied and the record names another,
//!    report [`VerificationOutcome::AlgorithmMismatch`] without hashing
//! 4. Stream the archive as raw bytes through the digest; the container
//!    format is never parsed here
//! 5. Compare digests byte for byte
//!
//! Mismatches are returned as values; only I/O and record errors are `Err`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veriarchive::{HashAlgorithm, Verifier};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = Verifier::new(Path::new("backup.zip"), Path::new("checksum.txt"))
//!     .expected_algorithm(HashAlgorithm::Sha256)
//!     .verify()?;
//! if outcome.is_verified() {
//!     println!("Checksum verified");
//! } else {
//!     println!("{}", outcome.summary());
//! }
//! # Ok(())
//! # }
//! ```

use crate::checksum::{self, ChecksumRecord};
use crate::digest::{self, HashAlgorithm};
use crate::error::Result;
use crate::types::VerificationOutcome;

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Verifier for one archive/checksum pair
#[derive(Debug, Clone)]
pub struct Verifier {
    archive_path: PathBuf,
    checksum_path: PathBuf,
    expected: Option<HashAlgorithm>,
}

impl Verifier {
    /// Create a verifier for `archive_path` against the record at `checksum_path`
    pub fn new(archive_path: &Path, checksum_path: &Path) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            checksum_path: checksum_path.to_path_buf(),
            expected: None,
        }
    }

    /// Require the record to name `algorithm`
    pub fn expected_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.expected = Some(algorithm);
        self
    }

    /// Run the verification
    ///
    /// # Errors
    ///
    /// - [`VeriError::ChecksumNotFound`](crate::VeriError::ChecksumNotFound) /
    ///   [`VeriError::ChecksumParse`](crate::VeriError::ChecksumParse) for a bad record
    /// - [`VeriError::UnsupportedAlgorithm`](crate::VeriError::UnsupportedAlgorithm)
    ///   if no algorithm was expected and the record names an unknown one
    /// - [`VeriError::Io`](crate::VeriError::Io) if the archive cannot be read
    pub fn verify(&self) -> Result<VerificationOutcome> {
        let start = Instant::now();
        let record = checksum::read_checksum(&self.checksum_path)?;
        debug!(
            "Checksum record {:?} names {}",
            self.checksum_path, record.algorithm
        );

        let algorithm = match self.expected {
            Some(expected) if !record.matches_algorithm(expected) => {
                warn!(
                    "Algorithm mismatch: expected {}, record holds {}",
                    expected, record.algorithm
                );
                return Ok(VerificationOutcome::AlgorithmMismatch {
                    expected,
                    recorded: record.algorithm,
                });
            }
            Some(expected) => expected,
            None => record.resolve_algorithm()?,
        };

        let outcome = compare(&self.archive_path, algorithm, record)?;
        info!(
            "Verified {:?} in {:?}: {}",
            self.archive_path,
            start.elapsed(),
            outcome.reason().unwrap_or("match")
        );
        Ok(outcome)
    }
}

fn compare(
    archive_path: &Path,
    algorithm: HashAlgorithm,
    record: ChecksumRecord,
) -> Result<VerificationOutcome> {
    let computed = digest::digest_file(algorithm, archive_path)?;

    if computed.as_bytes() == record.digest.as_slice() {
        Ok(VerificationOutcome::Match(computed))
    } else {
        Ok(VerificationOutcome::HashMismatch {
            computed,
            recorded: record.digest,
        })
    }
}

/// Verify `archive_path` with `algorithm` against the record at `checksum_path`
pub fn verify_archive(
    archive_path: &Path,
    algorithm: HashAlgorithm,
    checksum_path: &Path,
) -> Result<VerificationOutcome> {
    Verifier::new(archive_path, checksum_path)
        .expected_algorithm(algorithm)
        .verify()
}
