//! # VeriArchive - fingerprinted directory snapshots
//!
//! Archive a directory tree into a ZIP container, record a checksum of the
//! container, and later prove the container has not been altered.
//!
//! ## Overview
//!
//! VeriArchive provides a simple, auditable "snapshot + fingerprint" workflow:
//! - Build a Deflate-compressed container from a directory tree
//! - Digest the finished container with SHA-256, SHA-1, MD5 or FNV-1a
//! - Persist the digest as a one-line checksum record
//! - Re-verify the container against the record at any later time
//! - Audit that every entry in the container still decompresses
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veriarchive::{audit_archive, checksum, ArchiveBuilder, HashAlgorithm, Verifier};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Build the container and its digest
//! let report = ArchiveBuilder::new(HashAlgorithm::Sha256)
//!     .build(Path::new("./my_project"), Path::new("./my_project.zip"))?;
//!
//! // Make sure the container decodes, then record the digest
//! audit_archive(&report.archive_path)?;
//! checksum::write_checksum(&report.digest, Path::new("checksum.txt"))?;
//!
//! // Later: verify
//! let outcome = Verifier::new(Path::new("./my_project.zip"), Path::new("checksum.txt")).verify()?;
//! assert!(outcome.is_verified());
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Digest of the container
//!
//! The digest is computed over the container bytes as stored on disk, not
//! over the source files. A checksum record therefore vouches for one
//! specific archive file; rebuilding from a tree whose files changed yields a
//! different digest.
//!
//! ### Deterministic builds
//!
//! Entry order follows a name-sorted directory walk and entry metadata comes
//! from the source files, so building an unchanged tree twice yields
//! byte-identical containers and identical digests.
//!
//! ### Verification outcomes
//!
//! A mismatch is a normal result ([`VerificationOutcome`]), not an error.
//! Errors ([`VeriError`]) are reserved for conditions that prevent a run from
//! completing: unreadable sources, malformed checksum records, corrupt
//! containers.
//!
//! ## Module Organization
//!
//! - [`digest`]: Supported algorithms and streaming accumulators
//! - [`archive`]: Container construction from a directory tree
//! - [`checksum`]: Checksum record writing and parsing
//! - [`verification`]: Re-verifying an archive against a record
//! - [`audit`]: Decoding every entry of a container
//! - [`report`]: The plain-text run log
//! - [`types`]: Shared data structures
//! - [`error`]: Error types and handling

pub mod archive;
pub mod audit;
pub mod checksum;
pub mod digest;
pub mod error;
pub mod report;
pub mod types;
pub mod utils;
pub mod verification;

pub use archive::ArchiveBuilder;
pub use audit::audit_archive;
pub use checksum::{read_checksum, write_checksum, ChecksumRecord};
pub use digest::{DigestAccumulator, HashAlgorithm};
pub use error::{Result, VeriError};
pub use report::RunLog;
pub use types::*;
pub use verification::{verify_archive, Verifier};
