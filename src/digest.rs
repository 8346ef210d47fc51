//! Streaming digest provider
//!
//! Every supported algorithm is a variant of the closed [`HashAlgorithm`]
//! enum, and each variant is bound to exactly one accumulator
//! implementation. Unknown identifiers are rejected when parsed, so the rest
//! of the crate never branches on algorithm names.
//!
//! ## Usage
//!
//! ```rust
//! use veriarchive::HashAlgorithm;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let algorithm: HashAlgorithm = "md5".parse()?;
//! let mut acc = algorithm.accumulator();
//! acc.update(b"hel");
//! acc.update(b"lo");
//! let record = acc.finalize();
//! assert_eq!(record.to_hex(), "5d41402abc4b2a76b9719d911017c592");
//! # Ok(())
//! # }
//! ```
//!
//! [`DigestAccumulator::finalize`] consumes the accumulator, so feeding
//! more bytes after finalization does not compile.

use crate::error::{Result, VeriError};
use crate::types::DigestRecord;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::hash::Hasher;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::trace;

/// Buffer size used when streaming files into an accumulator
pub const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// SHA-256 (32-byte digest)
    Sha256,
    /// SHA-1 (20-byte digest)
    Sha1,
    /// MD5 (16-byte digest)
    Md5,
    /// 64-bit FNV-1a, non-cryptographic (8-byte digest)
    Fnv1a,
}

impl HashAlgorithm {
    /// All supported algorithms
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha1,
        HashAlgorithm::Md5,
        HashAlgorithm::Fnv1a,
    ];

    /// Lowercase identifier as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Fnv1a => "fnv1a",
        }
    }

    /// Uppercase token written into checksum files
    pub fn record_name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Fnv1a => "FNV1A",
        }
    }

    /// Length of the finalized digest in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Fnv1a => 8,
        }
    }

    /// Create a fresh streaming accumulator for this algorithm
    pub fn accumulator(&self) -> DigestAccumulator {
        let state = match self {
            HashAlgorithm::Sha256 => State::Sha256(Sha256::new()),
            HashAlgorithm::Sha1 => State::Sha1(Sha1::new()),
            HashAlgorithm::Md5 => State::Md5(Md5::new()),
            HashAlgorithm::Fnv1a => State::Fnv1a(fnv::FnvHasher::default()),
        };
        DigestAccumulator {
            algorithm: *self,
            state,
            bytes_hashed: 0,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = VeriError;

    fn from_str(s: &str) -> Result<Self> {
        HashAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| VeriError::UnsupportedAlgorithm(s.to_string()))
    }
}

enum State {
    Sha256(Sha256),
    Sha1(Sha1),
    Md5(Md5),
    Fnv1a(fnv::FnvHasher),
}

/// Incremental hash state for one algorithm
///
/// Implements [`Write`] so any reader can be drained into it with
/// [`io::copy`].
pub struct DigestAccumulator {
    algorithm: HashAlgorithm,
    state: State,
    bytes_hashed: u64,
}

impl DigestAccumulator {
    /// Algorithm this accumulator computes
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of bytes fed so far
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Sha256(h) => h.update(data),
            State::Sha1(h) => h.update(data),
            State::Md5(h) => h.update(data),
            State::Fnv1a(h) => h.write(data),
        }
        self.bytes_hashed += data.len() as u64;
    }

    /// Finish hashing and pair the digest with its algorithm
    pub fn finalize(self) -> DigestRecord {
        let bytes = match self.state {
            State::Sha256(h) => h.finalize().to_vec(),
            State::Sha1(h) => h.finalize().to_vec(),
            State::Md5(h) => h.finalize().to_vec(),
            // big-endian, same byte order as the textual FNV value
            State::Fnv1a(h) => h.finish().to_be_bytes().to_vec(),
        };
        trace!(
            "Finalized {} digest over {} bytes",
            self.algorithm,
            self.bytes_hashed
        );
        DigestRecord::new(self.algorithm, bytes)
    }
}

impl fmt::Debug for DigestAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestAccumulator")
            .field("algorithm", &self.algorithm)
            .field("bytes_hashed", &self.bytes_hashed)
            .finish()
    }
}

impl Write for DigestAccumulator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stream a reader to its end through a fresh accumulator
pub fn digest_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> Result<DigestRecord> {
    let mut acc = algorithm.accumulator();
    let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        acc.update(&buffer[..bytes_read]);
    }

    Ok(acc.finalize())
}

/// Hash a file's raw bytes
///
/// The file is read as an opaque byte stream; it is never parsed.
pub fn digest_file(algorithm: HashAlgorithm, path: &Path) -> Result<DigestRecord> {
    let mut file = File::open(path)?;
    digest_reader(algorithm, &mut file)
}
