//! Integration tests for VeriArchive
//!
//! Exercises the full build, record, audit and verify workflow against
//! generated project trees, including tampering with the archive and the
//! checksum record after the fact.

use ::veriarchive::*;
use filetime::FileTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// Test harness holding a source tree and an output directory
pub struct ArchiveTestHarness {
    pub source_dir: TempDir,
    pub out_dir: TempDir,
    pub file_generator: FileGenerator,
}

impl ArchiveTestHarness {
    /// Create a new test harness
    pub fn new() -> Self {
        Self {
            source_dir: TempDir::new().unwrap(),
            out_dir: TempDir::new().unwrap(),
            file_generator: FileGenerator::new(42),
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.out_dir.path().join("project.zip")
    }

    pub fn checksum_path(&self) -> PathBuf {
        self.out_dir.path().join("checksum.txt")
    }

    /// Generate a nested project tree, returning the relative file names
    pub fn generate_project(&mut self, config: ProjectConfig) -> anyhow::Result<Vec<String>> {
        let root = self.source_dir.path().to_path_buf();
        let mut names = Vec::new();

        for depth in 1..=config.max_depth {
            for dir_idx in 0..config.dirs_per_level {
                let mut path = root.clone();
                let mut rel = Vec::new();
                for level in 0..depth {
                    let component = format!("dir_{}_{}", level, dir_idx);
                    path = path.join(&component);
                    rel.push(component);
                }
                fs::create_dir_all(&path)?;

                for file_idx in 0..config.files_per_dir {
                    let file_name = format!("file_{}.dat", file_idx);
                    let content = self
                        .file_generator
                        .generate_file_content(config.file_size_range.clone());
                    fs::write(path.join(&file_name), &content)?;

                    let mut parts = rel.clone();
                    parts.push(file_name);
                    names.push(parts.join("/"));
                }
            }
        }

        names.sort_by(|a, b| a.split('/').cmp(b.split('/')));
        Ok(names)
    }

    /// Build with `algorithm` and write the checksum record
    pub fn build_and_record(&self, algorithm: HashAlgorithm) -> anyhow::Result<BuildReport> {
        let report = ArchiveBuilder::new(algorithm).build(self.source_dir.path(), &self.archive_path())?;
        write_checksum(&report.digest, &self.checksum_path())?;
        Ok(report)
    }

    /// Pin every file's mtime so rebuilt containers are comparable
    pub fn pin_mtimes(&self, unix_seconds: i64) -> anyhow::Result<()> {
        let time = FileTime::from_unix_time(unix_seconds, 0);
        for path in archive::list_sources(self.source_dir.path(), false)? {
            filetime::set_file_mtime(&path, time)?;
        }
        Ok(())
    }
}

/// Project generation parameters
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub max_depth: usize,
    pub dirs_per_level: usize,
    pub files_per_dir: usize,
    pub file_size_range: Range<usize>,
}

/// Seeded content generator producing a mix of text and binary files
pub struct FileGenerator {
    pub rng: StdRng,
}

impl FileGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate_file_content(&mut self, size_range: Range<usize>) -> Vec<u8> {
        let size = self.rng.random_range(size_range);
        match self.rng.random_range(0..3) {
            0 => (0..size)
                .map(|_| self.rng.random_range(b'a'..=b'z'))
                .collect(),
            1 => (0..size).map(|_| self.rng.random()).collect(),
            _ => vec![self.rng.random::<u8>(); size],
        }
    }
}

/// Flip one byte of the file at `path`
pub fn flip_byte(path: &Path, index: usize) -> anyhow::Result<()> {
    let mut bytes = fs::read(path)?;
    bytes[index] ^= 0xff;
    fs::write(path, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn small_project() -> ProjectConfig {
        ProjectConfig {
            max_depth: 2,
            dirs_per_level: 3,
            files_per_dir: 4,
            file_size_range: 1..4_000,
        }
    }

    #[test]
    #[traced_test]
    fn test_round_trip_every_algorithm() {
        let mut harness = ArchiveTestHarness::new();
        let names = harness.generate_project(small_project()).unwrap();

        for algorithm in HashAlgorithm::ALL {
            info!("Round trip with {}", algorithm);
            let report = harness.build_and_record(algorithm).unwrap();

            let entry_names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(entry_names, names);
            assert_eq!(report.digest.as_bytes().len(), algorithm.digest_len());

            let audit = audit_archive(&harness.archive_path()).unwrap();
            assert_eq!(audit.entries_checked, names.len());
            assert_eq!(audit.bytes_decoded, report.total_source_bytes);

            let outcome =
                verify_archive(&harness.archive_path(), algorithm, &harness.checksum_path()).unwrap();
            assert!(outcome.is_verified(), "{}", outcome.summary());

            // Without an expected algorithm the record decides
            let outcome = Verifier::new(&harness.archive_path(), &harness.checksum_path())
                .verify()
                .unwrap();
            assert_eq!(outcome, VerificationOutcome::Match(report.digest.clone()));
        }
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let mut harness = ArchiveTestHarness::new();
        harness.generate_project(small_project()).unwrap();
        harness.pin_mtimes(1_700_000_000).unwrap();

        let first = harness.build_and_record(HashAlgorithm::Sha256).unwrap();
        let first_bytes = fs::read(harness.archive_path()).unwrap();

        let second = harness.build_and_record(HashAlgorithm::Sha256).unwrap();
        let second_bytes = fs::read(harness.archive_path()).unwrap();

        assert_eq!(first.digest, second.digest);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_digest_covers_container_not_sources() {
        let mut harness = ArchiveTestHarness::new();
        harness.generate_project(small_project()).unwrap();
        harness.pin_mtimes(1_700_000_000).unwrap();
        let before = harness.build_and_record(HashAlgorithm::Md5).unwrap();

        // Same size, same mtime, different content
        let target = harness.source_dir.path().join("dir_0_0/file_0.dat");
        let mut content = fs::read(&target).unwrap();
        content[0] = content[0].wrapping_add(1);
        fs::write(&target, &content).unwrap();
        filetime::set_file_mtime(&target, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

        let after = ArchiveBuilder::new(HashAlgorithm::Md5)
            .build(harness.source_dir.path(), &harness.archive_path())
            .unwrap();
        assert_ne!(before.digest, after.digest);

        // The old record no longer vouches for the rebuilt container
        let outcome =
            verify_archive(&harness.archive_path(), HashAlgorithm::Md5, &harness.checksum_path())
                .unwrap();
        assert_eq!(outcome.reason(), Some("hash mismatch"));
    }

    #[test]
    #[traced_test]
    fn test_tamper_with_container() {
        let mut harness = ArchiveTestHarness::new();
        harness.generate_project(small_project()).unwrap();
        let report = harness.build_and_record(HashAlgorithm::Sha1).unwrap();

        let len = report.archive_size as usize;
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let index = rng.random_range(0..len);
            flip_byte(&harness.archive_path(), index).unwrap();

            let outcome =
                verify_archive(&harness.archive_path(), HashAlgorithm::Sha1, &harness.checksum_path())
                    .unwrap();
            match &outcome {
                VerificationOutcome::HashMismatch { computed, recorded } => {
                    assert_ne!(computed.as_bytes(), recorded.as_slice());
                    assert_eq!(recorded.as_slice(), report.digest.as_bytes());
                }
                other => panic!("byte {} flip not detected: {:?}", index, other),
            }

            // Flip back, the container verifies again
            flip_byte(&harness.archive_path(), index).unwrap();
            assert!(verify_archive(&harness.archive_path(), HashAlgorithm::Sha1, &harness.checksum_path())
                .unwrap()
                .is_verified());
        }
    }

    #[test]
    fn test_tamper_with_record_algorithm() {
        let mut harness = ArchiveTestHarness::new();
        harness.generate_project(small_project()).unwrap();
        let report = harness.build_and_record(HashAlgorithm::Sha256).unwrap();

        let checksum = harness.checksum_path();
        fs::write(&checksum, format!("MD5 {}\n", report.digest.to_hex())).unwrap();

        let outcome = verify_archive(&harness.archive_path(), HashAlgorithm::Sha256, &checksum).unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::AlgorithmMismatch {
                expected: HashAlgorithm::Sha256,
                recorded: "MD5".to_string(),
            }
        );
        assert!(outcome.computed().is_none());

        // Left to the record, MD5 is used and the digest no longer fits
        let outcome = Verifier::new(&harness.archive_path(), &checksum).verify().unwrap();
        assert_eq!(outcome.reason(), Some("hash mismatch"));
        assert_eq!(outcome.computed().unwrap().algorithm(), HashAlgorithm::Md5);
    }

    #[test]
    fn test_tamper_with_record_digest() {
        let mut harness = ArchiveTestHarness::new();
        harness.generate_project(small_project()).unwrap();
        let report = harness.build_and_record(HashAlgorithm::Fnv1a).unwrap();

        let mut digest = report.digest.as_bytes().to_vec();
        digest[7] ^= 0x01;
        fs::write(harness.checksum_path(), format!("FNV1A {}", hex::encode(&digest))).unwrap();

        let outcome =
            verify_archive(&harness.archive_path(), HashAlgorithm::Fnv1a, &harness.checksum_path())
                .unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::HashMismatch {
                computed: report.digest.clone(),
                recorded: digest,
            }
        );
    }

    #[test]
    fn test_cut_short_container_is_not_a_container() {
        let mut harness = ArchiveTestHarness::new();
        harness.generate_project(small_project()).unwrap();
        let report = harness.build_and_record(HashAlgorithm::Sha256).unwrap();

        let bytes = fs::read(harness.archive_path()).unwrap();
        fs::write(harness.archive_path(), &bytes[..report.archive_size as usize / 2]).unwrap();

        // The end record is gone, so the container does not even open
        let err = audit_archive(&harness.archive_path()).unwrap_err();
        assert!(matches!(err, VeriError::InvalidArchive(_)), "unexpected error: {:?}", err);
        assert!(err.is_corruption());
    }

    #[test]
    fn test_archive_written_into_source_tree() {
        let mut harness = ArchiveTestHarness::new();
        let names = harness.generate_project(small_project()).unwrap();
        let inside = harness.source_dir.path().join("self.zip");

        // Build twice so the second walk sees the first container
        ArchiveBuilder::new(HashAlgorithm::Md5)
            .build(harness.source_dir.path(), &inside)
            .unwrap();
        let report = ArchiveBuilder::new(HashAlgorithm::Md5)
            .build(harness.source_dir.path(), &inside)
            .unwrap();

        assert_eq!(report.entry_count(), names.len());
        assert!(report.entries.iter().all(|e| e.name != "self.zip"));
        audit_archive(&inside).unwrap();
    }

    #[test]
    fn test_large_mixed_project() {
        let mut harness = ArchiveTestHarness::new();
        let names = harness
            .generate_project(ProjectConfig {
                max_depth: 3,
                dirs_per_level: 4,
                files_per_dir: 8,
                file_size_range: 1..20_000,
            })
            .unwrap();

        let report = harness.build_and_record(HashAlgorithm::Sha256).unwrap();
        assert_eq!(report.entry_count(), names.len());
        assert!(report.compression_ratio() > 0.0);

        let audit = audit_archive(&harness.archive_path()).unwrap();
        assert_eq!(audit.entries_checked, names.len());
        assert!(Verifier::new(&harness.archive_path(), &harness.checksum_path())
            .expected_algorithm(HashAlgorithm::Sha256)
            .verify()
            .unwrap()
            .is_verified());
    }
}
