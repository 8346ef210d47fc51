//! Main test module for VeriArchive
//!
//! This module includes all test suites:
//! - Integration tests for the build, audit and verify workflow
//! - Property-based tests for determinism and tamper detection

pub mod integration;

#[cfg(test)]
mod edge_cases {
    use ::veriarchive::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let archive = out.path().join("empty.zip");

        let report = ArchiveBuilder::new(HashAlgorithm::Sha256)
            .build(source.path(), &archive)
            .unwrap();
        assert_eq!(report.entry_count(), 0);
        assert_eq!(report.total_source_bytes, 0);

        let audit = audit_archive(&archive).unwrap();
        assert_eq!(audit, AuditReport::default());

        let checksum = out.path().join("checksum.txt");
        write_checksum(&report.digest, &checksum).unwrap();
        assert!(verify_archive(&archive, HashAlgorithm::Sha256, &checksum)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn test_empty_subdirectories_are_not_entries() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("a/b/c")).unwrap();
        fs::write(source.path().join("a/file.txt"), "x").unwrap();

        let out = TempDir::new().unwrap();
        let report = ArchiveBuilder::new(HashAlgorithm::Md5)
            .build(source.path(), &out.path().join("a.zip"))
            .unwrap();

        let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a/file.txt"]);
    }

    #[test]
    fn test_zero_length_file() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("empty.txt"), "").unwrap();

        let out = TempDir::new().unwrap();
        let archive = out.path().join("z.zip");
        let report = ArchiveBuilder::new(HashAlgorithm::Fnv1a)
            .build(source.path(), &archive)
            .unwrap();

        assert_eq!(report.entry_count(), 1);
        assert_eq!(report.entries[0].size, 0);
        let audit = audit_archive(&archive).unwrap();
        assert_eq!(audit.entries_checked, 1);
        assert_eq!(audit.bytes_decoded, 0);
    }

    #[test]
    fn test_missing_checksum_file() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a").unwrap();
        let out = TempDir::new().unwrap();
        let archive = out.path().join("a.zip");
        ArchiveBuilder::new(HashAlgorithm::Sha1)
            .build(source.path(), &archive)
            .unwrap();

        let err = verify_archive(&archive, HashAlgorithm::Sha1, &out.path().join("nope.txt"))
            .unwrap_err();
        assert!(matches!(err, VeriError::ChecksumNotFound(_)));
    }

    #[test]
    fn test_malformed_checksum_records() {
        let out = TempDir::new().unwrap();
        let archive = out.path().join("never-read.zip");
        let checksum = out.path().join("checksum.txt");

        for content in ["", "SHA256", "SHA256 abc", "SHA256 zz", "SHA256 abcd extra"] {
            fs::write(&checksum, content).unwrap();
            let err = Verifier::new(&archive, &checksum).verify().unwrap_err();
            assert!(
                matches!(err, VeriError::ChecksumParse(_)),
                "content {:?} gave {:?}",
                content,
                err
            );
        }
    }

    #[test]
    fn test_checksum_record_layout() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("hello.txt"), "hello").unwrap();
        let out = TempDir::new().unwrap();
        let archive = out.path().join("h.zip");
        let checksum = out.path().join("checksum.txt");

        let report = ArchiveBuilder::new(HashAlgorithm::Sha256)
            .build(source.path(), &archive)
            .unwrap();
        write_checksum(&report.digest, &checksum).unwrap();

        let text = fs::read_to_string(&checksum).unwrap();
        let line = text.strip_suffix('\n').unwrap();
        let (algorithm, digest_hex) = line.split_once(' ').unwrap();
        assert_eq!(algorithm, "SHA256");
        assert_eq!(digest_hex.len(), 64);
        assert!(digest_hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
