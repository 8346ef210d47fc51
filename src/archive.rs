//! Archive construction
//!
//! [`ArchiveBuilder`] walks a source directory, writes every regular file
//! into a Deflate-compressed ZIP container and then digests the finished
//! container as it sits on disk.
//!
//! ## Determinism
//!
//! Two builds of an unchanged tree produce byte-identical containers:
//!
//! - directory listings are sorted by file name, so entry order does not
//!   depend on the host filesystem's listing order
//! - entry timestamps come from the source file mtime, never from the clock
//! - compression method and level are fixed
//!
//! ## What the digest covers
//!
//! The digest is computed over the *container bytes*, not over the source
//! files. Verification therefore detects damage to the container itself
//! (truncation, a broken central directory) as well as content tampering.
//!
//! ## Example
//!
//! ```rust,no_run
//! use veriarchive::{ArchiveBuilder, HashAlgorithm};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = ArchiveBuilder::new(HashAlgorithm::Sha256)
//!     .build(Path::new("./project"), Path::new("./project.zip"))?;
//! println!("{} entries, digest {}", report.entry_count(), report.digest.to_hex());
//! # Ok(())
//! # }
//! ```

use crate::digest::{HashAlgorithm, STREAM_BUFFER_SIZE};
use crate::error::{Result, VeriError};
use crate::types::{BuildReport, FileEntry};
use crate::utils::{self, FileMetadata};

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entries at or above this size need the ZIP64 extensions
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Builds a container from a directory tree and digests the result
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    algorithm: HashAlgorithm,
    follow_symlinks: bool,
}

impl ArchiveBuilder {
    /// Create a builder that digests the container with `algorithm`
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            follow_symlinks: false,
        }
    }

    /// Archive the targets of symbolic links instead of skipping the links
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Algorithm used for the container digest
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Archive `source` into a fresh container at `dest`
    ///
    /// Any error aborts the build immediately; the destination may then be
    /// left incomplete on disk.
    ///
    /// # Errors
    ///
    /// - [`VeriError::SourceNotFound`] / [`VeriError::NotADirectory`] for a bad source
    /// - [`VeriError::PermissionDenied`] if part of the tree cannot be read
    /// - [`VeriError::Io`] / [`VeriError::Zip`] for write failures
    pub fn build(&self, source: &Path, dest: &Path) -> Result<BuildReport> {
        let start = Instant::now();
        check_source(source)?;

        info!("Archiving {:?} into {:?} ({})", source, dest, self.algorithm);

        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(dest)?;
        let dest_canonical = dest.canonicalize().ok();

        let mut writer = ZipWriter::new(BufWriter::with_capacity(STREAM_BUFFER_SIZE, file));
        let mut entries = Vec::new();
        let mut total_source_bytes = 0u64;

        let walker = WalkDir::new(source)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(walk_error)?;

            if !entry.file_type().is_file() {
                trace!("Skipping non-file {:?}", entry.path());
                continue;
            }
            if is_destination(entry.path(), dest, dest_canonical.as_deref()) {
                debug!("Skipping the container itself: {:?}", entry.path());
                continue;
            }

            let file_entry = self.write_entry(&mut writer, source, entry.path())?;
            total_source_bytes += file_entry.size;
            entries.push(file_entry);
        }

        let buffered = writer.finish()?;
        let mut file = buffered
            .into_inner()
            .map_err(|e| VeriError::Io(e.into_error()))?;
        file.flush()?;

        // digest pass over the finished container
        file.seek(SeekFrom::Start(0))?;
        let mut acc = self.algorithm.accumulator();
        let archive_size = io::copy(&mut file, &mut acc)?;
        let digest = acc.finalize();

        let duration = start.elapsed();
        info!(
            "Archived {} files ({} bytes) into {} bytes in {:?}",
            entries.len(),
            total_source_bytes,
            archive_size,
            duration
        );

        Ok(BuildReport {
            archive_path: dest.to_path_buf(),
            archive_size,
            entries,
            total_source_bytes,
            digest,
            duration,
        })
    }

    fn write_entry<W: Write + Seek>(
        &self,
        writer: &mut ZipWriter<W>,
        root: &Path,
        path: &Path,
    ) -> Result<FileEntry> {
        let name = utils::archive_name(path, root)?;
        let mut source = open_source(path)?;
        let metadata = FileMetadata::from_fs(&source.metadata()?)?;
        let modified: DateTime<Utc> = metadata.modified.into();

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(dos_timestamp(&modified))
            .unix_permissions(metadata.permissions)
            .large_file(metadata.size >= ZIP64_THRESHOLD);

        writer.start_file(name.as_str(), options)?;
        let copied = io::copy(&mut source, writer)?;
        if copied != metadata.size {
            warn!(
                "{:?} changed while archiving: expected {} bytes, read {}",
                path, metadata.size, copied
            );
        }

        debug!("Added {} ({} bytes)", name, copied);

        Ok(FileEntry {
            name,
            source: path.to_path_buf(),
            size: copied,
            permissions: metadata.permissions,
            modified,
        })
    }
}

fn check_source(source: &Path) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => VeriError::SourceNotFound(source.to_path_buf()),
        io::ErrorKind::PermissionDenied => VeriError::PermissionDenied {
            path: source.to_path_buf(),
        },
        _ => VeriError::Io(e),
    })?;

    if !metadata.is_dir() {
        return Err(VeriError::NotADirectory(source.to_path_buf()));
    }
    Ok(())
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => VeriError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => VeriError::Io(e),
    })
}

fn walk_error(err: walkdir::Error) -> VeriError {
    let denied = err
        .io_error()
        .map(|e| e.kind() == io::ErrorKind::PermissionDenied)
        .unwrap_or(false);

    if denied {
        if let Some(path) = err.path() {
            return VeriError::PermissionDenied {
                path: path.to_path_buf(),
            };
        }
    }
    VeriError::WalkDir(err)
}

/// The container may live inside the tree it archives
fn is_destination(path: &Path, dest: &Path, dest_canonical: Option<&Path>) -> bool {
    if path.file_name() != dest.file_name() {
        return false;
    }
    match (path.canonicalize().ok(), dest_canonical) {
        (Some(candidate), Some(dest)) => candidate == dest,
        _ => false,
    }
}

/// Convert an mtime to a DOS timestamp, falling back to the DOS epoch
/// (1980-01-01) outside the representable 1980–2107 range
fn dos_timestamp(modified: &DateTime<Utc>) -> zip::DateTime {
    let year = u16::try_from(modified.year()).unwrap_or(0);
    zip::DateTime::from_date_and_time(
        year,
        modified.month() as u8,
        modified.day() as u8,
        modified.hour() as u8,
        modified.minute() as u8,
        modified.second() as u8,
    )
    .unwrap_or_default()
}

/// Paths of every regular file the builder would archive, in entry order
///
/// Useful for previewing a build without writing anything.
pub fn list_sources(source: &Path, follow_symlinks: bool) -> Result<Vec<PathBuf>> {
    check_source(source)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(source)
        .follow_links(follow_symlinks)
        .sort_by_file_name()
    {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
