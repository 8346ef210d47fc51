//! Readability audit
//!
//! The digest proves the archive file is byte-identical to what was built;
//! the audit proves the container inside it still decodes. Every entry is
//! opened through the central directory and fully decompressed into a
//! discard sink, which also checks each entry's CRC-32.

use crate::error::{Result, VeriError};
use crate::types::AuditReport;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{debug, trace};
use zip::ZipArchive;

/// Decode every entry of the container at `path`
///
/// # Errors
///
/// - [`VeriError::Io`] if the file cannot be opened
/// - [`VeriError::InvalidArchive`] if it is not a readable container
/// - [`VeriError::CorruptEntry`] naming the first entry that fails to decode
pub fn audit_archive(path: &Path) -> Result<AuditReport> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| VeriError::InvalidArchive(e.to_string()))?;

    let mut report = AuditReport::default();

    for index in 0..archive.len() {
        let fallback_name = archive
            .name_for_index(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", index));

        let mut entry = archive.by_index(index).map_err(|e| VeriError::CorruptEntry {
            name: fallback_name.clone(),
            reason: e.to_string(),
        })?;

        let decoded = io::copy(&mut entry, &mut io::sink()).map_err(|e| VeriError::CorruptEntry {
            name: fallback_name.clone(),
            reason: e.to_string(),
        })?;

        trace!("Decoded {} ({} bytes)", fallback_name, decoded);
        report.entries_checked += 1;
        report.bytes_decoded += decoded;
    }

    debug!(
        "Audited {:?}: {} entries, {} bytes",
        path, report.entries_checked, report.bytes_decoded
    );
    Ok(report)
}
