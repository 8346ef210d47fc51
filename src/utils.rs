//! Utility functions for VeriArchive
//!
//! Small helpers shared by the builder, the checksum recorder and the CLI:
//!
//! - File metadata extraction (size, permissions, modification time)
//! - Turning host paths into portable container entry names
//! - Byte formatting (human-readable sizes)
//! - Atomic file writing
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use crate::utils::{archive_name, format_bytes};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let base = Path::new("/home/user/project");
//! let full_path = Path::new("/home/user/project/src/main.rs");
//! assert_eq!(archive_name(full_path, base)?, "src/main.rs");
//!
//! println!("Size: {}", format_bytes(1536)); // "1.50 KB"
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, VeriError};
use std::fs;
use std::io::Write;
use std::path::{Component, Path};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// File metadata container
///
/// # Fields
///
/// * `size` - File size in bytes (0 for directories)
/// * `permissions` - Unix-style permissions (e.g., 0o644, 0o755)
/// * `modified` - Last modification timestamp
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes (0 for directories)
    pub size: u64,
    /// Unix-style permissions (e.g., 0o644 for rw-r--r--)
    pub permissions: u32,
    /// Last modification timestamp
    pub modified: SystemTime,
}

impl FileMetadata {
    /// Extract metadata from an already-fetched `fs::Metadata`
    pub fn from_fs(metadata: &fs::Metadata) -> Result<Self> {
        Ok(Self {
            size: metadata.len(),
            permissions: get_permissions(metadata),
            modified: metadata.modified()?,
        })
    }
}

/// Get Unix permissions from metadata
#[cfg(unix)]
fn get_permissions(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

/// Get permissions from metadata (Windows implementation)
#[cfg(windows)]
fn get_permissions(metadata: &fs::Metadata) -> u32 {
    // Only the read-only attribute maps onto unix bits
    let mut mode = if metadata.permissions().readonly() { 0o444 } else { 0o644 };
    if metadata.is_dir() {
        mode |= 0o111;
    }
    mode
}

/// Build the container entry name for `path` relative to `base`
///
/// Components are joined with `/` regardless of the host separator so the
/// archive is portable.
///
/// # Errors
///
/// - [`VeriError::Internal`] if `path` is not under `base`
/// - [`VeriError::PathConversion`] if a component is not valid UTF-8
pub fn archive_name(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| {
        VeriError::internal(format!("Path {:?} is not relative to {:?}", path, base))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| VeriError::PathConversion(part.to_os_string()))?;
                parts.push(part);
            }
            Component::CurDir => {}
            other => {
                return Err(VeriError::internal(format!(
                    "Unexpected path component {:?} in {:?}",
                    other, relative
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(VeriError::internal(format!(
            "Path {:?} has no name relative to {:?}",
            path, base
        )));
    }

    Ok(parts.join("/"))
}

/// Format bytes in human-readable form
///
/// Uses 1024 as the conversion factor.
///
/// ```rust,ignore
/// assert_eq!(format_bytes(1023), "1023 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Atomic file write (write to temp file then rename)
///
/// The temporary file is created next to `path` so the final rename never
/// crosses a filesystem boundary. Either the previous file or the complete
/// new content is visible, never a partial write.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| VeriError::Io(e.error))?;

    Ok(())
}
