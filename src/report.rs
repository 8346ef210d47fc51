//! Run log
//!
//! After a successful build a short plain-text summary is written next to
//! the working directory. The log is purely observational; nothing reads it
//! back.

use crate::error::Result;
use crate::types::BuildReport;
use crate::utils::format_bytes;

use chrono::{DateTime, Local, SecondsFormat};
use humantime::format_duration;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default log file name
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Summary of one build run
#[derive(Debug, Clone)]
pub struct RunLog {
    /// Container path
    pub output: PathBuf,
    /// Human-readable container size
    pub archive_size: String,
    /// Lowercase algorithm identifier
    pub algorithm: String,
    /// Hex digest of the container
    pub digest_hex: String,
    /// When the run started
    pub started_at: DateTime<Local>,
    /// How long the build took
    pub elapsed: Duration,
}

impl RunLog {
    /// Summarize a finished build
    pub fn from_build(report: &BuildReport, started_at: DateTime<Local>, elapsed: Duration) -> Self {
        Self {
            output: report.archive_path.clone(),
            archive_size: format_bytes(report.archive_size),
            algorithm: report.digest.algorithm().to_string(),
            digest_hex: report.digest.to_hex(),
            started_at,
            elapsed,
        }
    }

    /// Start time as RFC 3339 with offset, second precision
    pub fn start_time(&self) -> String {
        self.started_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// Render the six log lines
    pub fn render(&self) -> String {
        format!(
            "Output: {}\nArchive Size: {}\nHash Algorithm: {}\nHash Value: {}\nStart Time: {}\nElapsed Time: {}\n",
            self.output.display(),
            self.archive_size,
            self.algorithm,
            self.digest_hex,
            self.start_time(),
            format_duration(self.elapsed),
        )
    }

    /// Write the log, replacing any previous file at `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}
