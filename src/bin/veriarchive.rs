//! # VeriArchive CLI - archive a folder and fingerprint the result
//!
//! ## Usage
//! ```bash
//! # Build an archive and its checksum record
//! veriarchive --dir ./project -o project.zip --hash sha256
//!
//! # Verify the archive later against checksum.txt
//! veriarchive -o project.zip --hash sha256 --verify
//!
//! # Verify against a record stored elsewhere
//! veriarchive -o project.zip --hash sha256 --verify --checksum project.sha256
//! ```
//!
//! Any other combination of flags prints the usage text.

use chrono::{Local, SecondsFormat};
use clap::{CommandFactory, Parser};
use colored::*;
use humantime::format_duration;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use veriarchive::checksum::DEFAULT_CHECKSUM_FILE;
use veriarchive::report::DEFAULT_LOG_FILE;
use veriarchive::utils::format_bytes;
use veriarchive::{
    audit_archive, write_checksum, ArchiveBuilder, HashAlgorithm, Result, RunLog,
    VerificationOutcome, Verifier,
};

/// VeriArchive CLI - archive a folder into a ZIP file and record its checksum
#[derive(Parser, Debug)]
#[command(name = "veriarchive")]
#[command(version)]
#[command(about = "Archive a directory and record a verifiable checksum of the archive")]
#[command(long_about = None)]
struct Cli {
    /// Folder full path
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Output archive file (the archive to check in verify mode)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Hashing algorithm (sha256, fnv1a, sha1, md5)
    #[arg(long)]
    hash: Option<String>,

    /// Checksum file name
    #[arg(long, default_value = DEFAULT_CHECKSUM_FILE)]
    checksum: PathBuf,

    /// Verify archive integrity (<dir> is ignored, <hash> must match the record)
    #[arg(long)]
    verify: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// What a given flag combination asks for
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Build {
        dir: PathBuf,
        output: PathBuf,
        hash: String,
    },
    Verify {
        output: PathBuf,
        hash: String,
    },
    Usage,
}

fn select_mode(cli: &Cli) -> Mode {
    match (&cli.dir, &cli.output, &cli.hash, cli.verify) {
        (_, Some(output), Some(hash), true) => Mode::Verify {
            output: output.clone(),
            hash: hash.clone(),
        },
        (Some(dir), Some(output), Some(hash), false) => Mode::Build {
            dir: dir.clone(),
            output: output.clone(),
            hash: hash.clone(),
        },
        _ => Mode::Usage,
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    init_tracing(cli.verbose);

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e.user_message());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("veriarchive=debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Main command runner
fn run(cli: &Cli) -> Result<()> {
    match select_mode(cli) {
        Mode::Build { dir, output, hash } => cmd_build(&dir, &output, &hash, &cli.checksum),
        Mode::Verify { output, hash } => cmd_verify(&output, &hash, &cli.checksum),
        Mode::Usage => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Build the archive, audit it, then record checksum and log
///
/// Nothing is persisted besides the container unless the build and the
/// audit both succeed.
fn cmd_build(dir: &Path, output: &Path, hash: &str, checksum_path: &Path) -> Result<()> {
    let algorithm: HashAlgorithm = hash.parse()?;

    println!("{}", "Creating archive...".blue().bold());

    let started_at = Local::now();
    let start = Instant::now();
    let spinner = start_spinner("Archiving files...");

    let built = ArchiveBuilder::new(algorithm).build(dir, output);
    spinner.finish_and_clear();
    let report = built?;
    let elapsed = start.elapsed();

    println!("\nArchive name: {}", output.display().to_string().cyan());
    println!("Archive size: {}", format_bytes(report.archive_size).cyan());
    println!(
        "Files: {} ({} uncompressed)",
        report.entry_count().to_string().cyan(),
        format_bytes(report.total_source_bytes)
    );

    let audit = audit_archive(output)?;
    println!(
        "\n{} Files in the archive are readable ({} entries checked)",
        "✓".green().bold(),
        audit.entries_checked
    );

    println!("Time start: {}", started_at.to_rfc3339_opts(SecondsFormat::Secs, false));
    println!("Elapsed time: {}", format_duration(elapsed));
    println!("Completed.");
    println!(
        "{}",
        format!("Hash ({}) : {}", algorithm, report.digest.to_hex()).yellow()
    );

    write_checksum(&report.digest, checksum_path)?;
    println!("Checksum file: {}", checksum_path.display());

    let log = RunLog::from_build(&report, started_at, elapsed);
    log.write_to(Path::new(DEFAULT_LOG_FILE))?;
    println!("Log saved to {}", DEFAULT_LOG_FILE);

    Ok(())
}

/// Verify an archive against its checksum record
///
/// A mismatch is reported, not treated as a failure of the command.
fn cmd_verify(output: &Path, hash: &str, checksum_path: &Path) -> Result<()> {
    let algorithm: HashAlgorithm = hash.parse()?;
    let outcome = Verifier::new(output, checksum_path)
        .expected_algorithm(algorithm)
        .verify()?;

    if let Some(computed) = outcome.computed() {
        print!(
            "{}",
            format!("Computed Hash ({}): {}", computed.algorithm(), computed.to_hex()).yellow()
        );
    }

    match &outcome {
        VerificationOutcome::Match(_) => println!(" {}", "Checksum verified".green()),
        VerificationOutcome::AlgorithmMismatch { .. } => {
            println!("{}", outcome.summary().red())
        }
        VerificationOutcome::HashMismatch { .. } => println!(" {}", outcome.summary().red()),
    }

    Ok(())
}

/// Spinner ticking on its own thread until cleared
fn start_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
