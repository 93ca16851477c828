//! Cdrpack CLI - inspect and unpack the payload container of drawing files.
//!
//! This is the main entry point for the cdrpack command-line application.

use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

use cdrpack::prelude::*;

/// Cdrpack - payload container tool for legacy drawing files
#[derive(Parser)]
#[command(name = "cdrpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a file is a payload container
    Probe {
        /// Path to the input file
        #[arg(env = "CDRPACK_INPUT")]
        input: PathBuf,
    },

    /// List payloads in a container
    List {
        /// Path to the input file
        #[arg(env = "CDRPACK_INPUT")]
        input: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Print the listing as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Extract payloads into a directory
    Extract {
        /// Path to the input file
        #[arg(env = "CDRPACK_INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "CDRPACK_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Write one payload to stdout
    Cat {
        /// Path to the input file
        input: PathBuf,

        /// Payload name (exact, or a prefix of a stored name)
        name: String,
    },

    /// Check payloads against their recorded CRC-32
    Verify {
        /// Path to the input file
        #[arg(env = "CDRPACK_INPUT")]
        input: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Probe { input } => {
            cmd_probe(&input)?;
        }
        Commands::List {
            input,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&input, filter.as_deref(), detailed, json)?;
        }
        Commands::Extract {
            input,
            output,
            filter,
        } => {
            cmd_extract(&input, &output, filter.as_deref())?;
        }
        Commands::Cat { input, name } => {
            cmd_cat(&input, &name)?;
        }
        Commands::Verify { input, filter } => {
            cmd_verify(&input, filter.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn cmd_probe(input: &Path) -> Result<()> {
    let mut archive = Archive::open(input).context("Failed to open input file")?;

    if archive.is_container() {
        println!(
            "{}: payload container, {} entries",
            input.display(),
            archive.entries().count()
        );
    } else if let ArchiveState::Rejected { detail, .. } = archive.state() {
        println!("{}: not a payload container ({})", input.display(), detail);
    }

    Ok(())
}

fn cmd_list(input: &Path, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let archive = open_container(input)?;
    let filter = compile_filter(filter)?;
    let entries: Vec<&DirectoryEntry> = archive
        .entries()
        .filter(|e| matches_filter(filter.as_ref(), e))
        .collect();

    if json {
        let listing = serde_json::to_string_pretty(&entries).context("Failed to encode listing")?;
        println!("{}", listing);
        return Ok(());
    }

    for entry in &entries {
        if detailed {
            println!(
                "{:>12} {:>12} {:>9} {:08x} {}",
                entry.compressed_size(),
                entry.uncompressed_size(),
                entry.compression_method().to_string(),
                entry.crc32(),
                entry.name_lossy()
            );
        } else {
            println!("{}", entry.name_lossy());
        }
    }

    println!("\nTotal: {} entries", entries.len());

    Ok(())
}

fn cmd_extract(input: &Path, output: &Path, filter: Option<&str>) -> Result<()> {
    println!("Opening container: {}", input.display());

    let start = Instant::now();
    let mut archive = open_container(input)?;
    println!(
        "Loaded {} entries in {:?}",
        archive.entries().count(),
        start.elapsed()
    );

    let filter = compile_filter(filter)?;
    let names: Vec<Vec<u8>> = archive
        .entries()
        .filter(|e| !e.is_dir() && matches_filter(filter.as_ref(), e))
        .map(|e| e.name().to_vec())
        .collect();

    println!("Extracting {} entries...", names.len());

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut extracted = 0;
    let mut errors = 0;

    for name in &names {
        let display = String::from_utf8_lossy(name);
        let Some(output_path) = sanitized_path(output, &display) else {
            warn!("skipping {}: name escapes the output directory", display);
            errors += 1;
            pb.inc(1);
            continue;
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        match archive.payload(name) {
            Ok(payload) => {
                let mut file = File::create(&output_path)
                    .with_context(|| format!("Failed to create {}", output_path.display()))?;
                write_payload(payload, &mut file)?;
                extracted += 1;
            }
            Err(e) => {
                pb.suspend(|| eprintln!("Error extracting {}: {}", display, e));
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} entries in {:?} ({} errors)",
        extracted,
        start.elapsed(),
        errors
    );

    Ok(())
}

fn cmd_cat(input: &Path, name: &str) -> Result<()> {
    let mut archive = open_container(input)?;
    let payload = archive
        .payload_str(name)
        .with_context(|| format!("Failed to read payload {}", name))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_payload(payload, &mut out)?;
    out.flush()?;

    Ok(())
}

fn cmd_verify(input: &Path, filter: Option<&str>) -> Result<()> {
    let mut archive = open_container(input)?;
    let filter = compile_filter(filter)?;
    let names: Vec<Vec<u8>> = archive
        .entries()
        .filter(|e| !e.is_dir() && matches_filter(filter.as_ref(), e))
        .map(|e| e.name().to_vec())
        .collect();

    let mut failures = 0;
    for name in &names {
        match archive.verify(name) {
            Ok(()) => println!("OK      {}", String::from_utf8_lossy(name)),
            Err(e) => {
                println!("FAILED  {}: {}", String::from_utf8_lossy(name), e);
                failures += 1;
            }
        }
    }

    println!("\nVerified {} entries ({} failed)", names.len(), failures);
    if failures > 0 {
        anyhow::bail!("{} of {} entries failed verification", failures, names.len());
    }

    Ok(())
}

fn open_container(input: &Path) -> Result<Archive<io::Cursor<memmap2::Mmap>>> {
    let mut archive = Archive::open(input).context("Failed to open input file")?;
    if archive.is_container() {
        return Ok(archive);
    }

    match archive.state() {
        ArchiveState::Rejected { detail, .. } => {
            anyhow::bail!("{} is not a payload container: {}", input.display(), detail)
        }
        _ => anyhow::bail!("{} is not a payload container", input.display()),
    }
}

fn write_payload<R: Read + Seek, W: Write>(payload: Payload<'_, R>, out: &mut W) -> Result<()> {
    match payload {
        Payload::Stored(mut range) => {
            io::copy(&mut range, out).context("Failed to copy stored payload")?;
        }
        Payload::Inflated(data) => {
            out.write_all(&data).context("Failed to write payload")?;
        }
    }
    Ok(())
}

fn compile_filter(filter: Option<&str>) -> Result<Option<glob::Pattern>> {
    filter
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid filter pattern {}", p)))
        .transpose()
}

fn matches_filter(filter: Option<&glob::Pattern>, entry: &DirectoryEntry) -> bool {
    filter.map_or(true, |p| p.matches(&entry.name_lossy()))
}

/// Join `name` onto `root`, refusing absolute paths and parent components.
fn sanitized_path(root: &Path, name: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for component in Path::new(&name.replace('\\', "/")).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (path != root).then_some(path)
}
