//! xpak CLI - Command-line tool for building and inspecting pak files.
//!
//! This is the main entry point for the xpak command-line application.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use xpak::prelude::*;

/// xpak - embedded ZIP/PAK container tool
#[derive(Parser)]
#[command(name = "xpak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of a pak file
    List {
        /// Path to the pak file
        #[arg(short, long, env = "INPUT_PAK")]
        pak: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Archive was written big-endian (console build)
        #[arg(long)]
        big_endian: bool,
    },

    /// Extract files from a pak file
    Extract {
        /// Path to the pak file
        #[arg(short, long, env = "INPUT_PAK")]
        pak: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Archive was written big-endian (console build)
        #[arg(long)]
        big_endian: bool,
    },

    /// Print a single entry to stdout
    Cat {
        /// Path to the pak file
        #[arg(short, long, env = "INPUT_PAK")]
        pak: PathBuf,

        /// Entry name
        name: String,

        /// Collapse CRLF line endings to LF
        #[arg(short, long)]
        text: bool,

        /// Archive was written big-endian (console build)
        #[arg(long)]
        big_endian: bool,
    },

    /// Build a pak file from a directory tree
    Create {
        /// Input directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output pak file
        #[arg(short, long)]
        output: PathBuf,

        /// Payload alignment boundary (power of two, 0 = none)
        #[arg(short, long, default_value_t = 512)]
        alignment: u32,

        /// Omit alignment padding from the central directory
        #[arg(long)]
        dense: bool,

        /// Compress payloads with LZMA
        #[arg(short, long)]
        compress: bool,

        /// Write big-endian (console build)
        #[arg(long)]
        big_endian: bool,

        /// Spill payloads to a temp file instead of holding them in memory
        #[arg(long)]
        disk_cache: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { pak, filter, detailed, big_endian } => {
            cmd_list(&pak, filter.as_deref(), detailed, big_endian)?;
        }
        Commands::Extract { pak, output, filter, big_endian } => {
            cmd_extract(&pak, &output, filter.as_deref(), big_endian)?;
        }
        Commands::Cat { pak, name, text, big_endian } => {
            cmd_cat(&pak, &name, text, big_endian)?;
        }
        Commands::Create { input, output, alignment, dense, compress, big_endian, disk_cache } => {
            cmd_create(&input, &output, alignment, dense, compress, big_endian, disk_cache)?;
        }
    }

    Ok(())
}

fn mount(pak_path: &Path, big_endian: bool) -> Result<ZipContainer> {
    let mut container = ZipContainer::new(NameCase::Insensitive);
    container.set_big_endian(big_endian);
    container
        .parse_from_disk(pak_path)
        .context("Failed to open pak file")?;
    Ok(container)
}

fn cmd_list(pak_path: &Path, filter: Option<&str>, detailed: bool, big_endian: bool) -> Result<()> {
    let container = mount(pak_path, big_endian)?;

    let mut count = 0;
    for entry in container.iter() {
        if let Some(pattern) = filter {
            if !glob_match(pattern, &entry.name) {
                continue;
            }
        }

        if detailed {
            println!(
                "{:>12} {:>12} {} {}",
                entry.compressed_size,
                entry.uncompressed_size,
                match entry.compression {
                    CompressionMethod::Lzma => "L",
                    CompressionMethod::Store => " ",
                },
                entry.name
            );
        } else {
            println!("{}", entry.name);
        }
        count += 1;
    }

    println!("\nTotal: {} entries (alignment {})", count, container.alignment());

    Ok(())
}

fn cmd_extract(pak_path: &Path, output: &Path, filter: Option<&str>, big_endian: bool) -> Result<()> {
    println!("Opening pak file: {}", pak_path.display());

    let start = Instant::now();
    let mut container = mount(pak_path, big_endian)?;

    println!("Loaded {} entries in {:?}", container.entry_count(), start.elapsed());

    let names: Vec<String> = container
        .names()
        .filter(|name| filter.map_or(true, |pattern| glob_match(pattern, name)))
        .map(str::to_string)
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
    for name in &names {
        let output_path = output.join(name.replace('\\', "/"));

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = container
            .read(name, false)
            .with_context(|| format!("Failed to read entry {name}"))?;
        fs::write(&output_path, data)?;

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(())
}

fn cmd_cat(pak_path: &Path, name: &str, text: bool, big_endian: bool) -> Result<()> {
    let mut container = mount(pak_path, big_endian)?;

    let data = container
        .read(name, text)
        .with_context(|| format!("Failed to read entry {name}"))?;
    std::io::stdout().write_all(&data)?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_create(
    input: &Path,
    output: &Path,
    alignment: u32,
    dense: bool,
    compress: bool,
    big_endian: bool,
    disk_cache: bool,
) -> Result<()> {
    anyhow::ensure!(
        alignment == 0 || alignment.is_power_of_two(),
        "Alignment must be a power of two (or 0)"
    );

    let mut container = if disk_cache {
        ZipContainer::with_disk_cache(NameCase::Insensitive, None)
    } else {
        ZipContainer::new(NameCase::Insensitive)
    };
    container.set_big_endian(big_endian);
    container.force_alignment(true, !dense, alignment);

    let method = if compress {
        CompressionMethod::Lzma
    } else {
        CompressionMethod::Store
    };

    let files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    println!("Packing {} files from {}...", files.len(), input.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    for path in &files {
        let name = path
            .strip_prefix(input)
            .unwrap_or(path)
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");

        container
            .add_file(&name, path, method)
            .with_context(|| format!("Failed to add {}", path.display()))?;

        pb.inc(1);
    }
    pb.finish_with_message("Done");

    let file = fs::File::create(output).context("Failed to create output file")?;
    let mut sink = FileSink::new(file);
    container
        .save_to_stream(&mut sink)
        .context("Failed to write pak file")?;
    drop(sink.into_inner()?);

    println!(
        "Wrote {} ({} entries, {} bytes) in {:?}",
        output.display(),
        container.entry_count(),
        container.estimate_size(),
        start.elapsed()
    );

    Ok(())
}

/// Case-insensitive entry-name filter: `*` wildcards, plain substring
/// match when the pattern carries none.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let name = name.to_lowercase();

    if !pattern.contains('*') {
        return name.contains(&pattern);
    }

    // Anchor each literal segment in order; a leading segment must sit
    // at the very start, a trailing one must close out the name.
    let mut rest = name.as_str();
    let mut anchored_start = !pattern.starts_with('*');
    for part in pattern.split('*').filter(|p| !p.is_empty()) {
        match rest.find(part) {
            Some(0) => rest = &rest[part.len()..],
            Some(at) if !anchored_start => rest = &rest[at + part.len()..],
            _ => return false,
        }
        anchored_start = false;
    }
    pattern.ends_with('*') || rest.is_empty()
}
