//! Main entry point for the file-bundler CLI application.
//!
//! Dispatches the `bundle`, `extract` and `list` subcommands to the library.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::process;

use file_bundler::cli::{BundleArgs, Command, ExtractArgs, ListArgs};
use file_bundler::{
    BundleExtractor, BundleOptions, BundleWriter, Cli, CompressionMethod, EntryFilter,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Bundle(args) => run_bundle(args, cli.quiet),
        Command::Extract(args) => run_extract(args, cli.quiet),
        Command::List(args) => run_list(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Create a bundle from the input paths and report the result.
///
/// Every input is walked in order into a single output file; with a
/// compression method selected, the summary line also shows the ratio.
///
/// # Arguments
///
/// * `args` - Parsed `bundle` subcommand arguments
/// * `quiet` - Suppress progress and summary output
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if any input cannot be bundled.
fn run_bundle(args: &BundleArgs, quiet: bool) -> Result<()> {
    let options = BundleOptions {
        compression: args.compression_method(),
        zstd_level: args.level,
    };

    let mut writer = BundleWriter::create(&args.output, options)
        .with_context(|| format!("cannot create {}", args.output.display()))?;

    for input in &args.input {
        if !quiet {
            println!("  adding: {}", input.display());
        }
        writer
            .add_path(input)
            .with_context(|| format!("failed to bundle {}", input.display()))?;
    }

    let (_, summary) = writer.finish().context("failed to write manifest")?;

    if !quiet {
        println!(
            "Bundle '{}' created: {} files, {} directories",
            args.output.display(),
            summary.files,
            summary.directories
        );
        if options.compression != CompressionMethod::None && summary.stored_bytes > 0 {
            println!(
                "Compressed with {}: {} -> {} ({:.2}:1)",
                options.compression,
                format_size(summary.original_bytes),
                format_size(summary.stored_bytes),
                summary.original_bytes as f64 / summary.stored_bytes as f64
            );
        }
    }

    Ok(())
}

/// Extract a bundle to disk, or to stdout in pipe mode.
///
/// Handles the extraction options:
/// - Pipe mode (`-p`): write selected file contents to stdout
/// - Output directory (`-o`): extract there instead of the current directory
/// - Names and exclusions (`FILES`, `-x`): only extract matching entries
///
/// # Arguments
///
/// * `args` - Parsed `extract` subcommand arguments
/// * `quiet` - Suppress progress output (implied by pipe mode)
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the bundle is invalid or an
/// entry cannot be written.
fn run_extract(args: &ExtractArgs, quiet: bool) -> Result<()> {
    let quiet = args.is_quiet(quiet);
    let extractor = BundleExtractor::open(&args.input)
        .with_context(|| format!("cannot read bundle {}", args.input.display()))?;
    let filter = EntryFilter::new(args.files.clone(), args.exclude.clone());

    if args.pipe {
        let files: Vec<_> = extractor
            .list_files()
            .iter()
            .filter(|e| !e.is_directory && filter.matches(e))
            .collect();
        let show_filename = files.len() > 1;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for entry in files {
            if show_filename {
                writeln!(out, "--- {} ---", entry.path)?;
            }
            extractor.extract_to_writer(entry, &mut out)?;
        }
        out.flush()?;
        return Ok(());
    }

    let output_dir = args.output.as_deref().unwrap_or_else(|| Path::new("."));
    let summary = extractor
        .extract_all_with(output_dir, &filter, |entry| {
            if !quiet {
                println!("  extracting: {}", entry.path);
            }
        })
        .with_context(|| format!("failed to extract into {}", output_dir.display()))?;

    if !quiet {
        println!(
            "Extracted {} files, {} directories ({})",
            summary.files,
            summary.directories,
            format_size(summary.bytes_written)
        );
    }

    Ok(())
}

/// List entries in the bundle.
///
/// Supports two output formats:
/// - Simple format: just entry paths, one per line
/// - Verbose format (`-v`): table with sizes, ratio and compression method
///
/// # Arguments
///
/// * `args` - Parsed `list` subcommand arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the bundle cannot be read.
fn run_list(args: &ListArgs) -> Result<()> {
    let extractor = BundleExtractor::open(&args.input)
        .with_context(|| format!("cannot read bundle {}", args.input.display()))?;

    if !args.verbose {
        for entry in extractor.list_files() {
            println!("{}", entry.path);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>10}  {:>5}  {:>6}  Name",
        "Length", "Size", "Cmpr", "Method"
    );
    println!("{}", "-".repeat(50));

    let mut total_original = 0u64;
    let mut total_stored = 0u64;
    let mut file_count = 0usize;

    for entry in extractor.list_files() {
        let name = if entry.is_directory {
            format!("{}/", entry.path)
        } else {
            entry.path.clone()
        };
        println!(
            "{:>10}  {:>10}  {:>4}%  {:>6}  {}",
            entry.original_size,
            entry.size,
            entry.savings_percent(),
            entry.compression_method,
            name
        );

        if !entry.is_directory {
            total_original += entry.original_size;
            total_stored += entry.size;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(50));
    println!(
        "{:>10}  {:>10}  {:>4}%  {:>6}  {} files",
        total_original,
        total_stored,
        file_bundler::bundle::savings_percent(total_stored, total_original),
        "",
        file_count
    );

    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// Picks the largest binary unit (KB, MB, GB, TB) the size reaches and
/// prints two decimals; smaller sizes are printed in bytes.
///
/// # Arguments
///
/// * `size` - The size in bytes to format
///
/// # Returns
///
/// A formatted string with the size and appropriate unit.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    let mut value = size as f64;
    let mut unit = None;
    for name in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = Some(name);
    }

    match unit {
        Some(unit) => format!("{:.2} {}", value, unit),
        None => format!("{} bytes", size),
    }
}
