use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::bundle::CompressionMethod;
use crate::bundle::codec::DEFAULT_ZSTD_LEVEL;

#[derive(Parser, Debug)]
#[command(name = "file-bundler")]
#[command(version)]
#[command(
    about = "Pack files and directories into a single bundle and extract them again",
    long_about = None
)]
#[command(after_help = "Examples:\n  \
  file-bundler bundle -i data -o data.bundle           bundle a directory\n  \
  file-bundler bundle -i data -o data.bundle -c zstd   bundle with zstd\n  \
  file-bundler extract -i data.bundle -o out           extract everything into out\n  \
  file-bundler list -v -i data.bundle                  show sizes and ratios")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode, no progress messages
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a bundle from files and directories
    Bundle(BundleArgs),
    /// Extract a bundle into a directory
    Extract(ExtractArgs),
    /// List bundle contents
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Files or directories to include
    #[arg(short, long, required = true, num_args = 1.., value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// Bundle file to create (overwritten if it exists)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Compression applied to every file
    #[arg(short, long, value_enum)]
    pub compress: Option<CompressionAlgorithm>,

    /// zstd compression level
    #[arg(
        long,
        env = "FILE_BUNDLER_ZSTD_LEVEL",
        default_value_t = DEFAULT_ZSTD_LEVEL,
        value_parser = clap::value_parser!(i32).range(1..=22)
    )]
    pub level: i32,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Bundle file to read
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Destination directory (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Entries to extract (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Exclude entries that follow
    #[arg(short = 'x', value_name = "PATTERN", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Write file contents to stdout instead of disk
    #[arg(short = 'p', long)]
    pub pipe: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Bundle file to read
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Show sizes, ratio and compression method
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    /// LZ4 frames, fastest
    Lz4,
    /// zstd, better ratio
    Zstd,
}

impl From<CompressionAlgorithm> for CompressionMethod {
    fn from(value: CompressionAlgorithm) -> Self {
        match value {
            CompressionAlgorithm::Lz4 => CompressionMethod::Lz4,
            CompressionAlgorithm::Zstd => CompressionMethod::Zstd,
        }
    }
}

impl BundleArgs {
    pub fn compression_method(&self) -> CompressionMethod {
        self.compress.map(Into::into).unwrap_or_default()
    }
}

impl ExtractArgs {
    pub fn is_quiet(&self, cli_quiet: bool) -> bool {
        cli_quiet || self.pipe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bundle_args() {
        let cli = Cli::parse_from([
            "file-bundler", "bundle", "-i", "a", "b", "-o", "out.bundle", "-c", "lz4",
        ]);
        let Command::Bundle(args) = cli.command else {
            panic!("expected bundle command");
        };
        assert_eq!(args.input, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(args.compression_method(), CompressionMethod::Lz4);
    }

    #[test]
    fn test_compression_defaults_to_none() {
        let cli = Cli::parse_from(["file-bundler", "bundle", "-i", "a", "-o", "out.bundle"]);
        let Command::Bundle(args) = cli.command else {
            panic!("expected bundle command");
        };
        assert_eq!(args.compression_method(), CompressionMethod::None);
    }

    #[test]
    fn test_parse_extract_args() {
        let cli = Cli::parse_from([
            "file-bundler", "extract", "-i", "x.bundle", "a.txt", "-x", "*.log", "-q",
        ]);
        assert!(cli.quiet);
        let Command::Extract(args) = cli.command else {
            panic!("expected extract command");
        };
        assert_eq!(args.files, ["a.txt"]);
        assert_eq!(args.exclude, ["*.log"]);
        assert!(args.output.is_none());
    }
}
