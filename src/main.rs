use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use zpak::{CompressionLevel, Decoder, EncodeOptions, Encoder};

#[derive(Parser)]
#[command(name = "zpak")]
#[command(about = "Pack a directory tree into a single compressed archive", long_about = None)]
struct Cli {
    /// Set the logging level
    #[arg(long, value_enum, global = true, default_value = "info")]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a directory into an archive file
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Compression algorithm: lz4, zstd, lzma or brotli
        #[arg(long, default_value = "lz4")]
        algo: String,
        #[arg(long, value_enum, default_value = "medium")]
        level: LevelArg,
    },
    /// Extract an archive into a directory
    Decode {
        input: PathBuf,
        output_dir: PathBuf,
        /// Force the outer codec instead of auto-detecting it
        #[arg(long)]
        algo: Option<String>,
    },
    /// Print the manifest of an archive without extracting it
    List {
        input: PathBuf,
        #[arg(long)]
        algo: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LevelArg {
    Low,
    Medium,
    High,
}

impl From<LevelArg> for CompressionLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Low => CompressionLevel::Low,
            LevelArg::Medium => CompressionLevel::Medium,
            LevelArg::High => CompressionLevel::High,
        }
    }
}

fn decoder_for(algo: Option<String>) -> Decoder {
    match algo {
        Some(name) => Decoder::with_algorithm(name),
        None => Decoder::new(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            algo,
            level,
        } => {
            let encoder = Encoder::new(EncodeOptions {
                algorithm: algo,
                level: level.into(),
            });
            let summary = encoder.encode(&input, &output)?;
            println!(
                "Packed {} files ({} bytes) into {} ({} bytes)",
                summary.entries,
                summary.input_bytes,
                output.display(),
                summary.archive_bytes
            );
        }
        Commands::Decode {
            input,
            output_dir,
            algo,
        } => {
            let entries = decoder_for(algo).decode(&input, &output_dir)?;
            println!("Extracted {} files into {}", entries, output_dir.display());
        }
        Commands::List { input, algo } => {
            let archive = decoder_for(algo).read_archive(&input)?;
            println!("{:<40} {:>12} {:>10}", "Path", "Size", "CRC-32");
            for entry in &archive.manifest.entries {
                println!(
                    "{:<40} {:>12} {:>10}",
                    entry.original_path,
                    entry.original_size,
                    format!("{:08x}", entry.checksum)
                );
            }
        }
    }
    Ok(())
}
