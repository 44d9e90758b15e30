//! LZW-GC command-line driver.
//!
//! Compresses or decompresses a file. With one worker the file is streamed
//! through a single dictionary; with more, it is split into that many chunks
//! that are coded in parallel and joined with boundary markers.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lzwgc::chunked::{compress_stream, decompress_stream};
use lzwgc::config::DEFAULT_CODE_BITS;
use lzwgc::{compress_chunks, decompress_chunks, Capacity, Config};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Streaming LZW with a garbage-collected dictionary.
#[derive(Parser)]
#[command(name = "lzwgc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by both directions.
#[derive(clap::Args)]
struct CodecArgs {
    /// Input file
    #[arg(short, long)]
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Code width in bits; the dictionary holds 2^bits tokens (8-24)
    #[arg(short, long, default_value_t = DEFAULT_CODE_BITS)]
    bits: u32,

    /// Number of independent chunks to code in parallel
    #[arg(short, long, default_value_t = 1)]
    workers: usize,
}

impl CodecArgs {
    fn config(&self) -> Result<Config> {
        let capacity = Capacity::from_code_bits(self.bits).context("Invalid code width")?;
        let config = Config::new(capacity).with_workers(self.workers);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Compress(CodecArgs),

    /// Decompress a file produced by `compress` with the same code width
    Decompress(CodecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    match cli.command {
        Commands::Compress(args) => cmd_compress(&args),
        Commands::Decompress(args) => cmd_decompress(&args),
    }
}

fn cmd_compress(args: &CodecArgs) -> Result<()> {
    let config = args.config()?;
    info!(
        "Compressing {:?} with {} bit codes, {} worker(s)",
        args.input,
        config.capacity.code_bits(),
        config.workers
    );
    let started = Instant::now();

    let (bytes_in, bytes_out) = if config.workers == 1 {
        let (reader, writer) = open_pair(&args.input, &args.output)?;
        let stats =
            compress_stream(reader, writer, config.capacity).context("Compression failed")?;
        debug!(tokens = stats.tokens, "stream compressed");
        (stats.bytes_in, stats.bytes_out)
    } else {
        let input = std::fs::read(&args.input).context("Failed to read input file")?;
        let output = compress_chunks(&input, &config).context("Compression failed")?;
        std::fs::write(&args.output, &output).context("Failed to write output file")?;
        (input.len() as u64, output.len() as u64)
    };

    report("Compressed", bytes_in, bytes_out, started);
    Ok(())
}

fn cmd_decompress(args: &CodecArgs) -> Result<()> {
    let config = args.config()?;
    info!(
        "Decompressing {:?} with {} bit codes, {} worker(s)",
        args.input,
        config.capacity.code_bits(),
        config.workers
    );
    let started = Instant::now();

    let (bytes_in, bytes_out) = if config.workers == 1 {
        let (reader, writer) = open_pair(&args.input, &args.output)?;
        let stats =
            decompress_stream(reader, writer, config.capacity).context("Decompression failed")?;
        debug!(chunks = stats.chunks, tokens = stats.tokens, "stream decompressed");
        (stats.bytes_in, stats.bytes_out)
    } else {
        let input = std::fs::read(&args.input).context("Failed to read input file")?;
        let output = decompress_chunks(&input, &config).context("Decompression failed")?;
        std::fs::write(&args.output, &output).context("Failed to write output file")?;
        (input.len() as u64, output.len() as u64)
    };

    report("Decompressed", bytes_in, bytes_out, started);
    Ok(())
}

fn open_pair(input: &Path, output: &Path) -> Result<(File, File)> {
    let reader = File::open(input).with_context(|| format!("Failed to open {:?}", input))?;
    let writer = File::create(output).with_context(|| format!("Failed to create {:?}", output))?;
    Ok((reader, writer))
}

fn report(verb: &str, bytes_in: u64, bytes_out: u64, started: Instant) {
    let elapsed = started.elapsed();
    let ratio = if bytes_in == 0 {
        0.0
    } else {
        bytes_out as f64 / bytes_in as f64
    };
    info!(
        "{} {} bytes into {} bytes ({:.3}) in {:.2?}",
        verb, bytes_in, bytes_out, ratio, elapsed
    );
}
