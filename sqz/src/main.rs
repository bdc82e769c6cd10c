//! sqz: SQZ image codec driver.
//!
//! `c` compresses a PNG/PGM/PPM image into an SQZ stream under a byte
//! budget, `d` decompresses a stream (optionally only its first N bytes)
//! into PNG or PGM/PPM, `i` probes a stream header without decoding.

mod info;
mod process;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sqzdrive::{ColorMode, DriverError, EncodeSettings, Limits, MAX_DWT_LEVELS, ScanOrder};

#[derive(Parser)]
#[command(name = "sqz", version, about = "SQZ - Simple, scalable image codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a PNG/PGM/PPM image.
    #[command(name = "c", alias = "C")]
    Compress(CompressArgs),

    /// Decompress an SQZ image.
    #[command(name = "d", alias = "D")]
    Decompress(DecompressArgs),

    /// Probe an SQZ image header without decoding.
    #[command(name = "i", alias = "I")]
    Info(InfoArgs),
}

/// Arguments for the `c` subcommand.
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input PNG/PGM/PPM image.
    pub input: PathBuf,

    /// Output SQZ image.
    pub output: PathBuf,

    /// Requested output size in bytes (default: near-lossless).
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub budget: Option<u64>,

    /// Number of DWT decompositions to perform.
    #[arg(short, long, default_value_t = MAX_DWT_LEVELS,
          value_parser = clap::value_parser!(u8).range(1..=MAX_DWT_LEVELS as i64))]
    pub level: u8,

    /// Internal color mode (ignored for grayscale sources).
    #[arg(short, long, value_enum, default_value = "ycocg-r")]
    pub mode: ModeArg,

    /// DWT coefficient scanning order.
    #[arg(short, long, value_enum, default_value = "snake")]
    pub order: OrderArg,

    /// Use additional chroma subsampling.
    #[arg(short, long)]
    pub subsampling: bool,

    #[command(flatten)]
    pub limits: LimitArgs,
}

impl CompressArgs {
    pub fn settings(&self) -> EncodeSettings {
        EncodeSettings::new()
            .with_levels(self.level)
            .with_color_mode(self.mode.into())
            .with_scan_order(self.order.into())
            .with_subsampling(self.subsampling)
    }
}

/// Arguments for the `d` subcommand.
#[derive(Args, Debug)]
pub struct DecompressArgs {
    /// Input SQZ image.
    pub input: PathBuf,

    /// Output image (.png for PNG, anything else for PGM/PPM).
    pub output: PathBuf,

    /// Size of the input compressed data that will be consumed.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub budget: Option<u64>,

    #[command(flatten)]
    pub limits: LimitArgs,
}

/// Arguments for the `i` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input SQZ image.
    pub input: PathBuf,

    /// Size of the input compressed data that will be consumed.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub budget: Option<u64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub limits: LimitArgs,
}

/// Resource limits shared by all subcommands.
#[derive(Args, Debug)]
pub struct LimitArgs {
    /// Largest buffer the driver may allocate, in bytes.
    #[arg(long, env = "SQZ_MAX_MEMORY")]
    pub max_memory: Option<u64>,
}

impl LimitArgs {
    pub fn to_limits(&self) -> Limits {
        match self.max_memory {
            Some(bytes) => Limits::none().with_max_memory(bytes),
            None => Limits::none(),
        }
    }
}

/// Internal color mode. Numeric values are accepted too.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(alias = "0")]
    Grayscale,
    #[value(name = "ycocg-r", alias = "1")]
    YcocgR,
    #[value(alias = "2")]
    Oklab,
    #[value(alias = "3")]
    Logl1,
}

impl From<ModeArg> for ColorMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Grayscale => ColorMode::Grayscale,
            ModeArg::YcocgR => ColorMode::YCoCgR,
            ModeArg::Oklab => ColorMode::Oklab,
            ModeArg::Logl1 => ColorMode::Logl1,
        }
    }
}

/// Coefficient scan order. Numeric values are accepted too.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    #[value(alias = "0")]
    Raster,
    #[value(alias = "1")]
    Snake,
    #[value(alias = "2")]
    Morton,
    #[value(alias = "3")]
    Hilbert,
}

impl From<OrderArg> for ScanOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Raster => ScanOrder::Raster,
            OrderArg::Snake => ScanOrder::Snake,
            OrderArg::Morton => ScanOrder::Morton,
            OrderArg::Hilbert => ScanOrder::Hilbert,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    ExitCode::from(outcome(run(cli), &mut io::stderr()))
}

fn run(cli: Cli) -> Result<(), DriverError> {
    match cli.command {
        Command::Compress(args) => process::compress(&args),
        Command::Decompress(args) => process::decompress(&args),
        Command::Info(args) => info::run(&args),
    }
}

/// Report a failed run to `err_out` and pick the process exit code.
fn outcome(result: Result<(), DriverError>, err_out: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            // Nothing useful is left to do if stderr itself is gone.
            let _ = report(&err, err_out);
            err.exit_code()
        }
    }
}

/// Print an error and its causes.
fn report(err: &DriverError, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "error: {err}")?;
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        writeln!(out, "  caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}
