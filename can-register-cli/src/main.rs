//! CAN Register Receiver CLI Application
//!
//! This is the command-line front end for the can-register-decoder library.
//! It owns everything the library leaves out:
//! - Frame source selection (candump log file or stdin)
//! - The receive loop
//! - Printing readings (text or JSON lines)
//!
//! Live capture works by piping candump into it:
//!   candump -L can0 | can-register-cli

use anyhow::{Context, Result};
use can_register_decoder::{CanFrame, CandumpParser, CandumpReader, FrameDecoder};
use clap::Parser;
use std::io;
use std::path::PathBuf;

mod config;
mod receiver;

use config::{AppConfig, OutputFormat};

type FrameSource = Box<dyn Iterator<Item = can_register_decoder::Result<CanFrame>>>;

/// CAN Register Receiver - Decode motor controller register readings
#[derive(Parser, Debug)]
#[command(name = "can-register-cli")]
#[command(about = "Decode register readings from CAN frames (candump log format)", long_about = None)]
#[command(version)]
struct Args {
    /// Path to candump log file (default: read from stdin)
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Arbitration ID carrying register readings, hex (0x201) or decimal
    #[arg(short, long, value_name = "ID", value_parser = config::parse_can_id)]
    target_id: Option<u32>,

    /// Treat the target ID as a 29-bit extended ID
    #[arg(long)]
    extended: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Append known register names to text output
    #[arg(long)]
    names: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of input frames to process
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Register Receiver v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", can_register_decoder::VERSION);

    let config = resolve_config(&args)?;
    let decoder = FrameDecoder::from_config(&config.decoder)
        .context("Invalid decoder configuration")?;
    log::info!("Listening for register frames on 0x{:X}", decoder.target_id());

    let frames: FrameSource = match &args.log {
        Some(path) => Box::new(
            CandumpParser::parse(path).with_context(|| format!("Failed to open log {:?}", path))?,
        ),
        None => {
            log::info!("Reading candump lines from stdin");
            Box::new(CandumpReader::new(io::stdin().lock()))
        }
    };
    let frames: FrameSource = match args.max_frames {
        Some(limit) => Box::new(frames.take(limit)),
        None => frames,
    };

    if !args.quiet {
        eprintln!("CAN Bus Receiver Started...");
    }

    let mut stdout = io::stdout().lock();
    let mut summary = receiver::ReceiveSummary::default();
    let result = receiver::run(frames, &decoder, &config.output, &mut stdout, &mut summary);

    // Always report the stop, even when the source failed
    if !args.quiet {
        eprintln!("CAN Bus Receiver Stopped.");
        eprintln!(
            "Frames: {}  Readings: {}  Malformed: {}  Skipped: {}",
            summary.frames, summary.readings, summary.malformed, summary.skipped
        );
    }

    result
}

/// Load the config file (if any) and apply command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(target_id) = args.target_id {
        config.decoder.target_id = target_id;
    }
    if args.extended {
        config.decoder.extended_id = true;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.names {
        config.output.show_register_names = true;
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
