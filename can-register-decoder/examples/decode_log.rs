//! Standalone candump log decoder
//!
//! Decodes register readings from a candump log and prints them together with
//! a short summary.
//!
//! Usage:
//!   decode_log <candump.log> [--target <hex id>]
//!
//! Example:
//!   cargo run --example decode_log -- trace.log --target 201

use can_register_decoder::{CandumpParser, DecoderError, FrameDecoder};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <candump.log> [--target <hex id>]", args[0]);
        std::process::exit(1);
    }

    let log_path = PathBuf::from(&args[1]);
    let mut target_id = can_register_decoder::DEFAULT_TARGET_ID;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--target" && i + 1 < args.len() {
            target_id = u32::from_str_radix(args[i + 1].trim_start_matches("0x"), 16)
                .unwrap_or_else(|_| {
                    eprintln!("Invalid target ID: {}", args[i + 1]);
                    std::process::exit(1);
                });
            i += 2;
        } else {
            i += 1;
        }
    }

    let frames = match CandumpParser::parse(&log_path) {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("Failed to open log: {}", e);
            std::process::exit(1);
        }
    };

    let decoder = FrameDecoder::new(target_id);
    let mut per_register: HashMap<u8, usize> = HashMap::new();
    let mut malformed = 0usize;

    for result in decoder.decode_frames(frames) {
        match result {
            Ok(reading) => {
                *per_register.entry(reading.reg_id).or_default() += 1;
                match reading.register() {
                    Some(reg) => println!("{} ({})", reading, reg),
                    None => println!("{}", reading),
                }
            }
            Err(DecoderError::MalformedFrame { .. }) => malformed += 1,
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    println!("\n=== DECODING SUMMARY ===");
    println!("Malformed frames: {}", malformed);
    let mut sorted: Vec<_> = per_register.into_iter().collect();
    sorted.sort();
    for (reg_id, count) in sorted {
        println!("  Reg 0x{:02X}: {} readings", reg_id, count);
    }
}
