//! CAN Register Decoder Library
//!
//! A stateless, reusable library for decoding motor controller register
//! readings from raw CAN frames.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Filters frames by a configured arbitration ID
//! - Decodes `[reg_id, value_hi, value_lo, ..]` payloads into typed readings
//! - Reports short target frames as errors instead of reading past the payload
//! - Reads frames from candump log files
//!
//! The library does NOT:
//! - Open, configure or close the CAN bus
//! - Own the receive loop or its cancellation
//! - Print or store readings
//!
//! All higher-level functionality is in the application layer (can-register-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use can_register_decoder::{CandumpParser, DecoderConfig, FrameDecoder};
//! use std::path::Path;
//!
//! let config = DecoderConfig::new().with_target_id(0x201);
//! let decoder = FrameDecoder::from_config(&config).unwrap();
//!
//! let frames = CandumpParser::parse(Path::new("candump.log")).unwrap();
//! for result in decoder.decode_frames(frames) {
//!     match result {
//!         Ok(reading) => println!("Received Data - {}", reading),
//!         Err(e) => eprintln!("Decode error: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod formats;
pub mod registers;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, DEFAULT_TARGET_ID};
pub use decoder::{decode, DecodingIterator, FrameDecoder, MIN_PAYLOAD_LEN};
pub use formats::{CandumpParser, CandumpReader};
pub use registers::Register;
pub use types::{CanFrame, DecoderError, RegisterReading, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
