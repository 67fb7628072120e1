//! Core types for the CAN register decoder library
//!
//! This module defines the raw frame the decoder consumes and the register
//! reading it emits. Both are plain values: the decoder keeps no state between
//! frames and nothing here is persisted.

use crate::registers::Register;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Highest valid 11-bit (standard) CAN ID
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Highest valid 29-bit (extended) CAN ID
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Maximum payload length of a classic CAN frame
pub const MAX_DATA_LEN: usize = 8;

/// Raw CAN frame as delivered by a frame source (bus, candump log, ...)
///
/// Construct with [`CanFrame::new`] or [`CanFrame::new_extended`] so the ID
/// width and payload length are checked once, up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    /// Timestamp in nanoseconds since epoch (0 when unknown)
    pub timestamp_ns: u64,
    /// Interface the frame was received on (e.g. "can0")
    pub channel: String,
    /// CAN arbitration ID (11-bit or 29-bit)
    pub can_id: u32,
    /// Frame data bytes (0-8 bytes)
    pub data: Vec<u8>,
    /// True if this is an extended (29-bit) CAN ID
    pub is_extended: bool,
}

impl CanFrame {
    /// Create a standard (11-bit) frame
    pub fn new(can_id: u32, data: &[u8]) -> Result<Self> {
        Self::build(can_id, data, false)
    }

    /// Create an extended (29-bit) frame
    pub fn new_extended(can_id: u32, data: &[u8]) -> Result<Self> {
        Self::build(can_id, data, true)
    }

    fn build(can_id: u32, data: &[u8], is_extended: bool) -> Result<Self> {
        let max_id = if is_extended { MAX_EXTENDED_ID } else { MAX_STANDARD_ID };
        if can_id > max_id {
            return Err(DecoderError::InvalidFrame(format!(
                "CAN ID 0x{:X} exceeds {}-bit range",
                can_id,
                if is_extended { 29 } else { 11 }
            )));
        }
        if data.len() > MAX_DATA_LEN {
            return Err(DecoderError::InvalidFrame(format!(
                "payload of {} bytes exceeds {} bytes",
                data.len(),
                MAX_DATA_LEN
            )));
        }

        Ok(Self {
            timestamp_ns: 0,
            channel: String::new(),
            can_id,
            data: data.to_vec(),
            is_extended,
        })
    }

    /// Builder method: set the receive timestamp
    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }

    /// Builder method: set the receiving interface name
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Convert timestamp from nanoseconds to DateTime<Utc>
    pub fn timestamp(&self) -> Timestamp {
        let secs = (self.timestamp_ns / 1_000_000_000) as i64;
        let nsecs = (self.timestamp_ns % 1_000_000_000) as u32;
        DateTime::from_timestamp(secs, nsecs).unwrap_or_else(Utc::now)
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Malformed frame: CAN ID 0x{can_id:X} carries {len} byte(s), need at least 3")]
    MalformedFrame { can_id: u32, len: usize },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DecoderError {
    /// True for errors that concern a single frame and leave the source usable
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            DecoderError::MalformedFrame { .. }
                | DecoderError::InvalidFrame(_)
                | DecoderError::LogParseError(_)
        )
    }
}

/// One register value reported by the motor controller gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterReading {
    /// Register identifier (first payload byte)
    pub reg_id: u8,
    /// Register value, big-endian from payload bytes 1 and 2
    pub value: u16,
}

impl RegisterReading {
    pub fn new(reg_id: u8, value: u16) -> Self {
        Self { reg_id, value }
    }

    /// Look up the known register for this reading, if any
    pub fn register(&self) -> Option<Register> {
        Register::from_id(self.reg_id)
    }
}

impl fmt::Display for RegisterReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reg ID: {}, Value: {}", self.reg_id, self.value)
    }
}
