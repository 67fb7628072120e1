//! Decoder configuration types
//!
//! The decoder needs one piece of configuration: which arbitration ID carries
//! register readings. Everything about where frames come from and what happens
//! to the readings belongs to the application layer.

use crate::types::{DecoderError, Result, MAX_EXTENDED_ID, MAX_STANDARD_ID};
use serde::{Deserialize, Serialize};

/// Arbitration ID the motor controller gateway publishes readings on
pub const DEFAULT_TARGET_ID: u32 = 0x201;

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Arbitration ID whose frames are decoded; all others are ignored
    #[serde(default = "default_target_id")]
    pub target_id: u32,

    /// Whether `target_id` is a 29-bit extended ID
    #[serde(default)]
    pub extended_id: bool,
}

fn default_target_id() -> u32 {
    DEFAULT_TARGET_ID
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            target_id: DEFAULT_TARGET_ID,
            extended_id: false,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the target arbitration ID
    pub fn with_target_id(mut self, target_id: u32) -> Self {
        self.target_id = target_id;
        self
    }

    /// Builder method: mark the target ID as extended (29-bit)
    pub fn with_extended_id(mut self, extended: bool) -> Self {
        self.extended_id = extended;
        self
    }

    /// Check that the target ID fits the declared ID width
    pub fn validate(&self) -> Result<()> {
        let (max_id, bits) = if self.extended_id {
            (MAX_EXTENDED_ID, 29)
        } else {
            (MAX_STANDARD_ID, 11)
        };

        if self.target_id > max_id {
            return Err(DecoderError::InvalidConfig(format!(
                "target ID 0x{:X} does not fit in {} bits",
                self.target_id, bits
            )));
        }
        Ok(())
    }
}
