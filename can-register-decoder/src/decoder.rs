//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! A [`FrameDecoder`] is configured with one target arbitration ID and turns
//! each frame carrying that ID into a [`RegisterReading`].
//!
//! Payload layout of a register frame:
//!
//! | byte | meaning                     |
//! |------|-----------------------------|
//! | 0    | register id                 |
//! | 1    | value, high byte            |
//! | 2    | value, low byte             |
//! | 3..  | ignored                     |

use crate::config::{DecoderConfig, DEFAULT_TARGET_ID};
use crate::types::{CanFrame, DecoderError, RegisterReading, Result};
use byteorder::{BigEndian, ByteOrder};

/// Minimum payload length of a register frame (id byte + 16-bit value)
pub const MIN_PAYLOAD_LEN: usize = 3;

/// Decode one frame against a target arbitration ID
///
/// # Returns
/// * `Ok(None)` if the frame carries another ID
/// * `Ok(Some(reading))` if it carries the target ID and a full payload
/// * `Err(DecoderError::MalformedFrame)` if it carries the target ID but
///   fewer than 3 payload bytes
///
/// # Example
/// ```
/// use can_register_decoder::{decode, CanFrame};
///
/// let frame = CanFrame::new(0x201, &[0x05, 0x00, 0x2A]).unwrap();
/// let reading = decode(&frame, 0x201).unwrap().unwrap();
/// assert_eq!(reading.reg_id, 5);
/// assert_eq!(reading.value, 42);
/// ```
pub fn decode(frame: &CanFrame, target_id: u32) -> Result<Option<RegisterReading>> {
    if frame.can_id != target_id {
        log::trace!("Skipping CAN ID 0x{:X}", frame.can_id);
        return Ok(None);
    }

    if frame.data.len() < MIN_PAYLOAD_LEN {
        return Err(DecoderError::MalformedFrame {
            can_id: frame.can_id,
            len: frame.data.len(),
        });
    }

    let reading = RegisterReading {
        reg_id: frame.data[0],
        value: BigEndian::read_u16(&frame.data[1..MIN_PAYLOAD_LEN]),
    };
    log::debug!("Decoded 0x{:X}: {}", frame.can_id, reading);

    Ok(Some(reading))
}

/// Stateless decoder bound to one target arbitration ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDecoder {
    target_id: u32,
}

impl FrameDecoder {
    /// Create a decoder for the given target arbitration ID
    pub fn new(target_id: u32) -> Self {
        Self { target_id }
    }

    /// Create a decoder from a validated configuration
    pub fn from_config(config: &DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.target_id))
    }

    pub fn target_id(&self) -> u32 {
        self.target_id
    }

    /// Decode a single frame, see [`decode`]
    pub fn decode(&self, frame: &CanFrame) -> Result<Option<RegisterReading>> {
        decode(frame, self.target_id)
    }

    /// Decode a stream of frames lazily
    ///
    /// Frames with other IDs are skipped. Frame source errors and malformed
    /// target frames are passed through as `Err` items so the caller can log
    /// them and keep going.
    ///
    /// # Example
    /// ```
    /// use can_register_decoder::{CanFrame, FrameDecoder};
    ///
    /// let frames = vec![
    ///     CanFrame::new(0x181, &[0x01, 0x02, 0x03]),
    ///     CanFrame::new(0x201, &[0x49, 0x01, 0x2C]),
    /// ];
    /// let decoder = FrameDecoder::new(0x201);
    /// let readings: Vec<_> = decoder.decode_frames(frames).collect();
    /// assert_eq!(readings.len(), 1);
    /// assert_eq!(readings[0].as_ref().unwrap().value, 300);
    /// ```
    pub fn decode_frames<I>(&self, frames: I) -> DecodingIterator<I::IntoIter>
    where
        I: IntoIterator<Item = Result<CanFrame>>,
    {
        DecodingIterator::new(frames.into_iter(), *self)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ID)
    }
}

/// Iterator that decodes CAN frames into register readings
///
/// This iterator wraps a frame iterator and processes each frame:
/// 1. Source error → yield it
/// 2. Target ID with full payload → yield the reading
/// 3. Target ID with short payload → yield `MalformedFrame`
/// 4. Otherwise → pull the next frame
pub struct DecodingIterator<I>
where
    I: Iterator<Item = Result<CanFrame>>,
{
    frame_iter: I,
    decoder: FrameDecoder,
}

impl<I> DecodingIterator<I>
where
    I: Iterator<Item = Result<CanFrame>>,
{
    fn new(frame_iter: I, decoder: FrameDecoder) -> Self {
        Self { frame_iter, decoder }
    }
}

impl<I> Iterator for DecodingIterator<I>
where
    I: Iterator<Item = Result<CanFrame>>,
{
    type Item = Result<RegisterReading>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = match self.frame_iter.next()? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e)),
            };

            match self.decoder.decode(&frame) {
                Ok(Some(reading)) => return Some(Ok(reading)),
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("{}", e);
                    return Some(Err(e));
                }
            }
        }
    }
}
