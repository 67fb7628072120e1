//! Frame sources
//!
//! Each source yields an iterator over `Result<CanFrame>` that can be fed
//! straight into [`FrameDecoder::decode_frames`](crate::FrameDecoder::decode_frames).

pub mod candump;

pub use candump::{parse_line, CandumpParser, CandumpReader};
