//! candump log file parser
//!
//! Parses the text format written by `candump -l` and replayed by `canplayer`
//! (Linux can-utils). One frame per line:
//!
//! ```text
//! (1700000000.250000) can0 201#05002A
//! (1700000000.260000) can0 18FF0201#0100
//! (1700000000.270000) can0 123#R
//! ```
//!
//! ## Supported
//! - Standard IDs (3 hex digits) and extended IDs (8 hex digits)
//! - Remote frames (`#R`), parsed with an empty payload
//!
//! ## Known Limitations
//! - CAN FD lines (`##`) are rejected; only classic CAN is supported

use crate::types::{CanFrame, DecoderError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// candump log parser
pub struct CandumpParser;

impl CandumpParser {
    /// Open a candump log file and return an iterator over CAN frames
    pub fn parse(path: &Path) -> Result<CandumpReader<BufReader<File>>> {
        log::info!("Parsing candump log: {:?}", path);

        if !path.exists() {
            return Err(DecoderError::LogParseError(format!(
                "candump log not found: {:?}",
                path
            )));
        }

        let file = File::open(path)?;
        Ok(CandumpReader::new(BufReader::new(file)))
    }
}

/// Iterator over CAN frames read line by line from a candump log
pub struct CandumpReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> CandumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for CandumpReader<R> {
    type Item = Result<CanFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;

            // A bad byte spoils only its own line
            let Ok(line) = std::str::from_utf8(&self.buf) else {
                return Some(Err(DecoderError::LogParseError(format!(
                    "line {}: invalid UTF-8",
                    self.line_no
                ))));
            };

            match parse_line(line) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => continue,
                Err(DecoderError::LogParseError(msg)) | Err(DecoderError::InvalidFrame(msg)) => {
                    return Some(Err(DecoderError::LogParseError(format!(
                        "line {}: {}",
                        self.line_no, msg
                    ))));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse one candump log line
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<CanFrame>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let (Some(ts_field), Some(channel), Some(frame_field)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(parse_error(format!("expected 3 fields: {:?}", line)));
    };

    let timestamp_ns = parse_timestamp(ts_field)?;

    if frame_field.contains("##") {
        return Err(parse_error(format!("CAN FD frames are not supported: {}", frame_field)));
    }

    let (id_str, data_str) = frame_field
        .split_once('#')
        .ok_or_else(|| parse_error(format!("missing '#' separator: {}", frame_field)))?;

    if !is_hex(id_str) {
        return Err(parse_error(format!("invalid CAN ID: {:?}", id_str)));
    }
    let can_id = u32::from_str_radix(id_str, 16)
        .map_err(|_| parse_error(format!("invalid CAN ID: {:?}", id_str)))?;

    let data = if data_str.starts_with('R') {
        Vec::new()
    } else {
        parse_hex_bytes(data_str)?
    };

    let frame = match id_str.len() {
        3 => CanFrame::new(can_id, &data)?,
        8 => CanFrame::new_extended(can_id, &data)?,
        n => return Err(parse_error(format!("CAN ID must have 3 or 8 hex digits, got {}", n))),
    };

    Ok(Some(frame.with_timestamp_ns(timestamp_ns).with_channel(channel)))
}

/// Parse `(secs.frac)` into nanoseconds
fn parse_timestamp(field: &str) -> Result<u64> {
    let inner = field
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| parse_error(format!("invalid timestamp: {:?}", field)))?;

    let (secs_str, frac_str) = inner.split_once('.').unwrap_or((inner, ""));
    if secs_str.is_empty() || !is_decimal(secs_str) || !is_decimal(frac_str) {
        return Err(parse_error(format!("invalid timestamp: {:?}", field)));
    }
    if frac_str.len() > 9 {
        return Err(parse_error(format!("timestamp precision exceeds nanoseconds: {:?}", field)));
    }

    let secs: u64 = secs_str
        .parse()
        .map_err(|_| parse_error(format!("invalid timestamp: {:?}", field)))?;
    let frac: u64 = if frac_str.is_empty() {
        0
    } else {
        frac_str
            .parse()
            .map_err(|_| parse_error(format!("invalid timestamp: {:?}", field)))?
    };
    let nanos = frac * 10u64.pow(9 - frac_str.len() as u32);

    secs.checked_mul(1_000_000_000)
        .and_then(|ns| ns.checked_add(nanos))
        .ok_or_else(|| parse_error(format!("timestamp out of range: {:?}", field)))
}

fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    if !is_hex(s) {
        return Err(parse_error(format!("invalid hex data: {:?}", s)));
    }
    if s.len() % 2 != 0 {
        return Err(parse_error(format!("odd number of hex digits in data: {:?}", s)));
    }

    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| parse_error(format!("invalid hex data: {:?}", s)))
        })
        .collect()
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_decimal(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_error(msg: String) -> DecoderError {
    DecoderError::LogParseError(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_standard_frame() {
        let frame = parse_line("(1700000000.250000) can0 201#05002A").unwrap().unwrap();
        assert_eq!(frame.can_id, 0x201);
        assert_eq!(frame.data, vec![0x05, 0x00, 0x2A]);
        assert_eq!(frame.channel, "can0");
        assert!(!frame.is_extended);
        assert_eq!(frame.timestamp_ns, 1_700_000_000_250_000_000);
    }

    #[test]
    fn test_parse_extended_and_remote() {
        let frame = parse_line("(0.000001) vcan1 18FF0201#0100").unwrap().unwrap();
        assert_eq!(frame.can_id, 0x18FF_0201);
        assert!(frame.is_extended);
        assert_eq!(frame.timestamp_ns, 1_000);

        let frame = parse_line("(1.5) can0 123#R").unwrap().unwrap();
        assert_eq!(frame.dlc(), 0);
        assert_eq!(frame.timestamp_ns, 1_500_000_000);
    }

    #[test]
    fn test_parse_empty_payload() {
        let frame = parse_line("(1.0) can0 201#").unwrap().unwrap();
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_rejects_bad_lines() {
        for line in [
            "can0 201#05002A",
            "(1.0) can0 201-05002A",
            "(1.0) can0 20G#00",
            "(1.0) can0 201#05002",
            "(1.0) can0 201#0500ZZ",
            "(1.0) can0 2010#00",
            "(1.0) can0 201##105002A",
            "(x.0) can0 201#00",
            "(1.0) can0 201#000102030405060708",
        ] {
            assert!(
                matches!(parse_line(line), Err(DecoderError::LogParseError(_)) | Err(DecoderError::InvalidFrame(_))),
                "line should be rejected: {}",
                line
            );
        }
    }

    #[test]
    fn test_reader_reports_line_numbers() {
        let log = "(1.0) can0 201#05002A\n\n(2.0) can0 nonsense\n(3.0) can0 181#00\n";
        let mut reader = CandumpReader::new(Cursor::new(log));

        assert_eq!(reader.next().unwrap().unwrap().can_id, 0x201);
        match reader.next().unwrap() {
            Err(DecoderError::LogParseError(msg)) => assert!(msg.starts_with("line 3:"), "{}", msg),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert_eq!(reader.next().unwrap().unwrap().can_id, 0x181);
        assert!(reader.next().is_none());
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn test_rejects_sign_prefixes() {
        for line in [
            "(1.0) can0 201#+F002A",
            "(1.0) can0 +01#05002A",
            "(+1.0) can0 201#05002A",
            "(1.+5) can0 201#05002A",
        ] {
            assert!(
                matches!(parse_line(line), Err(DecoderError::LogParseError(_))),
                "line should be rejected: {}",
                line
            );
        }
    }

    #[test]
    fn test_reader_recovers_from_invalid_utf8() {
        let log: &[u8] =
            b"(1.0) can0 201#05002A\n(2.0) can0 201#05\xFF2A\n(3.0) can0 201#49012C\nbad\n";
        let mut reader = CandumpReader::new(Cursor::new(log));

        assert_eq!(reader.next().unwrap().unwrap().data, vec![0x05, 0x00, 0x2A]);
        match reader.next().unwrap() {
            Err(e @ DecoderError::LogParseError(_)) => {
                assert_eq!(e.to_string(), "Failed to parse log file: line 2: invalid UTF-8");
                assert!(e.is_frame_local());
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert_eq!(reader.next().unwrap().unwrap().data, vec![0x49, 0x01, 0x2C]);
        match reader.next().unwrap() {
            Err(DecoderError::LogParseError(msg)) => assert!(msg.starts_with("line 4:"), "{}", msg),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(reader.next().is_none());
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut reader = CandumpReader::new(Cursor::new("(1.0) can0 201#05002A"));
        assert_eq!(reader.next().unwrap().unwrap().can_id, 0x201);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_missing_file() {
        let result = CandumpParser::parse(Path::new("does-not-exist.log"));
        assert!(matches!(result, Err(DecoderError::LogParseError(_))));
    }
}
