//! Receive loop
//!
//! Pulls frames from a source, decodes them and writes each reading out.
//! Frame-local problems (short target frames, unparseable log lines) are
//! logged and counted; anything else ends the loop.

use crate::config::{OutputConfig, OutputFormat};
use anyhow::{Context, Result};
use can_register_decoder::{CanFrame, DecoderError, FrameDecoder, Register, RegisterReading};
use serde::Serialize;
use std::io::Write;

/// One JSON output line
#[derive(Serialize)]
struct JsonReading<'a> {
    #[serde(flatten)]
    reading: &'a RegisterReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    register: Option<Register>,
}

/// Counters collected over one receive loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveSummary {
    pub frames: usize,
    pub readings: usize,
    pub malformed: usize,
    pub skipped: usize,
}

/// Run the receive loop until the frame source is exhausted
///
/// Counters are updated in place so they stay valid when the loop ends early.
pub fn run<I, W>(
    frames: I,
    decoder: &FrameDecoder,
    output: &OutputConfig,
    out: &mut W,
    summary: &mut ReceiveSummary,
) -> Result<()>
where
    I: IntoIterator<Item = can_register_decoder::Result<CanFrame>>,
    W: Write,
{
    for item in frames {
        let frame = match item {
            Ok(frame) => frame,
            Err(e) if e.is_frame_local() => {
                log::warn!("Skipping input: {}", e);
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e).context("Failed to read CAN frames"),
        };
        summary.frames += 1;

        match decoder.decode(&frame) {
            Ok(Some(reading)) => {
                summary.readings += 1;
                write_reading(out, &reading, output)?;
            }
            Ok(None) => {}
            Err(e @ DecoderError::MalformedFrame { .. }) => {
                log::warn!("{}", e);
                summary.malformed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn write_reading<W: Write>(out: &mut W, reading: &RegisterReading, output: &OutputConfig) -> Result<()> {
    match output.format {
        OutputFormat::Text => {
            write!(out, "Received Data - {}", reading)?;
            if output.show_register_names {
                if let Some(reg) = reading.register() {
                    write!(out, " ({})", reg)?;
                }
            }
            writeln!(out)?;
        }
        OutputFormat::Json => {
            let line = JsonReading {
                reading,
                register: reading.register().filter(|_| output.show_register_names),
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_register_decoder::CandumpReader;
    use std::io::Cursor;

    const TRACE: &str = "\
(1.0) can0 201#05002A
(2.0) can0 301#05002A
(3.0) can0 201#05
(4.0) can0 garbage
(5.0) can0 201#49012C
";

    fn run_trace(output: &OutputConfig) -> (ReceiveSummary, String) {
        let mut out = Vec::new();
        let frames = CandumpReader::new(Cursor::new(TRACE));
        let mut summary = ReceiveSummary::default();
        run(frames, &FrameDecoder::new(0x201), output, &mut out, &mut summary).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_text_output_and_counters() {
        let (summary, text) = run_trace(&OutputConfig::default());
        assert_eq!(
            text,
            "Received Data - Reg ID: 5, Value: 42\nReceived Data - Reg ID: 73, Value: 300\n"
        );
        assert_eq!(
            summary,
            ReceiveSummary { frames: 4, readings: 2, malformed: 1, skipped: 1 }
        );
    }

    #[test]
    fn test_text_output_with_names() {
        let output = OutputConfig { show_register_names: true, ..Default::default() };
        let (_, text) = run_trace(&output);
        assert!(text.ends_with("Reg ID: 73, Value: 300 (MotorTemp)\n"), "{}", text);
        assert!(text.starts_with("Received Data - Reg ID: 5, Value: 42\n"), "{}", text);
    }

    #[test]
    fn test_json_output() {
        let output = OutputConfig { format: OutputFormat::Json, ..Default::default() };
        let (_, text) = run_trace(&output);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![r#"{"reg_id":5,"value":42}"#, r#"{"reg_id":73,"value":300}"#]);
    }

    #[test]
    fn test_json_output_with_names() {
        let output = OutputConfig { format: OutputFormat::Json, show_register_names: true };
        let (_, text) = run_trace(&output);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"reg_id":5,"value":42}"#,
                r#"{"reg_id":73,"value":300,"register":"MotorTemp"}"#,
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let log: &[u8] =
            b"(1.0) can0 201#05002A\n(2.0) can0 201#05\xFF2A\n(3.0) can0 201#49012C\n";
        let mut out = Vec::new();
        let mut summary = ReceiveSummary::default();
        run(
            CandumpReader::new(Cursor::new(log)),
            &FrameDecoder::new(0x201),
            &OutputConfig::default(),
            &mut out,
            &mut summary,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Received Data - Reg ID: 5, Value: 42\nReceived Data - Reg ID: 73, Value: 300\n"
        );
        assert_eq!(summary, ReceiveSummary { frames: 2, readings: 2, malformed: 0, skipped: 1 });
    }

    #[test]
    fn test_summary_kept_on_abort() {
        let frames = vec![
            CanFrame::new(0x201, &[1, 0, 1]),
            CanFrame::new(0x201, &[1]),
            Err(DecoderError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "bus gone"))),
        ];
        let mut out = Vec::new();
        let mut summary = ReceiveSummary::default();
        let result = run(
            frames,
            &FrameDecoder::new(0x201),
            &OutputConfig::default(),
            &mut out,
            &mut summary,
        );
        assert!(result.is_err());
        assert_eq!(summary, ReceiveSummary { frames: 2, readings: 1, malformed: 1, skipped: 0 });
    }

    #[test]
    fn test_io_error_aborts() {
        let frames = vec![
            CanFrame::new(0x201, &[1, 0, 1]),
            Err(DecoderError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "bus gone"))),
            CanFrame::new(0x201, &[2, 0, 2]),
        ];
        let mut out = Vec::new();
        let mut summary = ReceiveSummary::default();
        let result = run(
            frames,
            &FrameDecoder::new(0x201),
            &OutputConfig::default(),
            &mut out,
            &mut summary,
        );
        assert!(result.is_err());
        assert_eq!(String::from_utf8(out).unwrap(), "Received Data - Reg ID: 1, Value: 1\n");
    }
}
