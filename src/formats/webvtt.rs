/*!
 * WebVTT (`.vtt`) codec.
 *
 * A `WEBVTT` header line is mandatory. Cue blocks have an optional identifier line,
 * a `start --> end [settings]` line and text lines. `NOTE`, `STYLE` and `REGION`
 * blocks carry no cues and are skipped.
 */

use log::warn;

use crate::errors::FormatError;
use crate::formats::{blank_line_blocks, Format, SubtitleCodec};
use crate::subtitle_processor::Cue;
use crate::timecode::TimeValue;

const SIGNATURE: &str = "WEBVTT";

/// WebVTT codec
#[derive(Debug, Clone, Copy, Default)]
pub struct WebVttCodec;

/// Parse `hh:mm:ss.fff` or the short `mm:ss.fff` form
fn parse_vtt_time(text: &str) -> Result<TimeValue, FormatError> {
    let trimmed = text.trim();
    if trimmed.matches(':').count() == 1 {
        TimeValue::parse(&format!("00:{}", trimmed))
    } else {
        TimeValue::parse(trimmed)
    }
}

fn parse_timing(line: &str) -> Result<(TimeValue, TimeValue), FormatError> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| FormatError::InvalidTimestamp(line.trim().to_string()))?;
    // Anything after the end time is cue settings
    let end = rest.split_whitespace().next().unwrap_or_default();

    Ok((parse_vtt_time(start)?, parse_vtt_time(end)?))
}

fn is_metadata_block(first_line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"].iter().any(|keyword| {
        first_line
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

impl SubtitleCodec for WebVttCodec {
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError> {
        let first_line = content.trim_start().lines().next().unwrap_or_default();
        let has_signature = first_line
            .strip_prefix(SIGNATURE)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
        if !has_signature {
            return Err(FormatError::MissingHeader {
                format: Format::WebVtt.to_string(),
                expected: SIGNATURE.to_string(),
            });
        }

        let mut cues = Vec::new();
        // The first block is the signature plus optional header lines
        for (line_number, lines) in blank_line_blocks(content).into_iter().skip(1) {
            if is_metadata_block(lines[0]) {
                continue;
            }

            let timing_at = if lines[0].contains("-->") { 0 } else { 1 };
            let Some(timing) = lines.get(timing_at) else {
                warn!(
                    "Skipping WebVTT cue: {}",
                    FormatError::MalformedCue {
                        line: line_number,
                        reason: "missing timing line".to_string(),
                    }
                );
                continue;
            };

            match parse_timing(timing) {
                Ok((start, end)) => {
                    let text = lines[timing_at + 1..].iter().map(|line| line.to_string()).collect();
                    cues.push(Cue::new(cues.len() + 1, start, end, text));
                }
                Err(e) => warn!("Skipping WebVTT cue at line {}: {}", line_number, e),
            }
        }

        Ok(cues)
    }

    fn encode(&self, cues: &[Cue]) -> String {
        let mut output = format!("{}\n\n", SIGNATURE);
        for cue in cues {
            output.push_str(&format!(
                "{}\n{} --> {}\n",
                cue.index,
                cue.start.format_dot(),
                cue.end.format_dot()
            ));
            for line in &cue.text {
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }

    fn format(&self) -> Format {
        Format::WebVtt
    }
}
