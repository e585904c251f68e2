/*!
 * SubRip (`.srt`) codec.
 *
 * Cues are blank-line separated blocks: an index line, a `start --> end` line with
 * comma fractions, then one or more text lines.
 */

use log::warn;

use crate::errors::FormatError;
use crate::formats::{blank_line_blocks, Format, SubtitleCodec};
use crate::subtitle_processor::Cue;
use crate::timecode::TimeValue;

/// SubRip codec
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtCodec;

impl SrtCodec {
    fn parse_block(line_number: usize, lines: &[&str]) -> Result<Cue, FormatError> {
        let malformed = |reason: &str| FormatError::MalformedCue {
            line: line_number,
            reason: reason.to_string(),
        };

        let index = lines[0]
            .trim()
            .parse::<usize>()
            .map_err(|_| malformed("index line is not a number"))?;

        let timing = lines.get(1).ok_or_else(|| malformed("missing timing line"))?;
        let (start, end) = parse_arrow_line(timing)?;

        let text = lines[2..].iter().map(|line| line.to_string()).collect();
        Ok(Cue::new(index, start, end, text))
    }
}

/// Parse `start --> end`, ignoring anything after the end timestamp
pub(crate) fn parse_arrow_line(line: &str) -> Result<(TimeValue, TimeValue), FormatError> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| FormatError::InvalidTimestamp(line.trim().to_string()))?;
    let end = rest.split_whitespace().next().unwrap_or_default();

    Ok((TimeValue::parse(start)?, TimeValue::parse(end)?))
}

impl SubtitleCodec for SrtCodec {
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError> {
        let mut cues = Vec::new();

        for (line_number, lines) in blank_line_blocks(content) {
            match Self::parse_block(line_number, &lines) {
                Ok(cue) => cues.push(cue),
                Err(e) => warn!("Skipping SRT cue: {}", e),
            }
        }

        Ok(cues)
    }

    fn encode(&self, cues: &[Cue]) -> String {
        let mut output = String::new();
        for cue in cues {
            output.push_str(&cue.to_string());
        }
        output
    }

    fn format(&self) -> Format {
        Format::Srt
    }
}
