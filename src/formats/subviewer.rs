/*!
 * SubViewer (`.sub`) codec.
 *
 * Each cue is a `start,end` line with dot fractions followed by one text line where
 * `|` (or `[br]`) separates display lines. Bracketed header tags are ignored.
 */

use log::warn;

use crate::errors::FormatError;
use crate::formats::{numbered_lines, Format, SubtitleCodec};
use crate::subtitle_processor::Cue;
use crate::timecode::TimeValue;

const HEADER: &str = "[INFORMATION]\n\
[TITLE]\n\
[AUTHOR]\n\
[SOURCE]\n\
[PRG]\n\
[FILEPATH]\n\
[DELAY]0\n\
[CD TRACK]0\n\
[COMMENT]\n\
[END INFORMATION]\n\
[SUBTITLE]\n\
[COLF]&HFFFFFF,[STYLE]bd,[SIZE]18,[FONT]Arial\n";

/// SubViewer codec
#[derive(Debug, Clone, Copy, Default)]
pub struct SubViewerCodec;

// @returns: Start and end of a `start,end` line
fn parse_timing(line: &str) -> Result<(TimeValue, TimeValue), FormatError> {
    match line.split(',').collect::<Vec<_>>().as_slice() {
        [start, end] => Ok((TimeValue::parse(start)?, TimeValue::parse(end)?)),
        _ => Err(FormatError::InvalidTimestamp(line.trim().to_string())),
    }
}

fn decode_text(line: &str) -> Vec<String> {
    line.replace("[br]", "|")
        .split('|')
        .map(|part| part.to_string())
        .collect()
}

impl SubtitleCodec for SubViewerCodec {
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError> {
        let mut cues = Vec::new();
        let mut lines = numbered_lines(content);

        while let Some((line_number, line)) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('[') {
                continue;
            }

            let (start, end) = match parse_timing(trimmed) {
                Ok(times) => times,
                Err(e) => {
                    warn!("Skipping SubViewer line {}: {}", line_number, e);
                    continue;
                }
            };

            match lines.next() {
                Some((_, text)) => {
                    // A blank text line is a cue without text
                    let text = if text.trim().is_empty() { Vec::new() } else { decode_text(text) };
                    cues.push(Cue::new(cues.len() + 1, start, end, text));
                }
                None => warn!(
                    "Skipping SubViewer cue: {}",
                    FormatError::MalformedCue {
                        line: line_number,
                        reason: "missing text line".to_string(),
                    }
                ),
            }
        }

        Ok(cues)
    }

    fn encode(&self, cues: &[Cue]) -> String {
        let mut output = String::from(HEADER);
        for cue in cues {
            output.push_str(&format!("{},{}\n", cue.start.format_dot(), cue.end.format_dot()));
            output.push_str(&cue.text.join("|"));
            output.push_str("\n\n");
        }
        output
    }

    fn format(&self) -> Format {
        Format::SubViewer
    }
}
