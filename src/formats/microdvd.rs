/*!
 * MicroDVD (`.sub`) codec.
 *
 * One cue per line, `{start}{end}text`, with frame numbers instead of timestamps and
 * `|` between display lines. A leading `{1}{1}<fps>` line declares the frame rate.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ArgumentError, FormatError};
use crate::formats::{numbered_lines, Format, SubtitleCodec};
use crate::subtitle_processor::Cue;
use crate::timecode::TimeValue;

/// Frame rate assumed when the file does not declare one
pub const DEFAULT_FRAME_RATE: f64 = 23.976;

static CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{(\d+)\}\{(\d+)\}(.*)$").unwrap()
});

/// MicroDVD codec bound to a frame rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MicroDvdCodec {
    frame_rate: f64,
}

impl MicroDvdCodec {
    pub(crate) const fn new(frame_rate: f64) -> Self {
        MicroDvdCodec { frame_rate }
    }

    /// Codec using a custom frame rate
    pub fn with_frame_rate(frame_rate: f64) -> Result<Self, ArgumentError> {
        if !(frame_rate > 0.0) || !frame_rate.is_finite() {
            return Err(ArgumentError::NonPositiveFrameRate(frame_rate));
        }
        Ok(MicroDvdCodec::new(frame_rate))
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

impl Default for MicroDvdCodec {
    fn default() -> Self {
        MicroDvdCodec::new(DEFAULT_FRAME_RATE)
    }
}

/// Frame rate declared by a `{1}{1}<fps>` line, if `text` is one
fn declared_frame_rate(start: &str, end: &str, text: &str) -> Option<f64> {
    if start != "1" || end != "1" {
        return None;
    }
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|fps| *fps > 0.0 && fps.is_finite())
}

impl SubtitleCodec for MicroDvdCodec {
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError> {
        let mut fps = self.frame_rate;
        let mut cues = Vec::new();
        let mut first = true;

        for (line_number, line) in numbered_lines(content) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some(caps) = CUE_REGEX.captures(trimmed) else {
                warn!(
                    "Skipping MicroDVD line: {}",
                    FormatError::MalformedCue {
                        line: line_number,
                        reason: "expected {start}{end}text".to_string(),
                    }
                );
                continue;
            };

            if std::mem::take(&mut first) {
                if let Some(declared) = declared_frame_rate(&caps[1], &caps[2], &caps[3]) {
                    debug!("MicroDVD content declares {} fps", declared);
                    fps = declared;
                    continue;
                }
            }

            let (Ok(start), Ok(end)) = (caps[1].parse::<i64>(), caps[2].parse::<i64>()) else {
                warn!("Skipping MicroDVD line {}: frame number out of range", line_number);
                continue;
            };

            let text = if caps[3].is_empty() {
                Vec::new()
            } else {
                caps[3].split('|').map(|part| part.to_string()).collect()
            };
            cues.push(Cue::new(
                cues.len() + 1,
                TimeValue::from_frames(start, fps),
                TimeValue::from_frames(end, fps),
                text,
            ));
        }

        Ok(cues)
    }

    fn encode(&self, cues: &[Cue]) -> String {
        let mut output = String::new();
        for cue in cues {
            output.push_str(&format!(
                "{{{}}}{{{}}}{}\n",
                cue.start.to_frames(self.frame_rate),
                cue.end.to_frames(self.frame_rate),
                cue.text.join("|")
            ));
        }
        output
    }

    fn format(&self) -> Format {
        Format::MicroDvd
    }
}
