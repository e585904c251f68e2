/*!
 * SubStation Alpha (`.ssa`) and Advanced SubStation Alpha (`.ass`) codec.
 *
 * Only the `[Events]` section carries cues. Its `Format:` line names the comma
 * separated fields of each `Dialogue:` line; `Text` is always last, so commas inside
 * the text survive. Timestamps use centiseconds (`h:mm:ss.cc`) and `\N` breaks lines.
 */

use log::warn;

use crate::errors::FormatError;
use crate::formats::{numbered_lines, Format, SubtitleCodec};
use crate::subtitle_processor::{split_lines, Cue};
use crate::timecode::TimeValue;

const DEFAULT_EVENT_FIELDS: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

/// Script flavour written by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsaVariant {
    /// SubStation Alpha v4.00
    Ssa,
    /// Advanced SubStation Alpha v4.00+
    Ass,
}

/// SSA/ASS codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsaCodec {
    variant: SsaVariant,
}

impl SsaCodec {
    pub const fn ssa() -> Self {
        SsaCodec { variant: SsaVariant::Ssa }
    }

    pub const fn ass() -> Self {
        SsaCodec { variant: SsaVariant::Ass }
    }

    pub fn variant(&self) -> SsaVariant {
        self.variant
    }

    fn header(&self) -> String {
        let (script_type, styles) = match self.variant {
            SsaVariant::Ssa => (
                "v4.00",
                "[V4 Styles]\n\
                 Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, TertiaryColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, AlphaLevel, Encoding\n\
                 Style: Default,Arial,20,16777215,255,0,0,0,0,1,2,2,2,10,10,10,0,1\n",
            ),
            SsaVariant::Ass => (
                "v4.00+",
                "[V4+ Styles]\n\
                 Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
                 Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n",
            ),
        };
        let first_field = match self.variant {
            SsaVariant::Ssa => "Marked",
            SsaVariant::Ass => "Layer",
        };

        format!(
            "[Script Info]\n\
             Title: Subtitle\n\
             ScriptType: {}\n\
             Collisions: Normal\n\
             PlayResX: 384\n\
             PlayResY: 288\n\
             Timer: 100.0000\n\
             \n\
             {}\n\
             [Events]\n\
             Format: {}, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
            script_type, styles, first_field
        )
    }
}

/// Format as `h:mm:ss.cc`, truncating to centiseconds
pub fn format_centiseconds(time: TimeValue) -> String {
    let sign = if time.is_negative() { "-" } else { "" };
    let ms = time.as_millis().unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}.{:02}",
        sign,
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1_000,
        (ms % 1_000) / 10
    )
}

// @struct: Column positions taken from an `[Events]` Format line
struct EventLayout {
    field_count: usize,
    start: usize,
    end: usize,
    text: usize,
}

impl EventLayout {
    fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        let position = |name: &str| {
            fields
                .iter()
                .position(|field| field.as_ref().trim().eq_ignore_ascii_case(name))
        };
        Some(EventLayout {
            field_count: fields.len(),
            start: position("Start")?,
            end: position("End")?,
            text: position("Text")?,
        })
    }

    fn parse_dialogue(&self, line_number: usize, body: &str, index: usize) -> Result<Cue, FormatError> {
        let fields: Vec<&str> = body.splitn(self.field_count, ',').collect();
        if fields.len() < self.field_count {
            return Err(FormatError::MalformedCue {
                line: line_number,
                reason: format!("expected {} fields, found {}", self.field_count, fields.len()),
            });
        }

        let start = TimeValue::parse(fields[self.start])?;
        let end = TimeValue::parse(fields[self.end])?;
        let text = fields[self.text]
            .replace("\\N", "\n")
            .replace("\\n", "\n");

        Ok(Cue::new(index, start, end, split_lines(&text)))
    }
}

impl SubtitleCodec for SsaCodec {
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError> {
        let mut cues = Vec::new();
        let mut in_events = false;
        let mut layout = EventLayout::from_fields(&DEFAULT_EVENT_FIELDS);

        for (line_number, line) in numbered_lines(content) {
            let trimmed = line.trim();

            if trimmed.starts_with('[') {
                in_events = trimmed.eq_ignore_ascii_case("[Events]");
                continue;
            }
            if !in_events {
                continue;
            }

            if let Some(fields) = trimmed.strip_prefix("Format:") {
                let names: Vec<&str> = fields.split(',').collect();
                layout = EventLayout::from_fields(&names);
                if layout.is_none() {
                    warn!("Events Format line {} lacks Start, End or Text", line_number);
                }
            } else if let Some(body) = trimmed.strip_prefix("Dialogue:") {
                let Some(layout) = &layout else {
                    continue;
                };
                match layout.parse_dialogue(line_number, body.trim_start(), cues.len() + 1) {
                    Ok(cue) => cues.push(cue),
                    Err(e) => warn!("Skipping {} dialogue: {}", self.format(), e),
                }
            }
        }

        Ok(cues)
    }

    fn encode(&self, cues: &[Cue]) -> String {
        let marker = match self.variant {
            SsaVariant::Ssa => "Marked=0",
            SsaVariant::Ass => "0",
        };

        let mut output = self.header();
        for cue in cues {
            output.push_str(&format!(
                "Dialogue: {},{},{},Default,,0,0,0,,{}\n",
                marker,
                format_centiseconds(cue.start),
                format_centiseconds(cue.end),
                cue.text.join("\\N")
            ));
        }
        output
    }

    fn format(&self) -> Format {
        match self.variant {
            SsaVariant::Ssa => Format::Ssa,
            SsaVariant::Ass => Format::Ass,
        }
    }
}
