/*!
 * SAMI (`.smi`) codec.
 *
 * SAMI is HTML-like markup where each `<SYNC Start=ms>` tag opens a caption that lasts
 * until the next sync point. Captions whose text is only whitespace (usually `&nbsp;`)
 * clear the screen and produce no cue.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::FormatError;
use crate::formats::{Format, SubtitleCodec};
use crate::subtitle_processor::Cue;
use crate::timecode::TimeValue;

/// Display time of a final caption that has no closing sync point
pub const DEFAULT_LAST_CUE_DURATION_MS: i64 = 3_000;

const HEADER: &str = "<SAMI>\n\
<HEAD>\n\
<TITLE>Subtitle</TITLE>\n\
<SAMIParam>\n  Metrics {time:ms;}\n  Spec {MSFT:1.0;}\n</SAMIParam>\n\
<STYLE TYPE=\"text/css\">\n\
<!--\n\
  P { font-family: Arial; font-weight: normal; color: white; background-color: black; text-align: center; }\n\
  .ENCC { Name: English; lang: en-US; }\n\
-->\n\
</STYLE>\n\
</HEAD>\n\
<BODY>\n";

const FOOTER: &str = "</BODY>\n</SAMI>\n";

static SYNC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<SYNC\s[^>]*?Start\s*=\s*"?(\d+)"?[^>]*>"#).unwrap()
});

static BODY_END_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</BODY\s*>").unwrap()
});

static BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>").unwrap()
});

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap()
});

/// SAMI codec
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamiCodec {
    last_cue_duration: TimeValue,
}

impl SamiCodec {
    pub const fn new(last_cue_duration_ms: i64) -> Self {
        SamiCodec {
            last_cue_duration: TimeValue::from_millis(last_cue_duration_ms),
        }
    }
}

impl Default for SamiCodec {
    fn default() -> Self {
        SamiCodec::new(DEFAULT_LAST_CUE_DURATION_MS)
    }
}

/// Escape the characters that are significant in SAMI markup
pub fn html_encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => encoded.push_str("&amp;"),
            '<' => encoded.push_str("&lt;"),
            '>' => encoded.push_str("&gt;"),
            '"' => encoded.push_str("&quot;"),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// Decode named and numeric character references; unknown names are left as is
pub fn html_decode(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// Visible text lines of one caption body
fn caption_lines(body: &str) -> Vec<String> {
    // Raw newlines in markup are plain whitespace
    let flattened = body.replace(['\r', '\n'], " ");
    let with_breaks = BREAK_REGEX.replace_all(&flattened, "\n");
    let stripped = TAG_REGEX.replace_all(&with_breaks, "");

    html_decode(&stripped)
        .split('\n')
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

impl SubtitleCodec for SamiCodec {
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError> {
        let body_end = BODY_END_REGEX
            .find(content)
            .map_or(content.len(), |m| m.start());
        let body = &content[..body_end];

        let mut syncs = Vec::new();
        for caps in SYNC_REGEX.captures_iter(body) {
            let (Some(tag), Ok(ms)) = (caps.get(0), caps[1].parse::<i64>()) else {
                continue;
            };
            syncs.push((TimeValue::from_millis(ms), tag.start(), tag.end()));
        }

        let mut cues = Vec::new();
        for (i, &(start, _, text_start)) in syncs.iter().enumerate() {
            let next = syncs.get(i + 1);
            let text_end = next.map_or(body.len(), |&(_, tag_start, _)| tag_start);
            let lines = caption_lines(&body[text_start..text_end]);
            if lines.is_empty() {
                continue;
            }

            let end = next.map_or(start + self.last_cue_duration, |&(time, _, _)| time);
            cues.push(Cue::new(cues.len() + 1, start, end, lines));
        }

        debug!("SAMI content has {} sync points, {} captions", syncs.len(), cues.len());
        Ok(cues)
    }

    fn encode(&self, cues: &[Cue]) -> String {
        let mut output = String::from(HEADER);
        for cue in cues {
            let text = cue
                .text
                .iter()
                .map(|line| html_encode(line))
                .collect::<Vec<_>>()
                .join("<br>");
            output.push_str(&format!("<SYNC Start={}>\n", cue.start.as_millis()));
            output.push_str(&format!("<P Class=ENCC>{}</P>\n", text));
            output.push_str(&format!("<SYNC Start={}>\n", cue.end.as_millis()));
            output.push_str("<P Class=ENCC>&nbsp;</P>\n");
        }
        output.push_str(FOOTER);
        output
    }

    fn format(&self) -> Format {
        Format::Sami
    }
}
