/*!
 * Subtitle format codecs.
 *
 * Every supported format has a codec implementing [`SubtitleCodec`]. The closed
 * [`Format`] enum maps each variant to its codec through a static table, so the set
 * of formats is checked at compile time instead of matched on strings.
 *
 * - `srt`: SubRip, the canonical default
 * - `subviewer`: SubViewer 1/2 (`.sub`)
 * - `microdvd`: frame-based MicroDVD (`.sub`)
 * - `sami`: Microsoft SAMI markup (`.smi`)
 * - `ssa`: SubStation Alpha and Advanced SubStation (`.ssa`, `.ass`)
 * - `webvtt`: Web Video Text Tracks (`.vtt`)
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ArgumentError, FormatError, ImportError};
use crate::subtitle_processor::Cue;

pub mod microdvd;
pub mod sami;
pub mod srt;
pub mod ssa;
pub mod subviewer;
pub mod webvtt;

pub use microdvd::MicroDvdCodec;
pub use sami::SamiCodec;
pub use srt::SrtCodec;
pub use ssa::SsaCodec;
pub use subviewer::SubViewerCodec;
pub use webvtt::WebVttCodec;

/// Shared decode/encode contract for every format
///
/// Codecs hold no mutable state. Decoding skips malformed cues and only fails when
/// the content as a whole is unusable (e.g. a missing mandatory header).
pub trait SubtitleCodec: Sync {
    /// Decode the full text of a file into cues
    fn decode(&self, content: &str) -> Result<Vec<Cue>, FormatError>;

    /// Encode cues into the full text of a file
    fn encode(&self, cues: &[Cue]) -> String;

    /// Format handled by this codec
    fn format(&self) -> Format;
}

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Srt,
    SubViewer,
    MicroDvd,
    Sami,
    Ssa,
    Ass,
    WebVtt,
}

/// Tunable codec parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Frame rate for MicroDVD files that do not declare one
    pub microdvd_frame_rate: f64,

    /// Display time of a trailing SAMI caption with no closing sync, in ms
    pub sami_last_cue_duration_ms: i64,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            microdvd_frame_rate: microdvd::DEFAULT_FRAME_RATE,
            sami_last_cue_duration_ms: sami::DEFAULT_LAST_CUE_DURATION_MS,
        }
    }
}

impl CodecOptions {
    pub fn validate(&self) -> Result<(), ArgumentError> {
        MicroDvdCodec::with_frame_rate(self.microdvd_frame_rate)?;
        if self.sami_last_cue_duration_ms < 0 {
            return Err(ArgumentError::InvalidDuration(self.sami_last_cue_duration_ms as f64 / 1000.0));
        }
        Ok(())
    }
}

static SRT: SrtCodec = SrtCodec;
static SUBVIEWER: SubViewerCodec = SubViewerCodec;
static MICRODVD: MicroDvdCodec = MicroDvdCodec::new(microdvd::DEFAULT_FRAME_RATE);
static SAMI: SamiCodec = SamiCodec::new(sami::DEFAULT_LAST_CUE_DURATION_MS);
static SSA: SsaCodec = SsaCodec::ssa();
static ASS: SsaCodec = SsaCodec::ass();
static WEBVTT: WebVttCodec = WebVttCodec;

impl Format {
    /// All formats, in menu order
    pub const ALL: [Format; 7] = [
        Format::Srt,
        Format::SubViewer,
        Format::MicroDvd,
        Format::Sami,
        Format::Ssa,
        Format::Ass,
        Format::WebVtt,
    ];

    /// Codec with default settings for this format
    pub fn codec(self) -> &'static dyn SubtitleCodec {
        match self {
            Format::Srt => &SRT,
            Format::SubViewer => &SUBVIEWER,
            Format::MicroDvd => &MICRODVD,
            Format::Sami => &SAMI,
            Format::Ssa => &SSA,
            Format::Ass => &ASS,
            Format::WebVtt => &WEBVTT,
        }
    }

    /// Codec configured with `options`
    pub fn codec_with(self, options: &CodecOptions) -> Box<dyn SubtitleCodec> {
        match self {
            Format::MicroDvd => Box::new(MicroDvdCodec::new(options.microdvd_frame_rate)),
            Format::Sami => Box::new(SamiCodec::new(options.sami_last_cue_duration_ms)),
            Format::Srt => Box::new(SrtCodec),
            Format::SubViewer => Box::new(SubViewerCodec),
            Format::Ssa => Box::new(SsaCodec::ssa()),
            Format::Ass => Box::new(SsaCodec::ass()),
            Format::WebVtt => Box::new(WebVttCodec),
        }
    }

    /// Preferred file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Format::Srt => "srt",
            Format::SubViewer | Format::MicroDvd => "sub",
            Format::Sami => "smi",
            Format::Ssa => "ssa",
            Format::Ass => "ass",
            Format::WebVtt => "vtt",
        }
    }

    /// Format implied by an extension; `.sub` is ambiguous and resolves to SubViewer
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Some(Format::Srt),
            "sub" => Some(Format::SubViewer),
            "smi" | "sami" => Some(Format::Sami),
            "ssa" => Some(Format::Ssa),
            "ass" => Some(Format::Ass),
            "vtt" => Some(Format::WebVtt),
            _ => None,
        }
    }

    // @returns: Lowercase identifier used on the command line and in config
    pub fn name(self) -> &'static str {
        match self {
            Format::Srt => "srt",
            Format::SubViewer => "subviewer",
            Format::MicroDvd => "microdvd",
            Format::Sami => "sami",
            Format::Ssa => "ssa",
            Format::Ass => "ass",
            Format::WebVtt => "webvtt",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" | "subrip" => Ok(Format::Srt),
            "subviewer" => Ok(Format::SubViewer),
            "microdvd" => Ok(Format::MicroDvd),
            "sami" | "smi" => Ok(Format::Sami),
            "ssa" => Ok(Format::Ssa),
            "ass" => Ok(Format::Ass),
            "webvtt" | "vtt" => Ok(Format::WebVtt),
            _ => Err(ImportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Iterate over lines with their 1-based line numbers, without trailing `\r`
pub(crate) fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(i, line)| (i + 1, line))
}

/// Group lines into blocks separated by blank lines
///
/// Each block carries the line number of its first line.
pub(crate) fn blank_line_blocks(content: &str) -> Vec<(usize, Vec<&str>)> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start_line = 0;

    for (number, line) in numbered_lines(content) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push((start_line, std::mem::take(&mut current)));
            }
            continue;
        }
        if current.is_empty() {
            start_line = number;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push((start_line, current));
    }

    blocks
}
