use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{ArgumentError, ExportError, ImportError};
use crate::file_utils::FileManager;
use crate::formats::{CodecOptions, Format};
use crate::timecode::TimeValue;

// @module: Cue and document model with load/save entry points

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    // @field: 1-based ordinal, may be sparse between reindexes
    pub index: usize,

    // @field: Start time
    pub start: TimeValue,

    // @field: End time, not required to be >= start
    pub end: TimeValue,

    // @field: Text lines in display order
    pub text: Vec<String>,
}

impl Cue {
    /// Creates a new cue from already split lines
    pub fn new(index: usize, start: TimeValue, end: TimeValue, text: Vec<String>) -> Self {
        Cue { index, start, end, text }
    }

    /// Creates a cue from millisecond bounds and a text blob split on line breaks
    pub fn from_millis(index: usize, start_ms: i64, end_ms: i64, text: &str) -> Self {
        Cue {
            index,
            start: TimeValue::from_millis(start_ms),
            end: TimeValue::from_millis(end_ms),
            text: split_lines(text),
        }
    }

    pub fn duration(&self) -> TimeValue {
        self.end - self.start
    }

    /// Text lines joined with `\n`
    pub fn joined_text(&self) -> String {
        self.text.join("\n")
    }

    /// Replace the text with the lines of `text`
    pub fn set_text(&mut self, text: &str) {
        self.text = split_lines(text);
    }

    /// Number of characters that are not whitespace
    pub fn visible_char_count(&self) -> usize {
        self.text
            .iter()
            .flat_map(|line| line.chars())
            .filter(|c| !c.is_whitespace())
            .count()
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start.format_srt(), self.end.format_srt())?;
        for line in &self.text {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Split a text blob into lines, accepting `\r\n` and `\n`
///
/// An empty blob has no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Ordered sequence of cues being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Cues in timeline order
    pub cues: Vec<Cue>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document { cues: Vec::new() }
    }

    pub fn from_cues(cues: Vec<Cue>) -> Self {
        Document { cues }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Cue> {
        self.cues.get(position)
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// End time of the last cue, zero for an empty document
    pub fn last_end(&self) -> TimeValue {
        self.cues.last().map(|cue| cue.end).unwrap_or(TimeValue::ZERO)
    }

    /// Renumber every cue to `1..=N` in current order
    pub fn reindex(&mut self) {
        for (i, cue) in self.cues.iter_mut().enumerate() {
            cue.index = i + 1;
        }
    }

    /// Delete the cues at the given positions, then reindex
    ///
    /// Every position is checked before anything is removed.
    pub fn remove(&mut self, positions: &[usize]) -> Result<usize, ArgumentError> {
        let len = self.cues.len();
        if let Some(&position) = positions.iter().find(|&&p| p >= len) {
            return Err(ArgumentError::PositionOutOfRange { position, len });
        }

        let mut sorted: Vec<usize> = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        // Descending so earlier removals don't shift later positions
        for &position in sorted.iter().rev() {
            self.cues.remove(position);
        }
        self.reindex();

        debug!("Removed {} cues, {} remaining", sorted.len(), self.cues.len());
        Ok(sorted.len())
    }

    /// Replace the timing and text of one cue
    pub fn edit_cue(
        &mut self,
        position: usize,
        start: TimeValue,
        end: TimeValue,
        text: &str,
    ) -> Result<(), ArgumentError> {
        let len = self.cues.len();
        let cue = self
            .cues
            .get_mut(position)
            .ok_or(ArgumentError::PositionOutOfRange { position, len })?;

        cue.start = start;
        cue.end = end;
        cue.set_text(text);
        Ok(())
    }

    /// Number of adjacent pairs where a cue ends after the next one starts
    pub fn overlap_count(&self) -> usize {
        self.cues
            .windows(2)
            .filter(|pair| pair[0].end > pair[1].start)
            .count()
    }

    /// Number of cues with a timestamp before zero
    ///
    /// No grammar can carry a negative time, so these cues are lost on a save and reload.
    pub fn negative_count(&self) -> usize {
        self.cues
            .iter()
            .filter(|cue| cue.start < TimeValue::ZERO || cue.end < TimeValue::ZERO)
            .count()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cue in &self.cues {
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}

/// Decode raw text in the given format
pub fn load(raw_text: &str, format: Format) -> Result<Document, ImportError> {
    load_with(raw_text, format, &CodecOptions::default())
}

/// Decode raw text with custom codec options
pub fn load_with(raw_text: &str, format: Format, options: &CodecOptions) -> Result<Document, ImportError> {
    // A UTF-8 BOM is not part of any grammar
    let content = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
    let cues = format.codec_with(options).decode(content)?;

    if cues.is_empty() && !content.trim().is_empty() {
        warn!("No valid {} cues found in content", format);
    }

    let document = Document::from_cues(cues);
    let overlaps = document.overlap_count();
    if overlaps > 0 {
        warn!("Found {} overlapping subtitle cues", overlaps);
    }

    debug!("Loaded {} cues as {}", document.len(), format);
    Ok(document)
}

fn warn_on_negative_times(document: &Document, format: Format) {
    let negative = document.negative_count();
    if negative > 0 {
        warn!(
            "{} cue(s) have times before zero and will not load back from {}; shift them forward first",
            negative, format
        );
    }
}

/// Encode a document in the given format
pub fn save(document: &Document, format: Format) -> String {
    warn_on_negative_times(document, format);
    format.codec().encode(&document.cues)
}

/// Encode a document with custom codec options
pub fn save_with(document: &Document, format: Format, options: &CodecOptions) -> String {
    warn_on_negative_times(document, format);
    format.codec_with(options).encode(&document.cues)
}

/// Read and decode a subtitle file, detecting the format when none is given
pub fn load_file<P: AsRef<Path>>(path: P, format: Option<Format>) -> Result<(Document, Format), ImportError> {
    load_file_with(path, format, &CodecOptions::default())
}

/// Read and decode a subtitle file with custom codec options
pub fn load_file_with<P: AsRef<Path>>(
    path: P,
    format: Option<Format>,
    options: &CodecOptions,
) -> Result<(Document, Format), ImportError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);

    let format = match format {
        Some(format) => format,
        None => FileManager::detect_format(path, &content)
            .ok_or_else(|| ImportError::UnknownFormat(path.display().to_string()))?,
    };

    let document = load_with(&content, format, options)?;
    Ok((document, format))
}

/// Encode a document and write it to disk
pub fn save_file<P: AsRef<Path>>(path: P, document: &Document, format: Format) -> Result<(), ExportError> {
    save_file_with(path, document, format, &CodecOptions::default())
}

/// Encode a document with custom codec options and write it to disk
pub fn save_file_with<P: AsRef<Path>>(
    path: P,
    document: &Document,
    format: Format,
    options: &CodecOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    FileManager::write_to_file(path, &save_with(document, format, options)).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
