/*!
 * Text cleanup transforms.
 *
 * Every function here honours a selection: with none (or an empty one) it rewrites
 * every cue, otherwise only the selected positions. Timing is never touched.
 */

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ArgumentError;
use crate::subtitle_processor::{split_lines, Document};
use crate::transforms::{target_positions, Selection};

/// Case conversion target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Upper,
    Lower,
    Title,
}

impl fmt::Display for TextCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextCase::Upper => write!(f, "upper"),
            TextCase::Lower => write!(f, "lower"),
            TextCase::Title => write!(f, "title"),
        }
    }
}

impl FromStr for TextCase {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upper" => Ok(TextCase::Upper),
            "lower" => Ok(TextCase::Lower),
            "title" => Ok(TextCase::Title),
            _ => Err(ArgumentError::InvalidValue {
                transform: "case".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Encoding the UTF-8 bytes of a cue are reinterpreted as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Ascii,
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "utf-8"),
            TextEncoding::Utf16Le => write!(f, "utf-16le"),
            TextEncoding::Ascii => write!(f, "ascii"),
            TextEncoding::Latin1 => write!(f, "iso-8859-1"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-16le" | "utf16le" | "unicode" => Ok(TextEncoding::Utf16Le),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(TextEncoding::Latin1),
            _ => Err(ArgumentError::InvalidValue {
                transform: "encoding".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl TextEncoding {
    /// Decode `bytes` as this encoding, replacing invalid sequences
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                let mut decoded = String::from_utf16_lossy(&units);
                if bytes.len() % 2 == 1 {
                    decoded.push(char::REPLACEMENT_CHARACTER);
                }
                decoded
            }
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '?' })
                .collect(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

// @const: Hearing-impaired annotations, applied in order
static HEARING_IMPAIRED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\[.*?\]",
        r"\(.*?\)",
        r"♪.*?♪",
        r"#.*?#",
        r"\{.*?\}",
        r"<.*?>",
        // Unterminated brackets run to the end of the text
        r"\[.*$",
        r"\(.*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").unwrap()
});

static BRACE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^}]+\}").unwrap()
});

/// Common OCR misreads, applied in order
pub const OCR_SUBSTITUTIONS: [(&str, &str); 10] = [
    ("l", "I"),
    ("0", "O"),
    ("1", "I"),
    ("rn", "m"),
    ("vv", "w"),
    ("|", "I"),
    ("[", "("),
    ("]", ")"),
    ("¡", "!"),
    ("¿", "?"),
];

/// Replace the text of each targeted cue, counting cues whose text changed
fn rewrite_text<F>(document: &mut Document, selection: Option<&Selection>, mut rewrite: F) -> Result<usize, ArgumentError>
where
    F: FnMut(&[String]) -> Vec<String>,
{
    let positions = target_positions(selection, document.len())?;

    let mut touched = 0;
    for position in positions {
        let cue = &mut document.cues[position];
        let text = rewrite(&cue.text);
        if text != cue.text {
            cue.text = text;
            touched += 1;
        }
    }
    Ok(touched)
}

/// Trim each line and drop the ones left empty
fn tidy_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Lowercase, then capitalise the first letter of each word
pub fn title_case(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut word_start = true;

    for c in line.chars() {
        if word_start && c.is_alphabetic() {
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
        word_start = !(c.is_alphanumeric() || c == '\'');
    }
    result
}

pub fn change_case(document: &mut Document, case: TextCase, selection: Option<&Selection>) -> Result<usize, ArgumentError> {
    rewrite_text(document, selection, |lines| {
        lines
            .iter()
            .map(|line| match case {
                TextCase::Upper => line.to_uppercase(),
                TextCase::Lower => line.to_lowercase(),
                TextCase::Title => title_case(line),
            })
            .collect()
    })
}

/// Remove `<...>` and `{...}` formatting tags
pub fn strip_formatting(document: &mut Document, selection: Option<&Selection>) -> Result<usize, ArgumentError> {
    rewrite_text(document, selection, |lines| {
        let joined = lines.join("\n");
        let without_html = HTML_TAG_REGEX.replace_all(&joined, "");
        let without_braces = BRACE_TAG_REGEX.replace_all(&without_html, "");
        tidy_lines(&without_braces)
    })
}

/// Remove sound descriptions, speaker labels and music cues
pub fn remove_hearing_impaired(document: &mut Document, selection: Option<&Selection>) -> Result<usize, ArgumentError> {
    rewrite_text(document, selection, |lines| {
        let mut text = lines.join("\n");
        for pattern in HEARING_IMPAIRED_PATTERNS.iter() {
            text = pattern.replace_all(&text, "").into_owned();
        }
        tidy_lines(&text)
    })
}

/// Apply the static OCR substitution table
pub fn fix_ocr_errors(document: &mut Document, selection: Option<&Selection>) -> Result<usize, ArgumentError> {
    rewrite_text(document, selection, |lines| {
        lines
            .iter()
            .map(|line| {
                OCR_SUBSTITUTIONS
                    .iter()
                    .fold(line.clone(), |text, &(from, to)| text.replace(from, to))
            })
            .collect()
    })
}

/// Reinterpret the UTF-8 bytes of each cue's text as `encoding`
pub fn convert_encoding(
    document: &mut Document,
    encoding: TextEncoding,
    selection: Option<&Selection>,
) -> Result<usize, ArgumentError> {
    rewrite_text(document, selection, |lines| {
        split_lines(&encoding.decode(lines.join("\n").as_bytes()))
    })
}
