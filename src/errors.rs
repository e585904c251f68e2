/*!
 * Error types for the subforge engine.
 *
 * This module contains the error taxonomy for the different parts of the engine,
 * using the thiserror crate for ergonomic error definitions:
 *
 * - `FormatError`: grammar violations found while decoding one cue or header
 * - `ImportError`: fatal problems loading a document (I/O, unusable content)
 * - `ExportError`: I/O failures while writing a document
 * - `ArgumentError`: invalid transform parameters, rejected before any mutation
 */

use std::path::PathBuf;

use thiserror::Error;

/// Grammar violations encountered while decoding subtitle text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// A timestamp did not match `h:m:s{,|.}f`
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// A mandatory header line was not found
    #[error("Missing {expected} header in {format} content")]
    MissingHeader {
        /// Format being decoded
        format: String,
        /// Header that was expected
        expected: String,
    },

    /// A cue could not be decoded
    #[error("Malformed cue at line {line}: {reason}")]
    MalformedCue {
        /// 1-based line number where the cue starts
        line: usize,
        /// Human readable reason
        reason: String,
    },
}

/// Errors that can occur while loading a document
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not usable in the requested format
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// No codec matches the requested or detected format
    #[error("Unknown subtitle format: {0}")]
    UnknownFormat(String),
}

/// Errors that can occur while writing a document
#[derive(Error, Debug)]
pub enum ExportError {
    /// The target could not be written
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Save was requested for a document that was never opened or saved
    #[error("No output path set for the document")]
    NoPath,
}

/// Invalid transform parameters
///
/// A transform reporting one of these has not modified the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("Scale factor must be positive, got {0}")]
    NonPositiveFactor(f64),

    #[error("Interval must be positive, got {0}ms")]
    NonPositiveInterval(i64),

    #[error("Frame rate must be positive, got {0}")]
    NonPositiveFrameRate(f64),

    #[error("Duration must be a non-negative finite number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("Character limit must be positive")]
    ZeroCharacterLimit,

    #[error("Position {position} is out of range for {len} cues")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Cannot split at position {position}: valid positions are 1..{len}")]
    InvalidSplitPosition { position: usize, len: usize },

    #[error("Invalid transform '{0}'")]
    UnknownTransform(String),

    #[error("Invalid value '{value}' for {transform}")]
    InvalidValue { transform: String, value: String },
}
