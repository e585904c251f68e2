/*!
 * Editing session lifecycle.
 *
 * This module handles:
 * - Opening and saving the document being edited
 * - Applying transforms with exactly one undo snapshot each
 * - Undo/redo and the unsaved-changes flag
 */

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::errors::{ArgumentError, ExportError, ImportError};
use crate::formats::{CodecOptions, Format};
use crate::history::EditHistory;
use crate::subtitle_processor::{self, Document};
use crate::timecode::TimeValue;
use crate::transforms::{self, Selection, Transform, TransformOutcome};

/// Owns the document being edited together with its history
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    document: Document,
    history: EditHistory,
    path: Option<PathBuf>,
    format: Format,
    options: CodecOptions,
    dirty: bool,
}

impl EditSession {
    /// Empty session with unlimited history
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session keeping at most `history_limit` undo states (0 = unlimited)
    pub fn with_history_limit(history_limit: usize) -> Self {
        EditSession {
            history: EditHistory::with_limit(history_limit),
            ..Self::default()
        }
    }

    /// Session over an existing document, not bound to a file
    pub fn from_document(document: Document, format: Format) -> Self {
        EditSession {
            document,
            format,
            ..Self::default()
        }
    }

    /// Use custom codec options for subsequent open and save calls
    pub fn set_codec_options(&mut self, options: CodecOptions) {
        self.options = options;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// True when there are changes since the last open or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File name with a `*` suffix while there are unsaved changes
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        if self.dirty { format!("{}*", name) } else { name }
    }

    /// Replace the document with the contents of `path`
    ///
    /// On failure the current document, history and flags are untouched.
    pub fn open<P: AsRef<Path>>(&mut self, path: P, format: Option<Format>) -> Result<(), ImportError> {
        let path = path.as_ref();
        let (document, format) = subtitle_processor::load_file_with(path, format, &self.options)?;

        info!("Opened {} ({} cues, {})", path.display(), document.len(), format);
        self.document = document;
        self.format = format;
        self.path = Some(path.to_path_buf());
        self.history.clear();
        self.dirty = false;
        Ok(())
    }

    /// Write the document back to the file it was opened from or last saved to
    pub fn save(&mut self) -> Result<(), ExportError> {
        let path = self.path.clone().ok_or(ExportError::NoPath)?;
        self.save_as(path, self.format)
    }

    /// Write the document to `path` in `format` and remember both
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P, format: Format) -> Result<(), ExportError> {
        let path = path.as_ref();
        subtitle_processor::save_file_with(path, &self.document, format, &self.options)?;

        info!("Saved {} cues to {} as {}", self.document.len(), path.display(), format);
        self.path = Some(path.to_path_buf());
        self.format = format;
        self.dirty = false;
        Ok(())
    }

    /// Validate, snapshot once, then mutate
    pub fn apply(&mut self, transform: &Transform, selection: Option<&Selection>) -> Result<TransformOutcome, ArgumentError> {
        transforms::validate(&self.document, transform, selection)?;

        self.history.snapshot(&self.document);
        let outcome = transforms::apply(&mut self.document, transform, selection)?;
        self.dirty = true;
        Ok(outcome)
    }

    /// Replace the timing and text of one cue
    pub fn edit_cue(&mut self, position: usize, start: TimeValue, end: TimeValue, text: &str) -> Result<(), ArgumentError> {
        let len = self.document.len();
        if position >= len {
            return Err(ArgumentError::PositionOutOfRange { position, len });
        }

        self.history.snapshot(&self.document);
        self.document.edit_cue(position, start, end, text)?;
        self.dirty = true;
        Ok(())
    }

    /// Delete cues at the given positions
    pub fn remove(&mut self, positions: &[usize]) -> Result<usize, ArgumentError> {
        let outcome = self.apply(
            &Transform::Remove {
                positions: positions.to_vec(),
            },
            None,
        )?;
        Ok(outcome.touched)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.document);
        if changed {
            debug!("Undo: {} states left", self.history.undo_depth());
            self.dirty = true;
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.document);
        if changed {
            debug!("Redo: {} states left", self.history.redo_depth());
            self.dirty = true;
        }
        changed
    }
}
