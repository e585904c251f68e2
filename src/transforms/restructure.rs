/*!
 * Transforms that add, remove or regroup cues.
 *
 * All of them leave the document reindexed `1..=N`.
 */

use log::debug;

use crate::errors::ArgumentError;
use crate::subtitle_processor::{Cue, Document};
use crate::timecode::TimeValue;

/// Largest gap two cues may have and still be merged
pub const MERGE_MAX_GAP: TimeValue = TimeValue::from_millis(500);

/// Spacing between documents appended by merge
pub const MERGE_DOCUMENT_SPACING: TimeValue = TimeValue::from_millis(1_000);

/// Renumber cues `1..=N`, returning how many indices changed
pub fn reindex(document: &mut Document) -> usize {
    let changed = document
        .iter()
        .enumerate()
        .filter(|(i, cue)| cue.index != i + 1)
        .count();
    document.reindex();
    changed
}

fn merged_length(first: &Cue, second: &Cue) -> usize {
    first.joined_text().chars().count() + 1 + second.joined_text().chars().count()
}

/// Append `second` to `first`, joining the boundary lines with a space
fn join_text(first: &mut Vec<String>, second: &[String]) {
    let mut rest = second.iter();
    match (first.last_mut(), rest.next()) {
        (Some(last), Some(head)) => {
            last.push(' ');
            last.push_str(head);
        }
        (None, Some(head)) => first.push(head.clone()),
        (_, None) => {}
    }
    first.extend(rest.cloned());
}

/// Merge adjacent short cues that are close together
///
/// After a merge the same position is checked again, so runs of short cues cascade.
pub fn merge_short_lines(document: &mut Document, min_chars: usize) -> Result<usize, ArgumentError> {
    if min_chars == 0 {
        return Err(ArgumentError::ZeroCharacterLimit);
    }

    let mut merged = 0;
    let mut i = 0;
    while i + 1 < document.cues.len() {
        let (current, next) = (&document.cues[i], &document.cues[i + 1]);
        let gap = next.start - current.end;

        if merged_length(current, next) <= min_chars && gap <= MERGE_MAX_GAP {
            let next = document.cues.remove(i + 1);
            let current = &mut document.cues[i];
            join_text(&mut current.text, &next.text);
            current.end = next.end;
            merged += 1;
        } else {
            i += 1;
        }
    }

    document.reindex();
    debug!("Merged {} short cues", merged);
    Ok(merged)
}

/// Greedy word wrap to lines of at most `max_chars` characters
///
/// A single word longer than the limit gets a line of its own.
pub fn wrap_words(lines: &[String], max_chars: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in lines.iter().flat_map(|line| line.split_whitespace()) {
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.chars().count() > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }

    wrapped
}

/// Start time of wrapped line `line` when `duration` is shared across `count` lines
fn line_offset(cue: &Cue, line: usize, count: usize) -> TimeValue {
    let duration = cue.duration().as_millis() as f64;
    cue.start + TimeValue::from_millis((duration * line as f64 / count as f64).round() as i64)
}

/// Reflow cues that have a line longer than `max_chars`
///
/// A reflow of up to two lines stays in the cue. Longer reflows become consecutive
/// two-line cues sharing the original duration in proportion to their line count.
pub fn split_long_lines(document: &mut Document, max_chars: usize) -> Result<usize, ArgumentError> {
    if max_chars == 0 {
        return Err(ArgumentError::ZeroCharacterLimit);
    }

    let mut reflowed = 0;
    let mut result = Vec::with_capacity(document.len());

    for cue in document.cues.drain(..) {
        if cue.text.iter().all(|line| line.chars().count() <= max_chars) {
            result.push(cue);
            continue;
        }

        reflowed += 1;
        let lines = wrap_words(&cue.text, max_chars);
        if lines.len() <= 2 {
            result.push(Cue { text: lines, ..cue });
            continue;
        }

        let count = lines.len();
        for (chunk_index, chunk) in lines.chunks(2).enumerate() {
            let first_line = chunk_index * 2;
            result.push(Cue::new(
                0,
                line_offset(&cue, first_line, count),
                line_offset(&cue, first_line + chunk.len(), count),
                chunk.to_vec(),
            ));
        }
    }

    document.cues = result;
    document.reindex();
    Ok(reflowed)
}

/// Append `secondary` one second after the end of `document`
pub fn merge_documents(document: &mut Document, secondary: &Document) -> usize {
    let offset = document.last_end() + MERGE_DOCUMENT_SPACING;

    document.cues.extend(secondary.iter().map(|cue| Cue {
        start: cue.start + offset,
        end: cue.end + offset,
        ..cue.clone()
    }));
    document.reindex();

    debug!("Appended {} cues at offset {}", secondary.len(), offset);
    secondary.len()
}

/// Check that `position` leaves both halves of a split non-empty
pub(crate) fn check_split_position(document: &Document, position: usize) -> Result<(), ArgumentError> {
    let len = document.len();
    if position == 0 || position >= len {
        return Err(ArgumentError::InvalidSplitPosition { position, len });
    }
    Ok(())
}

/// Detach the cues from `position` on into a new document rebased to zero
pub fn split_at_index(document: &mut Document, position: usize) -> Result<Document, ArgumentError> {
    check_split_position(document, position)?;

    let mut tail = Document::from_cues(document.cues.split_off(position));
    let origin = tail.cues[0].start;
    for cue in &mut tail.cues {
        cue.start -= origin;
        cue.end -= origin;
    }

    document.reindex();
    tail.reindex();
    Ok(tail)
}
