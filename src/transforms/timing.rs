use crate::errors::ArgumentError;
use crate::subtitle_processor::{Cue, Document};
use crate::timecode::TimeValue;
use crate::transforms::{target_positions, Selection};

// @module: Transforms that move cue boundaries without changing text

/// Reading speed assumed by SmartDuration, in visible characters per second
pub const READING_SPEED_CPS: f64 = 15.0;

/// Shortest duration SmartDuration allows
pub const SMART_MIN_DURATION: TimeValue = TimeValue::from_millis(1_000);

/// Longest duration SmartDuration allows
pub const SMART_MAX_DURATION: TimeValue = TimeValue::from_millis(10_000);

/// Convert a non-negative number of seconds to a time value
pub(crate) fn duration_from_seconds(seconds: f64) -> Result<TimeValue, ArgumentError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ArgumentError::InvalidDuration(seconds));
    }
    Ok(TimeValue::from_seconds(seconds))
}

/// Map both boundaries of every cue, counting cues that changed
fn map_boundaries<F>(document: &mut Document, mut f: F) -> usize
where
    F: FnMut(TimeValue) -> TimeValue,
{
    let mut touched = 0;
    for cue in &mut document.cues {
        let (start, end) = (f(cue.start), f(cue.end));
        if start != cue.start || end != cue.end {
            cue.start = start;
            cue.end = end;
            touched += 1;
        }
    }
    touched
}

/// Add `delta` to both boundaries of the selected cues, or every cue
///
/// Results may be negative.
pub fn shift(document: &mut Document, delta: TimeValue, selection: Option<&Selection>) -> Result<usize, ArgumentError> {
    let positions = target_positions(selection, document.len())?;
    for &position in &positions {
        let cue = &mut document.cues[position];
        cue.start += delta;
        cue.end += delta;
    }
    Ok(positions.len())
}

/// Multiply every timestamp by `factor`, rounding to the nearest millisecond
pub fn scale(document: &mut Document, factor: f64) -> Result<usize, ArgumentError> {
    // Validates the factor once so the mapping below cannot fail halfway
    TimeValue::ZERO.scale(factor)?;
    Ok(map_boundaries(document, |t| t.scale(factor).unwrap_or(t)))
}

/// Floor every timestamp to a multiple of `interval_ms`
pub fn snap_to_interval(document: &mut Document, interval_ms: i64) -> Result<usize, ArgumentError> {
    TimeValue::ZERO.floor_to(interval_ms)?;
    Ok(map_boundaries(document, |t| t.floor_to(interval_ms).unwrap_or(t)))
}

/// Round every timestamp to the nearest frame boundary at `fps`
pub fn sync_to_frame_rate(document: &mut Document, fps: f64) -> Result<usize, ArgumentError> {
    TimeValue::ZERO.snap_to_frame(fps)?;
    Ok(map_boundaries(document, |t| t.snap_to_frame(fps).unwrap_or(t)))
}

/// Upper duration bound for a cue based on its reading time
fn smart_upper_bound(cue: &Cue) -> TimeValue {
    let ideal = cue.visible_char_count() as f64 / READING_SPEED_CPS;
    let upper = TimeValue::from_seconds(ideal * 1.5).min(SMART_MAX_DURATION);
    // Very short texts would otherwise get an upper bound below the 1s floor
    upper.max(SMART_MIN_DURATION)
}

/// Clamp each cue's duration into its reading-time window by moving its end
pub fn smart_duration(document: &mut Document) -> usize {
    let mut touched = 0;
    for cue in &mut document.cues {
        let duration = cue.duration();
        let upper = smart_upper_bound(cue);

        if duration < SMART_MIN_DURATION {
            cue.end = cue.start + SMART_MIN_DURATION;
        } else if duration > upper {
            cue.end = cue.start + upper;
        } else {
            continue;
        }
        touched += 1;
    }
    touched
}

/// Clamp each cue's end to the next cue's start in one left-to-right pass
///
/// The pass is not repeated, so the result is not guaranteed to be overlap free when
/// a clamp produces a new inversion further along.
pub fn fix_overlaps(document: &mut Document) -> usize {
    let mut touched = 0;
    for i in 1..document.cues.len() {
        let next_start = document.cues[i].start;
        let cue = &mut document.cues[i - 1];
        if cue.end > next_start {
            cue.end = next_start;
            touched += 1;
        }
    }
    touched
}

/// Close gaps longer than `max_gap_seconds` by meeting at the midpoint
pub fn fix_gaps(document: &mut Document, max_gap_seconds: f64) -> Result<usize, ArgumentError> {
    let max_gap = duration_from_seconds(max_gap_seconds)?;

    let mut touched = 0;
    for i in 1..document.cues.len() {
        let end = document.cues[i - 1].end;
        let gap = document.cues[i].start - end;
        if gap > max_gap {
            let midpoint = end + TimeValue::from_millis(gap.as_millis() / 2);
            document.cues[i - 1].end = midpoint;
            document.cues[i].start = midpoint;
            touched += 1;
        }
    }
    Ok(touched)
}

/// Extend cues shorter than `min_seconds`; never shortens
pub fn adjust_display_time(document: &mut Document, min_seconds: f64) -> Result<usize, ArgumentError> {
    let minimum = duration_from_seconds(min_seconds)?;

    let mut touched = 0;
    for cue in &mut document.cues {
        if cue.duration() < minimum {
            cue.end = cue.start + minimum;
            touched += 1;
        }
    }
    Ok(touched)
}
