/*!
 * Timeline and text transforms applied to a [`Document`].
 *
 * Every transform validates its parameters before touching the document. When a
 * transform returns an [`ArgumentError`] the document is exactly as it was.
 *
 * - `timing`: shift, scale, snapping, frame-rate sync, duration and gap repair
 * - `restructure`: merging, splitting, reindexing and removing cues
 * - `text`: case, tag stripping, hearing-impaired cleanup, OCR table, re-encoding
 */

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ArgumentError;
use crate::subtitle_processor::Document;
use crate::timecode::TimeValue;

pub mod restructure;
pub mod text;
pub mod timing;

pub use text::{TextCase, TextEncoding};

/// Zero-based cue positions chosen by the host
///
/// An empty selection means every cue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<usize>);

impl Selection {
    pub fn new() -> Self {
        Selection(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0.contains(&position)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Fail on the first position outside `0..len`
    pub fn validate(&self, len: usize) -> Result<(), ArgumentError> {
        match self.0.range(len..).next() {
            Some(&position) => Err(ArgumentError::PositionOutOfRange { position, len }),
            None => Ok(()),
        }
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Selection(iter.into_iter().collect())
    }
}

impl FromStr for Selection {
    type Err = ArgumentError;

    /// Parse a comma separated list such as `0,3,5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>().map_err(|_| ArgumentError::InvalidValue {
                    transform: "selection".to_string(),
                    value: part.to_string(),
                })
            })
            .collect()
    }
}

/// Positions a selection-aware transform should touch, checked against `len`
pub(crate) fn target_positions(selection: Option<&Selection>, len: usize) -> Result<Vec<usize>, ArgumentError> {
    match selection {
        Some(selection) if !selection.is_empty() => {
            selection.validate(len)?;
            Ok(selection.iter().collect())
        }
        _ => Ok((0..len).collect()),
    }
}

/// Defaults used when a transform is named without a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDefaults {
    /// Gaps longer than this are closed by FixGaps, in seconds
    #[serde(default = "default_max_gap_seconds")]
    pub max_gap_seconds: f64,

    /// Longest merged text MergeShortLines may produce
    #[serde(default = "default_merge_min_chars")]
    pub merge_min_chars: usize,

    /// Longest line SplitLongLines leaves alone
    #[serde(default = "default_split_max_chars")]
    pub split_max_chars: usize,

    /// Minimum display time for AdjustDisplayTime, in seconds
    #[serde(default = "default_min_display_seconds")]
    pub min_display_seconds: f64,
}

fn default_max_gap_seconds() -> f64 {
    0.25
}

fn default_merge_min_chars() -> usize {
    40
}

fn default_split_max_chars() -> usize {
    42
}

fn default_min_display_seconds() -> f64 {
    1.0
}

impl Default for TransformDefaults {
    fn default() -> Self {
        TransformDefaults {
            max_gap_seconds: default_max_gap_seconds(),
            merge_min_chars: default_merge_min_chars(),
            split_max_chars: default_split_max_chars(),
            min_display_seconds: default_min_display_seconds(),
        }
    }
}

/// A transform together with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Shift { delta: TimeValue },
    Scale { factor: f64 },
    SnapToInterval { interval_ms: i64 },
    SmartDuration,
    SyncToFrameRate { fps: f64 },
    FixOverlaps,
    FixGaps { max_gap_seconds: f64 },
    AdjustDisplayTime { min_seconds: f64 },
    MergeShortLines { min_chars: usize },
    SplitLongLines { max_chars: usize },
    Reindex,
    Remove { positions: Vec<usize> },
    MergeDocuments { secondary: Document },
    SplitAtIndex { position: usize },
    ChangeCase(TextCase),
    StripFormatting,
    RemoveHearingImpaired,
    FixOcrErrors,
    ConvertEncoding(TextEncoding),
}

impl Transform {
    /// Short name used on the command line and in logs
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Shift { .. } => "shift",
            Transform::Scale { .. } => "scale",
            Transform::SnapToInterval { .. } => "snap",
            Transform::SmartDuration => "smart-duration",
            Transform::SyncToFrameRate { .. } => "sync-fps",
            Transform::FixOverlaps => "fix-overlaps",
            Transform::FixGaps { .. } => "fix-gaps",
            Transform::AdjustDisplayTime { .. } => "min-display",
            Transform::MergeShortLines { .. } => "merge-short",
            Transform::SplitLongLines { .. } => "split-long",
            Transform::Reindex => "reindex",
            Transform::Remove { .. } => "remove",
            Transform::MergeDocuments { .. } => "merge",
            Transform::SplitAtIndex { .. } => "split-at",
            Transform::ChangeCase(_) => "case",
            Transform::StripFormatting => "strip-tags",
            Transform::RemoveHearingImpaired => "strip-hi",
            Transform::FixOcrErrors => "fix-ocr",
            Transform::ConvertEncoding(_) => "encoding",
        }
    }

    /// Whether the transform restricts itself to a selection when one is given
    pub fn is_selection_aware(&self) -> bool {
        matches!(
            self,
            Transform::Shift { .. }
                | Transform::ChangeCase(_)
                | Transform::StripFormatting
                | Transform::RemoveHearingImpaired
                | Transform::FixOcrErrors
                | Transform::ConvertEncoding(_)
        )
    }

    /// Parse `name[=value]`, filling omitted parameters from `defaults`
    pub fn parse_with_defaults(s: &str, defaults: &TransformDefaults) -> Result<Self, ArgumentError> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };
        let name = name.to_lowercase();

        let invalid = |value: &str| ArgumentError::InvalidValue {
            transform: name.clone(),
            value: value.to_string(),
        };
        let required = || value.ok_or_else(|| invalid(""));

        let transform = match name.as_str() {
            "shift" => Transform::Shift { delta: parse_offset(required()?).ok_or_else(|| invalid(s))? },
            "scale" => {
                let value = required()?;
                Transform::Scale { factor: value.parse().map_err(|_| invalid(value))? }
            }
            "snap" => {
                let value = required()?;
                Transform::SnapToInterval { interval_ms: value.parse().map_err(|_| invalid(value))? }
            }
            "smart-duration" => Transform::SmartDuration,
            "sync-fps" => {
                let value = required()?;
                Transform::SyncToFrameRate { fps: value.parse().map_err(|_| invalid(value))? }
            }
            "fix-overlaps" => Transform::FixOverlaps,
            "fix-gaps" => Transform::FixGaps {
                max_gap_seconds: match value {
                    Some(v) => v.parse().map_err(|_| invalid(v))?,
                    None => defaults.max_gap_seconds,
                },
            },
            "min-display" => Transform::AdjustDisplayTime {
                min_seconds: match value {
                    Some(v) => v.parse().map_err(|_| invalid(v))?,
                    None => defaults.min_display_seconds,
                },
            },
            "merge-short" => Transform::MergeShortLines {
                min_chars: match value {
                    Some(v) => v.parse().map_err(|_| invalid(v))?,
                    None => defaults.merge_min_chars,
                },
            },
            "split-long" => Transform::SplitLongLines {
                max_chars: match value {
                    Some(v) => v.parse().map_err(|_| invalid(v))?,
                    None => defaults.split_max_chars,
                },
            },
            "reindex" => Transform::Reindex,
            "remove" => {
                let value = required()?;
                let selection: Selection = value.parse()?;
                Transform::Remove { positions: selection.iter().collect() }
            }
            "split-at" => {
                let value = required()?;
                Transform::SplitAtIndex { position: value.parse().map_err(|_| invalid(value))? }
            }
            "case" => Transform::ChangeCase(required()?.parse()?),
            "strip-tags" => Transform::StripFormatting,
            "strip-hi" => Transform::RemoveHearingImpaired,
            "fix-ocr" => Transform::FixOcrErrors,
            "encoding" => Transform::ConvertEncoding(required()?.parse()?),
            _ => return Err(ArgumentError::UnknownTransform(s.to_string())),
        };

        Ok(transform)
    }
}

/// Signed offset given either as milliseconds or as a timestamp
fn parse_offset(value: &str) -> Option<TimeValue> {
    if let Ok(ms) = value.parse::<i64>() {
        return Some(TimeValue::from_millis(ms));
    }
    match value.strip_prefix('-') {
        Some(rest) => TimeValue::parse(rest).ok().map(|t| -t),
        None => TimeValue::parse(value.strip_prefix('+').unwrap_or(value)).ok(),
    }
}

impl FromStr for Transform {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::parse_with_defaults(s, &TransformDefaults::default())
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Shift { delta } => write!(f, "shift={}", delta.as_millis()),
            Transform::Scale { factor } => write!(f, "scale={}", factor),
            Transform::SnapToInterval { interval_ms } => write!(f, "snap={}", interval_ms),
            Transform::SyncToFrameRate { fps } => write!(f, "sync-fps={}", fps),
            Transform::FixGaps { max_gap_seconds } => write!(f, "fix-gaps={}", max_gap_seconds),
            Transform::AdjustDisplayTime { min_seconds } => write!(f, "min-display={}", min_seconds),
            Transform::MergeShortLines { min_chars } => write!(f, "merge-short={}", min_chars),
            Transform::SplitLongLines { max_chars } => write!(f, "split-long={}", max_chars),
            Transform::Remove { positions } => {
                let list: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
                write!(f, "remove={}", list.join(","))
            }
            Transform::MergeDocuments { secondary } => write!(f, "merge({} cues)", secondary.len()),
            Transform::SplitAtIndex { position } => write!(f, "split-at={}", position),
            Transform::ChangeCase(case) => write!(f, "case={}", case),
            Transform::ConvertEncoding(encoding) => write!(f, "encoding={}", encoding),
            other => f.write_str(other.name()),
        }
    }
}

/// Result of a successful transform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutcome {
    /// Number of cues created, changed or removed
    pub touched: usize,

    /// Detached tail produced by SplitAtIndex
    pub detached: Option<Document>,
}

impl TransformOutcome {
    pub(crate) fn touched(touched: usize) -> Self {
        TransformOutcome { touched, detached: None }
    }
}

/// Check every parameter of `transform` against `document` without mutating it
pub fn validate(document: &Document, transform: &Transform, selection: Option<&Selection>) -> Result<(), ArgumentError> {
    if let Some(selection) = selection {
        selection.validate(document.len())?;
    }

    match transform {
        Transform::Scale { factor } => {
            TimeValue::ZERO.scale(*factor)?;
        }
        Transform::SnapToInterval { interval_ms } => {
            TimeValue::ZERO.floor_to(*interval_ms)?;
        }
        Transform::SyncToFrameRate { fps } => {
            TimeValue::ZERO.snap_to_frame(*fps)?;
        }
        Transform::FixGaps { max_gap_seconds } => {
            timing::duration_from_seconds(*max_gap_seconds)?;
        }
        Transform::AdjustDisplayTime { min_seconds } => {
            timing::duration_from_seconds(*min_seconds)?;
        }
        Transform::MergeShortLines { min_chars } | Transform::SplitLongLines { max_chars: min_chars } => {
            if *min_chars == 0 {
                return Err(ArgumentError::ZeroCharacterLimit);
            }
        }
        Transform::Remove { positions } => {
            let len = document.len();
            if let Some(&position) = positions.iter().find(|&&p| p >= len) {
                return Err(ArgumentError::PositionOutOfRange { position, len });
            }
        }
        Transform::SplitAtIndex { position } => {
            restructure::check_split_position(document, *position)?;
        }
        _ => {}
    }

    Ok(())
}

/// Apply one transform to `document`
///
/// Selection-aware transforms only touch the selected cues; the others validate the
/// selection and then ignore it.
pub fn apply(
    document: &mut Document,
    transform: &Transform,
    selection: Option<&Selection>,
) -> Result<TransformOutcome, ArgumentError> {
    validate(document, transform, selection)?;
    let scope = if transform.is_selection_aware() { selection } else { None };

    let outcome = match transform {
        Transform::Shift { delta } => TransformOutcome::touched(timing::shift(document, *delta, scope)?),
        Transform::Scale { factor } => TransformOutcome::touched(timing::scale(document, *factor)?),
        Transform::SnapToInterval { interval_ms } => {
            TransformOutcome::touched(timing::snap_to_interval(document, *interval_ms)?)
        }
        Transform::SmartDuration => TransformOutcome::touched(timing::smart_duration(document)),
        Transform::SyncToFrameRate { fps } => TransformOutcome::touched(timing::sync_to_frame_rate(document, *fps)?),
        Transform::FixOverlaps => TransformOutcome::touched(timing::fix_overlaps(document)),
        Transform::FixGaps { max_gap_seconds } => {
            TransformOutcome::touched(timing::fix_gaps(document, *max_gap_seconds)?)
        }
        Transform::AdjustDisplayTime { min_seconds } => {
            TransformOutcome::touched(timing::adjust_display_time(document, *min_seconds)?)
        }
        Transform::MergeShortLines { min_chars } => {
            TransformOutcome::touched(restructure::merge_short_lines(document, *min_chars)?)
        }
        Transform::SplitLongLines { max_chars } => {
            TransformOutcome::touched(restructure::split_long_lines(document, *max_chars)?)
        }
        Transform::Reindex => TransformOutcome::touched(restructure::reindex(document)),
        Transform::Remove { positions } => TransformOutcome::touched(document.remove(positions)?),
        Transform::MergeDocuments { secondary } => {
            TransformOutcome::touched(restructure::merge_documents(document, secondary))
        }
        Transform::SplitAtIndex { position } => {
            let tail = restructure::split_at_index(document, *position)?;
            TransformOutcome {
                touched: tail.len(),
                detached: Some(tail),
            }
        }
        Transform::ChangeCase(case) => TransformOutcome::touched(text::change_case(document, *case, scope)?),
        Transform::StripFormatting => TransformOutcome::touched(text::strip_formatting(document, scope)?),
        Transform::RemoveHearingImpaired => {
            TransformOutcome::touched(text::remove_hearing_impaired(document, scope)?)
        }
        Transform::FixOcrErrors => TransformOutcome::touched(text::fix_ocr_errors(document, scope)?),
        Transform::ConvertEncoding(encoding) => {
            TransformOutcome::touched(text::convert_encoding(document, *encoding, scope)?)
        }
    };

    debug!("Applied {} to {} cues", transform, outcome.touched);
    Ok(outcome)
}
