/*!
 * Timing checks for subtitle cues.
 *
 * This module reports, without changing anything, cues whose timing is:
 * - Inverted or empty (end not after start)
 * - Too short or too long to read comfortably
 * - Faster to read than the configured characters-per-second limit
 * - Overlapping the previous cue, or separated from it by a large gap
 *
 * Each issue names the transform that repairs it.
 */

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::subtitle_processor::{Cue, Document};
use crate::timecode::TimeValue;

/// Maximum characters per second for readable subtitles
const DEFAULT_MAX_CPS: f64 = 25.0;

/// Minimum duration for a cue in milliseconds
const MIN_CUE_DURATION_MS: i64 = 500;

/// Maximum duration for a single cue in milliseconds (30 seconds)
const MAX_CUE_DURATION_MS: i64 = 30_000;

/// Types of timing issues
#[derive(Debug, Clone, PartialEq)]
pub enum TimecodeIssue {
    /// End time is not after start time
    InvalidTimeRange { start: TimeValue, end: TimeValue },
    /// Duration is too short
    DurationTooShort { duration: TimeValue, min: TimeValue },
    /// Duration is too long
    DurationTooLong { duration: TimeValue, max: TimeValue },
    /// Reading speed exceeds limit
    ReadingSpeedTooHigh { cps: f64, max_cps: f64 },
    /// Starts before the previous cue ends
    OverlapsPrevious { previous_index: usize, overlap: TimeValue },
    /// Gap after the previous cue is larger than the warning threshold
    LargeGap { previous_index: usize, gap: TimeValue },
}

impl TimecodeIssue {
    /// Transform that repairs this kind of issue, if there is one
    pub fn suggested_transform(&self) -> Option<&'static str> {
        match self {
            TimecodeIssue::InvalidTimeRange { .. } => None,
            TimecodeIssue::DurationTooShort { .. } => Some("min-display"),
            TimecodeIssue::DurationTooLong { .. } | TimecodeIssue::ReadingSpeedTooHigh { .. } => {
                Some("smart-duration")
            }
            TimecodeIssue::OverlapsPrevious { .. } => Some("fix-overlaps"),
            TimecodeIssue::LargeGap { .. } => Some("fix-gaps"),
        }
    }

    /// Large gaps are informational and do not fail a cue
    pub fn is_warning(&self) -> bool {
        matches!(self, TimecodeIssue::LargeGap { .. })
    }
}

impl fmt::Display for TimecodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimecodeIssue::InvalidTimeRange { start, end } => {
                write!(f, "Invalid time range: start {} >= end {}", start, end)
            }
            TimecodeIssue::DurationTooShort { duration, min } => {
                write!(f, "Duration too short: {}ms (min: {}ms)", duration.as_millis(), min.as_millis())
            }
            TimecodeIssue::DurationTooLong { duration, max } => {
                write!(f, "Duration too long: {}ms (max: {}ms)", duration.as_millis(), max.as_millis())
            }
            TimecodeIssue::ReadingSpeedTooHigh { cps, max_cps } => {
                write!(f, "Reading speed too high: {:.1} CPS (max: {:.1})", cps, max_cps)
            }
            TimecodeIssue::OverlapsPrevious { previous_index, overlap } => {
                write!(f, "Overlaps cue {} by {}ms", previous_index, overlap.as_millis())
            }
            TimecodeIssue::LargeGap { previous_index, gap } => {
                write!(f, "Large gap of {}ms after cue {}", gap.as_millis(), previous_index)
            }
        }
    }
}

/// Issues found for one cue
#[derive(Debug, Clone)]
pub struct CueReport {
    /// Zero-based position in the document
    pub position: usize,
    /// Index of the cue
    pub index: usize,
    pub issues: Vec<TimecodeIssue>,
}

impl CueReport {
    pub fn passed(&self) -> bool {
        self.issues.iter().all(TimecodeIssue::is_warning)
    }
}

/// Result of checking a whole document
#[derive(Debug, Clone, Default)]
pub struct TimecodeReport {
    /// Cues with at least one issue, in document order
    pub cues: Vec<CueReport>,
    /// Number of adjacent overlapping pairs
    pub overlap_count: usize,
}

impl TimecodeReport {
    /// True when no cue has a failing issue
    pub fn passed(&self) -> bool {
        self.cues.iter().all(CueReport::passed)
    }

    pub fn total_issues(&self) -> usize {
        self.cues.iter().map(|c| c.issues.len()).sum()
    }

    /// Distinct repair transforms for the issues found, in first-seen order
    pub fn suggested_transforms(&self) -> Vec<&'static str> {
        let mut suggestions = Vec::new();
        for issue in self.cues.iter().flat_map(|c| &c.issues) {
            if let Some(name) = issue.suggested_transform() {
                if !suggestions.contains(&name) {
                    suggestions.push(name);
                }
            }
        }
        suggestions
    }
}

/// Limits used by [`TimecodeValidator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimecodeValidatorConfig {
    /// Maximum characters per second
    #[serde(default = "default_max_cps")]
    pub max_cps: f64,

    /// Minimum cue duration in ms
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: i64,

    /// Maximum cue duration in ms
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: i64,

    /// Whether to check for overlaps
    #[serde(default = "default_check_overlaps")]
    pub check_overlaps: bool,

    /// Gap in ms above which a warning is reported (0 = disabled)
    #[serde(default)]
    pub max_gap_warning_ms: i64,
}

fn default_max_cps() -> f64 {
    DEFAULT_MAX_CPS
}

fn default_min_duration_ms() -> i64 {
    MIN_CUE_DURATION_MS
}

fn default_max_duration_ms() -> i64 {
    MAX_CUE_DURATION_MS
}

fn default_check_overlaps() -> bool {
    true
}

impl Default for TimecodeValidatorConfig {
    fn default() -> Self {
        Self {
            max_cps: DEFAULT_MAX_CPS,
            min_duration_ms: MIN_CUE_DURATION_MS,
            max_duration_ms: MAX_CUE_DURATION_MS,
            check_overlaps: true,
            max_gap_warning_ms: 0,
        }
    }
}

/// Timing checker for documents
#[derive(Debug, Clone, Default)]
pub struct TimecodeValidator {
    config: TimecodeValidatorConfig,
}

impl TimecodeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TimecodeValidatorConfig) -> Self {
        Self { config }
    }

    /// Reading speed in visible characters per second
    pub fn calculate_cps(cue: &Cue) -> f64 {
        if cue.end <= cue.start {
            return f64::INFINITY;
        }
        cue.visible_char_count() as f64 / cue.duration().to_seconds()
    }

    /// Issues a cue has on its own
    pub fn check_cue(&self, cue: &Cue) -> Vec<TimecodeIssue> {
        if cue.end <= cue.start {
            // Nothing else is meaningful for an empty or inverted range
            return vec![TimecodeIssue::InvalidTimeRange { start: cue.start, end: cue.end }];
        }

        let mut issues = Vec::new();
        let duration = cue.duration();
        let min = TimeValue::from_millis(self.config.min_duration_ms);
        let max = TimeValue::from_millis(self.config.max_duration_ms);

        if duration < min {
            issues.push(TimecodeIssue::DurationTooShort { duration, min });
        }
        if duration > max {
            issues.push(TimecodeIssue::DurationTooLong { duration, max });
        }

        let cps = Self::calculate_cps(cue);
        if cps > self.config.max_cps {
            issues.push(TimecodeIssue::ReadingSpeedTooHigh {
                cps,
                max_cps: self.config.max_cps,
            });
        }

        issues
    }

    /// Check every cue and every adjacent pair
    pub fn validate(&self, document: &Document) -> TimecodeReport {
        let mut report = TimecodeReport::default();

        for (position, cue) in document.iter().enumerate() {
            let mut issues = self.check_cue(cue);

            if let Some(previous) = position.checked_sub(1).and_then(|p| document.get(p)) {
                if self.config.check_overlaps && previous.end > cue.start {
                    report.overlap_count += 1;
                    issues.push(TimecodeIssue::OverlapsPrevious {
                        previous_index: previous.index,
                        overlap: previous.end - cue.start,
                    });
                }

                let gap = cue.start - previous.end;
                if self.config.max_gap_warning_ms > 0 && gap.as_millis() > self.config.max_gap_warning_ms {
                    issues.push(TimecodeIssue::LargeGap {
                        previous_index: previous.index,
                        gap,
                    });
                }
            }

            if !issues.is_empty() {
                report.cues.push(CueReport {
                    position,
                    index: cue.index,
                    issues,
                });
            }
        }

        debug!(
            "Timecode validation: {} cues, {} issues, {} overlaps",
            document.len(),
            report.total_issues(),
            report.overlap_count
        );

        report
    }
}
