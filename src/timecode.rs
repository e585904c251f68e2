/*!
 * Millisecond time values used by every codec and transform.
 *
 * A `TimeValue` is a signed count of milliseconds. Arithmetic saturates instead of
 * wrapping, and negative values are allowed so that shifted cues can sit before zero.
 */

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ArgumentError, FormatError};

// @const: h:m:s followed by a comma or dot fraction
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d+):(\d+)[,.](\d+)$").unwrap()
});

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Signed duration with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeValue(i64);

impl TimeValue {
    pub const ZERO: TimeValue = TimeValue(0);

    pub const fn from_millis(ms: i64) -> Self {
        TimeValue(ms)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Convert fractional seconds, rounding to the nearest millisecond
    pub fn from_seconds(seconds: f64) -> Self {
        // `as` saturates for out-of-range floats and maps NaN to zero
        TimeValue((seconds * 1000.0).round() as i64)
    }

    pub fn to_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parse `hh:mm:ss,fff` or `hh:mm:ss.fff`
    ///
    /// The fraction is read as a decimal fraction of a second, so `.5`, `.50` and
    /// `.500` all mean 500ms. More than three fraction digits is rejected.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let trimmed = text.trim();
        let invalid = || FormatError::InvalidTimestamp(trimmed.to_string());

        let caps = TIMESTAMP_REGEX.captures(trimmed).ok_or_else(invalid)?;

        let hours: i64 = caps[1].parse().map_err(|_| invalid())?;
        let minutes: i64 = caps[2].parse().map_err(|_| invalid())?;
        let seconds: i64 = caps[3].parse().map_err(|_| invalid())?;
        let fraction = &caps[4];

        if minutes >= 60 || seconds >= 60 || fraction.len() > 3 {
            return Err(invalid());
        }

        let digits: i64 = fraction.parse().map_err(|_| invalid())?;
        let millis = digits * 10_i64.pow(3 - fraction.len() as u32);

        hours
            .checked_mul(MS_PER_HOUR)
            .and_then(|ms| ms.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis))
            .map(TimeValue)
            .ok_or_else(invalid)
    }

    /// Format as `hh:mm:ss{sep}fff`
    pub fn format(self, separator: char) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let ms = self.0.unsigned_abs();
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{}{:02}:{:02}:{:02}{}{:03}", sign, hours, minutes, seconds, separator, millis)
    }

    /// SRT form, `hh:mm:ss,fff`
    pub fn format_srt(self) -> String {
        self.format(',')
    }

    /// WebVTT / SubViewer form, `hh:mm:ss.fff`
    pub fn format_dot(self) -> String {
        self.format('.')
    }

    pub fn checked_add(self, other: TimeValue) -> Option<TimeValue> {
        self.0.checked_add(other.0).map(TimeValue)
    }

    pub fn checked_sub(self, other: TimeValue) -> Option<TimeValue> {
        self.0.checked_sub(other.0).map(TimeValue)
    }

    /// Multiply by a positive factor, rounding to the nearest millisecond
    pub fn scale(self, factor: f64) -> Result<TimeValue, ArgumentError> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(ArgumentError::NonPositiveFactor(factor));
        }
        Ok(TimeValue((self.0 as f64 * factor).round() as i64))
    }

    /// Floor to the nearest lower multiple of `interval_ms`
    pub fn floor_to(self, interval_ms: i64) -> Result<TimeValue, ArgumentError> {
        if interval_ms <= 0 {
            return Err(ArgumentError::NonPositiveInterval(interval_ms));
        }
        Ok(TimeValue(self.0.div_euclid(interval_ms) * interval_ms))
    }

    /// Nearest frame number at the given frame rate
    pub fn to_frames(self, fps: f64) -> i64 {
        (self.to_seconds() * fps).round() as i64
    }

    /// Start time of a frame at the given frame rate
    pub fn from_frames(frames: i64, fps: f64) -> TimeValue {
        TimeValue::from_seconds(frames as f64 / fps)
    }

    /// Round to the nearest frame boundary
    pub fn snap_to_frame(self, fps: f64) -> Result<TimeValue, ArgumentError> {
        if !(fps > 0.0) || !fps.is_finite() {
            return Err(ArgumentError::NonPositiveFrameRate(fps));
        }
        Ok(TimeValue::from_frames(self.to_frames(fps), fps))
    }
}

impl Add for TimeValue {
    type Output = TimeValue;

    fn add(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeValue {
    type Output = TimeValue;

    fn sub(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for TimeValue {
    fn add_assign(&mut self, rhs: TimeValue) {
        *self = *self + rhs;
    }
}

impl SubAssign for TimeValue {
    fn sub_assign(&mut self, rhs: TimeValue) {
        *self = *self - rhs;
    }
}

impl Neg for TimeValue {
    type Output = TimeValue;

    fn neg(self) -> TimeValue {
        TimeValue(self.0.saturating_neg())
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_srt())
    }
}

impl FromStr for TimeValue {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeValue::parse(s)
    }
}
