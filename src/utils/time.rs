//! Microsecond epoch arithmetic.
//!
//! All times in this crate are signed microseconds since the Unix epoch (UTC).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParameterError, SeismicResult};

/// Microseconds in one second.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Microseconds in one minute.
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;

/// Microseconds in one hour.
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// Microseconds in one day.
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// Sampling period rounded to whole microseconds.
///
/// `rate_hz` must be positive.
#[inline]
pub fn sampling_period_micros(rate_hz: f64) -> i64 {
    (1.0e6 / rate_hz).round() as i64
}

/// Time offset of sample `index` from the first sample, rounded to whole microseconds.
///
/// Computed from the exact period so that long series do not accumulate the
/// rounding error of [`sampling_period_micros`].
#[inline]
pub fn sample_offset_micros(index: usize, rate_hz: f64) -> i64 {
    (index as f64 * 1.0e6 / rate_hz).round() as i64
}

/// [`sample_offset_micros`] that returns `None` when the offset does not fit in an `i64`.
#[inline]
pub fn checked_sample_offset_micros(index: usize, rate_hz: f64) -> Option<i64> {
    fit_micros((index as f64 * 1.0e6 / rate_hz).round())
}

/// Convert fractional seconds to whole microseconds.
#[inline]
pub fn seconds_to_micros(seconds: f64) -> i64 {
    (seconds * 1.0e6).round() as i64
}

/// [`seconds_to_micros`] that returns `None` when the result does not fit in an `i64`.
#[inline]
pub fn checked_seconds_to_micros(seconds: f64) -> Option<i64> {
    fit_micros((seconds * 1.0e6).round())
}

#[inline]
fn fit_micros(micros: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    (micros.is_finite() && micros >= i64::MIN as f64 && micros < i64::MAX as f64)
        .then_some(micros as i64)
}

/// Convert microseconds to fractional seconds.
#[inline]
pub fn micros_to_seconds(micros: i64) -> f64 {
    micros as f64 / 1.0e6
}

/// Epoch microseconds for a calendar time given as year, day of year and time of day.
///
/// Returns `None` when the parts do not form a valid date or time.
pub fn epoch_micros_from_ordinal(
    year: i32,
    day_of_year: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millisecond: u32,
) -> Option<i64> {
    let date = NaiveDate::from_yo_opt(year, day_of_year)?;
    let time = date.and_hms_milli_opt(hour, minute, second, millisecond)?;
    Some(time.and_utc().timestamp_micros())
}

/// Split epoch microseconds back into `(year, day_of_year, hour, minute, second, millisecond)`
/// plus the leftover sub-millisecond microseconds.
pub fn ordinal_from_epoch_micros(micros: i64) -> Option<((i32, u32, u32, u32, u32, u32), i64)> {
    use chrono::{Datelike, Timelike};

    let time = DateTime::<Utc>::from_timestamp_micros(micros)?;
    let sub_milli = micros.rem_euclid(1_000);
    Some((
        (
            time.year(),
            time.ordinal(),
            time.hour(),
            time.minute(),
            time.second(),
            time.timestamp_subsec_millis(),
        ),
        sub_milli,
    ))
}

/// Format epoch microseconds with a `chrono` format string.
///
/// Falls back to the raw number when the value is outside chrono's range.
pub fn format_micros(micros: i64, format: &str) -> String {
    match DateTime::<Utc>::from_timestamp_micros(micros) {
        Some(time) => time.format(format).to_string(),
        None => micros.to_string(),
    }
}

/// Closed interval `[start, end]` of epoch microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Create a window.
    ///
    /// # Errors
    /// Fails if `start > end`.
    pub fn new(start: i64, end: i64) -> SeismicResult<Self> {
        if start > end {
            return Err(ParameterError::invalid_value(
                "time window",
                format!("start {start} is after end {end}"),
            )
            .into());
        }
        Ok(Self { start, end })
    }

    /// First instant in the window.
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Last instant in the window.
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Length in microseconds.
    pub const fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether `time` falls inside the window.
    pub const fn contains(&self, time: i64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Whether `[start, end]` shares at least one instant with the window.
    pub const fn overlaps(&self, start: i64, end: i64) -> bool {
        start <= self.end && end >= self.start
    }
}
