//! Time axis tick placement and labelling.

use crate::utils::time::{
    MICROS_PER_DAY, MICROS_PER_HOUR, MICROS_PER_MINUTE, MICROS_PER_SECOND, format_micros,
};
use crate::{ParameterError, SeismicResult};

/// Roughly one labelled tick per this many pixels.
pub const PIXELS_PER_MAJOR_TICK: u32 = 100;

/// Minor ticks between two majors, counting the major itself.
pub const MINOR_PER_MAJOR: i64 = 5;

const MILLI: i64 = 1_000;

/// Candidate major spacings, smallest first.
const NICE_INTERVALS: [i64; 28] = [
    MILLI,
    2 * MILLI,
    5 * MILLI,
    10 * MILLI,
    20 * MILLI,
    50 * MILLI,
    100 * MILLI,
    200 * MILLI,
    500 * MILLI,
    MICROS_PER_SECOND,
    2 * MICROS_PER_SECOND,
    5 * MICROS_PER_SECOND,
    10 * MICROS_PER_SECOND,
    15 * MICROS_PER_SECOND,
    30 * MICROS_PER_SECOND,
    MICROS_PER_MINUTE,
    2 * MICROS_PER_MINUTE,
    5 * MICROS_PER_MINUTE,
    10 * MICROS_PER_MINUTE,
    15 * MICROS_PER_MINUTE,
    30 * MICROS_PER_MINUTE,
    MICROS_PER_HOUR,
    2 * MICROS_PER_HOUR,
    3 * MICROS_PER_HOUR,
    6 * MICROS_PER_HOUR,
    12 * MICROS_PER_HOUR,
    MICROS_PER_DAY,
    2 * MICROS_PER_DAY,
];

/// One tick mark.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Epoch microseconds.
    pub time: i64,
    /// Pixel x.
    pub x: f64,
    /// Label; only major ticks carry one.
    pub label: Option<String>,
}

/// Ticks for one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    /// Labelled ticks.
    pub major: Vec<Tick>,
    /// Unlabelled ticks between majors.
    pub minor: Vec<Tick>,
    /// Spacing of major ticks in microseconds.
    pub interval: i64,
    /// Date of the first visible instant, for an axis title.
    pub reference_label: String,
}

impl TimeAxis {
    /// Place ticks on `[start, end]` drawn `width` pixels wide.
    ///
    /// Majors are aligned to whole multiples of the interval since the epoch.
    /// The label format follows the interval: milliseconds below one second,
    /// seconds below one minute, minutes below one day, dates above.
    ///
    /// # Errors
    /// `end` must be after `start` and `width` must be non-zero.
    pub fn ticks(start: i64, end: i64, width: u32) -> SeismicResult<Self> {
        if end <= start || width == 0 {
            return Err(ParameterError::invalid_value(
                "time axis",
                format!("[{start}, {end}] over {width} px"),
            )
            .into());
        }
        let duration = end - start;
        let target = i64::from((width / PIXELS_PER_MAJOR_TICK).max(2));
        let interval = major_interval(duration, target);
        let format = label_format(interval);
        let x_of = |time: i64| (time - start) as f64 / duration as f64 * f64::from(width);

        let major = aligned(start, end, interval)
            .map(|time| Tick {
                time,
                x: x_of(time),
                label: Some(format_micros(time, format)),
            })
            .collect();

        let minor_interval = interval / MINOR_PER_MAJOR;
        let minor = if minor_interval > 0 {
            aligned(start, end, minor_interval)
                .filter(|time| time.rem_euclid(interval) != 0)
                .map(|time| Tick {
                    time,
                    x: x_of(time),
                    label: None,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            major,
            minor,
            interval,
            reference_label: format_micros(start, "%Y-%m-%d"),
        })
    }
}

/// Smallest nice spacing giving at most `target` intervals over `duration`.
fn major_interval(duration: i64, target: i64) -> i64 {
    let raw = (duration + target - 1) / target;
    NICE_INTERVALS
        .iter()
        .copied()
        .find(|&interval| interval >= raw)
        .unwrap_or_else(|| (raw + MICROS_PER_DAY - 1) / MICROS_PER_DAY * MICROS_PER_DAY)
}

fn label_format(interval: i64) -> &'static str {
    if interval < MICROS_PER_SECOND {
        "%H:%M:%S%.3f"
    } else if interval < MICROS_PER_MINUTE {
        "%H:%M:%S"
    } else if interval < MICROS_PER_DAY {
        "%H:%M"
    } else {
        "%Y-%m-%d"
    }
}

/// Multiples of `step` inside `[start, end]`.
fn aligned(start: i64, end: i64, step: i64) -> impl Iterator<Item = i64> {
    let first = start.div_euclid(step) * step;
    let first = if first < start { first + step } else { first };
    (0..)
        .map(move |k| first + k * step)
        .take_while(move |&time| time <= end)
}
