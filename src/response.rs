//! Scalar instrument response.
//!
//! A [`SimpleResponse`] converts raw digitizer counts into physical units by
//! dividing by a single sensitivity factor. It is independent of the sample data
//! and is never consulted by the renderer.

use serde::{Deserialize, Serialize};

use crate::{ParameterError, Sample, Segment, SeismicResult};

/// Physical unit on either side of a response stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    /// Raw digitizer counts.
    #[default]
    Counts,
    /// Volts.
    Volts,
    /// Displacement in meters.
    Meters,
    /// Velocity in meters per second.
    MetersPerSecond,
    /// Acceleration in meters per second squared.
    MetersPerSecondSquared,
    /// Anything else.
    Unknown,
}

/// Scalar deconvolution factor with its unit pair and validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleResponse {
    scalar: f64,
    input_units: Units,
    output_units: Units,
    start_time: Option<i64>,
    end_time: Option<i64>,
}

impl SimpleResponse {
    /// Create a response that maps `input_units` to `output_units` through `scalar`.
    ///
    /// `scalar` is the sensitivity: output samples are input samples divided by it.
    ///
    /// # Errors
    /// The scalar must be finite and non-zero.
    pub fn new(scalar: f64, input_units: Units, output_units: Units) -> SeismicResult<Self> {
        if !scalar.is_finite() || scalar == 0.0 {
            return Err(
                ParameterError::invalid_value("scalar", "must be finite and non-zero").into(),
            );
        }
        Ok(Self {
            scalar,
            input_units,
            output_units,
            start_time: None,
            end_time: None,
        })
    }

    /// Restrict the response to `[start, end]`; either side may be open.
    ///
    /// # Errors
    /// Fails if both bounds are given and `start > end`.
    pub fn with_validity(mut self, start: Option<i64>, end: Option<i64>) -> SeismicResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ParameterError::invalid_value(
                    "validity",
                    format!("start {s} is after end {e}"),
                )
                .into());
            }
        }
        self.start_time = start;
        self.end_time = end;
        Ok(self)
    }

    /// Sensitivity factor.
    pub const fn scalar(&self) -> f64 {
        self.scalar
    }

    /// Units of the raw samples.
    pub const fn input_units(&self) -> Units {
        self.input_units
    }

    /// Units after removing the response.
    pub const fn output_units(&self) -> Units {
        self.output_units
    }

    /// Start of the validity window.
    pub const fn start_time(&self) -> Option<i64> {
        self.start_time
    }

    /// End of the validity window.
    pub const fn end_time(&self) -> Option<i64> {
        self.end_time
    }

    /// Whether the response applies at epoch time `time`.
    pub fn is_valid_at(&self, time: i64) -> bool {
        self.start_time.is_none_or(|s| time >= s) && self.end_time.is_none_or(|e| time <= e)
    }

    /// Copy of `segment` in output units.
    ///
    /// # Errors
    /// Fails if the response is not valid at the segment's start time.
    pub fn remove_from<T: Sample>(&self, segment: &Segment<T>) -> SeismicResult<Segment<T>> {
        if !self.is_valid_at(segment.start_time()) {
            return Err(ParameterError::invalid_value(
                "segment",
                "starts outside the response validity window",
            )
            .into());
        }
        let factor = T::from_f64_lossy(self.scalar);
        let mut converted = segment.clone();
        converted.set_data(segment.samples().mapv(|v| v / factor));
        Ok(converted)
    }
}
