//! A contiguous run of regularly sampled values.
//!
//! A [`Segment`] pairs a sample buffer with its sampling rate and the epoch
//! time of its first sample. The end time is derived and kept current on
//! every mutation:
//!
//! ```text
//! end_time = start_time + round((len - 1) * 1e6 / sampling_rate)
//! ```
//!
//! The fallible setters refuse a rate or buffer whose last sample would fall
//! outside the `i64` microsecond range. The infallible ones saturate instead.
//!
//! # Examples
//!
//! ```rust
//! use seismic_samples::Segment;
//!
//! let segment = Segment::from_samples(vec![0.0f32; 10], 40.0, 1_000_000).unwrap();
//! assert_eq!(segment.end_time().unwrap(), 1_225_000);
//! ```

use ndarray::{Array1, ArrayView1, s};

use crate::utils::time::{
    checked_sample_offset_micros, sample_offset_micros, sampling_period_micros,
};
use crate::{ParameterError, Sample, SeismicResult, UnavailableError};

/// A single gap-free run of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<T: Sample> {
    samples: Array1<T>,
    sampling_rate: Option<f64>,
    start_time: i64,
    end_time: i64,
}

impl<T: Sample> Default for Segment<T> {
    fn default() -> Self {
        Self {
            samples: Array1::from(Vec::new()),
            sampling_rate: None,
            start_time: 0,
            end_time: 0,
        }
    }
}

impl<T: Sample> Segment<T> {
    /// Create an empty segment with no sampling rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a segment from samples, a sampling rate in Hz and a start time in epoch microseconds.
    ///
    /// # Errors
    /// Fails if `sampling_rate_hz` is not strictly positive or the last sample
    /// would fall outside the representable time range.
    pub fn from_samples(
        samples: Vec<T>,
        sampling_rate_hz: f64,
        start_time: i64,
    ) -> SeismicResult<Self> {
        let mut segment = Self::new();
        segment.set_start_time(start_time);
        segment.set_data(samples);
        segment.set_sampling_rate(sampling_rate_hz)?;
        Ok(segment)
    }

    /// Replace all samples.
    pub fn set_data(&mut self, samples: impl Into<Array1<T>>) {
        self.samples = samples.into();
        self.update_end_time();
    }

    /// Replace all samples from a borrowed buffer that carries a declared length.
    ///
    /// Readers use this to reject a buffer that is shorter or longer than its
    /// header claims; an empty buffer with a non-zero declared length is the
    /// common case.
    ///
    /// # Errors
    /// Returns [`ParameterError::SampleCountMismatch`] if the lengths disagree,
    /// and rejects a buffer too long for the current rate to fit in time.
    pub fn set_data_from_slice(&mut self, samples: &[T], declared_len: usize) -> SeismicResult<()> {
        if samples.len() != declared_len {
            return Err(ParameterError::SampleCountMismatch {
                declared: declared_len,
                actual: samples.len(),
            }
            .into());
        }
        if let Some(rate) = self.sampling_rate {
            check_span(self.start_time, samples.len(), rate)?;
        }
        self.set_data(samples.to_vec());
        Ok(())
    }

    /// Set the sampling rate in Hz.
    ///
    /// # Errors
    /// Rejects rates that are not finite and strictly positive, and rates so
    /// low that the last sample would fall outside the representable time range.
    pub fn set_sampling_rate(&mut self, rate_hz: f64) -> SeismicResult<()> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(ParameterError::invalid_value(
                "sampling_rate",
                format!("{rate_hz} must be finite and > 0"),
            )
            .into());
        }
        check_span(self.start_time, self.samples.len(), rate_hz)?;
        self.sampling_rate = Some(rate_hz);
        self.update_end_time();
        Ok(())
    }

    /// Set the time of the first sample in epoch microseconds.
    pub fn set_start_time(&mut self, start_time: i64) {
        self.start_time = start_time;
        self.update_end_time();
    }

    /// Whether a sampling rate has been set.
    pub const fn has_sampling_rate(&self) -> bool {
        self.sampling_rate.is_some()
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> SeismicResult<f64> {
        self.sampling_rate
            .ok_or_else(|| UnavailableError::new("sampling rate", "never set").into())
    }

    /// Sampling period in seconds.
    pub fn sampling_period(&self) -> SeismicResult<f64> {
        self.sampling_rate()
            .map(|rate| 1.0 / rate)
            .map_err(|_| UnavailableError::new("sampling period", "sampling rate not set").into())
    }

    /// Sampling period rounded to whole microseconds.
    pub fn sampling_period_micros(&self) -> SeismicResult<i64> {
        let rate = self
            .sampling_rate
            .ok_or(UnavailableError::new("sampling period", "sampling rate not set"))?;
        Ok(sampling_period_micros(rate))
    }

    /// Time of the first sample in epoch microseconds.
    pub const fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Time of the last sample in epoch microseconds.
    ///
    /// # Errors
    /// Fails with an unavailable error if the sampling rate was never set.
    pub fn end_time(&self) -> SeismicResult<i64> {
        if self.sampling_rate.is_none() {
            return Err(UnavailableError::new("end time", "sampling rate not set").into());
        }
        Ok(self.end_time)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the segment holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Borrow the sample buffer.
    pub fn samples(&self) -> ArrayView1<'_, T> {
        self.samples.view()
    }

    /// Borrow the samples in `[start, end)`.
    ///
    /// Bounds are clamped to the buffer.
    pub fn samples_in(&self, start: usize, end: usize) -> ArrayView1<'_, T> {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        self.samples.slice(s![start..end])
    }

    /// Epoch time of the sample at `index`.
    pub fn sample_time(&self, index: usize) -> SeismicResult<i64> {
        let rate = self.sampling_rate()?;
        Ok(self.start_time.saturating_add(sample_offset_micros(index, rate)))
    }

    /// Index of the first sample at or after `time`, or `None` if every sample is earlier.
    pub fn index_at_or_after(&self, time: i64) -> SeismicResult<Option<usize>> {
        let rate = self.sampling_rate()?;
        if self.samples.is_empty() || time > self.end_time {
            return Ok(None);
        }
        if time <= self.start_time {
            return Ok(Some(0));
        }
        let offset = time.saturating_sub(self.start_time) as f64 * rate / 1.0e6;
        let mut index = offset.ceil() as usize;
        // rounding of sample times can put the exact boundary one sample off
        while index > 0 && self.offset_time(index - 1, rate) >= time {
            index -= 1;
        }
        while index < self.samples.len() && self.offset_time(index, rate) < time {
            index += 1;
        }
        Ok(Some(index.min(self.samples.len() - 1)))
    }

    /// Index of the last sample at or before `time`, or `None` if every sample is later.
    pub fn index_at_or_before(&self, time: i64) -> SeismicResult<Option<usize>> {
        let rate = self.sampling_rate()?;
        if self.samples.is_empty() || time < self.start_time {
            return Ok(None);
        }
        if time >= self.end_time {
            return Ok(Some(self.samples.len() - 1));
        }
        let offset = time.saturating_sub(self.start_time) as f64 * rate / 1.0e6;
        let mut index = (offset.floor() as usize).min(self.samples.len() - 1);
        while index + 1 < self.samples.len() && self.offset_time(index + 1, rate) <= time {
            index += 1;
        }
        Ok(Some(index))
    }

    /// Smallest and largest sample value, ignoring NaN.
    pub fn min_max(&self) -> Option<(T, T)> {
        min_max_of(self.samples.view())
    }

    #[inline]
    fn offset_time(&self, index: usize, rate: f64) -> i64 {
        self.start_time.saturating_add(sample_offset_micros(index, rate))
    }

    fn update_end_time(&mut self) {
        self.end_time = match self.sampling_rate {
            Some(rate) => end_time_of(self.start_time, self.samples.len(), rate).unwrap_or(i64::MAX),
            None => self.start_time,
        };
    }
}

/// Time of the last of `len` samples, or `None` if it overflows.
fn end_time_of(start_time: i64, len: usize, rate: f64) -> Option<i64> {
    match len {
        0 => Some(start_time),
        n => checked_sample_offset_micros(n - 1, rate).and_then(|o| start_time.checked_add(o)),
    }
}

fn check_span(start_time: i64, len: usize, rate: f64) -> SeismicResult<()> {
    match end_time_of(start_time, len, rate) {
        Some(_) => Ok(()),
        None => Err(ParameterError::invalid_value(
            "sampling_rate",
            format!(
                "{len} samples at {rate} Hz from {start_time} end past the representable time range"
            ),
        )
        .into()),
    }
}

/// Smallest and largest value of a view, ignoring NaN.
pub(crate) fn min_max_of<T: Sample>(view: ArrayView1<'_, T>) -> Option<(T, T)> {
    view.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_time_follows_rate_and_length() {
        let mut segment = Segment::<f64>::new();
        segment.set_sampling_rate(40.0).unwrap();
        segment.set_start_time(1_000_000);
        segment.set_data(vec![0.0; 10]);
        assert_eq!(segment.end_time().unwrap(), 1_000_000 + 225_000);

        segment.set_sampling_rate(100.0).unwrap();
        assert_eq!(segment.end_time().unwrap(), 1_000_000 + 90_000);

        segment.set_data(vec![1.0; 2]);
        assert_eq!(segment.end_time().unwrap(), 1_010_000);
    }

    #[test]
    fn test_end_time_rounds_total_offset() {
        let segment = Segment::from_samples(vec![0.0f32; 4], 3.0, 0).unwrap();
        // round(3 * 1e6 / 3) rather than 3 * round(1e6 / 3)
        assert_eq!(segment.end_time().unwrap(), 1_000_000);
    }

    #[test]
    fn test_end_time_property_over_rates() {
        for &rate in &[0.5, 1.0, 3.0, 7.3, 20.0, 40.0, 100.0, 200.0, 1000.0] {
            for &n in &[1usize, 2, 17, 1000] {
                let start = 1_234_567;
                let segment = Segment::from_samples(vec![0.0f32; n], rate, start).unwrap();
                let expected = start + ((n - 1) as f64 * 1.0e6 / rate).round() as i64;
                assert_eq!(segment.end_time().unwrap(), expected, "rate {rate} n {n}");
            }
        }
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let mut segment = Segment::<f32>::new();
        assert!(segment.set_sampling_rate(0.0).unwrap_err().is_malformed_input());
        assert!(segment.set_sampling_rate(-10.0).is_err());
        assert!(segment.set_sampling_rate(f64::NAN).is_err());
        assert!(!segment.has_sampling_rate());
    }

    #[test]
    fn test_reads_before_rate_are_unavailable() {
        let segment = Segment::<f32>::new();
        assert!(segment.sampling_period().unwrap_err().is_unavailable());
        assert!(segment.end_time().unwrap_err().is_unavailable());
        assert!(segment.sample_time(0).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_rejects_span_past_time_range() {
        let err = Segment::from_samples(vec![0.0f32; 10], 1.0e-30, 1_580_560_215_250_000)
            .unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("sampling_rate"));

        let mut segment = Segment::from_samples(vec![0.0f32; 2], 1.0, i64::MAX - 2_000_000).unwrap();
        assert!(segment.set_data_from_slice(&[0.0; 4], 4).is_err());
        assert_eq!(segment.len(), 2);
        assert!(segment.set_sampling_rate(1.0e-3).is_err());
        assert_eq!(segment.sampling_rate().unwrap(), 1.0);
    }

    #[test]
    fn test_infallible_setters_saturate() {
        let mut segment = Segment::from_samples(vec![0.0f64; 3], 1.0, 0).unwrap();
        segment.set_start_time(i64::MAX - 1);
        assert_eq!(segment.end_time().unwrap(), i64::MAX);
        assert_eq!(segment.sample_time(2).unwrap(), i64::MAX);
        assert_eq!(segment.index_at_or_before(i64::MAX).unwrap(), Some(2));
        assert_eq!(segment.index_at_or_after(i64::MIN).unwrap(), Some(0));
    }

    #[test]
    fn test_sampling_period() {
        let segment = Segment::from_samples(vec![0.0f32; 3], 40.0, 0).unwrap();
        assert_eq!(segment.sampling_period().unwrap(), 0.025);
        assert_eq!(segment.sampling_period_micros().unwrap(), 25_000);
    }

    #[test]
    fn test_set_data_from_slice_checks_length() {
        let mut segment = Segment::<f32>::new();
        let err = segment.set_data_from_slice(&[], 5).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(segment.is_empty());

        segment.set_data_from_slice(&[1.0, 2.0], 2).unwrap();
        assert_eq!(segment.len(), 2);
    }

    #[test]
    fn test_index_lookup() {
        let segment = Segment::from_samples(vec![0.0f32; 10], 10.0, 0).unwrap();
        assert_eq!(segment.index_at_or_after(0).unwrap(), Some(0));
        assert_eq!(segment.index_at_or_after(100_000).unwrap(), Some(1));
        assert_eq!(segment.index_at_or_after(100_001).unwrap(), Some(2));
        assert_eq!(segment.index_at_or_after(900_001).unwrap(), None);
        assert_eq!(segment.index_at_or_before(-1).unwrap(), None);
        assert_eq!(segment.index_at_or_before(199_999).unwrap(), Some(1));
        assert_eq!(segment.index_at_or_before(200_000).unwrap(), Some(2));
        assert_eq!(segment.index_at_or_before(5_000_000).unwrap(), Some(9));
    }

    #[test]
    fn test_min_max_skips_nan() {
        let segment = Segment::from_samples(vec![1.0f64, f64::NAN, -3.0, 2.5], 1.0, 0).unwrap();
        assert_eq!(segment.min_max(), Some((-3.0, 2.5)));
        assert_eq!(Segment::<f64>::new().min_max(), None);
    }

    #[test]
    fn test_samples_in_clamps() {
        let segment = Segment::from_samples(vec![1.0f32, 2.0, 3.0], 1.0, 0).unwrap();
        assert_eq!(segment.samples_in(1, 10).to_vec(), vec![2.0, 3.0]);
        assert!(segment.samples_in(5, 2).is_empty());
    }
}
