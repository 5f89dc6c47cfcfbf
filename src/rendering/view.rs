//! Zoom and pan state for one plot.
//!
//! [`ViewState`] is a plain value: every operation returns a new state and the
//! caller decides where to keep it.

use crate::rendering::decimate::RenderRequest;
use crate::utils::time::MICROS_PER_SECOND;
use crate::{ParameterError, Sample, SeismicResult, Waveform};

/// Narrowest window a zoom may produce, in microseconds.
pub const MIN_VIEW_SPAN: i64 = 1_000;

/// Visible time range of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewState {
    start: i64,
    end: i64,
}

impl ViewState {
    /// View of `[start, end]`.
    ///
    /// # Errors
    /// `end` must be after `start`.
    pub fn new(start: i64, end: i64) -> SeismicResult<Self> {
        if end <= start {
            return Err(ParameterError::invalid_value(
                "view",
                format!("end {end} is not after start {start}"),
            )
            .into());
        }
        Ok(Self { start, end })
    }

    /// View spanning the whole waveform. A waveform of a single instant gets
    /// one second either side.
    ///
    /// # Errors
    /// Unavailable if the waveform has no segments.
    pub fn fit<T: Sample>(waveform: &Waveform<T>) -> SeismicResult<Self> {
        let start = waveform.earliest_time()?;
        let end = waveform.latest_time()?;
        if end > start {
            Ok(Self { start, end })
        } else {
            Ok(Self {
                start: start - MICROS_PER_SECOND,
                end: end + MICROS_PER_SECOND,
            })
        }
    }

    /// Start in epoch microseconds.
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// End in epoch microseconds.
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Span in microseconds.
    pub const fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Zoom by `factor` (above 1 zooms in) keeping `anchor` at the same relative position.
    ///
    /// # Errors
    /// `factor` must be finite and positive.
    pub fn zoom(self, factor: f64, anchor: i64) -> SeismicResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ParameterError::invalid_value(
                "zoom factor",
                format!("{factor} must be finite and positive"),
            )
            .into());
        }
        let anchor = anchor.clamp(self.start, self.end);
        let before = ((anchor - self.start) as f64 / factor).round() as i64;
        let after = ((self.end - anchor) as f64 / factor).round() as i64;
        let mut start = anchor - before;
        let mut end = anchor + after;
        if end - start < MIN_VIEW_SPAN {
            let missing = MIN_VIEW_SPAN - (end - start);
            start -= missing / 2;
            end = start + MIN_VIEW_SPAN;
        }
        Ok(Self { start, end })
    }

    /// Shift by `delta` microseconds.
    pub const fn pan(self, delta: i64) -> Self {
        Self {
            start: self.start.saturating_add(delta),
            end: self.end.saturating_add(delta),
        }
    }

    /// Shift by `dx` pixels of a plot `width` pixels wide; positive moves later.
    pub fn pan_pixels(self, dx: f64, width: u32) -> Self {
        if width == 0 {
            return self;
        }
        let delta = (dx / f64::from(width) * self.duration() as f64).round() as i64;
        self.pan(delta)
    }

    /// Epoch time under pixel column `x` of a plot `width` pixels wide.
    pub fn time_at_pixel(&self, x: f64, width: u32) -> i64 {
        if width == 0 {
            return self.start;
        }
        self.start + (x / f64::from(width) * self.duration() as f64).round() as i64
    }

    /// Render request for this view.
    ///
    /// # Errors
    /// See [`RenderRequest::new`].
    pub fn request(&self, width: u32, height: u32) -> SeismicResult<RenderRequest> {
        RenderRequest::new(self.start, self.end, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    #[test]
    fn test_new_rejects_empty_span() {
        assert!(ViewState::new(10, 10).is_err());
        assert!(ViewState::new(10, 5).is_err());
        assert_eq!(ViewState::new(0, 10).unwrap().duration(), 10);
    }

    #[test]
    fn test_zoom_about_anchor() {
        let view = ViewState::new(0, 1_000_000).unwrap();
        let zoomed = view.zoom(2.0, 250_000).unwrap();
        assert_eq!(zoomed.start(), 125_000);
        assert_eq!(zoomed.end(), 625_000);

        let out = zoomed.zoom(0.5, 250_000).unwrap();
        assert_eq!(out, view);

        assert!(view.zoom(0.0, 0).is_err());
        assert!(view.zoom(f64::NAN, 0).is_err());
    }

    #[test]
    fn test_zoom_has_floor() {
        let view = ViewState::new(0, 10_000).unwrap();
        let zoomed = view.zoom(1_000.0, 5_000).unwrap();
        assert_eq!(zoomed.duration(), MIN_VIEW_SPAN);
    }

    #[test]
    fn test_pan() {
        let view = ViewState::new(0, 1_000).unwrap();
        assert_eq!(view.pan(-500), ViewState::new(-500, 500).unwrap());
        assert_eq!(view.pan_pixels(50.0, 100), ViewState::new(500, 1_500).unwrap());
        assert_eq!(view.time_at_pixel(25.0, 100), 250);
    }

    #[test]
    fn test_fit_waveform() {
        let mut waveform = Waveform::<f32>::new();
        assert!(ViewState::fit(&waveform).unwrap_err().is_unavailable());

        waveform
            .set_segments(Segment::from_samples(vec![0.0; 11], 10.0, 5_000_000).unwrap())
            .unwrap();
        let view = ViewState::fit(&waveform).unwrap();
        assert_eq!((view.start(), view.end()), (5_000_000, 6_000_000));

        waveform
            .set_segments(Segment::from_samples(vec![0.0], 10.0, 0).unwrap())
            .unwrap();
        let view = ViewState::fit(&waveform).unwrap();
        assert_eq!(view.duration(), 2 * MICROS_PER_SECOND);

        let request = view.request(640, 100).unwrap();
        assert_eq!(request.start(), view.start());
        assert_eq!(request.width(), 640);
    }
}
