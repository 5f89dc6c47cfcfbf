//! Extremum-preserving decimation of segments into pixel-space lines.
//!
//! When far more samples are visible than there are pixel columns, the
//! visible range is split into one bucket per pixel column it covers. Each
//! column emits one vertical line from the smaller to the larger of its own
//! bucket's extrema and the next bucket's extrema, so a spike on a bucket
//! boundary is never lost. With few samples per column consecutive samples are
//! joined directly.

use ndarray::ArrayView1;

use crate::segment::min_max_of;
use crate::utils::time::sample_offset_micros;
use crate::{Channel, ParameterError, Sample, Segment, SeismicResult};

/// Samples per pixel column above which the bucketed path is taken.
pub const DECIMATION_THRESHOLD: f64 = 5.0;

/// Default share of the height used by the trace.
pub const DEFAULT_HEIGHT_FRACTION: f64 = 0.9;

/// A line from `(x1, y1)` to `(x2, y2)` in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start x.
    pub x1: f64,
    /// Start y.
    pub y1: f64,
    /// End x.
    pub x2: f64,
    /// End y.
    pub y2: f64,
}

impl LineSegment {
    /// Create a line.
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Smaller and larger y endpoint.
    pub fn y_extent(&self) -> (f64, f64) {
        (self.y1.min(self.y2), self.y1.max(self.y2))
    }
}

/// What to draw and into how many pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    start: i64,
    end: i64,
    width: u32,
    height: u32,
    height_fraction: f64,
    amplitude: Option<(f64, f64)>,
}

impl RenderRequest {
    /// Plot `[start, end]` epoch microseconds into `width` by `height` pixels.
    ///
    /// # Errors
    /// Width and height must be non-zero and `end` must be after `start`.
    pub fn new(start: i64, end: i64, width: u32, height: u32) -> SeismicResult<Self> {
        if width == 0 || height == 0 {
            return Err(ParameterError::invalid_value(
                "plot size",
                format!("{width}x{height} has no pixels"),
            )
            .into());
        }
        if end <= start {
            return Err(ParameterError::invalid_value(
                "plot window",
                format!("end {end} is not after start {start}"),
            )
            .into());
        }
        Ok(Self {
            start,
            end,
            width,
            height,
            height_fraction: DEFAULT_HEIGHT_FRACTION,
            amplitude: None,
        })
    }

    /// Share of the height the trace may occupy; the rest is split evenly as padding.
    ///
    /// # Errors
    /// `fraction` must lie in `(0, 1]`.
    pub fn with_height_fraction(mut self, fraction: f64) -> SeismicResult<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ParameterError::invalid_value(
                "height_fraction",
                format!("{fraction} not in (0, 1]"),
            )
            .into());
        }
        self.height_fraction = fraction;
        Ok(self)
    }

    /// Use a fixed amplitude range instead of the visible extrema.
    ///
    /// # Errors
    /// Both bounds must be finite and `min <= max`.
    pub fn with_amplitude_range(mut self, min: f64, max: f64) -> SeismicResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ParameterError::invalid_value(
                "amplitude range",
                format!("[{min}, {max}] is not a finite ordered range"),
            )
            .into());
        }
        self.amplitude = Some((min, max));
        Ok(self)
    }

    /// Plot start in epoch microseconds.
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Plot end in epoch microseconds.
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Share of the height used by the trace.
    pub const fn height_fraction(&self) -> f64 {
        self.height_fraction
    }

    /// Fixed amplitude range, if any.
    pub const fn amplitude_range(&self) -> Option<(f64, f64)> {
        self.amplitude
    }

    /// Pixel x of epoch time `time`.
    #[inline]
    pub fn x_of(&self, time: i64) -> f64 {
        (time - self.start) as f64 / (self.end - self.start) as f64 * f64::from(self.width)
    }

    /// Padding above and below the trace in pixels.
    #[inline]
    pub fn padding(&self) -> f64 {
        f64::from(self.height) * (1.0 - self.height_fraction) / 2.0
    }
}

/// Affine amplitude to pixel-y mapping with the axis inverted.
#[derive(Debug, Clone, Copy)]
struct YMap {
    min: f64,
    scale: f64,
    bottom: f64,
    middle: f64,
}

impl YMap {
    fn new(request: &RenderRequest, min: f64, max: f64) -> Self {
        let height = f64::from(request.height);
        let pad = request.padding();
        let range = max - min;
        Self {
            min,
            scale: if range > 0.0 { (height - 2.0 * pad) / range } else { 0.0 },
            bottom: height - pad,
            middle: height / 2.0,
        }
    }

    #[inline]
    fn y(&self, value: f64) -> f64 {
        if self.scale == 0.0 {
            self.middle
        } else {
            self.bottom - (value - self.min) * self.scale
        }
    }
}

/// Inclusive index range of `segment` inside the request window.
pub fn visible_range<T: Sample>(segment: &Segment<T>, request: &RenderRequest) -> Option<(usize, usize)> {
    if segment.is_empty() {
        return None;
    }
    let end = segment.end_time().ok()?;
    if end < request.start || segment.start_time() > request.end {
        return None;
    }
    let first = segment.index_at_or_after(request.start).ok()??;
    let last = segment.index_at_or_before(request.end).ok()??;
    (first <= last).then_some((first, last))
}

/// Smallest and largest visible value, ignoring NaN.
pub fn visible_extrema<T: Sample>(segment: &Segment<T>, request: &RenderRequest) -> Option<(f64, f64)> {
    let (first, last) = visible_range(segment, request)?;
    min_max_of(segment.samples_in(first, last + 1))
        .map(|(lo, hi)| (lo.to_f64_lossless(), hi.to_f64_lossless()))
}

/// Render the visible part of one segment.
///
/// Returns no lines when the segment has no sampling rate, no samples, or does
/// not overlap the window. When more than [`DECIMATION_THRESHOLD`] samples fall
/// on each column the segment covers, one line per covered column is produced,
/// never more than `width`.
pub fn render_segment<T: Sample>(segment: &Segment<T>, request: &RenderRequest) -> Vec<LineSegment> {
    let Ok(rate) = segment.sampling_rate() else {
        return Vec::new();
    };
    let Some((first, last)) = visible_range(segment, request) else {
        return Vec::new();
    };
    let visible = segment.samples_in(first, last + 1);
    let Some((min, max)) = request
        .amplitude
        .or_else(|| min_max_of(visible).map(|(lo, hi)| (lo.to_f64_lossless(), hi.to_f64_lossless())))
    else {
        return Vec::new();
    };

    let ymap = YMap::new(request, min, max);
    let x_at = |index: usize| {
        request.x_of(
            segment
                .start_time()
                .saturating_add(sample_offset_micros(first + index, rate)),
        )
    };

    let columns = covered_columns(x_at(0), x_at(visible.len() - 1), request.width);
    let step = visible.len() as f64 / columns as f64;
    if step > DECIMATION_THRESHOLD {
        decimated(visible, columns, &ymap, x_at)
    } else {
        joined(visible, &ymap, x_at)
    }
}

/// Pixel columns touched by `[x_first, x_last]`, clamped to the plot and at least one.
fn covered_columns(x_first: f64, x_last: f64, width: u32) -> usize {
    let width = f64::from(width);
    let lo = x_first.floor().clamp(0.0, width);
    let hi = x_last.ceil().clamp(0.0, width);
    ((hi - lo) as usize).max(1)
}

fn decimated<T: Sample>(
    visible: ArrayView1<'_, T>,
    columns: usize,
    ymap: &YMap,
    x_at: impl Fn(usize) -> f64,
) -> Vec<LineSegment> {
    let count = visible.len();
    let bounds = |column: usize| column * count / columns;
    let buckets: Vec<Option<(f64, f64)>> = (0..columns)
        .map(|column| {
            let view = visible.slice(ndarray::s![bounds(column)..bounds(column + 1)]);
            min_max_of(view).map(|(lo, hi)| (lo.to_f64_lossless(), hi.to_f64_lossless()))
        })
        .collect();

    let mut lines = Vec::with_capacity(columns);
    for (column, bucket) in buckets.iter().enumerate() {
        let Some((mut lo, mut hi)) = *bucket else {
            continue;
        };
        if let Some(Some((next_lo, next_hi))) = buckets.get(column + 1) {
            lo = lo.min(*next_lo);
            hi = hi.max(*next_hi);
        }
        let x = x_at(bounds(column));
        lines.push(LineSegment::new(x, ymap.y(hi), x, ymap.y(lo)));
    }
    lines
}

fn joined<T: Sample>(
    visible: ArrayView1<'_, T>,
    ymap: &YMap,
    x_at: impl Fn(usize) -> f64,
) -> Vec<LineSegment> {
    if visible.len() == 1 {
        let x = x_at(0);
        let y = ymap.y(visible[0].to_f64_lossless());
        return vec![LineSegment::new(x, y, x, y)];
    }
    visible
        .windows(2)
        .into_iter()
        .enumerate()
        .filter(|(_, pair)| !pair[0].is_nan() && !pair[1].is_nan())
        .map(|(index, pair)| {
            LineSegment::new(
                x_at(index),
                ymap.y(pair[0].to_f64_lossless()),
                x_at(index + 1),
                ymap.y(pair[1].to_f64_lossless()),
            )
        })
        .collect()
}

/// Render every segment of a channel's waveform on one shared amplitude scale.
///
/// Without a fixed range in `request`, the scale spans the visible extrema of
/// all segments. Each segment decimates into the columns its own time range
/// covers, so `k` non-overlapping segments yield at most `width + k` decimated
/// lines: neighbours can share the column their seam falls in.
pub fn render_channel<T: Sample>(channel: &Channel<T>, request: &RenderRequest) -> Vec<LineSegment> {
    let waveform = channel.waveform();
    let request = match request.amplitude {
        Some(_) => *request,
        None => {
            let extrema = waveform
                .segments()
                .filter_map(|segment| visible_extrema(segment, request))
                .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)));
            match extrema {
                Some((lo, hi)) => RenderRequest {
                    amplitude: Some((lo, hi)),
                    ..*request
                },
                None => return Vec::new(),
            }
        }
    };
    waveform
        .segments()
        .flat_map(|segment| render_segment(segment, &request))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    const START: i64 = 1_000_000_000_000_000;

    fn sine(len: usize, rate: f64) -> Segment<f64> {
        let samples = (0..len).map(|i| (i as f64 * 0.01).sin()).collect();
        Segment::from_samples(samples, rate, START).unwrap()
    }

    fn request_for(segment: &Segment<f64>, width: u32) -> RenderRequest {
        RenderRequest::new(START, segment.end_time().unwrap(), width, 200)
            .unwrap()
            .with_height_fraction(0.8)
            .unwrap()
    }

    #[test]
    fn test_request_validation() {
        assert!(RenderRequest::new(0, 10, 0, 10).is_err());
        assert!(RenderRequest::new(0, 10, 10, 0).is_err());
        assert!(RenderRequest::new(10, 10, 10, 10).is_err());
        let request = RenderRequest::new(0, 10, 10, 10).unwrap();
        assert!(request.with_height_fraction(0.0).is_err());
        assert!(request.with_height_fraction(1.5).is_err());
        assert!(request.with_amplitude_range(1.0, -1.0).is_err());
        assert!(request.with_amplitude_range(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_decimation_is_bounded() {
        let segment = sine(1_000_000, 100.0);
        for width in [1u32, 7, 640, 1920] {
            let lines = render_segment(&segment, &request_for(&segment, width));
            assert!(!lines.is_empty());
            assert!(lines.len() <= width as usize, "{} lines for width {width}", lines.len());
        }
    }

    #[test]
    fn test_decimation_keeps_extrema() {
        let mut samples = vec![0.0f64; 50_000];
        samples[12_345] = 7.5;
        samples[40_001] = -3.25;
        let segment = Segment::from_samples(samples, 100.0, START).unwrap();
        let request = request_for(&segment, 300);
        let lines = render_segment(&segment, &request);

        // 80% of 200 px leaves 20 px above and below
        let top = lines.iter().map(|l| l.y_extent().0).fold(f64::INFINITY, f64::min);
        let bottom = lines.iter().map(|l| l.y_extent().1).fold(f64::NEG_INFINITY, f64::max);
        assert_approx_eq!(top, 20.0, 1e-9);
        assert_approx_eq!(bottom, 180.0, 1e-9);
    }

    #[test]
    fn test_clipped_decimation_keeps_window_extrema() {
        // 100 s at 100 Hz plotted over [20 s, 80 s]
        let mut samples: Vec<f64> = (0..10_000).map(|i| (i as f64 * 0.01).sin()).collect();
        samples[5_000] = 5.0;
        samples[6_000] = -3.0;
        samples[500] = 100.0;
        samples[9_500] = -100.0;
        let segment = Segment::from_samples(samples, 100.0, START).unwrap();
        let request = RenderRequest::new(START + 20_000_000, START + 80_000_000, 100, 200).unwrap();
        assert_eq!(visible_range(&segment, &request), Some((2_000, 8_000)));

        let lines = render_segment(&segment, &request);
        assert!(lines.len() <= 100);

        // default 90% of 200 px leaves 10 px above and below
        let top = lines.iter().map(|l| l.y_extent().0).fold(f64::INFINITY, f64::min);
        let bottom = lines.iter().map(|l| l.y_extent().1).fold(f64::NEG_INFINITY, f64::max);
        assert_approx_eq!(top, 10.0, 1e-9);
        assert_approx_eq!(bottom, 190.0, 1e-9);
        assert!(lines.iter().all(|l| l.x1 >= 0.0 && l.x1 <= 100.0));
    }

    #[test]
    fn test_boundary_spike_is_spanned_by_neighbour() {
        // width 10, 100 samples: bucket k covers [10k, 10k + 10)
        let mut samples = vec![0.0f64; 100];
        samples[30] = 1.0;
        samples[0] = -1.0;
        let segment = Segment::from_samples(samples, 1000.0, START).unwrap();
        let request = request_for(&segment, 10);
        let lines = render_segment(&segment, &request);
        assert_eq!(lines.len(), 10);
        // column 2 peeks into column 3 and reaches the spike
        assert_approx_eq!(lines[2].y_extent().0, 20.0, 1e-9);
        assert_approx_eq!(lines[3].y_extent().0, 20.0, 1e-9);
        assert!(lines[4].y_extent().0 > 20.0);
    }

    #[test]
    fn test_few_samples_are_joined() {
        let segment = Segment::from_samples(vec![0.0f64, 1.0, 0.0, -1.0], 1.0, START).unwrap();
        let request = RenderRequest::new(START, START + 3_000_000, 300, 100)
            .unwrap()
            .with_height_fraction(1.0)
            .unwrap();
        let lines = render_segment(&segment, &request);
        assert_eq!(lines.len(), 3);

        assert!(lines[0].x1.abs() < 1e-9);
        assert_approx_eq!(lines[0].x2, 100.0, 1e-9);
        assert_approx_eq!(lines[2].x2, 300.0, 1e-9);
        // larger values plot higher
        assert!(lines[0].y2.abs() < 1e-9);
        assert_approx_eq!(lines[0].y1, 50.0, 1e-9);
        assert_approx_eq!(lines[2].y2, 100.0, 1e-9);
    }

    #[test]
    fn test_out_of_window_is_empty() {
        let segment = sine(100, 100.0);
        let before = RenderRequest::new(START - 10_000_000, START - 1, 100, 100).unwrap();
        assert!(render_segment(&segment, &before).is_empty());
        let after = RenderRequest::new(START + 10_000_000, START + 20_000_000, 100, 100).unwrap();
        assert!(render_segment(&segment, &after).is_empty());

        let unset = Segment::<f64>::new();
        assert!(render_segment(&unset, &before).is_empty());
    }

    #[test]
    fn test_window_clips_samples() {
        let segment = Segment::from_samples((0..100).map(f64::from).collect(), 10.0, START).unwrap();
        // samples 20..=29
        let request = RenderRequest::new(START + 2_000_000, START + 2_900_000, 100, 100).unwrap();
        assert_eq!(visible_range(&segment, &request), Some((20, 29)));
        let lines = render_segment(&segment, &request);
        assert_eq!(lines.len(), 9);
        assert!(lines[0].x1.abs() < 1e-9);
        assert_approx_eq!(lines[8].x2, 100.0, 1e-9);
    }

    #[test]
    fn test_flat_signal_sits_mid_height() {
        let segment = Segment::from_samples(vec![4.0f64; 1000], 100.0, START).unwrap();
        let lines = render_segment(&segment, &request_for(&segment, 50));
        assert!(lines.iter().all(|l| l.y1 == 100.0 && l.y2 == 100.0));
    }

    #[test]
    fn test_fixed_amplitude_range() {
        let segment = Segment::from_samples(vec![0.0f64, 1.0], 1.0, START).unwrap();
        let request = RenderRequest::new(START, START + 1_000_000, 10, 100)
            .unwrap()
            .with_height_fraction(1.0)
            .unwrap()
            .with_amplitude_range(-1.0, 1.0)
            .unwrap();
        let lines = render_segment(&segment, &request);
        assert_approx_eq!(lines[0].y1, 50.0, 1e-9);
        assert!(lines[0].y2.abs() < 1e-9);
    }

    #[test]
    fn test_segment_decimates_into_its_own_columns() {
        // one minute of 100 Hz data in the middle tenth of a ten minute plot
        let segment = Segment::from_samples(vec![1.0f64; 6_000], 100.0, START + 270_000_000)
            .unwrap();
        let request = RenderRequest::new(START, START + 600_000_000, 1_000, 100).unwrap();
        let lines = render_segment(&segment, &request);
        assert!(lines.len() <= 101, "{} lines", lines.len());
        assert!(lines.iter().all(|l| l.x1 >= 450.0 && l.x1 <= 550.0));
    }

    #[test]
    fn test_channel_decimation_stays_within_width() {
        // a day of hourly 1 Hz files
        let mut channel = Channel::<f32>::new("HHZ").unwrap();
        let hours: Vec<Segment<f32>> = (0..24i64)
            .map(|hour| {
                let samples = (0..3_600).map(|i| (i as f32 * 0.1).sin()).collect();
                Segment::from_samples(samples, 1.0, START + hour * 3_600_000_000).unwrap()
            })
            .collect();
        channel.waveform_mut().extend_segments(hours).unwrap();

        let width = 1_000u32;
        let request = RenderRequest::new(START, START + 86_400_000_000, width, 200).unwrap();
        let lines = render_channel(&channel, &request);
        assert!(
            lines.len() <= width as usize + 24,
            "{} lines for width {width}",
            lines.len()
        );
        assert!(lines.len() > width as usize / 2);
        assert!(lines.iter().all(|l| l.x1 >= 0.0 && l.x1 <= f64::from(width)));
    }

    #[test]
    fn test_channel_shares_scale() {
        let mut channel = Channel::<f32>::new("HHZ").unwrap();
        let quiet = Segment::from_samples(vec![0.0f32, 1.0], 1.0, START).unwrap();
        let loud = Segment::from_samples(vec![0.0f32, 4.0], 1.0, START + 2_000_000).unwrap();
        channel.waveform_mut().set_segments(quiet).unwrap();
        channel.waveform_mut().add_segment(loud).unwrap();

        let request = RenderRequest::new(START, START + 3_000_000, 30, 100)
            .unwrap()
            .with_height_fraction(1.0)
            .unwrap();
        let lines = render_channel(&channel, &request);
        assert_eq!(lines.len(), 2);
        // 1.0 on a 0..4 scale
        assert_approx_eq!(lines[0].y2, 75.0, 1e-9);
        assert!(lines[1].y2.abs() < 1e-9);
    }
}
