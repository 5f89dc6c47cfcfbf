//! Turning waveforms into pixel-space line segments.
//!
//! - [`decimate`]: the extremum-preserving decimation engine
//! - [`view`]: zoom and pan state threaded through by the caller
//! - [`ticks`]: time-axis tick positions and labels
//!
//! ```
//! use seismic_samples::rendering::{RenderRequest, render_segment};
//! use seismic_samples::Segment;
//!
//! let samples: Vec<f32> = (0..100_000).map(|i| (i as f32 * 0.01).sin()).collect();
//! let segment = Segment::from_samples(samples, 100.0, 0)?;
//! let request = RenderRequest::new(0, segment.end_time()?, 800, 120)?;
//! let lines = render_segment(&segment, &request);
//! assert!(lines.len() <= 800);
//! # Ok::<(), seismic_samples::SeismicError>(())
//! ```

pub mod decimate;
pub mod ticks;
pub mod view;

pub use decimate::{
    DECIMATION_THRESHOLD, DEFAULT_HEIGHT_FRACTION, LineSegment, RenderRequest, render_channel,
    render_segment, visible_extrema, visible_range,
};
pub use ticks::{Tick, TimeAxis};
pub use view::{MIN_VIEW_SPAN, ViewState};

use crate::{Channel, Sample, Station};

/// Everything the presentation layer needs to draw one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTrace {
    /// `NET.STA.LOC.CHA` label.
    pub display_name: String,
    /// Lines in pixel space.
    pub lines: Vec<LineSegment>,
}

impl ChannelTrace {
    /// Render `channel` for `request`.
    pub fn render<T: Sample>(channel: &Channel<T>, request: &RenderRequest) -> Self {
        Self {
            display_name: channel.display_name(),
            lines: render_channel(channel, request),
        }
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One trace per channel of `station`, each in its own `request`-sized panel.
pub fn render_station<T: Sample>(station: &Station<T>, request: &RenderRequest) -> Vec<ChannelTrace> {
    station
        .channels()
        .map(|channel| ChannelTrace::render(channel, request))
        .collect()
}
