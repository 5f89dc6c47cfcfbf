//! An ordered collection of segments for one channel.
//!
//! Gaps between segments are allowed. Segments are kept sorted by start time
//! and the derived extrema (earliest start, latest end, total sample count) are
//! recomputed in one pass after every mutation, so the read accessors are O(1).

use crate::{ParameterError, Sample, Segment, SeismicResult, UnavailableError};

/// Segments of one channel plus the channel's network/station/channel/location identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform<T: Sample> {
    segments: Vec<Segment<T>>,
    network: String,
    station: String,
    channel_code: String,
    location_code: String,
    earliest_time: Option<i64>,
    latest_time: Option<i64>,
    cumulative_samples: usize,
}

impl<T: Sample> Default for Waveform<T> {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            network: String::new(),
            station: String::new(),
            channel_code: String::new(),
            location_code: String::new(),
            earliest_time: None,
            latest_time: None,
            cumulative_samples: 0,
        }
    }
}

impl<T: Sample> Waveform<T> {
    /// Create an empty waveform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a single segment.
    ///
    /// # Errors
    /// Rejects a segment without a sampling rate; the waveform is left unchanged.
    pub fn set_segments(&mut self, segment: Segment<T>) -> SeismicResult<()> {
        Self::check_segment(&segment)?;
        self.segments.clear();
        self.segments.push(segment);
        self.update_derived();
        Ok(())
    }

    /// Append one segment.
    ///
    /// # Errors
    /// Rejects a segment without a sampling rate; the waveform is left unchanged.
    pub fn add_segment(&mut self, segment: Segment<T>) -> SeismicResult<()> {
        Self::check_segment(&segment)?;
        self.segments.push(segment);
        self.update_derived();
        Ok(())
    }

    /// Append several segments at once, re-sorting only once.
    ///
    /// # Errors
    /// Nothing is appended if any segment lacks a sampling rate.
    pub fn extend_segments(
        &mut self,
        segments: impl IntoIterator<Item = Segment<T>>,
    ) -> SeismicResult<()> {
        let segments: Vec<Segment<T>> = segments.into_iter().collect();
        for segment in &segments {
            Self::check_segment(segment)?;
        }
        self.segments.extend(segments);
        self.update_derived();
        Ok(())
    }

    /// Remove every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.update_derived();
    }

    /// Number of segments.
    pub fn number_of_segments(&self) -> usize {
        self.segments.len()
    }

    /// Total number of samples across all segments.
    pub const fn cumulative_number_of_samples(&self) -> usize {
        self.cumulative_samples
    }

    /// Start time of the earliest segment.
    ///
    /// # Errors
    /// Fails with an unavailable error if there are no segments.
    pub fn earliest_time(&self) -> SeismicResult<i64> {
        self.earliest_time
            .ok_or_else(|| UnavailableError::new("earliest time", "waveform has no segments").into())
    }

    /// End time of the latest-ending segment.
    ///
    /// # Errors
    /// Fails with an unavailable error if there are no segments.
    pub fn latest_time(&self) -> SeismicResult<i64> {
        self.latest_time
            .ok_or_else(|| UnavailableError::new("latest time", "waveform has no segments").into())
    }

    /// Segments in ascending start-time order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment<T>> {
        self.segments.iter()
    }

    /// Segment at `index` in start-time order.
    pub fn segment(&self, index: usize) -> Option<&Segment<T>> {
        self.segments.get(index)
    }

    /// Whether the waveform holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Set the network code.
    pub fn set_network(&mut self, network: impl Into<String>) {
        self.network = network.into();
    }

    /// Set the station name.
    pub fn set_station(&mut self, station: impl Into<String>) {
        self.station = station.into();
    }

    /// Set the channel code.
    pub fn set_channel_code(&mut self, channel_code: impl Into<String>) {
        self.channel_code = channel_code.into();
    }

    /// Set the location code.
    pub fn set_location_code(&mut self, location_code: impl Into<String>) {
        self.location_code = location_code.into();
    }

    /// Network code.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Station name.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Channel code.
    pub fn channel_code(&self) -> &str {
        &self.channel_code
    }

    /// Location code.
    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    /// `NET.STA.LOC.CHA` label used by the presentation layer.
    pub fn display_name(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location_code, self.channel_code
        )
    }

    fn check_segment(segment: &Segment<T>) -> SeismicResult<()> {
        if !segment.has_sampling_rate() {
            return Err(ParameterError::invalid_value(
                "segment",
                "sampling rate must be set before adding to a waveform",
            )
            .into());
        }
        Ok(())
    }

    fn update_derived(&mut self) {
        self.segments.sort_by_key(Segment::start_time);

        let mut earliest = None;
        let mut latest: Option<i64> = None;
        let mut total = 0;
        for segment in &self.segments {
            // segments are sorted, so the first start is the earliest
            earliest.get_or_insert(segment.start_time());
            let end = segment.end_time().unwrap_or(segment.start_time());
            latest = Some(latest.map_or(end, |l| l.max(end)));
            total += segment.len();
        }
        self.earliest_time = earliest;
        self.latest_time = latest;
        self.cumulative_samples = total;
    }
}
