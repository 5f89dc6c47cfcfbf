//! Turning flat channel readings into stations and sensors.
//!
//! Readings are first normalized (codes upper-cased, sentinels turned into
//! `None`, inclination turned into dip) and merged by full
//! `NET.STA.LOC.CHA` identity, so several files of the same channel become one
//! channel with several segments. Each `NET.STA.LOC` group is then matched
//! against the [`Catalogue`] repeatedly: the first candidate whose three codes
//! are all present forms a [`ThreeChannelSensor`], those channels are consumed,
//! and matching restarts on what is left. Whatever is never matched becomes a
//! [`SingleChannelSensor`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::channel::normalize_code;
use crate::io::reader::{ABSENT, RawReading};
use crate::io::sac::defined_string;
use crate::loader::SkippedInput;
use crate::loader::catalogue::Catalogue;
use crate::sensor::{ComponentRole, SensorPosition};
use crate::{
    CHANNEL_CODE_LENGTH, Channel, ParameterError, Sample, Segment, SeismicError, SeismicResult,
    SingleChannelSensor, Station, ThreeChannelSensor, Waveform,
};

/// Convert an inclination from vertical (0 up, 90 horizontal, 180 down) to a
/// dip below horizontal.
#[inline]
pub fn inclination_to_dip(inclination: f64) -> f64 {
    (inclination - 90.0).clamp(-90.0, 90.0)
}

/// Wrap an azimuth into `[0, 360)`.
#[inline]
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let wrapped = azimuth.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// A reading after normalization, ready for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReading<T: Sample> {
    /// File the reading came from.
    pub path: PathBuf,
    /// Network code.
    pub network: String,
    /// Station code.
    pub station: String,
    /// Location code.
    pub location: String,
    /// Three-letter channel code.
    pub channel_code: String,
    /// Azimuth in degrees, not yet wrapped.
    pub azimuth: Option<f64>,
    /// Dip in degrees.
    pub dip: Option<f64>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Elevation in meters.
    pub elevation: Option<f64>,
    /// The samples.
    pub segment: Segment<T>,
}

impl<T: Sample> ChannelReading<T> {
    /// Normalize a raw reading.
    ///
    /// # Errors
    /// - missing network, station or channel
    /// - a channel code that is not three characters
    /// - an invalid sampling rate, a sample buffer that disagrees with its
    ///   declared count, or no samples at all
    pub fn from_raw(
        path: &Path,
        raw: RawReading<T>,
        default_location: &str,
    ) -> SeismicResult<Self> {
        let network = required_code(&raw.network_code, "network")?;
        let station = required_code(&raw.station_code, "station")?;
        let channel_code = required_code(&raw.channel_code, "channel")?;
        if channel_code.chars().count() != CHANNEL_CODE_LENGTH {
            return Err(ParameterError::ChannelCodeLength { code: channel_code }.into());
        }
        let location = defined_string(&raw.location_code)
            .map(normalize_code)
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| normalize_code(default_location));

        if raw.sample_count == 0 {
            return Err(ParameterError::invalid_value("samples", "no samples to load").into());
        }
        let mut segment = Segment::new();
        segment.set_sampling_rate(raw.sampling_rate)?;
        segment.set_start_time(raw.start_time);
        segment.set_data_from_slice(&raw.samples, raw.sample_count)?;

        Ok(Self {
            path: path.to_path_buf(),
            network,
            station,
            location,
            channel_code,
            azimuth: optional(raw.azimuth),
            dip: optional(raw.inclination).map(inclination_to_dip),
            latitude: optional(raw.latitude),
            longitude: optional(raw.longitude),
            elevation: optional(raw.elevation),
            segment,
        })
    }

    /// `NET.STA.LOC` grouping key.
    pub fn station_key(&self) -> String {
        format!("{}.{}.{}", self.network, self.station, self.location)
    }
}

fn required_code(value: &str, field: &'static str) -> SeismicResult<String> {
    defined_string(value)
        .map(normalize_code)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ParameterError::missing_field(field).into())
}

#[inline]
fn optional(value: f64) -> Option<f64> {
    (value != ABSENT && value.is_finite()).then_some(value)
}

/// Header field blamed for a rejected reading, for diagnostics.
pub fn offending_field(err: &SeismicError) -> &str {
    match err {
        SeismicError::Parameter(ParameterError::MissingField { field }) => field.as_str(),
        SeismicError::Parameter(ParameterError::InvalidValue { parameter, .. }) => parameter.as_str(),
        SeismicError::Parameter(ParameterError::ChannelCodeLength { .. }) => "channel",
        SeismicError::Parameter(ParameterError::SampleCountMismatch { .. }) => "npts",
        SeismicError::Format(_) | SeismicError::Io(_) => "file",
        SeismicError::Invariant(_) | SeismicError::Unavailable(_) => "channel",
    }
}

/// All readings of one channel identity.
#[derive(Debug)]
struct MergedChannel<T: Sample> {
    channel_code: String,
    paths: Vec<PathBuf>,
    azimuth: Option<f64>,
    dip: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
    segments: Vec<Segment<T>>,
}

impl<T: Sample> MergedChannel<T> {
    fn new(reading: ChannelReading<T>) -> Self {
        Self {
            channel_code: reading.channel_code,
            paths: vec![reading.path],
            azimuth: reading.azimuth,
            dip: reading.dip,
            latitude: reading.latitude,
            longitude: reading.longitude,
            elevation: reading.elevation,
            segments: vec![reading.segment],
        }
    }

    /// First defined value wins for every optional attribute.
    fn absorb(&mut self, reading: ChannelReading<T>) {
        self.paths.push(reading.path);
        self.azimuth = self.azimuth.or(reading.azimuth);
        self.dip = self.dip.or(reading.dip);
        self.latitude = self.latitude.or(reading.latitude);
        self.longitude = self.longitude.or(reading.longitude);
        self.elevation = self.elevation.or(reading.elevation);
        self.segments.push(reading.segment);
    }

    fn into_channel(self, identity: &SiteKey) -> SeismicResult<Channel<T>> {
        let mut channel = Channel::new(&self.channel_code)?;
        channel.set_location_code(&identity.location);
        if let Some(azimuth) = self.azimuth {
            channel.set_azimuth(normalize_azimuth(azimuth))?;
        }
        if let Some(dip) = self.dip {
            channel.set_dip(dip)?;
        }
        let mut waveform = Waveform::new();
        waveform.set_network(identity.network.clone());
        waveform.set_station(identity.station.clone());
        waveform.extend_segments(self.segments)?;
        channel.set_waveform(waveform);
        Ok(channel)
    }

    fn skipped<'a>(&'a self, reason: &'a str) -> impl Iterator<Item = SkippedInput> + 'a {
        self.paths.iter().map(move |path| SkippedInput {
            path: path.clone(),
            reason: format!("{}: {reason}", self.channel_code),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SiteKey {
    network: String,
    station: String,
    location: String,
}

impl std::fmt::Display for SiteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.network, self.station, self.location)
    }
}

/// Stations built by [`group_readings`] and the inputs dropped along the way.
#[derive(Debug)]
pub struct Grouping<T: Sample> {
    /// Non-empty stations ordered by network then station code.
    pub stations: Vec<Station<T>>,
    /// Files whose channel could not be placed in a sensor.
    pub skipped: Vec<SkippedInput>,
}

/// Build stations from normalized readings.
///
/// Failures while assembling a sensor are logged and reported through
/// [`Grouping::skipped`]; they never abort the batch.
pub fn group_readings<T: Sample>(
    readings: impl IntoIterator<Item = ChannelReading<T>>,
    catalogue: &Catalogue,
) -> Grouping<T> {
    let mut sites: BTreeMap<SiteKey, Vec<MergedChannel<T>>> = BTreeMap::new();
    for reading in readings {
        let key = SiteKey {
            network: reading.network.clone(),
            station: reading.station.clone(),
            location: reading.location.clone(),
        };
        let channels = sites.entry(key).or_default();
        match channels
            .iter_mut()
            .find(|c| c.channel_code == reading.channel_code)
        {
            Some(existing) => existing.absorb(reading),
            None => channels.push(MergedChannel::new(reading)),
        }
    }

    let mut stations: Vec<Station<T>> = Vec::new();
    let mut skipped = Vec::new();
    for (key, pending) in sites {
        let index = match stations
            .iter()
            .position(|s| s.network_code() == key.network && s.name() == key.station)
        {
            Some(index) => index,
            None => {
                stations.push(Station::new(&key.network, &key.station));
                stations.len() - 1
            }
        };
        group_site(&mut stations[index], &key, pending, catalogue, &mut skipped);
    }
    stations.retain(|station| !station.is_empty());

    Grouping { stations, skipped }
}

fn group_site<T: Sample>(
    station: &mut Station<T>,
    key: &SiteKey,
    mut pending: Vec<MergedChannel<T>>,
    catalogue: &Catalogue,
    skipped: &mut Vec<SkippedInput>,
) {
    const ROLES: [ComponentRole; 3] = [
        ComponentRole::Vertical,
        ComponentRole::North,
        ComponentRole::East,
    ];

    loop {
        let codes: Vec<&str> = pending.iter().map(|c| c.channel_code.as_str()).collect();
        let Some((candidate, indices)) = catalogue.first_match(&codes) else {
            break;
        };
        debug!(site = %key, codes = ?candidate.codes(), "matched three-component sensor");

        // remove from the back so earlier indices stay valid
        let mut picks: Vec<(usize, ComponentRole)> = indices.into_iter().zip(ROLES).collect();
        picks.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        let members: Vec<(ComponentRole, MergedChannel<T>)> = picks
            .into_iter()
            .map(|(index, role)| (role, pending.remove(index)))
            .collect();

        let position = position_of(key, members.iter().map(|(_, c)| c));
        let paths: Vec<PathBuf> = members
            .iter()
            .flat_map(|(_, c)| c.paths.iter().cloned())
            .collect();
        let codes: Vec<String> = members.iter().map(|(_, c)| c.channel_code.clone()).collect();

        let built = members.into_iter().try_fold(
            ThreeChannelSensor::new(&key.location),
            |mut sensor, (role, merged)| {
                sensor.set_channel(role, merged.into_channel(key)?)?;
                Ok::<_, SeismicError>(sensor)
            },
        );
        let result = built.and_then(|mut sensor| {
            *sensor.position_mut() = position;
            station.add(sensor)
        });
        if let Err(err) = result {
            warn!(site = %key, channels = ?codes, error = %err, "dropping three-component sensor");
            skipped.extend(paths.into_iter().map(|path| SkippedInput {
                path,
                reason: err.to_string(),
            }));
        }
    }

    for merged in pending {
        let position = position_of(key, std::iter::once(&merged));
        let rejected: Vec<SkippedInput> = merged.skipped("not placed in a sensor").collect();
        let code = merged.channel_code.clone();
        let result = merged.into_channel(key).and_then(|channel| {
            let mut sensor = SingleChannelSensor::new(&key.location);
            sensor.set_vertical_channel(channel)?;
            *sensor.position_mut() = position;
            station.add(sensor)
        });
        if let Err(err) = result {
            warn!(site = %key, channel = %code, error = %err, "dropping single-channel sensor");
            skipped.extend(rejected.into_iter().map(|input| SkippedInput {
                reason: format!("{}; {err}", input.reason),
                ..input
            }));
        }
    }
}

/// Position from the first channel that supplies each coordinate.
fn position_of<'a, T: Sample + 'a>(
    key: &SiteKey,
    channels: impl Iterator<Item = &'a MergedChannel<T>> + Clone,
) -> SensorPosition {
    let mut position = SensorPosition::default();
    if let Some(latitude) = channels.clone().find_map(|c| c.latitude) {
        if let Err(err) = position.set_latitude(latitude) {
            warn!(site = %key, error = %err, "ignoring latitude");
        }
    }
    if let Some(longitude) = channels.clone().find_map(|c| c.longitude) {
        if let Err(err) = position.set_longitude(longitude) {
            warn!(site = %key, error = %err, "ignoring longitude");
        }
    }
    if let Some(elevation) = channels.clone().find_map(|c| c.elevation) {
        if let Err(err) = position.set_elevation(elevation) {
            warn!(site = %key, error = %err, "ignoring elevation");
        }
    }
    position
}
