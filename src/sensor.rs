//! Physical instruments grouping one or three channels.
//!
//! A [`Sensor`] is either a [`SingleChannelSensor`] (one vertical channel) or a
//! [`ThreeChannelSensor`] (vertical, north and east). Both share the role checks
//! in [`ComponentRole`]: the third letter of a channel code must belong to the
//! letter set of the role it is assigned to, and the sets are disjoint. Both
//! also require a channel's location code to match the sensor's.

use serde::{Deserialize, Serialize};

use crate::{Channel, InvariantError, ParameterError, Sample, SeismicResult, UnavailableError};

/// Orientation letters accepted for the vertical role.
pub const VERTICAL_CODES: [char; 3] = ['Z', 'L', '3'];
/// Orientation letters accepted for the north (first horizontal) role.
pub const NORTH_CODES: [char; 4] = ['N', '1', 'R', 'Q'];
/// Orientation letters accepted for the east (second horizontal) role.
pub const EAST_CODES: [char; 3] = ['E', '2', 'T'];

/// Position of a channel within a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentRole {
    /// Vertical component.
    Vertical,
    /// First horizontal component.
    North,
    /// Second horizontal component.
    East,
}

impl ComponentRole {
    /// Letters accepted for this role.
    pub const fn codes(&self) -> &'static [char] {
        match self {
            ComponentRole::Vertical => &VERTICAL_CODES,
            ComponentRole::North => &NORTH_CODES,
            ComponentRole::East => &EAST_CODES,
        }
    }

    /// Role an orientation letter belongs to, if any.
    pub fn of(orientation: char) -> Option<Self> {
        [Self::Vertical, Self::North, Self::East]
            .into_iter()
            .find(|role| role.accepts(orientation))
    }

    /// Whether `orientation` belongs to this role.
    pub fn accepts(&self, orientation: char) -> bool {
        self.codes().contains(&orientation.to_ascii_uppercase())
    }

    /// Whether `orientation` is a horizontal letter.
    pub fn is_horizontal(orientation: char) -> bool {
        Self::North.accepts(orientation) || Self::East.accepts(orientation)
    }

    /// Azimuth assumed when the metadata does not supply one.
    pub const fn default_azimuth(&self) -> f64 {
        match self {
            ComponentRole::Vertical | ComponentRole::North => 0.0,
            ComponentRole::East => 90.0,
        }
    }

    /// Lower-case role name for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            ComponentRole::Vertical => "vertical",
            ComponentRole::North => "north",
            ComponentRole::East => "east",
        }
    }
}

/// Optional geographic position shared by both sensor kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorPosition {
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
}

impl SensorPosition {
    /// Set the latitude in degrees.
    ///
    /// # Errors
    /// Rejects values outside `[-90, 90]`.
    pub fn set_latitude(&mut self, latitude: f64) -> SeismicResult<()> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ParameterError::invalid_value(
                "latitude",
                format!("{latitude} not in [-90, 90]"),
            )
            .into());
        }
        self.latitude = Some(latitude);
        Ok(())
    }

    /// Set the longitude in degrees.
    ///
    /// # Errors
    /// Rejects values outside `[-180, 180]`.
    pub fn set_longitude(&mut self, longitude: f64) -> SeismicResult<()> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ParameterError::invalid_value(
                "longitude",
                format!("{longitude} not in [-180, 180]"),
            )
            .into());
        }
        self.longitude = Some(longitude);
        Ok(())
    }

    /// Set the elevation in meters.
    ///
    /// # Errors
    /// Rejects non-finite values.
    pub fn set_elevation(&mut self, elevation: f64) -> SeismicResult<()> {
        if !elevation.is_finite() {
            return Err(ParameterError::invalid_value("elevation", "must be finite").into());
        }
        self.elevation = Some(elevation);
        Ok(())
    }

    /// Latitude in degrees, if known.
    pub const fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    /// Longitude in degrees, if known.
    pub const fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    /// Elevation in meters, if known.
    pub const fn elevation(&self) -> Option<f64> {
        self.elevation
    }
}

fn check_assignment<T: Sample>(
    channel: &Channel<T>,
    role: ComponentRole,
    location_code: &str,
) -> SeismicResult<()> {
    if !role.accepts(channel.orientation_code()) {
        return Err(InvariantError::orientation(channel.channel_code(), role.name()).into());
    }
    check_location(channel, location_code)
}

fn check_location<T: Sample>(channel: &Channel<T>, location_code: &str) -> SeismicResult<()> {
    if channel.location_code() != location_code {
        return Err(InvariantError::LocationMismatch {
            channel_location: channel.location_code().to_string(),
            sensor_location: location_code.to_string(),
        }
        .into());
    }
    Ok(())
}

/// A sensor with a single vertical channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleChannelSensor<T: Sample> {
    vertical: Option<Channel<T>>,
    location_code: String,
    position: SensorPosition,
}

impl<T: Sample> SingleChannelSensor<T> {
    /// Create an empty sensor at `location_code`.
    pub fn new(location_code: &str) -> Self {
        Self {
            vertical: None,
            location_code: crate::channel::normalize_code(location_code),
            position: SensorPosition::default(),
        }
    }

    /// Assign the vertical channel.
    ///
    /// Any orientation letter that is not horizontal is accepted, so unusual
    /// single components (hydrophones, pressure) still form a sensor.
    ///
    /// # Errors
    /// Rejects horizontal orientation letters and channels at a different location.
    pub fn set_vertical_channel(&mut self, channel: Channel<T>) -> SeismicResult<()> {
        if ComponentRole::is_horizontal(channel.orientation_code()) {
            return Err(InvariantError::orientation(channel.channel_code(), "vertical").into());
        }
        check_location(&channel, &self.location_code)?;
        self.vertical = Some(channel);
        Ok(())
    }

    /// The vertical channel.
    ///
    /// # Errors
    /// Fails with an unavailable error if never assigned.
    pub fn vertical_channel(&self) -> SeismicResult<&Channel<T>> {
        self.vertical
            .as_ref()
            .ok_or_else(|| UnavailableError::new("vertical channel", "never assigned").into())
    }

    /// Whether the vertical channel has been assigned.
    pub const fn is_complete(&self) -> bool {
        self.vertical.is_some()
    }

    /// Location code.
    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    /// Geographic position.
    pub const fn position(&self) -> &SensorPosition {
        &self.position
    }

    /// Mutable geographic position.
    pub fn position_mut(&mut self) -> &mut SensorPosition {
        &mut self.position
    }

    /// Assigned channels.
    pub fn channels(&self) -> impl Iterator<Item = &Channel<T>> {
        self.vertical.iter()
    }
}

/// A sensor with vertical, north and east channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeChannelSensor<T: Sample> {
    vertical: Option<Channel<T>>,
    north: Option<Channel<T>>,
    east: Option<Channel<T>>,
    location_code: String,
    position: SensorPosition,
}

impl<T: Sample> ThreeChannelSensor<T> {
    /// Create an empty sensor at `location_code`.
    pub fn new(location_code: &str) -> Self {
        Self {
            vertical: None,
            north: None,
            east: None,
            location_code: crate::channel::normalize_code(location_code),
            position: SensorPosition::default(),
        }
    }

    /// Assign the vertical channel.
    ///
    /// # Errors
    /// Rejects non-vertical orientation letters and channels at a different location.
    pub fn set_vertical_channel(&mut self, channel: Channel<T>) -> SeismicResult<()> {
        self.vertical = Some(Self::prepare(channel, ComponentRole::Vertical, &self.location_code)?);
        Ok(())
    }

    /// Assign the north channel.
    ///
    /// # Errors
    /// Rejects non-north orientation letters and channels at a different location.
    pub fn set_north_channel(&mut self, channel: Channel<T>) -> SeismicResult<()> {
        self.north = Some(Self::prepare(channel, ComponentRole::North, &self.location_code)?);
        Ok(())
    }

    /// Assign the east channel.
    ///
    /// # Errors
    /// Rejects non-east orientation letters and channels at a different location.
    pub fn set_east_channel(&mut self, channel: Channel<T>) -> SeismicResult<()> {
        self.east = Some(Self::prepare(channel, ComponentRole::East, &self.location_code)?);
        Ok(())
    }

    /// Assign a channel to an explicit role.
    ///
    /// # Errors
    /// See the role-specific setters.
    pub fn set_channel(&mut self, role: ComponentRole, channel: Channel<T>) -> SeismicResult<()> {
        match role {
            ComponentRole::Vertical => self.set_vertical_channel(channel),
            ComponentRole::North => self.set_north_channel(channel),
            ComponentRole::East => self.set_east_channel(channel),
        }
    }

    fn prepare(
        mut channel: Channel<T>,
        role: ComponentRole,
        location_code: &str,
    ) -> SeismicResult<Channel<T>> {
        check_assignment(&channel, role, location_code)?;
        if !channel.has_azimuth() {
            channel.set_azimuth(role.default_azimuth())?;
        }
        Ok(channel)
    }

    /// The vertical channel.
    ///
    /// # Errors
    /// Fails with an unavailable error if never assigned.
    pub fn vertical_channel(&self) -> SeismicResult<&Channel<T>> {
        self.vertical
            .as_ref()
            .ok_or_else(|| UnavailableError::new("vertical channel", "never assigned").into())
    }

    /// The north channel.
    ///
    /// # Errors
    /// Fails with an unavailable error if never assigned.
    pub fn north_channel(&self) -> SeismicResult<&Channel<T>> {
        self.north
            .as_ref()
            .ok_or_else(|| UnavailableError::new("north channel", "never assigned").into())
    }

    /// The east channel.
    ///
    /// # Errors
    /// Fails with an unavailable error if never assigned.
    pub fn east_channel(&self) -> SeismicResult<&Channel<T>> {
        self.east
            .as_ref()
            .ok_or_else(|| UnavailableError::new("east channel", "never assigned").into())
    }

    /// Whether all three channels are assigned.
    pub const fn is_complete(&self) -> bool {
        self.vertical.is_some() && self.north.is_some() && self.east.is_some()
    }

    /// Location code.
    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    /// Geographic position.
    pub const fn position(&self) -> &SensorPosition {
        &self.position
    }

    /// Mutable geographic position.
    pub fn position_mut(&mut self) -> &mut SensorPosition {
        &mut self.position
    }

    /// Assigned channels in vertical, north, east order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel<T>> {
        self.vertical
            .iter()
            .chain(self.north.iter())
            .chain(self.east.iter())
    }
}

/// Either kind of sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum Sensor<T: Sample> {
    /// One vertical channel.
    Single(SingleChannelSensor<T>),
    /// Vertical, north and east channels.
    Three(ThreeChannelSensor<T>),
}

impl<T: Sample> Sensor<T> {
    /// Assigned channels.
    pub fn channels(&self) -> Box<dyn Iterator<Item = &Channel<T>> + '_> {
        match self {
            Sensor::Single(sensor) => Box::new(sensor.channels()),
            Sensor::Three(sensor) => Box::new(sensor.channels()),
        }
    }

    /// Number of channels the sensor contributes to its station.
    pub const fn number_of_channels(&self) -> usize {
        match self {
            Sensor::Single(_) => 1,
            Sensor::Three(_) => 3,
        }
    }

    /// Whether every channel slot is filled.
    pub const fn is_complete(&self) -> bool {
        match self {
            Sensor::Single(sensor) => sensor.is_complete(),
            Sensor::Three(sensor) => sensor.is_complete(),
        }
    }

    /// Location code.
    pub fn location_code(&self) -> &str {
        match self {
            Sensor::Single(sensor) => sensor.location_code(),
            Sensor::Three(sensor) => sensor.location_code(),
        }
    }

    /// The vertical channel.
    ///
    /// # Errors
    /// Fails with an unavailable error if never assigned.
    pub fn vertical_channel(&self) -> SeismicResult<&Channel<T>> {
        match self {
            Sensor::Single(sensor) => sensor.vertical_channel(),
            Sensor::Three(sensor) => sensor.vertical_channel(),
        }
    }

    /// Whether the sensor owns a channel with this code at this location.
    pub fn contains_channel(&self, channel_code: &str, location_code: &str) -> bool {
        self.channels().any(|c| {
            c.channel_code() == channel_code && c.location_code() == location_code
        })
    }
}

impl<T: Sample> From<SingleChannelSensor<T>> for Sensor<T> {
    fn from(sensor: SingleChannelSensor<T>) -> Self {
        Sensor::Single(sensor)
    }
}

impl<T: Sample> From<ThreeChannelSensor<T>> for Sensor<T> {
    fn from(sensor: ThreeChannelSensor<T>) -> Self {
        Sensor::Three(sensor)
    }
}
