//! Sensors installed at one network/station pair.

use crate::{
    Channel, InvariantError, Sample, SeismicResult, Sensor, SingleChannelSensor,
    ThreeChannelSensor, UnavailableError,
};

/// A named collection of sensors.
///
/// No two channels owned by the station may share the same channel code and
/// location code. [`Station::add`] checks this before inserting, so a rejected
/// sensor leaves the station untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Station<T: Sample> {
    network_code: String,
    name: String,
    three_channel_sensors: Vec<ThreeChannelSensor<T>>,
    single_channel_sensors: Vec<SingleChannelSensor<T>>,
}

impl<T: Sample> Station<T> {
    /// Create an empty station.
    pub fn new(network_code: &str, name: &str) -> Self {
        Self {
            network_code: crate::channel::normalize_code(network_code),
            name: crate::channel::normalize_code(name),
            three_channel_sensors: Vec::new(),
            single_channel_sensors: Vec::new(),
        }
    }

    /// Network code.
    pub fn network_code(&self) -> &str {
        &self.network_code
    }

    /// Station name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a sensor.
    ///
    /// # Errors
    /// - Unavailable if the sensor has empty channel slots.
    /// - Invariant violation if any of its channels collides with an existing
    ///   `(channel code, location code)` pair. The station is not modified.
    pub fn add(&mut self, sensor: impl Into<Sensor<T>>) -> SeismicResult<()> {
        let sensor = sensor.into();
        if !sensor.is_complete() {
            return Err(UnavailableError::new("sensor channels", "sensor is incomplete").into());
        }
        for channel in sensor.channels() {
            if self.channel_exists(channel.channel_code(), channel.location_code()) {
                return Err(InvariantError::DuplicateChannel {
                    station: format!("{}.{}", self.network_code, self.name),
                    channel_code: channel.channel_code().to_string(),
                    location_code: channel.location_code().to_string(),
                }
                .into());
            }
        }
        match sensor {
            Sensor::Single(sensor) => self.single_channel_sensors.push(sensor),
            Sensor::Three(sensor) => self.three_channel_sensors.push(sensor),
        }
        Ok(())
    }

    /// Whether any owned channel has this code and location.
    pub fn channel_exists(&self, channel_code: &str, location_code: &str) -> bool {
        self.channels()
            .any(|c| c.channel_code() == channel_code && c.location_code() == location_code)
    }

    /// Total channels; three-channel sensors count three, single-channel sensors one.
    pub fn number_of_channels(&self) -> usize {
        3 * self.three_channel_sensors.len() + self.single_channel_sensors.len()
    }

    /// Number of vertical channels, one per sensor.
    pub fn number_of_vertical_channels(&self) -> usize {
        self.three_channel_sensors.len() + self.single_channel_sensors.len()
    }

    /// Number of sensors of either kind.
    pub fn number_of_sensors(&self) -> usize {
        self.number_of_vertical_channels()
    }

    /// Three-channel sensors in insertion order.
    pub fn three_channel_sensors(&self) -> &[ThreeChannelSensor<T>] {
        &self.three_channel_sensors
    }

    /// Single-channel sensors in insertion order.
    pub fn single_channel_sensors(&self) -> &[SingleChannelSensor<T>] {
        &self.single_channel_sensors
    }

    /// Every owned channel, three-channel sensors first.
    pub fn channels(&self) -> impl Iterator<Item = &Channel<T>> {
        self.three_channel_sensors
            .iter()
            .flat_map(ThreeChannelSensor::channels)
            .chain(
                self.single_channel_sensors
                    .iter()
                    .flat_map(SingleChannelSensor::channels),
            )
    }

    /// Whether the station has no sensors.
    pub fn is_empty(&self) -> bool {
        self.three_channel_sensors.is_empty() && self.single_channel_sensors.is_empty()
    }

    /// Remove every sensor.
    pub fn clear(&mut self) {
        self.three_channel_sensors.clear();
        self.single_channel_sensors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(code: &str) -> Channel<f32> {
        let mut channel = Channel::new(code).unwrap();
        channel.set_location_code("01");
        channel
    }

    fn three(codes: [&str; 3]) -> ThreeChannelSensor<f32> {
        let mut sensor = ThreeChannelSensor::new("01");
        sensor.set_vertical_channel(channel(codes[0])).unwrap();
        sensor.set_north_channel(channel(codes[1])).unwrap();
        sensor.set_east_channel(channel(codes[2])).unwrap();
        sensor
    }

    fn single(code: &str) -> SingleChannelSensor<f32> {
        let mut sensor = SingleChannelSensor::new("01");
        sensor.set_vertical_channel(channel(code)).unwrap();
        sensor
    }

    #[test]
    fn test_channel_counts() {
        let mut station = Station::new("uu", " ugrn");
        assert_eq!(station.name(), "UGRN");
        assert_eq!(station.network_code(), "UU");

        station.add(three(["HHZ", "HHN", "HHE"])).unwrap();
        station.add(single("ENZ")).unwrap();

        assert_eq!(station.number_of_channels(), 4);
        assert_eq!(station.number_of_vertical_channels(), 2);
        assert!(station.channel_exists("HHN", "01"));
        assert!(!station.channel_exists("HHN", "00"));
    }

    #[test]
    fn test_duplicate_rejected_without_mutation() {
        let mut station = Station::new("UU", "UGRN");
        station.add(three(["HHZ", "HHN", "HHE"])).unwrap();
        let before = station.clone();

        let err = station.add(single("HHZ")).unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(station, before);

        assert!(station.add(three(["HHZ", "HH1", "HH2"])).is_err());
        assert_eq!(station.number_of_channels(), 3);
    }

    #[test]
    fn test_incomplete_sensor_rejected() {
        let mut station = Station::<f32>::new("UU", "UGRN");
        let mut sensor = ThreeChannelSensor::new("01");
        sensor.set_vertical_channel(channel("HHZ")).unwrap();
        assert!(station.add(sensor).unwrap_err().is_unavailable());
        assert!(station.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut station = Station::new("UU", "UGRN");
        station.add(single("EHZ")).unwrap();
        station.clear();
        assert!(station.is_empty());
        assert_eq!(station.number_of_channels(), 0);
    }
}
