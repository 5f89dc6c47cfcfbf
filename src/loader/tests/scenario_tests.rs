//! End-to-end grouping scenarios.

use super::{Fixture, START};
use crate::loader::{Loader, LoaderConfig};
use approx_eq::assert_approx_eq;

fn load(fixtures: &[Fixture]) -> crate::loader::LoadOutcome<f32> {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = fixtures.iter().map(|f| f.write(dir.path())).collect();
    Loader::new(LoaderConfig::default())
        .unwrap()
        .load::<f32, _>(&paths)
}

#[test]
fn test_ugrn_round_trip() {
    let outcome = load(&[
        Fixture::new("UGRN", "HHZ"),
        Fixture::new("UGRN", "HHN"),
        Fixture::new("UGRN", "HHE"),
    ]);

    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.stations.len(), 1);
    let station = outcome.station("UU", "UGRN").unwrap();
    assert_eq!(station.name(), "UGRN");
    assert_eq!(station.three_channel_sensors().len(), 1);
    assert!(station.single_channel_sensors().is_empty());
    assert_eq!(station.number_of_channels(), 3);

    for channel in station.channels() {
        let waveform = channel.waveform();
        assert_eq!(waveform.cumulative_number_of_samples(), 10);
        assert_eq!(waveform.earliest_time().unwrap(), START);
        // 9 periods of 25 ms
        assert_eq!(waveform.latest_time().unwrap(), START + 225_000);
        assert_approx_eq!(waveform.segment(0).unwrap().sampling_rate().unwrap(), 40.0, 1e-9);
    }
}

#[test]
fn test_lone_accelerometer_is_single_sensor() {
    let outcome = load(&[Fixture::new("UGRN", "HNZ")]);
    let station = &outcome.stations[0];
    assert!(station.three_channel_sensors().is_empty());
    assert_eq!(station.single_channel_sensors().len(), 1);
    assert_eq!(
        station.single_channel_sensors()[0]
            .vertical_channel()
            .unwrap()
            .channel_code(),
        "HNZ"
    );
}

#[test]
fn test_inclination_becomes_dip() {
    let mut down = Fixture::new("UGRN", "EHZ");
    down.inclination = Some(180.0);
    let mut level = Fixture::new("CTU", "EHZ");
    level.inclination = Some(90.0);

    let outcome = load(&[down, level]);
    let dip = |station: &str| {
        outcome
            .station("UU", station)
            .unwrap()
            .channels()
            .next()
            .unwrap()
            .dip()
            .unwrap()
    };
    assert_eq!(dip("UGRN"), 90.0);
    assert_eq!(dip("CTU"), 0.0);
}

#[test]
fn test_header_azimuth_is_wrapped() {
    let mut vertical = Fixture::new("UGRN", "HHZ");
    vertical.azimuth = Some(0.0);
    let mut north = Fixture::new("UGRN", "HH1");
    north.azimuth = Some(-5.0);
    let mut east = Fixture::new("UGRN", "HH2");
    east.azimuth = Some(445.0);

    let outcome = load(&[vertical, north, east]);
    let sensor = &outcome.stations[0].three_channel_sensors()[0];
    assert_approx_eq!(sensor.north_channel().unwrap().azimuth().unwrap(), 355.0, 1e-9);
    assert_approx_eq!(sensor.east_channel().unwrap().azimuth().unwrap(), 85.0, 1e-9);
}

#[test]
fn test_two_sensors_and_leftover() {
    let mut fixtures: Vec<Fixture> = ["HHZ", "HHN", "HHE", "HNZ", "HNN", "HNE", "LHZ"]
        .into_iter()
        .map(|c| Fixture::new("UGRN", c))
        .collect();
    let mut other = Fixture::new("UGRN", "EHZ");
    other.location = Some("10");
    fixtures.push(other);

    let outcome = load(&fixtures);
    let station = &outcome.stations[0];
    assert_eq!(station.three_channel_sensors().len(), 2);
    assert_eq!(station.single_channel_sensors().len(), 2);
    assert_eq!(station.number_of_channels(), 8);
    assert_eq!(station.number_of_vertical_channels(), 4);
    assert!(station.channel_exists("EHZ", "10"));
    assert_eq!(outcome.summary.waveforms, 8);
}

#[test]
fn test_split_files_merge_into_segments() {
    let first = Fixture::new("UGRN", "EHZ");
    let mut second = Fixture::new("UGRN", "EHZ");
    second.start = START + 3_600_000_000;

    let outcome = load(&[second, first]);
    let channel = outcome.stations[0].channels().next().unwrap();
    let starts: Vec<i64> = channel.waveform().segments().map(|s| s.start_time()).collect();
    assert_eq!(starts, vec![START, START + 3_600_000_000]);
    assert_eq!(outcome.summary.waveforms, 1);
}
