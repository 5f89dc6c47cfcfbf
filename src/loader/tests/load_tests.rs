//! Batch behaviour: skipping, windows, progress and precision dispatch.

use std::sync::Arc;

use super::{Fixture, START};
use crate::loader::{CountingProgress, Loader, LoaderConfig, WaveformFileRecord};
use crate::utils::time::TimeWindow;
use crate::Precision;

fn loader() -> Loader {
    Loader::new(LoaderConfig::default()).unwrap()
}

#[test]
fn test_corrupt_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = Fixture::new("UGRN", "EHZ").write(dir.path());
    let corrupt = dir.path().join("corrupt.sac");
    std::fs::write(&corrupt, vec![0xFFu8; 700]).unwrap();
    let short = dir.path().join("short.sac");
    std::fs::write(&short, b"SAC").unwrap();

    let outcome = loader().load::<f32, _>(&[corrupt.clone(), good, short.clone()]);

    assert_eq!(outcome.summary.stations, 1);
    assert_eq!(outcome.summary.waveforms, 1);
    assert_eq!(outcome.skipped.len(), 2);
    assert!(outcome.skipped.iter().any(|s| s.path == corrupt));
    assert!(outcome.skipped.iter().any(|s| s.path == short));
}

#[test]
fn test_out_of_range_times_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = Fixture::new("UGRN", "EHZ").write(dir.path());

    let mut slow = Fixture::new("SLOW", "EHZ").sac();
    slow.header.delta = 1.0e30;
    let slow_path = dir.path().join("slow.sac");
    slow.write(&slow_path).unwrap();

    let mut late = Fixture::new("LATE", "EHZ").sac();
    late.header.b = 1.0e30;
    let late_path = dir.path().join("late.sac");
    late.write(&late_path).unwrap();

    let outcome = loader().load::<f32, _>(&[slow_path.clone(), good, late_path.clone()]);

    assert_eq!(outcome.summary.stations, 1);
    assert_eq!(outcome.stations[0].name(), "UGRN");
    assert_eq!(outcome.skipped.len(), 2);
    let reason_for = |path: &std::path::Path| {
        outcome
            .skipped
            .iter()
            .find(|s| s.path == path)
            .map(|s| s.reason.clone())
            .unwrap()
    };
    assert!(reason_for(&slow_path).contains("'delta'"));
    assert!(reason_for(&late_path).contains("'b'"));
}

#[test]
fn test_missing_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = loader().load::<f64, _>(&[dir.path().join("absent.sac")]);
    assert!(outcome.stations.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.summary.to_string(), "0 stations, 0 waveforms");
}

#[test]
fn test_missing_network_names_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = Fixture::new("UGRN", "HHZ");
    fixture.network = "-12345";
    let path = fixture.write(dir.path());

    let outcome = loader().load::<f32, _>(&[path]);
    assert!(outcome.stations.is_empty());
    assert!(outcome.skipped[0].reason.contains("network"));
}

#[test]
fn test_bad_channel_code_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::new("UGRN", "HHZZ").write(dir.path());
    let outcome = loader().load::<f32, _>(&[path]);
    assert!(outcome.stations.is_empty());
    assert!(outcome.skipped[0].reason.contains("HHZZ"));
}

#[test]
fn test_time_window_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::new("UGRN", "EHZ").write(dir.path());

    // 40 Hz: samples 4..=7 lie in [100 ms, 175 ms]
    let window = TimeWindow::new(START + 100_000, START + 175_000).unwrap();
    let loader = Loader::new(LoaderConfig::default().with_time_window(window)).unwrap();
    let outcome = loader.load::<f32, _>(&[path.clone()]);

    let channel = outcome.stations[0].channels().next().unwrap();
    assert_eq!(channel.waveform().cumulative_number_of_samples(), 4);
    assert_eq!(channel.waveform().earliest_time().unwrap(), START + 100_000);

    let outside = TimeWindow::new(START - 10_000_000, START - 1).unwrap();
    let loader = Loader::new(LoaderConfig::default().with_time_window(outside)).unwrap();
    let outcome = loader.load::<f32, _>(&[path]);
    assert!(outcome.stations.is_empty());
    assert!(outcome.skipped[0].reason.contains("samples"));
}

#[test]
fn test_progress_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        Fixture::new("UGRN", "HHZ").write(dir.path()),
        dir.path().join("missing.sac"),
    ];
    let progress = Arc::new(CountingProgress::new());
    let loader = loader().with_progress(Arc::clone(&progress));
    let _ = loader.load::<f32, _>(&paths);

    assert_eq!(progress.total(), 2);
    assert_eq!(progress.done(), 2);
    assert_eq!(progress.failed(), 1);
}

#[test]
fn test_load_any_dispatches_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::new("UGRN", "HHZ").write(dir.path());

    let loaded = loader().load_any(&[path], Precision::Double);
    assert_eq!(loaded.precision(), Precision::Double);
    assert_eq!(loaded.summary().waveforms, 1);
    assert!(loaded.skipped().is_empty());
}

#[test]
fn test_load_event_uses_records() {
    let dir = tempfile::tempdir().unwrap();
    let record = |identifier: i64, event_identifier: i64, channel: &'static str| {
        let path = Fixture::new("UGRN", channel).write(dir.path());
        WaveformFileRecord {
            identifier,
            event_identifier,
            network: "UU".to_string(),
            station: "UGRN".to_string(),
            channel: channel.to_string(),
            location_code: String::new(),
            file_path: path,
            start_time: None,
            end_time: None,
        }
    };
    let records = vec![
        record(1, 7, "HHZ"),
        record(2, 7, "HHN"),
        record(3, 7, "HHE"),
        record(4, 8, "ENZ"),
    ];

    let outcome = loader().load_event::<f32>(&records, 7);
    assert_eq!(outcome.summary.stations, 1);
    assert_eq!(outcome.summary.waveforms, 3);
    assert_eq!(outcome.stations[0].three_channel_sensors().len(), 1);
}

#[test]
fn test_custom_location_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::new("UGRN", "HHZ").write(dir.path());
    let config = LoaderConfig {
        default_location: "00".to_string(),
        ..LoaderConfig::default()
    };
    let outcome = Loader::new(config).unwrap().load::<f32, _>(&[path]);
    let channel = outcome.stations[0].channels().next().unwrap();
    assert_eq!(channel.location_code(), "00");
}

#[test]
fn test_invalid_config_rejected() {
    let config = LoaderConfig {
        default_location: " ".to_string(),
        ..LoaderConfig::default()
    };
    assert!(Loader::new(config).is_err());
}
