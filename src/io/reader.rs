//! The waveform-reader seam used by the loader.
//!
//! A reader turns one file into one [`RawReading`]: header identity, optional
//! orientation and position, and the samples. Absent numeric fields are passed
//! through as [`ABSENT`] and absent strings as the format's own marker; the
//! loader translates both into `Option`s before anything reaches the data model.

use std::path::Path;

use crate::io::sac::{self, SacFile};
use crate::utils::time::{TimeWindow, checked_sample_offset_micros, sample_offset_micros};
use crate::{ParameterError, Precision, Sample, SeismicResult};

/// Marker for an absent numeric header field.
pub const ABSENT: f64 = sac::UNDEFINED_FLOAT as f64;

/// Marker for an absent string header field.
pub const ABSENT_STRING: &str = sac::UNDEFINED_STRING;

/// One channel read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading<T: Sample> {
    /// Network code as stored in the file.
    pub network_code: String,
    /// Station code as stored in the file.
    pub station_code: String,
    /// Channel code as stored in the file.
    pub channel_code: String,
    /// Location code as stored in the file.
    pub location_code: String,
    /// Azimuth in degrees, or [`ABSENT`].
    pub azimuth: f64,
    /// Inclination from vertical in degrees, or [`ABSENT`].
    pub inclination: f64,
    /// Latitude in degrees, or [`ABSENT`].
    pub latitude: f64,
    /// Longitude in degrees, or [`ABSENT`].
    pub longitude: f64,
    /// Elevation in meters, or [`ABSENT`].
    pub elevation: f64,
    /// Sampling rate in Hz.
    pub sampling_rate: f64,
    /// Epoch microseconds of the first returned sample.
    pub start_time: i64,
    /// Number of returned samples.
    pub sample_count: usize,
    /// The samples.
    pub samples: Vec<T>,
}

/// Reads one waveform file into a [`RawReading`].
pub trait WaveformReader {
    /// Read `path`, keeping only samples inside `window` when one is given.
    ///
    /// # Errors
    /// Format and I/O failures for this file.
    fn read<T: Sample>(
        &self,
        path: &Path,
        window: Option<TimeWindow>,
    ) -> SeismicResult<RawReading<T>>;
}

/// Supported waveform file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    /// SAC binary.
    #[default]
    Sac,
}

impl FileType {
    /// Guess the type from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        extension.eq_ignore_ascii_case("sac").then_some(Self::Sac)
    }
}

/// Reader for SAC binary files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SacReader;

impl WaveformReader for SacReader {
    fn read<T: Sample>(
        &self,
        path: &Path,
        window: Option<TimeWindow>,
    ) -> SeismicResult<RawReading<T>> {
        let file = SacFile::read(path)?;
        reading_from_sac(file, window)
    }
}

/// Convert a decoded SAC file into a reading.
///
/// # Errors
/// Fails when `delta` or the reference time is unset, and when `delta` or `b`
/// puts a sample outside the representable time range.
pub fn reading_from_sac<T: Sample>(
    file: SacFile,
    window: Option<TimeWindow>,
) -> SeismicResult<RawReading<T>> {
    let header = file.header;
    let delta = sac::defined_float(header.delta)
        .filter(|d| *d > 0.0)
        .ok_or_else(|| ParameterError::missing_field("delta"))?;
    let sampling_rate = nominal_rate(1.0 / f64::from(delta));
    let start_time = header.start_time()?;
    checked_sample_offset_micros(file.data.len().saturating_sub(1), sampling_rate)
        .and_then(|offset| start_time.checked_add(offset))
        .ok_or_else(|| {
            ParameterError::invalid_value(
                "delta",
                format!(
                    "{delta} s over {} samples ends outside the representable time range",
                    file.data.len()
                ),
            )
        })?;

    let (first, last) = match window {
        Some(window) => window_indices(start_time, sampling_rate, file.data.len(), window),
        None => (0, file.data.len()),
    };
    let samples: Vec<T> = file.data[first..last]
        .iter()
        .map(|&v| T::from_raw_f32(v))
        .collect();

    Ok(RawReading {
        network_code: header.knetwk,
        station_code: header.kstnm,
        channel_code: header.kcmpnm,
        location_code: header.khole,
        azimuth: f64::from(header.cmpaz),
        inclination: f64::from(header.cmpinc),
        latitude: f64::from(header.stla),
        longitude: f64::from(header.stlo),
        elevation: f64::from(header.stel),
        sampling_rate,
        start_time: start_time.saturating_add(sample_offset_micros(first, sampling_rate)),
        sample_count: samples.len(),
        samples,
    })
}

/// Undo the single-precision quantization of `delta`: 1 / 0.025f32 is 39.9999994.
fn nominal_rate(rate: f64) -> f64 {
    let snapped = (rate * 1.0e3).round() / 1.0e3;
    if (snapped - rate).abs() <= 1.0e-6 * rate {
        snapped
    } else {
        rate
    }
}

/// Half-open index range of samples whose time falls inside `window`.
fn window_indices(start: i64, rate: f64, len: usize, window: TimeWindow) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }
    let to_index = |time: i64| time.saturating_sub(start) as f64 * rate / 1.0e6;
    let first = to_index(window.start()).ceil().max(0.0);
    let last = (to_index(window.end()).floor() + 1.0).min(len as f64);
    if last <= first {
        return (0, 0);
    }
    (first as usize, last as usize)
}

/// A reading at either precision.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyReading {
    /// Single precision samples.
    F32(RawReading<f32>),
    /// Double precision samples.
    F64(RawReading<f64>),
}

impl AnyReading {
    /// Precision of the contained samples.
    pub const fn precision(&self) -> Precision {
        match self {
            AnyReading::F32(_) => Precision::Single,
            AnyReading::F64(_) => Precision::Double,
        }
    }

    /// Number of samples.
    pub const fn sample_count(&self) -> usize {
        match self {
            AnyReading::F32(r) => r.sample_count,
            AnyReading::F64(r) => r.sample_count,
        }
    }
}

/// Read `path` at the precision chosen at run time.
///
/// # Errors
/// Fails for unrecognized file types and for whatever the reader reports.
pub fn read_any(
    path: &Path,
    precision: Precision,
    window: Option<TimeWindow>,
) -> SeismicResult<AnyReading> {
    let reader = match FileType::from_path(path).unwrap_or_default() {
        FileType::Sac => SacReader,
    };
    Ok(match precision {
        Precision::Single => AnyReading::F32(reader.read(path, window)?),
        Precision::Double => AnyReading::F64(reader.read(path, window)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sac::SacHeader;
    use approx_eq::assert_approx_eq;

    fn file(samples: usize) -> SacFile {
        let mut header = SacHeader {
            delta: 0.025,
            knetwk: "UU".to_string(),
            kstnm: "UGRN".to_string(),
            kcmpnm: "HHE".to_string(),
            cmpaz: 90.0,
            cmpinc: 90.0,
            ..SacHeader::default()
        };
        header.set_start_time(1_000_000_000_000_000);
        SacFile {
            header,
            data: (0..samples).map(|i| i as f32).collect(),
        }
    }

    #[test]
    fn test_reading_from_sac() {
        let reading: RawReading<f64> = reading_from_sac(file(10), None).unwrap();
        assert_approx_eq!(reading.sampling_rate, 40.0, 1e-4);
        assert_eq!(reading.start_time, 1_000_000_000_000_000);
        assert_eq!(reading.sample_count, 10);
        assert_eq!(reading.location_code, ABSENT_STRING);
        assert_eq!(reading.latitude, ABSENT);
        assert_approx_eq!(reading.azimuth, 90.0, 1e-9);
    }

    #[test]
    fn test_window_cut() {
        let start = 1_000_000_000_000_000;
        // samples 2..=5 fall in [50 ms, 130 ms]
        let window = TimeWindow::new(start + 50_000, start + 130_000).unwrap();
        let reading: RawReading<f32> = reading_from_sac(file(10), Some(window)).unwrap();
        assert_eq!(reading.samples, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(reading.start_time, start + 50_000);

        let outside = TimeWindow::new(start + 10_000_000, start + 20_000_000).unwrap();
        let reading: RawReading<f32> = reading_from_sac(file(10), Some(outside)).unwrap();
        assert_eq!(reading.sample_count, 0);
    }

    #[test]
    fn test_missing_delta() {
        let mut sac = file(3);
        sac.header.delta = sac::UNDEFINED_FLOAT;
        let err = reading_from_sac::<f32>(sac, None).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("delta"));
    }

    #[test]
    fn test_span_past_time_range() {
        let mut sac = file(3);
        sac.header.delta = 1.0e30;
        let err = reading_from_sac::<f32>(sac, None).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("'delta'"));

        let mut sac = file(3);
        sac.header.b = 1.0e30;
        let err = reading_from_sac::<f32>(sac, None).unwrap_err();
        assert!(err.to_string().contains("'b'"));

        // a single sample has no span to overflow
        let mut sac = file(1);
        sac.header.delta = 1.0e30;
        assert_eq!(reading_from_sac::<f32>(sac, None).unwrap().sample_count, 1);
    }

    #[test]
    fn test_read_any_precision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UU.UGRN.HHE.sac");
        file(4).write(&path).unwrap();

        let reading = read_any(&path, Precision::Double, None).unwrap();
        assert_eq!(reading.precision(), Precision::Double);
        assert_eq!(reading.sample_count(), 4);
        assert_eq!(FileType::from_path(&path), Some(FileType::Sac));
        assert_eq!(FileType::from_path(Path::new("trace.mseed")), None);
    }
}
