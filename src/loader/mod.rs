//! Batch loading of waveform files into stations.
//!
//! [`Loader::load`] reads every file with a [`WaveformReader`], normalizes the
//! headers, and hands the readings to the grouper which pairs channels into
//! sensors using the [`Catalogue`]. A file that cannot be read or lacks a
//! required header field is logged, recorded in [`LoadOutcome::skipped`] and
//! otherwise ignored; a load never fails as a whole.
//!
//! With the `parallel-processing` feature files are read on the rayon thread
//! pool. Grouping always runs on the calling thread.
//!
//! ```no_run
//! use seismic_samples::loader::{Loader, LoaderConfig};
//!
//! let loader = Loader::new(LoaderConfig::default())?;
//! let outcome = loader.load::<f32, _>(&["UU.UGRN.HHZ.sac", "UU.UGRN.HHN.sac", "UU.UGRN.HHE.sac"]);
//! println!("{}", outcome.summary);
//! # Ok::<(), seismic_samples::SeismicError>(())
//! ```

pub mod catalogue;
pub mod config;
pub mod grouper;
pub mod progress;
pub mod records;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel-processing")]
use rayon::prelude::*;
use tracing::{info, warn};

pub use catalogue::{Candidate, Catalogue};
pub use config::{CatalogueConfig, DEFAULT_LOCATION, LoaderConfig, Triplet};
pub use grouper::{ChannelReading, Grouping, group_readings, inclination_to_dip, normalize_azimuth};
pub use progress::{CountingProgress, LoadProgress};
#[cfg(feature = "progress-tracking")]
pub use progress::ProgressBarReporter;
pub use records::{WaveformFileRecord, paths_for_event};

use crate::io::reader::{SacReader, WaveformReader};
use crate::{Precision, Sample, SeismicResult, Station};
use progress::Tracker;

/// An input that did not make it into any station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    /// The offending file.
    pub path: PathBuf,
    /// Human-readable reason, naming the field where one is to blame.
    pub reason: String,
}

/// Counts reported at the end of a batch load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Stations assembled.
    pub stations: usize,
    /// Channel waveforms across all stations.
    pub waveforms: usize,
}

impl LoadSummary {
    /// Count stations and their waveforms.
    pub fn of<T: Sample>(stations: &[Station<T>]) -> Self {
        Self {
            stations: stations.len(),
            waveforms: stations.iter().map(Station::number_of_channels).sum(),
        }
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stations, {} waveforms", self.stations, self.waveforms)
    }
}

/// Result of a batch load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome<T: Sample> {
    /// Non-empty stations ordered by network then station code.
    pub stations: Vec<Station<T>>,
    /// Files that were skipped and why.
    pub skipped: Vec<SkippedInput>,
    /// Final counts.
    pub summary: LoadSummary,
}

impl<T: Sample> LoadOutcome<T> {
    /// Station by network and name.
    pub fn station(&self, network_code: &str, name: &str) -> Option<&Station<T>> {
        self.stations
            .iter()
            .find(|s| s.network_code() == network_code && s.name() == name)
    }
}

/// A load at the precision chosen at run time.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyStations {
    /// Single precision samples.
    F32(LoadOutcome<f32>),
    /// Double precision samples.
    F64(LoadOutcome<f64>),
}

impl AnyStations {
    /// Precision of the loaded samples.
    pub const fn precision(&self) -> Precision {
        match self {
            AnyStations::F32(_) => Precision::Single,
            AnyStations::F64(_) => Precision::Double,
        }
    }

    /// Final counts.
    pub const fn summary(&self) -> LoadSummary {
        match self {
            AnyStations::F32(outcome) => outcome.summary,
            AnyStations::F64(outcome) => outcome.summary,
        }
    }

    /// Files that were skipped.
    pub fn skipped(&self) -> &[SkippedInput] {
        match self {
            AnyStations::F32(outcome) => &outcome.skipped,
            AnyStations::F64(outcome) => &outcome.skipped,
        }
    }
}

/// Reads files and assembles stations.
pub struct Loader<R: WaveformReader = SacReader> {
    config: LoaderConfig,
    catalogue: Catalogue,
    reader: R,
    progress: Option<Box<dyn LoadProgress>>,
}

impl Loader<SacReader> {
    /// Loader for SAC files.
    ///
    /// # Errors
    /// Fails if the configuration does not validate.
    pub fn new(config: LoaderConfig) -> SeismicResult<Self> {
        Self::with_reader(config, SacReader)
    }
}

impl<R: WaveformReader + Sync> Loader<R> {
    /// Loader using a custom reader.
    ///
    /// # Errors
    /// Fails if the configuration does not validate.
    pub fn with_reader(config: LoaderConfig, reader: R) -> SeismicResult<Self> {
        config.validate()?;
        let catalogue = Catalogue::new(&config.catalogue)?;
        Ok(Self {
            config,
            catalogue,
            reader,
            progress: None,
        })
    }

    /// Report progress to `reporter`.
    pub fn with_progress(mut self, reporter: impl LoadProgress + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }

    /// The active configuration.
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The expanded catalogue.
    pub const fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Read one file and normalize its headers.
    ///
    /// # Errors
    /// Reader failures and missing or malformed header fields.
    pub fn read_one<T: Sample>(&self, path: &Path) -> SeismicResult<ChannelReading<T>> {
        let raw = self.reader.read::<T>(path, self.config.time_window)?;
        ChannelReading::from_raw(path, raw, &self.config.default_location)
    }

    /// Load `paths` into stations.
    pub fn load<T: Sample, P: AsRef<Path> + Sync>(&self, paths: &[P]) -> LoadOutcome<T> {
        let tracker = Tracker::start(self.progress.as_deref(), paths.len());
        let read = |path: &Path| {
            let result = self.read_one::<T>(path);
            tracker.file_done(path, result.is_ok());
            result.map_err(|err| {
                warn!(
                    path = %path.display(),
                    field = grouper::offending_field(&err),
                    error = %err,
                    "skipping waveform file"
                );
                SkippedInput {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                }
            })
        };

        #[cfg(feature = "parallel-processing")]
        let results: Vec<_> = paths.par_iter().map(|p| read(p.as_ref())).collect();
        #[cfg(not(feature = "parallel-processing"))]
        let results: Vec<_> = paths.iter().map(|p| read(p.as_ref())).collect();

        let mut readings = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for result in results {
            match result {
                Ok(reading) => readings.push(reading),
                Err(input) => skipped.push(input),
            }
        }

        let grouping = group_readings(readings, &self.catalogue);
        skipped.extend(grouping.skipped);
        let summary = LoadSummary::of(&grouping.stations);
        let elapsed = tracker.finish(&summary);
        info!(
            stations = summary.stations,
            waveforms = summary.waveforms,
            skipped = skipped.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "finished loading waveforms"
        );

        LoadOutcome {
            stations: grouping.stations,
            skipped,
            summary,
        }
    }

    /// Load every file linked to `event_identifier`.
    pub fn load_event<T: Sample>(
        &self,
        records: &[WaveformFileRecord],
        event_identifier: i64,
    ) -> LoadOutcome<T> {
        self.load(&paths_for_event(records, event_identifier))
    }

    /// Load at a precision chosen at run time.
    pub fn load_any<P: AsRef<Path> + Sync>(&self, paths: &[P], precision: Precision) -> AnyStations {
        match precision {
            Precision::Single => AnyStations::F32(self.load(paths)),
            Precision::Double => AnyStations::F64(self.load(paths)),
        }
    }
}
