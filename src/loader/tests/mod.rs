//! Loader tests against synthetic SAC files on disk.

use std::path::{Path, PathBuf};

use crate::io::sac::{SacFile, SacHeader};

mod load_tests;
mod scenario_tests;

/// 2020-02-01T12:30:15.250Z
pub(crate) const START: i64 = 1_580_560_215_250_000;

/// Header fields for one synthetic channel file.
#[derive(Debug, Clone)]
pub(crate) struct Fixture {
    pub network: &'static str,
    pub station: &'static str,
    pub location: Option<&'static str>,
    pub channel: &'static str,
    pub inclination: Option<f32>,
    pub azimuth: Option<f32>,
    pub samples: usize,
    pub rate: f32,
    pub start: i64,
}

impl Fixture {
    pub(crate) fn new(station: &'static str, channel: &'static str) -> Self {
        Self {
            network: "UU",
            station,
            location: None,
            channel,
            inclination: None,
            azimuth: None,
            samples: 10,
            rate: 40.0,
            start: START,
        }
    }

    pub(crate) fn sac(&self) -> SacFile {
        let mut header = SacHeader {
            delta: 1.0 / self.rate,
            knetwk: self.network.to_string(),
            kstnm: self.station.to_string(),
            kcmpnm: self.channel.to_string(),
            ..SacHeader::default()
        };
        if let Some(location) = self.location {
            header.khole = location.to_string();
        }
        if let Some(inclination) = self.inclination {
            header.cmpinc = inclination;
        }
        if let Some(azimuth) = self.azimuth {
            header.cmpaz = azimuth;
        }
        header.set_start_time(self.start);
        SacFile {
            header,
            data: (0..self.samples).map(|i| (i as f32 * 0.5).sin()).collect(),
        }
    }

    /// Write under `dir` with a name derived from the identity.
    pub(crate) fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!(
            "{}.{}.{}.{}.{}.sac",
            self.network,
            self.station,
            self.location.unwrap_or(""),
            self.channel,
            self.start
        ));
        self.sac().write(&path).unwrap();
        path
    }
}
