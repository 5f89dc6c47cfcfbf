//! Waveform file rows from the event catalogue store.
//!
//! The store itself lives outside this crate. Rows arrive as plain values (or
//! JSON) and only the identity, file path and event link are used to build the
//! list of files handed to the loader.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ParameterError, SeismicResult};

/// One row of the `waveform` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformFileRecord {
    /// Row identifier.
    pub identifier: i64,
    /// Event this waveform belongs to.
    pub event_identifier: i64,
    /// Network code.
    pub network: String,
    /// Station code.
    pub station: String,
    /// Channel code.
    pub channel: String,
    /// Location code.
    #[serde(default)]
    pub location_code: String,
    /// Path of the waveform file.
    pub file_path: PathBuf,
    /// Epoch microseconds of the first sample, when the store records it.
    #[serde(default)]
    pub start_time: Option<i64>,
    /// Epoch microseconds of the last sample, when the store records it.
    #[serde(default)]
    pub end_time: Option<i64>,
}

impl WaveformFileRecord {
    /// `NET.STA.LOC.CHA` identity of the row.
    pub fn display_name(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location_code, self.channel
        )
    }

    /// Parse a JSON array of rows.
    ///
    /// # Errors
    /// Malformed JSON or rows missing required columns.
    pub fn from_json_str(json: &str) -> SeismicResult<Vec<Self>> {
        serde_json::from_str(json)
            .map_err(|e| ParameterError::invalid_value("waveform records", e.to_string()).into())
    }
}

/// File paths of every row linked to `event_identifier`, in row order, without duplicates.
pub fn paths_for_event(records: &[WaveformFileRecord], event_identifier: i64) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for record in records
        .iter()
        .filter(|r| r.event_identifier == event_identifier)
    {
        if !paths.contains(&record.file_path) {
            paths.push(record.file_path.clone());
        }
    }
    paths
}
