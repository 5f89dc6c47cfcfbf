//! Loader configuration.
//!
//! Both structs deserialize from JSON with every field optional, so a config
//! file only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sensor::ComponentRole;
use crate::utils::time::TimeWindow;
use crate::{ParameterError, SeismicResult};

/// Location code given to readings whose header has none.
pub const DEFAULT_LOCATION: &str = "01";

/// One orientation convention: the third letters of the vertical, north and east channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    /// Vertical orientation letter.
    pub vertical: char,
    /// First horizontal, assigned to the north slot.
    pub north: char,
    /// Second horizontal, assigned to the east slot.
    pub east: char,
}

impl Triplet {
    /// Create a triplet.
    pub const fn new(vertical: char, north: char, east: char) -> Self {
        Self {
            vertical,
            north,
            east,
        }
    }

    /// Letters with their roles.
    pub const fn letters(&self) -> [(ComponentRole, char); 3] {
        [
            (ComponentRole::Vertical, self.vertical),
            (ComponentRole::North, self.north),
            (ComponentRole::East, self.east),
        ]
    }
}

/// Ordered channel-naming conventions used to pair channels into sensors.
///
/// Order matters: earlier entries are tried first. The defaults follow the
/// SEED naming convention with high-gain seismometers ahead of accelerometers
/// ahead of low-gain instruments, and higher sampling bands first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Instrument letters (second code letter) in priority order.
    pub instrument_codes: Vec<char>,
    /// Band letters (first code letter) in priority order.
    pub band_codes: Vec<char>,
    /// Orientation conventions in priority order.
    pub triplets: Vec<Triplet>,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            instrument_codes: vec!['H', 'N', 'L'],
            band_codes: vec!['F', 'G', 'D', 'C', 'E', 'H', 'S', 'B', 'M', 'L', 'V', 'U'],
            triplets: vec![
                Triplet::new('Z', 'N', 'E'),
                Triplet::new('Z', '1', '2'),
                Triplet::new('Z', 'R', 'T'),
                Triplet::new('L', 'Q', 'T'),
                Triplet::new('3', '1', '2'),
            ],
        }
    }
}

impl CatalogueConfig {
    /// Check that every list is non-empty, every letter is an upper-case ASCII
    /// alphanumeric and every triplet letter fits its role.
    ///
    /// # Errors
    /// Names the first offending field.
    pub fn validate(&self) -> SeismicResult<()> {
        for (field, codes) in [
            ("instrument_codes", &self.instrument_codes),
            ("band_codes", &self.band_codes),
        ] {
            if codes.is_empty() {
                return Err(ParameterError::invalid_value(field, "must not be empty").into());
            }
            if let Some(bad) = codes.iter().find(|c| !is_code_letter(**c)) {
                return Err(ParameterError::invalid_value(
                    field,
                    format!("'{bad}' is not an upper-case letter or digit"),
                )
                .into());
            }
        }
        if self.triplets.is_empty() {
            return Err(ParameterError::invalid_value("triplets", "must not be empty").into());
        }
        for triplet in &self.triplets {
            for (role, letter) in triplet.letters() {
                if !role.accepts(letter) {
                    return Err(ParameterError::invalid_value(
                        "triplets",
                        format!("'{letter}' is not a {} orientation", role.name()),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[inline]
fn is_code_letter(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

/// Settings for [`crate::loader::Loader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Location code substituted when a header has none.
    pub default_location: String,
    /// Only keep samples inside this window.
    pub time_window: Option<TimeWindow>,
    /// Channel pairing conventions.
    pub catalogue: CatalogueConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION.to_string(),
            time_window: None,
            catalogue: CatalogueConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Default configuration restricted to `window`.
    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    /// Parse from a JSON string.
    ///
    /// # Errors
    /// Malformed JSON or a configuration that fails [`LoaderConfig::validate`].
    pub fn from_json_str(json: &str) -> SeismicResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ParameterError::invalid_value("loader config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    /// I/O failures plus everything [`LoaderConfig::from_json_str`] reports.
    pub fn from_json_file(path: impl AsRef<Path>) -> SeismicResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    /// Only if serialization itself fails.
    pub fn to_json_string(&self) -> SeismicResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ParameterError::invalid_value("loader config", e.to_string()).into())
    }

    /// Check the configuration.
    ///
    /// # Errors
    /// The default location must be non-blank; the catalogue must validate.
    pub fn validate(&self) -> SeismicResult<()> {
        if crate::channel::normalize_code(&self.default_location).is_empty() {
            return Err(
                ParameterError::invalid_value("default_location", "must not be blank").into(),
            );
        }
        // deserialized windows bypass TimeWindow::new
        if let Some(window) = self.time_window {
            TimeWindow::new(window.start(), window.end())?;
        }
        self.catalogue.validate()
    }
}
