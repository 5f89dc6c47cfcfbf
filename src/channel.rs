//! One sensor component and its waveform.

use crate::{
    ParameterError, Sample, SeismicResult, SimpleResponse, UnavailableError, Waveform,
};

/// Required length of a channel code.
pub const CHANNEL_CODE_LENGTH: usize = 3;

/// Strip all whitespace and upper-case a code.
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// One component of a sensor.
///
/// The channel code is always exactly three characters: band, instrument and
/// orientation, e.g. `HHZ`. Azimuth and dip are optional and range-checked when set.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel<T: Sample> {
    channel_code: String,
    location_code: String,
    azimuth: Option<f64>,
    dip: Option<f64>,
    waveform: Waveform<T>,
    response: Option<SimpleResponse>,
}

impl<T: Sample> Channel<T> {
    /// Create a channel with the given code and an empty waveform.
    ///
    /// # Errors
    /// Fails if the normalized code is not exactly three characters.
    pub fn new(channel_code: &str) -> SeismicResult<Self> {
        let mut channel = Self {
            channel_code: String::new(),
            location_code: String::new(),
            azimuth: None,
            dip: None,
            waveform: Waveform::new(),
            response: None,
        };
        channel.set_channel_code(channel_code)?;
        Ok(channel)
    }

    /// Set the channel code after stripping whitespace and upper-casing.
    ///
    /// # Errors
    /// Fails if the normalized code is not exactly three characters; the channel is unchanged.
    pub fn set_channel_code(&mut self, channel_code: &str) -> SeismicResult<()> {
        let code = normalize_code(channel_code);
        if code.chars().count() != CHANNEL_CODE_LENGTH {
            return Err(ParameterError::ChannelCodeLength { code }.into());
        }
        self.waveform.set_channel_code(code.clone());
        self.channel_code = code;
        Ok(())
    }

    /// Set the location code after stripping whitespace and upper-casing.
    pub fn set_location_code(&mut self, location_code: &str) {
        let code = normalize_code(location_code);
        self.waveform.set_location_code(code.clone());
        self.location_code = code;
    }

    /// Set the azimuth in degrees clockwise from north.
    ///
    /// # Errors
    /// Rejects values outside `[0, 360)`.
    pub fn set_azimuth(&mut self, azimuth: f64) -> SeismicResult<()> {
        if !(0.0..360.0).contains(&azimuth) {
            return Err(
                ParameterError::invalid_value("azimuth", format!("{azimuth} not in [0, 360)"))
                    .into(),
            );
        }
        self.azimuth = Some(azimuth);
        Ok(())
    }

    /// Set the dip in degrees down from horizontal.
    ///
    /// # Errors
    /// Rejects values outside `[-90, 90]`.
    pub fn set_dip(&mut self, dip: f64) -> SeismicResult<()> {
        if !(-90.0..=90.0).contains(&dip) {
            return Err(ParameterError::invalid_value("dip", format!("{dip} not in [-90, 90]")).into());
        }
        self.dip = Some(dip);
        Ok(())
    }

    /// Replace the waveform. Its channel and location codes are overwritten with this channel's.
    pub fn set_waveform(&mut self, mut waveform: Waveform<T>) {
        waveform.set_channel_code(self.channel_code.clone());
        waveform.set_location_code(self.location_code.clone());
        self.waveform = waveform;
    }

    /// Attach a scalar response.
    pub fn set_simple_response(&mut self, response: SimpleResponse) {
        self.response = Some(response);
    }

    /// Three-letter channel code.
    pub fn channel_code(&self) -> &str {
        &self.channel_code
    }

    /// Location code.
    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    /// Orientation letter, the third character of the channel code.
    pub fn orientation_code(&self) -> char {
        self.channel_code.chars().nth(2).unwrap_or(' ')
    }

    /// Whether an azimuth has been set.
    pub const fn has_azimuth(&self) -> bool {
        self.azimuth.is_some()
    }

    /// Whether a dip has been set.
    pub const fn has_dip(&self) -> bool {
        self.dip.is_some()
    }

    /// Azimuth in degrees.
    ///
    /// # Errors
    /// Fails with an unavailable error if never set.
    pub fn azimuth(&self) -> SeismicResult<f64> {
        self.azimuth
            .ok_or_else(|| UnavailableError::new("azimuth", "never set").into())
    }

    /// Dip in degrees.
    ///
    /// # Errors
    /// Fails with an unavailable error if never set.
    pub fn dip(&self) -> SeismicResult<f64> {
        self.dip
            .ok_or_else(|| UnavailableError::new("dip", "never set").into())
    }

    /// The channel's waveform.
    pub const fn waveform(&self) -> &Waveform<T> {
        &self.waveform
    }

    /// Mutable access to the waveform.
    pub fn waveform_mut(&mut self) -> &mut Waveform<T> {
        &mut self.waveform
    }

    /// The attached scalar response, if any.
    pub const fn simple_response(&self) -> Option<&SimpleResponse> {
        self.response.as_ref()
    }

    /// `NET.STA.LOC.CHA` label.
    pub fn display_name(&self) -> String {
        self.waveform.display_name()
    }
}
