//! Error types and result utilities for seismic data operations.
//!
//! Errors fall into three families so callers can tell them apart:
//!
//! - [`ParameterError`]: malformed input rejected at construction or assignment
//!   (bad header field, wrong-length channel code, non-positive sampling rate).
//! - [`InvariantError`]: an insertion that would break a structural rule
//!   (duplicate channel on a station, orientation letter in the wrong role).
//! - [`UnavailableError`]: a derived value was queried before it was set.
//!
//! File-level failures are reported through [`FormatError`] and [`std::io::Error`].

use std::path::PathBuf;

use thiserror::Error;

/// Convenience type alias for results that may contain a [`SeismicError`].
pub type SeismicResult<T> = Result<T, SeismicError>;

/// Top-level error for all operations in this crate.
#[derive(Error, Debug)]
pub enum SeismicError {
    /// Malformed input.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Structural invariant violated on insertion.
    #[error(transparent)]
    Invariant(#[from] InvariantError),

    /// A value was read before it was available.
    #[error(transparent)]
    Unavailable(#[from] UnavailableError),

    /// A waveform file could not be decoded.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeismicError {
    /// Returns true for malformed-input errors.
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self, Self::Parameter(_))
    }

    /// Returns true for invariant violations.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// Returns true when the error means "not yet available" rather than "invalid".
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Malformed input rejected at construction or assignment time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is outside its valid domain.
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        /// Name of the parameter.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required header field is absent.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// Channel codes must be exactly three characters.
    #[error("Channel code '{code}' must be exactly 3 characters")]
    ChannelCodeLength {
        /// The offending code after normalization.
        code: String,
    },

    /// Sample buffer length disagrees with the declared sample count.
    #[error("Sample buffer holds {actual} values but {declared} were declared")]
    SampleCountMismatch {
        /// Declared number of samples.
        declared: usize,
        /// Number of samples actually present.
        actual: usize,
    },
}

impl ParameterError {
    /// Create an invalid-value error.
    pub fn invalid_value(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Rejected insertion that would break a structural rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantError {
    /// Channel code and location code already present on the station.
    #[error("Channel {channel_code} at location '{location_code}' already exists on {station}")]
    DuplicateChannel {
        /// Station display name.
        station: String,
        /// Colliding channel code.
        channel_code: String,
        /// Colliding location code.
        location_code: String,
    },

    /// Orientation letter does not fit the role the channel is assigned to.
    #[error("Channel {channel_code} cannot be used as the {role} component")]
    OrientationMismatch {
        /// The rejected channel code.
        channel_code: String,
        /// Role name.
        role: &'static str,
    },

    /// Channel location differs from the owning sensor.
    #[error("Channel location '{channel_location}' differs from sensor location '{sensor_location}'")]
    LocationMismatch {
        /// Location code on the channel.
        channel_location: String,
        /// Location code on the sensor.
        sensor_location: String,
    },
}

impl InvariantError {
    /// Create an orientation mismatch error.
    pub fn orientation(channel_code: impl Into<String>, role: &'static str) -> Self {
        Self::OrientationMismatch {
            channel_code: channel_code.into(),
            role,
        }
    }
}

/// A derived value was queried before it was set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{what} is not available: {reason}")]
pub struct UnavailableError {
    /// The value that was requested.
    pub what: &'static str,
    /// Why it is not available.
    pub reason: &'static str,
}

impl UnavailableError {
    /// Create a new precondition failure.
    pub const fn new(what: &'static str, reason: &'static str) -> Self {
        Self { what, reason }
    }
}

/// Failure to decode a waveform file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// File is shorter than the fixed header.
    #[error("{}: truncated header ({len} bytes)", path.display())]
    TruncatedHeader {
        /// Offending file.
        path: PathBuf,
        /// Bytes available.
        len: usize,
    },

    /// Header version did not match in either byte order.
    #[error("{}: unsupported header version", path.display())]
    UnknownByteOrder {
        /// Offending file.
        path: PathBuf,
    },

    /// Data section is shorter than the header claims.
    #[error("{}: header declares {declared} samples but only {available} are present", path.display())]
    TruncatedData {
        /// Offending file.
        path: PathBuf,
        /// Samples declared by the header.
        declared: usize,
        /// Samples actually present.
        available: usize,
    },

    /// Only evenly sampled time series are supported.
    #[error("{}: {reason}", path.display())]
    Unsupported {
        /// Offending file.
        path: PathBuf,
        /// What is unsupported.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err: SeismicError = ParameterError::invalid_value("rate", "must be > 0").into();
        assert!(err.is_malformed_input());
        assert!(!err.is_unavailable());

        let err: SeismicError = UnavailableError::new("end time", "sampling rate not set").into();
        assert!(err.is_unavailable());
        assert!(!err.is_invariant_violation());

        let err: SeismicError = InvariantError::orientation("HHN", "vertical").into();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = ParameterError::missing_field("knetwk");
        assert!(err.to_string().contains("knetwk"));

        let err = ParameterError::ChannelCodeLength {
            code: "HHZZ".to_string(),
        };
        assert!(err.to_string().contains("HHZZ"));
    }
}
