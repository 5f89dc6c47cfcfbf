//! Sample type abstraction shared by every container in the data model.

use bytemuck::Pod;
use num_traits::{Float, FromPrimitive, NumCast};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Core trait defining the interface for waveform sample types.
///
/// Implemented for `f32` and `f64`. Every type in the data model
/// (`Segment`, `Waveform`, `Channel`, sensors and `Station`) is generic over it,
/// so one implementation serves both precisions.
///
/// All implementors support:
/// - Floating point arithmetic through [`num_traits::Float`]
/// - Lossless casting to `f64` for rendering and statistics
/// - A plain-old-data layout ([`bytemuck::Pod`])
pub trait Sample:
    Float
    + FromPrimitive
    + NumCast
    + Pod
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + Serialize
    + for<'de> Deserialize<'de>
    + 'static
{
    /// Precision tag for this sample type.
    const PRECISION: Precision;

    /// Widen this sample to `f64`.
    fn to_f64_lossless(self) -> f64;

    /// Narrow an `f64` value to this sample type.
    fn from_f64_lossy(value: f64) -> Self;

    /// Convert a raw single-precision file value.
    fn from_raw_f32(value: f32) -> Self;
}

impl Sample for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline]
    fn to_f64_lossless(self) -> f64 {
        <f64 as From<f32>>::from(self)
    }

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn from_raw_f32(value: f32) -> Self {
        value
    }
}

impl Sample for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn to_f64_lossless(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    #[inline]
    fn from_raw_f32(value: f32) -> Self {
        <f64 as From<f32>>::from(value)
    }
}

/// Numeric precision of a sample buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit floating point.
    #[default]
    Single,
    /// 64-bit floating point.
    Double,
}

impl Precision {
    /// Precision of the sample type `T`.
    pub const fn of<T: Sample>() -> Self {
        T::PRECISION
    }

    /// Size in bytes of one sample.
    pub const fn bytes(&self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }

    /// Short label used in diagnostics.
    pub const fn label(&self) -> &'static str {
        match self {
            Precision::Single => "f32",
            Precision::Double => "f64",
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_of() {
        assert_eq!(Precision::of::<f32>(), Precision::Single);
        assert_eq!(Precision::of::<f64>(), Precision::Double);
        assert_eq!(Precision::Double.bytes(), 8);
        assert_eq!(Precision::Single.to_string(), "f32");
    }

    #[test]
    fn test_widening() {
        assert_eq!(1.5f32.to_f64_lossless(), 1.5);
        assert_eq!(f32::from_f64_lossy(2.25), 2.25f32);
        assert_eq!(<f64 as Sample>::from_raw_f32(0.5), 0.5);
    }
}
