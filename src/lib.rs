// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)] // Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::vec_box)] // Avoids using `Vec<Box<T>>` when unnecessary
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # SeismicSamples
//!
//! A seismic waveform library: a typed data model for stations, sensors and
//! channels, a loader that groups SAC files into three-component sensors, and a
//! decimation engine that turns millions of samples into a few hundred pixel
//! columns without losing the peaks.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! seismic_samples = "0.1.0"
//! ```
//!
//! ## Features
//!
//! - `parallel-processing`: decode input files in parallel (using `rayon`)
//! - `progress-tracking`: terminal progress bar for the loader (using `indicatif`)
//!
//! ## Data model
//!
//! A [`Station`] owns [`ThreeChannelSensor`]s and [`SingleChannelSensor`]s.
//! Each sensor owns [`Channel`]s, each channel owns one [`Waveform`], and a
//! waveform is a time-ordered list of contiguous [`Segment`]s. Times are `i64`
//! microseconds since the Unix epoch throughout.
//!
//! ```rust
//! use seismic_samples::{Channel, Segment, SingleChannelSensor, Station};
//!
//! let mut channel = Channel::<f32>::new("HHZ")?;
//! channel.set_location_code("01");
//! channel
//!     .waveform_mut()
//!     .set_segments(Segment::from_samples(vec![0.0, 1.0, -1.0], 100.0, 0)?)?;
//!
//! let mut sensor = SingleChannelSensor::new("01");
//! sensor.set_vertical_channel(channel)?;
//!
//! let mut station = Station::new("UU", "UGRN");
//! station.add(sensor)?;
//! assert_eq!(station.number_of_channels(), 1);
//! # Ok::<(), seismic_samples::SeismicError>(())
//! ```
//!
//! ## Error Handling
//!
//! Errors are grouped by kind so callers can tell malformed input from a value
//! that simply is not there yet:
//!
//! ```rust
//! use seismic_samples::{ParameterError, SeismicError, SeismicResult};
//!
//! let result: SeismicResult<()> = Err(SeismicError::Parameter(
//!     ParameterError::invalid_value("sampling_rate", "must be positive"),
//! ));
//!
//! match result {
//!     Ok(()) => {}
//!     Err(err) if err.is_malformed_input() => eprintln!("bad input: {err}"),
//!     Err(err) if err.is_unavailable() => eprintln!("not ready: {err}"),
//!     Err(other) => eprintln!("{other}"),
//! }
//! ```
//!
//! ## Loading
//!
//! See [`loader`] for turning a set of SAC files into stations, and
//! [`rendering`] for turning those into line segments.

pub mod channel;
pub mod error;
pub mod io;
pub mod loader;
pub mod rendering;
pub mod response;
pub mod segment;
pub mod sensor;
pub mod station;
pub mod traits;
pub mod utils;
pub mod waveform;

pub use channel::{CHANNEL_CODE_LENGTH, Channel, normalize_code};
pub use error::{
    FormatError, InvariantError, ParameterError, SeismicError, SeismicResult, UnavailableError,
};
pub use loader::{LoadOutcome, Loader, LoaderConfig};
pub use response::{SimpleResponse, Units};
pub use segment::Segment;
pub use sensor::{ComponentRole, Sensor, SensorPosition, SingleChannelSensor, ThreeChannelSensor};
pub use station::Station;
pub use traits::{Precision, Sample};
pub use utils::time::TimeWindow;
pub use waveform::Waveform;
