//! Waveform file input and output.

pub mod reader;
pub mod sac;

pub use reader::{
    ABSENT, ABSENT_STRING, AnyReading, FileType, RawReading, SacReader, WaveformReader, read_any,
    reading_from_sac,
};
pub use sac::{ByteOrder, SacFile, SacHeader};
