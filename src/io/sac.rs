//! SAC (Seismic Analysis Code) binary files.
//!
//! A SAC file is a fixed 632-byte header followed by `npts` single-precision
//! samples. The header has 70 floats, 40 integers and 192 bytes of
//! fixed-width strings. Fields that are not set hold the sentinel `-12345`
//! (or the string `"-12345"`). This module decodes and encodes the header
//! faithfully, sentinels included; translating sentinels into `Option`s is the
//! loader's job.
//!
//! Both byte orders are accepted. The order is detected from the header version
//! field, which must read 6 or 7.

use std::path::Path;

use crate::utils::time::{
    checked_seconds_to_micros, epoch_micros_from_ordinal, ordinal_from_epoch_micros,
};
use crate::{FormatError, ParameterError, SeismicResult};

/// Sentinel for unset float fields.
pub const UNDEFINED_FLOAT: f32 = -12345.0;
/// Sentinel for unset integer fields.
pub const UNDEFINED_INT: i32 = -12345;
/// Sentinel for unset string fields.
pub const UNDEFINED_STRING: &str = "-12345";

/// Size of the fixed header in bytes.
pub const HEADER_BYTES: usize = 632;

const FLOAT_WORDS: usize = 70;
const INT_OFFSET: usize = FLOAT_WORDS * 4;
const STRING_OFFSET: usize = INT_OFFSET + 40 * 4;

// float header word indices
const DELTA: usize = 0;
const DEPMIN: usize = 1;
const DEPMAX: usize = 2;
const SCALE: usize = 3;
const B: usize = 5;
const E: usize = 6;
const STLA: usize = 31;
const STLO: usize = 32;
const STEL: usize = 33;
const DEPMEN: usize = 56;
const CMPAZ: usize = 57;
const CMPINC: usize = 58;

// integer header word indices
const NZYEAR: usize = 0;
const NZJDAY: usize = 1;
const NZHOUR: usize = 2;
const NZMIN: usize = 3;
const NZSEC: usize = 4;
const NZMSEC: usize = 5;
const NVHDR: usize = 6;
const NPTS: usize = 9;
const IFTYPE: usize = 15;
const IDEP: usize = 16;
const IZTYPE: usize = 17;
const LEVEN: usize = 35;

// string byte offsets
const KSTNM: usize = STRING_OFFSET;
const KHOLE: usize = STRING_OFFSET + 24;
const KCMPNM: usize = STRING_OFFSET + 160;
const KNETWK: usize = STRING_OFFSET + 168;

/// File type code for an evenly spaced time series.
pub const ITIME: i32 = 1;
/// Dependent variable type "unknown".
const IUNKN: i32 = 5;
/// Reference time is the begin time.
const IB: i32 = 9;

/// Byte order of a SAC file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    #[inline]
    fn read_f32(self, bytes: [u8; 4]) -> f32 {
        match self {
            ByteOrder::Little => f32::from_le_bytes(bytes),
            ByteOrder::Big => f32::from_be_bytes(bytes),
        }
    }

    #[inline]
    fn read_i32(self, bytes: [u8; 4]) -> i32 {
        match self {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        }
    }

    /// Native value of a word copied verbatim from a file in this order.
    #[inline]
    const fn to_native(self, raw: u32) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le(raw),
            ByteOrder::Big => u32::from_be(raw),
        }
    }
}

/// Decoded SAC header fields used by this crate.
///
/// Values are stored exactly as found in the file, including sentinels.
#[derive(Debug, Clone, PartialEq)]
pub struct SacHeader {
    /// Sampling interval in seconds.
    pub delta: f32,
    /// Begin time offset from the reference time in seconds.
    pub b: f32,
    /// End time offset from the reference time in seconds.
    pub e: f32,
    /// Amplitude scale factor.
    pub scale: f32,
    /// Station latitude in degrees.
    pub stla: f32,
    /// Station longitude in degrees.
    pub stlo: f32,
    /// Station elevation in meters.
    pub stel: f32,
    /// Component azimuth in degrees clockwise from north.
    pub cmpaz: f32,
    /// Component inclination in degrees from vertical (0 is up).
    pub cmpinc: f32,
    /// Reference year.
    pub nzyear: i32,
    /// Reference day of year.
    pub nzjday: i32,
    /// Reference hour.
    pub nzhour: i32,
    /// Reference minute.
    pub nzmin: i32,
    /// Reference second.
    pub nzsec: i32,
    /// Reference millisecond.
    pub nzmsec: i32,
    /// Header version.
    pub nvhdr: i32,
    /// Number of samples.
    pub npts: i32,
    /// File type.
    pub iftype: i32,
    /// Evenly spaced flag (1 true, 0 false).
    pub leven: i32,
    /// Station name.
    pub kstnm: String,
    /// Location code.
    pub khole: String,
    /// Channel code.
    pub kcmpnm: String,
    /// Network code.
    pub knetwk: String,
}

impl Default for SacHeader {
    fn default() -> Self {
        Self {
            delta: UNDEFINED_FLOAT,
            b: UNDEFINED_FLOAT,
            e: UNDEFINED_FLOAT,
            scale: UNDEFINED_FLOAT,
            stla: UNDEFINED_FLOAT,
            stlo: UNDEFINED_FLOAT,
            stel: UNDEFINED_FLOAT,
            cmpaz: UNDEFINED_FLOAT,
            cmpinc: UNDEFINED_FLOAT,
            nzyear: UNDEFINED_INT,
            nzjday: UNDEFINED_INT,
            nzhour: UNDEFINED_INT,
            nzmin: UNDEFINED_INT,
            nzsec: UNDEFINED_INT,
            nzmsec: UNDEFINED_INT,
            nvhdr: 6,
            npts: 0,
            iftype: ITIME,
            leven: 1,
            kstnm: UNDEFINED_STRING.to_string(),
            khole: UNDEFINED_STRING.to_string(),
            kcmpnm: UNDEFINED_STRING.to_string(),
            knetwk: UNDEFINED_STRING.to_string(),
        }
    }
}

impl SacHeader {
    /// Epoch microseconds of the first sample: reference time plus `b`.
    ///
    /// # Errors
    /// Fails when the reference time fields are unset or do not form a valid
    /// date, or when `b` moves the start outside the representable time range.
    pub fn start_time(&self) -> SeismicResult<i64> {
        let parts = [
            ("nzyear", self.nzyear),
            ("nzjday", self.nzjday),
            ("nzhour", self.nzhour),
            ("nzmin", self.nzmin),
            ("nzsec", self.nzsec),
            ("nzmsec", self.nzmsec),
        ];
        for (name, value) in parts {
            if value == UNDEFINED_INT || value < 0 {
                return Err(ParameterError::missing_field(name).into());
            }
        }
        let reference = epoch_micros_from_ordinal(
            self.nzyear,
            self.nzjday as u32,
            self.nzhour as u32,
            self.nzmin as u32,
            self.nzsec as u32,
            self.nzmsec as u32,
        )
        .ok_or_else(|| ParameterError::invalid_value("reference time", "not a valid date"))?;
        let begin = if self.b == UNDEFINED_FLOAT {
            Some(0)
        } else {
            checked_seconds_to_micros(f64::from(self.b))
        };
        begin
            .and_then(|begin| reference.checked_add(begin))
            .ok_or_else(|| {
                ParameterError::invalid_value(
                    "b",
                    format!("{} s puts the start outside the representable time range", self.b),
                )
                .into()
            })
    }

    /// Set the reference time to `start` truncated to milliseconds, carrying the rest in `b`.
    pub fn set_start_time(&mut self, start: i64) {
        if let Some(((year, jday, hour, minute, second, milli), sub_milli)) =
            ordinal_from_epoch_micros(start)
        {
            self.nzyear = year;
            self.nzjday = jday as i32;
            self.nzhour = hour as i32;
            self.nzmin = minute as i32;
            self.nzsec = second as i32;
            self.nzmsec = milli as i32;
            self.b = sub_milli as f32 / 1.0e6;
        }
    }
}

/// A decoded SAC file.
#[derive(Debug, Clone, PartialEq)]
pub struct SacFile {
    /// Header fields.
    pub header: SacHeader,
    /// Samples in file order.
    pub data: Vec<f32>,
}

impl SacFile {
    /// Decode a SAC file from bytes. `path` is only used in error messages.
    ///
    /// # Errors
    /// - [`FormatError::TruncatedHeader`] if fewer than 632 bytes are present
    /// - [`FormatError::UnknownByteOrder`] if the header version is not 6 or 7
    /// - [`FormatError::Unsupported`] for unevenly sampled or non time-series files
    /// - [`FormatError::TruncatedData`] if the data section is shorter than `npts`
    pub fn from_bytes(bytes: &[u8], path: &Path) -> SeismicResult<Self> {
        if bytes.len() < HEADER_BYTES {
            return Err(FormatError::TruncatedHeader {
                path: path.to_path_buf(),
                len: bytes.len(),
            }
            .into());
        }
        let order = detect_byte_order(bytes).ok_or_else(|| FormatError::UnknownByteOrder {
            path: path.to_path_buf(),
        })?;

        let float = |index: usize| order.read_f32(word(bytes, 4 * index));
        let int = |index: usize| order.read_i32(word(bytes, INT_OFFSET + 4 * index));

        let header = SacHeader {
            delta: float(DELTA),
            b: float(B),
            e: float(E),
            scale: float(SCALE),
            stla: float(STLA),
            stlo: float(STLO),
            stel: float(STEL),
            cmpaz: float(CMPAZ),
            cmpinc: float(CMPINC),
            nzyear: int(NZYEAR),
            nzjday: int(NZJDAY),
            nzhour: int(NZHOUR),
            nzmin: int(NZMIN),
            nzsec: int(NZSEC),
            nzmsec: int(NZMSEC),
            nvhdr: int(NVHDR),
            npts: int(NPTS),
            iftype: int(IFTYPE),
            leven: int(LEVEN),
            kstnm: string(bytes, KSTNM, 8),
            khole: string(bytes, KHOLE, 8),
            kcmpnm: string(bytes, KCMPNM, 8),
            knetwk: string(bytes, KNETWK, 8),
        };

        if header.iftype != ITIME && header.iftype != UNDEFINED_INT {
            return Err(FormatError::Unsupported {
                path: path.to_path_buf(),
                reason: format!("file type {} is not a time series", header.iftype),
            }
            .into());
        }
        if header.leven == 0 {
            return Err(FormatError::Unsupported {
                path: path.to_path_buf(),
                reason: "unevenly sampled data".to_string(),
            }
            .into());
        }

        let declared = usize::try_from(header.npts).map_err(|_| {
            ParameterError::invalid_value("npts", format!("{} is negative", header.npts))
        })?;
        let available = (bytes.len() - HEADER_BYTES) / 4;
        if available < declared {
            return Err(FormatError::TruncatedData {
                path: path.to_path_buf(),
                declared,
                available,
            }
            .into());
        }
        let data = decode_samples(&bytes[HEADER_BYTES..HEADER_BYTES + 4 * declared], order);

        Ok(Self { header, data })
    }

    /// Read and decode a SAC file.
    ///
    /// # Errors
    /// I/O failures plus everything [`SacFile::from_bytes`] reports.
    pub fn read(path: impl AsRef<Path>) -> SeismicResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, path)
    }

    /// Encode as little-endian SAC bytes.
    ///
    /// `npts`, `depmin`, `depmax`, `depmen` and `e` are derived from the data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut floats = [UNDEFINED_FLOAT; FLOAT_WORDS];
        let mut ints = [UNDEFINED_INT; 40];
        let header = &self.header;

        floats[DELTA] = header.delta;
        floats[B] = header.b;
        floats[SCALE] = header.scale;
        floats[STLA] = header.stla;
        floats[STLO] = header.stlo;
        floats[STEL] = header.stel;
        floats[CMPAZ] = header.cmpaz;
        floats[CMPINC] = header.cmpinc;
        if !self.data.is_empty() {
            let (lo, hi, sum) = self.data.iter().fold(
                (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
                |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + f64::from(v)),
            );
            floats[DEPMIN] = lo;
            floats[DEPMAX] = hi;
            floats[DEPMEN] = (sum / self.data.len() as f64) as f32;
        }
        if header.delta != UNDEFINED_FLOAT && header.b != UNDEFINED_FLOAT && !self.data.is_empty() {
            floats[E] = header.b + header.delta * (self.data.len() - 1) as f32;
        }

        ints[NZYEAR] = header.nzyear;
        ints[NZJDAY] = header.nzjday;
        ints[NZHOUR] = header.nzhour;
        ints[NZMIN] = header.nzmin;
        ints[NZSEC] = header.nzsec;
        ints[NZMSEC] = header.nzmsec;
        ints[NVHDR] = 6;
        ints[NPTS] = self.data.len() as i32;
        ints[IFTYPE] = ITIME;
        ints[IDEP] = IUNKN;
        ints[IZTYPE] = IB;
        ints[LEVEN] = 1;

        let mut bytes = Vec::with_capacity(HEADER_BYTES + 4 * self.data.len());
        for value in floats {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        for value in ints {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let mut strings = [b' '; HEADER_BYTES - STRING_OFFSET];
        // every 8-byte slot starts undefined; offset 16 is the tail of the 16-byte kevnm
        for offset in (0..strings.len()).step_by(8).filter(|&o| o != 16) {
            put_string(&mut strings, offset, UNDEFINED_STRING);
        }
        put_string(&mut strings, KSTNM - STRING_OFFSET, &header.kstnm);
        put_string(&mut strings, KHOLE - STRING_OFFSET, &header.khole);
        put_string(&mut strings, KCMPNM - STRING_OFFSET, &header.kcmpnm);
        put_string(&mut strings, KNETWK - STRING_OFFSET, &header.knetwk);
        bytes.extend_from_slice(&strings);

        let words: Vec<u32> = self.data.iter().map(|v| v.to_bits().to_le()).collect();
        bytes.extend_from_slice(bytemuck::cast_slice(&words));
        bytes
    }

    /// Encode and write to `path`.
    ///
    /// # Errors
    /// I/O failures.
    pub fn write(&self, path: impl AsRef<Path>) -> SeismicResult<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

fn detect_byte_order(bytes: &[u8]) -> Option<ByteOrder> {
    let version = word(bytes, INT_OFFSET + 4 * NVHDR);
    [ByteOrder::Little, ByteOrder::Big]
        .into_iter()
        .find(|order| matches!(order.read_i32(version), 6 | 7))
}

/// Decode a data section whose length is a multiple of four.
///
/// The section is copied into `u32` words first since a byte buffer carries no
/// alignment guarantee.
fn decode_samples(bytes: &[u8], order: ByteOrder) -> Vec<f32> {
    let mut words = vec![0u32; bytes.len() / 4];
    bytemuck::cast_slice_mut::<u32, u8>(&mut words).copy_from_slice(bytes);
    words
        .into_iter()
        .map(|raw| f32::from_bits(order.to_native(raw)))
        .collect()
}

#[inline]
fn word(bytes: &[u8], offset: usize) -> [u8; 4] {
    [
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]
}

fn string(bytes: &[u8], offset: usize, len: usize) -> String {
    String::from_utf8_lossy(&bytes[offset..offset + len])
        .trim_end_matches(['\0', ' '])
        .trim()
        .to_string()
}

fn put_string(buffer: &mut [u8], offset: usize, value: &str) {
    let slot = &mut buffer[offset..offset + 8];
    slot.fill(b' ');
    for (dst, src) in slot.iter_mut().zip(value.bytes()) {
        *dst = src;
    }
}

/// Whether a float header value is set.
pub fn defined_float(value: f32) -> Option<f32> {
    (value != UNDEFINED_FLOAT && value.is_finite()).then_some(value)
}

/// Whether a string header value is set.
pub fn defined_string(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty() && trimmed != UNDEFINED_STRING).then_some(trimmed)
}
