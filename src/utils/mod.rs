//! Utility functions shared across the crate.
//!
//! # Modules
//!
//! - [`time`] - microsecond epoch arithmetic and timestamp formatting

pub mod time;

pub use time::*;
