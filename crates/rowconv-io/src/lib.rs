#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`IoError`] variants for file access and decoding failures.
pub mod error;

/// PPM image encoding and decoding.
///
/// Read binary (`P6`) and ASCII (`P3`) pixmaps, write binary pixmaps.
pub mod ppm;

pub use crate::error::IoError;
