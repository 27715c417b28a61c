#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and image header failures.
pub mod error;

/// Image metadata reading without pixel decoding.
///
/// See [`metadata::read_image_size`] to get the dimensions of an image file.
pub mod metadata;
