#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Camera records reconstructed from a structure-from-motion model.
pub mod camera;

/// World transforms and field of view for reconstructed cameras.
pub mod geometry;

/// I/O utilities for reading structure-from-motion files.
pub mod io;

/// Small immutable matrix value types.
pub mod linalg;

/// Sparse point records and their visibility lists.
pub mod point;

/// Rotation representation conversions.
pub mod transforms;
