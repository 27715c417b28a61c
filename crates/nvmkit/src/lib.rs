#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// End-to-end import of an NVM file into a scene sink.
pub mod import;

/// Recovery of image dimensions for parsed cameras.
pub mod intrinsics;

/// Scene-graph capability the importer writes into.
pub mod scene;

#[doc(inline)]
pub use nvmkit_3d as k3d;

#[doc(inline)]
pub use nvmkit_io as io;
