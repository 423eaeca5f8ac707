//! Photon point kernels for collapsed-cone convolution
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod grid;
mod io;
mod kernel;
mod poly;
mod tabulated;

// The individual steps are useful on their own
pub mod pipeline;

// inline important modules for a nice public API
#[doc(inline)]
pub use kernel::Kernel;

#[doc(inline)]
pub use grid::ResampleGrid;

#[doc(inline)]
pub use tabulated::TabulatedKernel;

#[doc(inline)]
pub use poly::{combine, polyenergetic, read_kernels, EnergyWeights};

#[doc(inline)]
pub use io::{read_binary, read_json, write_binary, write_json};

#[doc(inline)]
pub use error::{Error, Result};
