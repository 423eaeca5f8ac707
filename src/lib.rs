//! `conehead` builds the photon point kernels used by collapsed-cone dose
//! calculations
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use conehead_egslst as egslst;

#[doc(inline)]
pub use conehead_kernel as kernel;

#[doc(inline)]
pub use conehead_utils as utils;
