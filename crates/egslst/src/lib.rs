//! Reader for EGSnrc energy deposition kernel listings
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod listing;
mod parsers;
mod reader;

// inline important modules for a nice public API
#[doc(inline)]
pub use listing::Listing;

#[doc(inline)]
pub use parsers::Marker;

#[doc(inline)]
pub use reader::ListingReader;

#[doc(inline)]
pub use error::{Error, Result};

use std::path::Path;

/// Read the energy deposition table of an EGSnrc listing
///
/// Returns a result containing the [Listing] extracted from the file at
/// `path`, which can be [&str], [String], [Path], etc...
///
/// Example
/// ```rust, no_run
/// # use conehead_egslst::{read_listing, Listing};
/// let listing: Listing = read_listing("path/to/6.0MeV.egslst").unwrap();
/// ```
pub fn read_listing<P: AsRef<Path>>(path: P) -> Result<Listing> {
    ListingReader::new().parse(path)
}
