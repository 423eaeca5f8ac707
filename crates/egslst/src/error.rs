//! Result and Error types for conehead-egslst

use crate::Marker;

/// Type alias for Result<T, egslst::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `conehead-egslst` crate
///
/// Every variant other than `IOError` means the listing is not in the expected
/// format, and names the file it came from.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("no \"{marker}\" line found in {file}")]
    MissingMarker { marker: Marker, file: String },

    #[error("unable to parse line {line} of {file}: \"{content}\"")]
    InvalidLine {
        file: String,
        line: usize,
        content: String,
    },

    #[error("no data between the table header (line {header}) and the end of run (line {end}) in {file}")]
    EmptyDataBlock {
        file: String,
        header: usize,
        end: usize,
    },

    #[error("{found} values do not form a complete {n_angles}x{n_radii} angle/radius grid in {file}")]
    IncompleteGrid {
        file: String,
        n_angles: usize,
        n_radii: usize,
        found: usize,
    },

    #[error("unexpected grid shape in {file} (expected {expected:?}, found {found:?})")]
    UnexpectedShape {
        file: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
}
