//! Result and Error types for conehead-kernel

/// Type alias for Result<T, kernel::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `conehead-kernel` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed serde JSON operation")]
    JSONError(#[from] serde_json::Error),

    #[error("failed binary (de)serialisation")]
    BinaryError(#[from] Box<bincode::ErrorKind>),

    #[error("listing is not in the expected format")]
    Format(#[from] conehead_egslst::Error),

    #[error("failed operation on curve data")]
    Utils(#[from] conehead_utils::Error),

    #[error("total energy of the grid must be positive and finite, found {total}")]
    DegenerateInput { total: f64 },

    #[error("inconsistent grid shapes (expected {expected:?}, found {found:?})")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{axis} axis is invalid ({reason})")]
    InvalidAxis {
        axis: &'static str,
        reason: conehead_utils::Error,
    },

    #[error("invalid angle label \"{0}\"")]
    InvalidAngleLabel(String),

    #[error("angle index {index} out of range for {n_angles} angles")]
    AngleIndexOutOfRange { index: usize, n_angles: usize },

    #[error("invalid resample grid ({samples} samples over [{lower}, {upper}])")]
    InvalidResampleGrid {
        lower: f64,
        upper: f64,
        samples: usize,
    },

    #[error("weight for \"{label}\" must be finite and non-negative, found {weight}")]
    InvalidWeight { label: String, weight: f64 },

    #[error("no kernel provided for \"{label}\" (weight {weight})")]
    MissingKernel { label: String, weight: f64 },

    #[error("no kernels to combine")]
    NoKernels,
}
