//! Uniform radial resampling configuration

// crate modules
use crate::error::{Error, Result};

// conehead modules
use conehead_utils::linspace;

// external crates
use serde::{Deserialize, Serialize};

/// Uniform radial sampling used for every resampled cumulative kernel
///
/// All kernels resampled onto the same grid can be combined or looked up
/// directly, regardless of the radial binning of the original simulation.
///
/// The default is the reference configuration of 5996 samples from 0.05 cm to
/// 60.0 cm, i.e. a 0.1 mm spacing.
///
/// ```rust
/// # use conehead_kernel::ResampleGrid;
/// let grid = ResampleGrid::default();
/// assert_eq!(grid.samples(), 5996);
/// assert!((grid.step() - 0.01).abs() < 1e-12);
///
/// // Anything else must be a valid closed interval
/// let coarse = ResampleGrid::new(0.5, 10.0, 20).unwrap();
/// assert_eq!(coarse.points().len(), 20);
/// assert!(ResampleGrid::new(10.0, 0.5, 20).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridValues")]
pub struct ResampleGrid {
    lower: f64,
    upper: f64,
    samples: usize,
}

impl ResampleGrid {
    /// Create a grid of `samples` points over [`lower`, `upper`] (cm)
    ///
    /// Bounds must be finite with `lower < upper`, and there must be at least
    /// two samples.
    pub fn new(lower: f64, upper: f64, samples: usize) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite()) || lower >= upper || samples < 2 {
            return Err(Error::InvalidResampleGrid {
                lower,
                upper,
                samples,
            });
        }

        Ok(Self {
            lower,
            upper,
            samples,
        })
    }

    /// First sample radius (cm)
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Final sample radius (cm)
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Number of sample points
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Spacing between sample points (cm)
    pub fn step(&self) -> f64 {
        (self.upper - self.lower) / (self.samples - 1) as f64
    }

    /// Every sample radius (cm) in ascending order
    pub fn points(&self) -> Vec<f64> {
        linspace(self.lower, self.upper, self.samples)
    }
}

impl Default for ResampleGrid {
    fn default() -> Self {
        Self {
            lower: 0.05,
            upper: 60.0,
            samples: 5996,
        }
    }
}

impl std::fmt::Display for ResampleGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} samples from {} to {} cm",
            self.samples, self.lower, self.upper
        )
    }
}

/// Unchecked values, so deserialised grids go through the same validation
#[derive(Deserialize)]
struct GridValues {
    lower: f64,
    upper: f64,
    samples: usize,
}

impl TryFrom<GridValues> for ResampleGrid {
    type Error = Error;

    fn try_from(values: GridValues) -> Result<Self> {
        Self::new(values.lower, values.upper, values.samples)
    }
}
