//! Polyenergetic kernels from weighted mono-energetic kernels
//!
//! A realistic beam is a spectrum of photon energies. The kernel for the beam
//! is approximated by weighting the normalised differential grid of each
//! mono-energetic kernel by the spectrum, summing, and running the result
//! through the usual [pipeline](crate::pipeline).
//!
//! ```rust, no_run
//! # use std::collections::BTreeMap;
//! # use conehead_kernel::{polyenergetic, read_kernels, EnergyWeights, ResampleGrid};
//! let grid = ResampleGrid::default();
//!
//! // Build the mono-energetic kernels in parallel
//! let paths = BTreeMap::from([
//!     ("0.5".to_string(), "kernels/0.5MeV.egslst"),
//!     ("1.0".to_string(), "kernels/1.0MeV.egslst"),
//! ]);
//! let kernels = read_kernels(&paths, &grid).unwrap();
//!
//! // Weight by a spectrum
//! let weights = EnergyWeights::from_iter([("0.5", 0.08196), ("1.0", 0.12385)]);
//! let kernel = polyenergetic(&kernels, &weights, &grid).unwrap();
//! ```

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

// crate modules
use crate::error::{Error, Result};
use crate::grid::ResampleGrid;
use crate::kernel::Kernel;

// conehead modules
use conehead_utils::f;

// external crates
use log::{debug, info, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Relative weight of each energy in a spectrum
///
/// Labels are free text, but must match the labels of the kernels they are
/// combined with. Weights do not need to sum to 1 since the combined kernel is
/// normalised anyway.
///
/// Stored as a simple JSON object:
///
/// ```json
/// { "0.5": 0.08196, "1.0": 0.12385, "1.5": 0.10605 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergyWeights(BTreeMap<String, f64>);

impl EnergyWeights {
    /// Create an empty set of weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Read weights from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let weights: Self = serde_json::from_reader(reader)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Varian Clinac iX 6 MV spectrum, in 0.5 MeV bins up to 6 MeV
    ///
    /// ```rust
    /// # use conehead_kernel::EnergyWeights;
    /// let weights = EnergyWeights::clinac_ix_6mv();
    /// assert_eq!(weights.len(), 12);
    /// assert_eq!(weights.get("1.0"), Some(0.12385));
    /// ```
    pub fn clinac_ix_6mv() -> &'static EnergyWeights {
        CLINAC_IX_6MV.get_or_init(|| {
            serde_json::from_str(include_str!("../data/clinac_ix_6mv.json"))
                .expect("unable to decode bundled Clinac iX spectrum")
        })
    }

    /// Set the weight for an energy label, returning any previous weight
    pub fn insert<S: Into<String>>(&mut self, label: S, weight: f64) -> Option<f64> {
        self.0.insert(label.into(), weight)
    }

    /// Weight for an energy label, if present
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Iterate over (label, weight) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, weight)| (label.as_str(), *weight))
    }

    /// Number of energies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no energies
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every weight
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Every weight must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        match self.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            Some((label, weight)) => Err(Error::InvalidWeight {
                label: label.to_string(),
                weight,
            }),
            None => Ok(()),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for EnergyWeights {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(label, weight)| (label.into(), weight))
                .collect(),
        )
    }
}

// Only ever deserialise the bundled spectrum once, on first use
static CLINAC_IX_6MV: OnceLock<EnergyWeights> = OnceLock::new();

/// Weighted sum of differential grids
///
/// Every grid must be the same shape. The result is not normalised.
///
/// ```rust
/// # use conehead_kernel::combine;
/// # use nalgebra::DMatrix;
/// let a = DMatrix::from_element(2, 2, 1.0);
/// let b = DMatrix::from_element(2, 2, 3.0);
///
/// let combined = combine(&[(&a, 0.5), (&b, 0.5)]).unwrap();
/// assert_eq!(combined, DMatrix::from_element(2, 2, 2.0));
///
/// // Grids have to match
/// let c = DMatrix::from_element(2, 3, 1.0);
/// assert!(combine(&[(&a, 0.5), (&c, 0.5)]).is_err());
/// ```
pub fn combine(grids: &[(&DMatrix<f64>, f64)]) -> Result<DMatrix<f64>> {
    let (first, _) = grids.first().ok_or(Error::NoKernels)?;
    let shape = first.shape();

    let mut combined = DMatrix::zeros(shape.0, shape.1);
    for (i, (grid, weight)) in grids.iter().enumerate() {
        if grid.shape() != shape {
            return Err(Error::ShapeMismatch {
                expected: shape,
                found: grid.shape(),
            });
        }

        if !weight.is_finite() || *weight < 0.0 {
            return Err(Error::InvalidWeight {
                label: f!("#{i}"),
                weight: *weight,
            });
        }

        combined += grid.map(|v| v * weight);
    }

    Ok(combined)
}

/// Build a polyenergetic kernel from labelled mono-energetic kernels
///
/// Every energy with a non-zero weight must have a kernel, and energies with
/// a zero weight are skipped if missing. Kernels without a weight are not
/// used.
///
/// The axes of the result are taken from the first kernel used (in label
/// order). Kernels are expected to share the same axes, so a difference in
/// axis values is only a warning, but a difference in shape is an error.
pub fn polyenergetic(
    kernels: &BTreeMap<String, Kernel>,
    weights: &EnergyWeights,
    grid: &ResampleGrid,
) -> Result<Kernel> {
    weights.validate()?;

    let mut parts = Vec::with_capacity(weights.len());
    for (label, weight) in weights.iter() {
        match kernels.get(label) {
            Some(kernel) => {
                debug!("{label:>8}: weight {weight}");
                parts.push((kernel, weight));
            }
            None if weight == 0.0 => warn!("No kernel for \"{label}\", skipped (zero weight)"),
            None => {
                return Err(Error::MissingKernel {
                    label: label.to_string(),
                    weight,
                })
            }
        }
    }

    let (reference, _) = parts.first().ok_or(Error::NoKernels)?;
    info!("Combining {} weighted kernels", parts.len());
    for (kernel, _) in &parts[1..] {
        if kernel.angles() != reference.angles() || kernel.radii() != reference.radii() {
            warn!("Combining kernels with different axis values");
            break;
        }
    }

    let grids = parts
        .iter()
        .map(|(kernel, weight)| (kernel.differential(), *weight))
        .collect::<Vec<(&DMatrix<f64>, f64)>>();

    Kernel::assemble(
        None,
        reference.angles().to_vec(),
        reference.radii().to_vec(),
        &combine(&grids)?,
        grid,
    )
}

/// Read several mono-energetic kernels in parallel
///
/// Keys of `paths` become the labels of the returned kernels. Any failure
/// fails the whole set.
pub fn read_kernels<P>(
    paths: &BTreeMap<String, P>,
    grid: &ResampleGrid,
) -> Result<BTreeMap<String, Kernel>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|(label, path)| -> Result<(String, Kernel)> {
            Ok((label.clone(), Kernel::from_file(path, grid)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel(values: &[f64]) -> Kernel {
        Kernel::new(
            vec![0.0, 90.0],
            vec![1.0, 2.0],
            &DMatrix::from_row_slice(2, 2, values),
            &ResampleGrid::new(0.5, 2.5, 5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn weights_validation() {
        let weights = EnergyWeights::from_iter([("1.0", 0.5), ("2.0", -0.1)]);
        assert!(matches!(
            weights.validate(),
            Err(Error::InvalidWeight { weight, .. }) if weight == -0.1
        ));
        assert!(EnergyWeights::from_iter([("1.0", f64::NAN)]).validate().is_err());
        assert!(EnergyWeights::new().validate().is_ok());
    }

    #[test]
    fn bundled_spectrum() {
        let weights = EnergyWeights::clinac_ix_6mv();
        assert!(weights.validate().is_ok());
        assert_eq!(weights.get("4.5"), Some(0.0));
        assert!((weights.total() - 0.55221).abs() < 1e-9);
    }

    #[test]
    fn missing_kernels() {
        let kernels = BTreeMap::from([("1.0".to_string(), kernel(&[1.0, 1.0, 1.0, 1.0]))]);
        let grid = ResampleGrid::new(0.5, 2.5, 5).unwrap();

        // zero weight is skipped
        let weights = EnergyWeights::from_iter([("1.0", 1.0), ("4.5", 0.0)]);
        assert!(polyenergetic(&kernels, &weights, &grid).is_ok());

        let weights = EnergyWeights::from_iter([("1.0", 1.0), ("2.0", 0.3)]);
        assert!(matches!(
            polyenergetic(&kernels, &weights, &grid),
            Err(Error::MissingKernel { label, .. }) if label == "2.0"
        ));

        assert!(matches!(
            polyenergetic(&kernels, &EnergyWeights::new(), &grid),
            Err(Error::NoKernels)
        ));
    }

    #[test]
    fn all_zero_weights_are_degenerate() {
        let kernels = BTreeMap::from([("1.0".to_string(), kernel(&[1.0, 2.0, 3.0, 4.0]))]);
        let weights = EnergyWeights::from_iter([("1.0", 0.0)]);
        let grid = ResampleGrid::new(0.5, 2.5, 5).unwrap();
        assert!(matches!(
            polyenergetic(&kernels, &weights, &grid),
            Err(Error::DegenerateInput { .. })
        ));
    }

    #[test]
    fn weighted_mixture() {
        // normalised: a = 0.25 everywhere, b = [0.1, 0.2, 0.3, 0.4]
        let a = kernel(&[1.0, 1.0, 1.0, 1.0]);
        let b = kernel(&[1.0, 2.0, 3.0, 4.0]);
        let kernels = BTreeMap::from([("a".to_string(), a), ("b".to_string(), b)]);

        let weights = EnergyWeights::from_iter([("a", 1.0), ("b", 3.0)]);
        let grid = ResampleGrid::new(0.5, 2.5, 5).unwrap();
        let poly = polyenergetic(&kernels, &weights, &grid).unwrap();

        let expected = [0.1375, 0.2125, 0.2875, 0.3625];
        for (value, expected) in poly.differential().transpose().iter().zip(expected) {
            assert!((value - expected).abs() < 1e-12);
        }
        assert!(poly.is_polyenergetic());
    }

    #[test]
    fn combine_failures() {
        assert!(matches!(combine(&[]), Err(Error::NoKernels)));

        let a = DMatrix::from_element(2, 2, 1.0);
        assert!(matches!(
            combine(&[(&a, f64::INFINITY)]),
            Err(Error::InvalidWeight { .. })
        ));
    }
}
