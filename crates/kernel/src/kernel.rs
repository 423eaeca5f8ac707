//! Point kernel data and implementations

// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::grid::ResampleGrid;
use crate::pipeline;
use crate::tabulated::TabulatedKernel;

// conehead modules
use conehead_egslst::{Listing, ListingReader};
use conehead_utils::{f, SliceExt, ValueExt};

// external crates
use log::{debug, info};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Normalised point kernel with cumulative fractions on a uniform radial grid
///
/// A [Kernel] is built once, either from a single simulation (mono-energetic)
/// or from a weighted combination of kernels (polyenergetic), and does not
/// change afterwards. Consumers need not care which, since both have the same
/// axes and resampled shapes.
///
/// | Data           | Shape                | Description                         |
/// | -------------- | -------------------- | ----------------------------------- |
/// | `angles`       | A                    | cone angles (degrees), ascending    |
/// | `radii`        | R                    | radial shell boundaries (cm)        |
/// | `differential` | A × R                | fraction per cone and shell, sum 1  |
/// | `cumulative`   | A × K                | fraction within radius, per cone    |
///
/// where K is the number of samples in the [ResampleGrid].
///
/// ```rust, no_run
/// # use conehead_kernel::{Kernel, ResampleGrid};
/// let kernel = Kernel::from_file("path/to/6.0MeV.egslst", &ResampleGrid::default()).unwrap();
///
/// // Fraction of energy deposited within 1 cm for the first cone
/// let fraction = kernel.fraction_within(0, 1.0).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KernelValues")]
pub struct Kernel {
    energy: Option<f64>,
    angles: Vec<f64>,
    radii: Vec<f64>,
    differential: DMatrix<f64>,
    cumulative: DMatrix<f64>,
    grid: ResampleGrid,
}

impl Kernel {
    /// Build a kernel from explicit axes and a raw differential grid
    ///
    /// The grid must have one row per angle and one column per radius, and
    /// does not need to be normalised. There is no source energy, as is the
    /// case for polyenergetic kernels.
    ///
    /// ```rust
    /// # use conehead_kernel::{Kernel, ResampleGrid};
    /// # use nalgebra::DMatrix;
    /// let grid = ResampleGrid::new(0.5, 1.0, 2).unwrap();
    /// let kernel = Kernel::new(
    ///     vec![0.0, 90.0],
    ///     vec![0.5, 1.0],
    ///     &DMatrix::from_element(2, 2, 1.0),
    ///     &grid,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(kernel.differential()[(0, 0)], 0.25);
    /// assert_eq!(kernel.cumulative().row(1).iter().copied().collect::<Vec<f64>>(), vec![0.25, 0.5]);
    /// ```
    pub fn new(
        angles: Vec<f64>,
        radii: Vec<f64>,
        differential: &DMatrix<f64>,
        grid: &ResampleGrid,
    ) -> Result<Self> {
        Self::assemble(None, angles, radii, differential, grid)
    }

    /// Build a mono-energetic kernel from a parsed listing
    pub fn from_listing(listing: &Listing, grid: &ResampleGrid) -> Result<Self> {
        Self::assemble(
            Some(listing.energy()),
            listing.angles().to_vec(),
            listing.radii().to_vec(),
            listing.values(),
            grid,
        )
    }

    /// Read and build a mono-energetic kernel from an EGSnrc listing
    ///
    /// The `path` may be a [&str], [String], [Path], etc..
    pub fn from_file<P: AsRef<Path>>(path: P, grid: &ResampleGrid) -> Result<Self> {
        Self::from_reader(&ListingReader::new(), path, grid)
    }

    /// Read and build a mono-energetic kernel with a pre-configured reader
    ///
    /// Useful to enforce the expected grid dimensions of the listing.
    pub fn from_reader<P: AsRef<Path>>(
        reader: &ListingReader,
        path: P,
        grid: &ResampleGrid,
    ) -> Result<Self> {
        let listing = reader.parse(path)?;
        Self::from_listing(&listing, grid)
    }

    /// Build a kernel from tabulated reference data
    ///
    /// See [TabulatedKernel::reference_6mv()] for the bundled 6 MV table.
    pub fn from_tabulated(table: &TabulatedKernel, grid: &ResampleGrid) -> Result<Self> {
        let (angles, radii, differential) = table.to_grid()?;
        Self::assemble(None, angles, radii, &differential, grid)
    }

    /// Validate the axes and run the raw grid through the full pipeline
    pub(crate) fn assemble(
        energy: Option<f64>,
        angles: Vec<f64>,
        radii: Vec<f64>,
        differential: &DMatrix<f64>,
        grid: &ResampleGrid,
    ) -> Result<Self> {
        match energy {
            Some(e) => info!("Building {e} MeV kernel"),
            None => info!("Building kernel"),
        }

        check_axes(&angles, &radii, differential.shape())?;
        let (differential, cumulative) = pipeline::build(&radii, differential, grid)?;
        debug!("Resampled to {grid}");

        Ok(Self {
            energy,
            angles,
            radii,
            differential,
            cumulative,
            grid: *grid,
        })
    }

    /// Source energy (MeV), or `None` for a polyenergetic kernel
    pub fn energy(&self) -> Option<f64> {
        self.energy
    }

    /// True for kernels without a single source energy
    pub fn is_polyenergetic(&self) -> bool {
        self.energy.is_none()
    }

    /// Cone angles (degrees) in ascending order
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Radial shell boundaries (cm) of the source data in ascending order
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Normalised differential grid, angles × radii
    pub fn differential(&self) -> &DMatrix<f64> {
        &self.differential
    }

    /// Resampled cumulative grid, angles × samples
    pub fn cumulative(&self) -> &DMatrix<f64> {
        &self.cumulative
    }

    /// The radial sampling of the cumulative grid
    pub fn grid(&self) -> &ResampleGrid {
        &self.grid
    }

    /// Radius (cm) of every column of the cumulative grid
    pub fn resample_radii(&self) -> Vec<f64> {
        self.grid.points()
    }

    /// Cumulative grid dimensions as (number of angles, number of samples)
    pub fn shape(&self) -> (usize, usize) {
        self.cumulative.shape()
    }

    /// Fraction of energy deposited within `radius` (cm) for one cone
    ///
    /// Interpolated linearly from the resampled cumulative curve, and clamped
    /// to the first/last sample outside of the grid.
    pub fn fraction_within(&self, angle_index: usize, radius: f64) -> Result<f64> {
        if angle_index >= self.angles.len() {
            return Err(Error::AngleIndexOutOfRange {
                index: angle_index,
                n_angles: self.angles.len(),
            });
        }

        let row = self
            .cumulative
            .row(angle_index)
            .iter()
            .copied()
            .collect::<Vec<f64>>();
        Ok(self.resample_radii().interpolate(&row, radius)?)
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = "Kernel {\n".to_string();
        s += &match self.energy {
            Some(e) => f!("    energy: {e} MeV\n"),
            None => "    energy: polyenergetic\n".to_string(),
        };
        s += &f!("    angles: {}\n", self.angles.len());
        s += &f!("    radii: {}\n", self.radii.len());
        s += &f!("    resampled: {}\n", self.grid);
        s += &f!(
            "    total: {}\n}}",
            self.cumulative.column(self.grid.samples() - 1).sum().sci(5, 2)
        );
        write!(f, "{}", s)
    }
}

/// Unchecked values, so deserialised kernels are consistent or rejected
#[derive(Deserialize)]
struct KernelValues {
    energy: Option<f64>,
    angles: Vec<f64>,
    radii: Vec<f64>,
    differential: DMatrix<f64>,
    cumulative: DMatrix<f64>,
    grid: ResampleGrid,
}

impl TryFrom<KernelValues> for Kernel {
    type Error = Error;

    fn try_from(values: KernelValues) -> Result<Self> {
        check_axes(&values.angles, &values.radii, values.differential.shape())?;

        let expected = (values.angles.len(), values.grid.samples());
        if values.cumulative.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: values.cumulative.shape(),
            });
        }

        Ok(Self {
            energy: values.energy,
            angles: values.angles,
            radii: values.radii,
            differential: values.differential,
            cumulative: values.cumulative,
            grid: values.grid,
        })
    }
}

/// Axes must be ascending and match the grid rows/columns
fn check_axes(angles: &[f64], radii: &[f64], shape: (usize, usize)) -> Result<()> {
    angles.check_ascending().map_err(|reason| Error::InvalidAxis {
        axis: "angle",
        reason,
    })?;

    radii.check_ascending().map_err(|reason| Error::InvalidAxis {
        axis: "radius",
        reason,
    })?;

    let expected = (angles.len(), radii.len());
    if shape != expected {
        return Err(Error::ShapeMismatch {
            expected,
            found: shape,
        });
    }
    Ok(())
}
