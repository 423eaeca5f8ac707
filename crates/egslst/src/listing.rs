// conehead modules
use conehead_utils::{f, ValueExt};

// external crates
use nalgebra::DMatrix;

/// Energy deposition kernel data extracted from an EGSnrc listing
///
/// The tabulated fractions are stored as a dense angle × radius grid, with
/// one row per angle and one column per radial shell. Both axes are strictly
/// increasing and `values[(a, r)]` is the fraction of energy deposited in the
/// cone `angles[a]` within the shell `radii[r]`.
///
/// The values are exactly as given in the listing, i.e. not normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub(crate) energy: f64,
    pub(crate) angles: Vec<f64>,
    pub(crate) radii: Vec<f64>,
    pub(crate) values: DMatrix<f64>,
}

impl Listing {
    /// Kinetic energy of the incident beam (MeV)
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Unique cone angles (degrees) in ascending order
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Unique radial boundaries (cm) in ascending order
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Raw differential grid, angles × radii
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Grid dimensions as (number of angles, number of radii)
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Sum of every value in the grid
    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// Consume the listing, returning (energy, angles, radii, values)
    pub fn into_parts(self) -> (f64, Vec<f64>, Vec<f64>, DMatrix<f64>) {
        (self.energy, self.angles, self.radii, self.values)
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (n_angles, n_radii) = self.shape();
        let mut s = "Listing {\n".to_string();
        s += &f!("    energy: {} MeV\n", self.energy);
        s += &f!("    angles: {n_angles} ({})\n", axis_range(&self.angles));
        s += &f!("    radii: {n_radii} ({})\n", axis_range(&self.radii));
        s += &f!("    total: {}\n}}", self.total().sci(5, 2));
        write!(f, "{}", s)
    }
}

fn axis_range(axis: &[f64]) -> String {
    match (axis.first(), axis.last()) {
        (Some(lower), Some(upper)) => f!("{lower} to {upper}"),
        _ => "empty".to_string(),
    }
}
