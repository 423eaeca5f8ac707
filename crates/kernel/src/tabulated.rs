//! Tabulated kernel data assets
//!
//! Published kernels are often only available as tables of the differential
//! fractions for each cone angle. These are stored as JSON keyed by angle
//! (degrees), with a shared list of radial shell boundaries (cm).
//!
//! ```json
//! {
//!   "description": "Tabulated polyenergetic 6 MV point kernel",
//!   "total": 0.289622754141,
//!   "radii": [0.05, 0.1, 0.15],
//!   "differential": {
//!     "3.75": [2.4651E-07, 1.2914E-07, 9.1505E-08],
//!     "7.50": [6.9232E-07, 4.0662E-07, 3.5639E-07]
//!   }
//! }
//! ```
//!
//! The optional `total` is the published normalisation factor, which is only
//! used to sanity check the table.

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

// crate modules
use crate::error::{Error, Result};

// external crates
use log::warn;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Differential kernel fractions tabulated by cone angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedKernel {
    #[serde(default)]
    description: String,
    #[serde(default)]
    total: Option<f64>,
    radii: Vec<f64>,
    differential: BTreeMap<String, Vec<f64>>,
}

impl TabulatedKernel {
    /// Read a tabulated kernel from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Bundled polyenergetic 6 MV kernel in water
    ///
    /// 48 cones from 3.75° to 180° in 3.75° steps, 24 radii from 0.05 cm to
    /// 60 cm.
    ///
    /// ```rust
    /// # use conehead_kernel::TabulatedKernel;
    /// let table = TabulatedKernel::reference_6mv();
    /// let (angles, radii, values) = table.to_grid().unwrap();
    /// assert_eq!(values.shape(), (48, 24));
    /// assert_eq!(angles[0], 3.75);
    /// assert_eq!(radii[23], 60.0);
    /// ```
    pub fn reference_6mv() -> &'static TabulatedKernel {
        REFERENCE_6MV.get_or_init(|| {
            serde_json::from_str(include_str!("../data/tabulated_6mv.json"))
                .expect("unable to decode bundled 6 MV kernel table")
        })
    }

    /// Free text description of the source of the data
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Radial shell boundaries (cm)
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Number of tabulated cone angles
    pub fn len(&self) -> usize {
        self.differential.len()
    }

    /// True if there are no tabulated angles
    pub fn is_empty(&self) -> bool {
        self.differential.is_empty()
    }

    /// Convert to (angles, radii, differential grid) sorted by angle
    ///
    /// Every angle key must be a number, and every row must have one value
    /// per radius.
    pub fn to_grid(&self) -> Result<(Vec<f64>, Vec<f64>, DMatrix<f64>)> {
        let mut rows = self
            .differential
            .iter()
            .map(|(label, values)| {
                label
                    .trim()
                    .parse::<f64>()
                    .map(|angle| (angle, values))
                    .map_err(|_| Error::InvalidAngleLabel(label.clone()))
            })
            .collect::<Result<Vec<(f64, &Vec<f64>)>>>()?;

        // string keys do not sort numerically
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n_radii = self.radii.len();
        if let Some((_, values)) = rows.iter().find(|(_, values)| values.len() != n_radii) {
            return Err(Error::ShapeMismatch {
                expected: (rows.len(), n_radii),
                found: (rows.len(), values.len()),
            });
        }

        let angles = rows.iter().map(|(angle, _)| *angle).collect::<Vec<f64>>();
        let values = rows
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .collect::<Vec<f64>>();
        let grid = DMatrix::from_row_slice(angles.len(), n_radii, &values);

        if let Some(total) = self.total {
            let sum = grid.sum();
            if (sum - total).abs() > 1e-6 * total.abs() {
                warn!("Tabulated total {total} does not match the sum of the data {sum}");
            }
        }

        Ok((angles, self.radii.clone(), grid))
    }
}

// Only ever deserialise the bundled table once, on first use
static REFERENCE_6MV: OnceLock<TabulatedKernel> = OnceLock::new();
