//! Normalise, accumulate, and resample differential kernel grids
//!
//! Every kernel, mono-energetic or polyenergetic, goes through the same three
//! steps:
//!
//! 1. [normalise()] the raw grid so that every value sums to 1
//! 2. [accumulate()] the fractions radially for each angle
//! 3. [resample()] the cumulative curves onto a common [ResampleGrid]
//!
//! These are pure functions of their inputs. [build()] chains all three.

// crate modules
use crate::error::{Error, Result};
use crate::grid::ResampleGrid;

// conehead modules
use conehead_utils::SliceExt;

// external crates
use log::{trace, warn};
use nalgebra::DMatrix;

/// Divide every value by the total of the grid
///
/// ```rust
/// # use conehead_kernel::pipeline::normalise;
/// # use nalgebra::DMatrix;
/// let grid = DMatrix::from_element(2, 2, 1.0);
/// let normalised = normalise(&grid).unwrap();
/// assert_eq!(normalised, DMatrix::from_element(2, 2, 0.25));
///
/// // No energy to normalise is an error rather than a grid of NaN values
/// assert!(normalise(&DMatrix::zeros(2, 2)).is_err());
/// ```
pub fn normalise(grid: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let total = grid.sum();
    if grid.is_empty() || !total.is_finite() || total <= 0.0 {
        return Err(Error::DegenerateInput { total });
    }

    if grid.iter().any(|v| *v < 0.0) {
        warn!("Normalising a grid containing negative values");
    }

    trace!("Normalising grid {:?} by {total}", grid.shape());
    Ok(grid.map(|v| v / total))
}

/// Running sum along each row, i.e. radially for each angle
///
/// ```rust
/// # use conehead_kernel::pipeline::accumulate;
/// # use nalgebra::DMatrix;
/// let grid = DMatrix::from_element(2, 2, 0.25);
/// let cumulative = accumulate(&grid);
/// assert_eq!(cumulative, DMatrix::from_row_slice(2, 2, &[0.25, 0.5, 0.25, 0.5]));
/// ```
pub fn accumulate(grid: &DMatrix<f64>) -> DMatrix<f64> {
    let (n_rows, n_cols) = grid.shape();
    let values = grid
        .row_iter()
        .flat_map(|row| row.iter().copied().collect::<Vec<f64>>().cumulative_sum())
        .collect::<Vec<f64>>();
    DMatrix::from_row_slice(n_rows, n_cols, &values)
}

/// Evaluate each cumulative row at every point of the resample grid
///
/// The `radii` are the control points of every row, so must be ascending and
/// match the number of columns. Linear interpolation is used between control
/// points, and sample points outside of the `radii` take the value of the
/// nearest control point.
///
/// The result always has one column per sample point, independent of the
/// number of `radii`.
///
/// ```rust
/// # use conehead_kernel::{pipeline::resample, ResampleGrid};
/// # use nalgebra::DMatrix;
/// let cumulative = DMatrix::from_row_slice(1, 2, &[0.5, 1.0]);
/// let grid = ResampleGrid::new(0.0, 3.0, 7).unwrap(); // 0.0, 0.5, ..., 3.0
///
/// let resampled = resample(&[1.0, 2.0], &cumulative, &grid).unwrap();
/// assert_eq!(resampled.shape(), (1, 7));
/// assert_eq!(resampled[(0, 0)], 0.5);  // 0.0 cm, clamped
/// assert_eq!(resampled[(0, 3)], 0.75); // 1.5 cm
/// assert_eq!(resampled[(0, 6)], 1.0);  // 3.0 cm, clamped
/// ```
pub fn resample(
    radii: &[f64],
    cumulative: &DMatrix<f64>,
    grid: &ResampleGrid,
) -> Result<DMatrix<f64>> {
    let (n_rows, n_cols) = cumulative.shape();
    if radii.len() != n_cols {
        return Err(Error::ShapeMismatch {
            expected: (n_rows, radii.len()),
            found: (n_rows, n_cols),
        });
    }

    radii.check_ascending().map_err(|reason| Error::InvalidAxis {
        axis: "radius",
        reason,
    })?;

    let points = grid.points();
    let mut values = Vec::with_capacity(n_rows * points.len());
    for row in cumulative.row_iter() {
        let row = row.iter().copied().collect::<Vec<f64>>();
        for r in &points {
            values.push(radii.interpolate(&row, *r)?);
        }
    }

    Ok(DMatrix::from_row_slice(n_rows, points.len(), &values))
}

/// Full pipeline from a raw differential grid
///
/// Returns the normalised differential grid and the resampled cumulative grid.
pub fn build(
    radii: &[f64],
    differential: &DMatrix<f64>,
    grid: &ResampleGrid,
) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
    let normalised = normalise(differential)?;
    let cumulative = resample(radii, &accumulate(&normalised), grid)?;
    Ok((normalised, cumulative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_grid() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            4,
            &[
                4.0, 3.0, 2.0, 1.0, //
                0.5, 0.5, 0.5, 0.5, //
                0.0, 1.0, 0.0, 2.0,
            ],
        )
    }

    #[test]
    fn normalised_sum_is_one() {
        let normalised = normalise(&example_grid()).unwrap();
        assert!((normalised.sum() - 1.0).abs() < 1e-12);
        assert_eq!(normalised[(0, 0)], 4.0 / 15.0);
    }

    #[test]
    fn degenerate_totals() {
        for grid in [
            DMatrix::zeros(2, 2),
            DMatrix::from_element(2, 2, -1.0),
            DMatrix::from_element(1, 1, f64::NAN),
            DMatrix::<f64>::zeros(0, 0),
        ] {
            assert!(matches!(
                normalise(&grid),
                Err(Error::DegenerateInput { .. })
            ));
        }
    }

    #[test]
    fn accumulated_rows_are_monotonic() {
        let normalised = normalise(&example_grid()).unwrap();
        let cumulative = accumulate(&normalised);

        for (row, original) in cumulative.row_iter().zip(normalised.row_iter()) {
            assert!(row.iter().zip(row.iter().skip(1)).all(|(a, b)| a <= b));
            assert!((row[row.len() - 1] - original.sum()).abs() < 1e-15);
        }
    }

    #[test]
    fn resample_at_control_points() {
        // uniform radii resampled on themselves are unchanged
        let radii = [1.0, 2.0, 3.0, 4.0];
        let grid = ResampleGrid::new(1.0, 4.0, 4).unwrap();
        let cumulative = accumulate(&normalise(&example_grid()).unwrap());

        let resampled = resample(&radii, &cumulative, &grid).unwrap();
        assert_eq!(resampled, cumulative);
    }

    #[test]
    fn resample_shape_independent_of_radii() {
        let grid = ResampleGrid::new(0.05, 60.0, 100).unwrap();
        for n_radii in [1, 2, 5, 24] {
            let radii = (1..=n_radii).map(|r| r as f64).collect::<Vec<f64>>();
            let cumulative = DMatrix::from_element(3, n_radii, 0.1);
            let resampled = resample(&radii, &cumulative, &grid).unwrap();
            assert_eq!(resampled.shape(), (3, 100));
        }
    }

    #[test]
    fn resample_rejects_bad_radii() {
        let grid = ResampleGrid::new(0.0, 1.0, 5).unwrap();
        let cumulative = DMatrix::from_element(1, 2, 0.5);

        assert!(matches!(
            resample(&[1.0, 2.0, 3.0], &cumulative, &grid),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            resample(&[2.0, 1.0], &cumulative, &grid),
            Err(Error::InvalidAxis { .. })
        ));
    }
}
