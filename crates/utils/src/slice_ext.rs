use crate::error::{Error, Result};

// external crates
use itertools::Itertools;

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use conehead_utils::SliceExt;
    /// # use conehead_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1, f64::MIN, 2.2].try_min(), Ok(f64::MIN));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    ///
    /// The float primitives do not implement `Ord` due to `NaN` being
    /// incomparable, so this uses `total_cmp` for an ordering in accordance
    /// with the IEEE 754 (2008 revision) totalOrder predicate.
    fn try_min(&self) -> Result<T>;

    /// Find index bin containing 'value', where bins are low < value <= high
    ///
    /// A value on a bin edge returns the bin below. Values equal to the lowest
    /// bound are considered part of the first bin. Edges must be ascending.
    ///
    /// ```text
    ///     0.0 <= bin 0 <= 0.1
    ///     0.1 < bin 1 <= 1.0
    ///     1.0 < bin 2 <= 20.0
    /// ```
    ///
    /// ```rust
    /// # use conehead_utils::SliceExt;
    /// let bounds = vec![0.0, 0.1, 1.0, 20.0];
    ///
    /// // Find values in the array
    /// assert_eq!(bounds.find_bin_inclusive(0.0 ), Ok(0));
    /// assert_eq!(bounds.find_bin_inclusive(0.5 ), Ok(1));
    /// assert_eq!(bounds.find_bin_inclusive(1.0 ), Ok(1));
    /// assert_eq!(bounds.find_bin_inclusive(20.0), Ok(2));
    ///
    /// // Values outside the bin bounds are an error case
    /// assert!(bounds.find_bin_inclusive(-1.0).is_err());
    /// assert!(bounds.find_bin_inclusive(21.0).is_err());
    /// ```
    fn find_bin_inclusive(&self, value: T) -> Result<usize>;

    /// Check the values are finite and strictly increasing
    ///
    /// ```rust
    /// # use conehead_utils::SliceExt;
    /// # use conehead_utils::Error;
    /// assert_eq!([0.05, 0.1, 0.15].check_ascending(), Ok(()));
    /// assert_eq!(
    ///     [0.05, 0.1, 0.1].check_ascending(),
    ///     Err(Error::NotStrictlyAscending { index: 2 })
    /// );
    /// ```
    fn check_ascending(&self) -> Result<()>;

    /// Running sum of the values
    ///
    /// Element `i` of the result is the sum of elements `0..=i`.
    ///
    /// ```rust
    /// # use conehead_utils::SliceExt;
    /// assert_eq!([0.25, 0.25].cumulative_sum(), vec![0.25, 0.5]);
    /// assert!(Vec::<f64>::new().cumulative_sum().is_empty());
    /// ```
    fn cumulative_sum(&self) -> Vec<T>;

    /// Piecewise linear interpolation of the curve (`self`, `fp`) at `x`
    ///
    /// `self` holds the x coordinates of the control points, which must be
    /// ascending. Anything outside of the control points takes the value of
    /// the nearest boundary point rather than being extrapolated.
    ///
    /// ```rust
    /// # use conehead_utils::SliceExt;
    /// let radii = [1.0, 2.0];
    /// let values = [0.5, 1.0];
    ///
    /// assert_eq!(radii.interpolate(&values, 1.5), Ok(0.75));
    ///
    /// // clamped to the boundary values
    /// assert_eq!(radii.interpolate(&values, 0.0), Ok(0.5));
    /// assert_eq!(radii.interpolate(&values, 3.0), Ok(1.0));
    /// ```
    fn interpolate(&self, fp: &[T], x: T) -> Result<T>;
}

impl SliceExt<f64> for [f64] {
    fn try_min(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        self.iter()
            .min_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn find_bin_inclusive(&self, value: f64) -> Result<usize> {
        // make sure there are bin edges to check against
        let n = self.len();
        if n < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: n,
                minimum_required: 2,
            });
        }

        let lower_bound = self[0];
        let upper_bound = self[n - 1];

        // is the value relevant? (NaN fails both comparisons)
        if !(lower_bound..=upper_bound).contains(&value) {
            return Err(Error::ValueOutsideOfBounds {
                value,
                lower_bound,
                upper_bound,
            });
        }

        // special case for being on the lowest edge
        if value == lower_bound {
            return Ok(0);
        }

        // first edge at or above the value closes the bin, range INCLUSIVE of
        // the upper edge
        Ok(self.partition_point(|edge| *edge < value) - 1)
    }

    fn check_ascending(&self) -> Result<()> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        }

        match self.iter().tuple_windows().position(|(a, b)| a >= b) {
            Some(i) => Err(Error::NotStrictlyAscending { index: i + 1 }),
            None => Ok(()),
        }
    }

    fn cumulative_sum(&self) -> Vec<f64> {
        self.iter()
            .scan(0.0, |total, v| {
                *total += v;
                Some(*total)
            })
            .collect()
    }

    fn interpolate(&self, fp: &[f64], x: f64) -> Result<f64> {
        if self.len() != fp.len() {
            return Err(Error::UnequalSliceLengths {
                left: self.len(),
                right: fp.len(),
            });
        }

        let (Some(&first), Some(&last)) = (self.first(), self.last()) else {
            return Err(Error::SliceContainsNoValues);
        };

        if x.is_nan() {
            return Err(Error::ValueOutsideOfBounds {
                value: x,
                lower_bound: first,
                upper_bound: last,
            });
        }

        // flat extrapolation either side of the control points
        if x <= first {
            return Ok(fp[0]);
        }
        if x >= last {
            return Ok(fp[fp.len() - 1]);
        }

        let i = self.find_bin_inclusive(x)?;
        let (x0, x1) = (self[i], self[i + 1]);
        let (y0, y1) = (fp[i], fp[i + 1]);

        // exact on the control point, avoids rounding in the lerp
        if x == x1 {
            return Ok(y1);
        }

        Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

/// Uniformly spaced values over the closed interval [`lower`, `upper`]
///
/// The final value is exactly `upper` for any `n > 1`, and a single sample
/// is just `lower`.
///
/// ```rust
/// # use conehead_utils::linspace;
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(0.05, 60.0, 1), vec![0.05]);
/// assert!(linspace(0.0, 1.0, 0).is_empty());
/// ```
pub fn linspace(lower: f64, upper: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lower],
        _ => {
            let step = (upper - lower) / (n - 1) as f64;
            let mut values = (0..n).map(|i| lower + i as f64 * step).collect::<Vec<f64>>();
            values[n - 1] = upper;
            values
        }
    }
}
