//! Integration tests for building kernels from listings and tables

use std::collections::BTreeMap;

use conehead_kernel::pipeline::{accumulate, normalise, resample};
use conehead_kernel::{
    combine, polyenergetic, read_binary, read_json, read_kernels, write_binary, write_json,
    EnergyWeights, Error, Kernel, ResampleGrid, TabulatedKernel,
};
use nalgebra::DMatrix;
use rstest::{fixture, rstest};

#[fixture]
fn grid() -> ResampleGrid {
    ResampleGrid::new(0.5, 10.0, 20).unwrap()
}

#[fixture]
fn kernels(grid: ResampleGrid) -> BTreeMap<String, Kernel> {
    let paths = BTreeMap::from([
        ("1.0".to_string(), "./data/listings/1.0MeV.egslst"),
        ("2.0".to_string(), "./data/listings/2.0MeV.egslst"),
        ("3.0".to_string(), "./data/listings/3.0MeV.egslst"),
    ]);
    read_kernels(&paths, &grid).unwrap()
}

/// Rows of a matrix as plain vectors for easier comparison
fn rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

#[test]
fn listing_to_kernel() {
    // 2 × 2 grid of equal values
    let kernel = Kernel::from_file("../egslst/data/scenario_2x2.egslst", &grid()).unwrap();
    assert_eq!(kernel.energy(), Some(6.0));
    assert_eq!(kernel.angles(), &[0.0, 3.75]);
    assert_eq!(kernel.radii(), &[0.5, 1.0]);
    assert_eq!(kernel.shape(), (2, 20));
    assert_eq!(rows(kernel.differential()), vec![vec![0.25, 0.25]; 2]);
}

#[test]
fn uniform_grid_steps() {
    let raw = DMatrix::from_element(2, 2, 1.0);

    let normalised = normalise(&raw).unwrap();
    assert_eq!(rows(&normalised), vec![vec![0.25, 0.25]; 2]);

    let cumulative = accumulate(&normalised);
    assert_eq!(rows(&cumulative), vec![vec![0.25, 0.5]; 2]);
}

#[test]
fn clamped_resampling() {
    let cumulative = DMatrix::from_row_slice(1, 2, &[0.5, 1.0]);
    let grid = ResampleGrid::new(0.0, 3.0, 7).unwrap();
    let resampled = resample(&[1.0, 2.0], &cumulative, &grid).unwrap();

    // 0.0, 0.5, ..., 3.0 cm
    assert_eq!(
        rows(&resampled),
        vec![vec![0.5, 0.5, 0.5, 0.75, 1.0, 1.0, 1.0]]
    );
}

#[test]
fn missing_terminator() {
    let result = Kernel::from_file("../egslst/data/missing_end.egslst", &grid());
    assert!(matches!(
        result,
        Err(Error::Format(conehead_egslst::Error::MissingMarker { .. }))
    ));
}

#[test]
fn all_zero_grid() {
    let result = Kernel::new(
        vec![0.0, 90.0],
        vec![1.0, 2.0],
        &DMatrix::zeros(2, 2),
        &grid(),
    );
    assert!(matches!(result, Err(Error::DegenerateInput { .. })));
}

#[test]
fn combining_mismatched_grids() {
    let a = DMatrix::from_element(2, 2, 1.0);
    let b = DMatrix::from_element(2, 3, 1.0);
    assert!(matches!(
        combine(&[(&a, 0.5), (&b, 0.5)]),
        Err(Error::ShapeMismatch {
            expected: (2, 2),
            found: (2, 3)
        })
    ));
}

#[rstest]
fn mono_energetic_kernels(kernels: BTreeMap<String, Kernel>) {
    assert_eq!(kernels.len(), 3);

    for (label, kernel) in &kernels {
        assert_eq!(kernel.energy(), Some(label.parse::<f64>().unwrap()));
        assert_eq!(kernel.angles(), &[0.0, 45.0, 90.0, 135.0]);
        assert_eq!(kernel.radii(), &[0.5, 1.0, 2.0, 5.0, 10.0]);
        assert_eq!(kernel.shape(), (4, 20));
        assert!((kernel.differential().sum() - 1.0).abs() < 1e-12);

        // never decreasing, and the last sample holds the full row total
        for (row, differential) in kernel
            .cumulative()
            .row_iter()
            .zip(kernel.differential().row_iter())
        {
            assert!(row.iter().zip(row.iter().skip(1)).all(|(a, b)| a <= b));
            assert!((row[19] - differential.sum()).abs() < 1e-12);
        }
    }
}

#[rstest]
fn identical_kernels_combine_to_themselves(kernels: BTreeMap<String, Kernel>, grid: ResampleGrid) {
    let one = kernels["1.0"].clone();
    let duplicated = BTreeMap::from([("a".to_string(), one.clone()), ("b".to_string(), one.clone())]);
    let weights = EnergyWeights::from_iter([("a", 0.5), ("b", 0.5)]);

    let poly = polyenergetic(&duplicated, &weights, &grid).unwrap();
    assert_eq!(poly.energy(), None);
    for (a, b) in poly.cumulative().iter().zip(one.cumulative().iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[rstest]
fn weighted_spectrum(kernels: BTreeMap<String, Kernel>, grid: ResampleGrid) {
    let weights = EnergyWeights::from_iter([("1.0", 0.2), ("2.0", 0.5), ("3.0", 0.3)]);
    let poly = polyenergetic(&kernels, &weights, &grid).unwrap();

    assert!(poly.is_polyenergetic());
    assert_eq!(poly.shape(), (4, 20));
    assert!((poly.differential().sum() - 1.0).abs() < 1e-12);

    // the mixture sits between the extremes of its components
    for (i, value) in poly.differential().iter().enumerate() {
        let parts = kernels
            .values()
            .map(|k| k.differential().as_slice()[i])
            .collect::<Vec<f64>>();
        let min = parts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = parts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(*value >= min - 1e-15 && *value <= max + 1e-15);
    }
}

#[rstest]
fn mismatched_listings(kernels: BTreeMap<String, Kernel>, grid: ResampleGrid) {
    let mut kernels = kernels;
    kernels.insert(
        "coarse".to_string(),
        Kernel::from_file("./data/listings/coarse_1.0MeV.egslst", &grid).unwrap(),
    );

    let weights = EnergyWeights::from_iter([("1.0", 0.5), ("coarse", 0.5)]);
    assert!(matches!(
        polyenergetic(&kernels, &weights, &grid),
        Err(Error::ShapeMismatch {
            expected: (4, 5),
            found: (4, 6)
        })
    ));
}

#[test]
fn failed_listing_fails_the_set() {
    let paths = BTreeMap::from([
        ("1.0".to_string(), "./data/listings/1.0MeV.egslst"),
        ("bad".to_string(), "../egslst/data/bad_line.egslst"),
    ]);
    assert!(read_kernels(&paths, &grid()).is_err());
}

#[test]
fn reference_table() {
    let kernel =
        Kernel::from_tabulated(TabulatedKernel::reference_6mv(), &ResampleGrid::default()).unwrap();

    assert_eq!(kernel.shape(), (48, 5996));
    assert_eq!(kernel.resample_radii()[5995], 60.0);
    assert!((kernel.differential().sum() - 1.0).abs() < 1e-12);

    // everything is deposited within the outermost radius
    let total = (0..48)
        .map(|i| kernel.fraction_within(i, 60.0).unwrap())
        .sum::<f64>();
    assert!((total - 1.0).abs() < 1e-12);
}

#[rstest]
#[case("json")]
#[case("bin")]
fn saved_kernels_reload(kernels: BTreeMap<String, Kernel>, #[case] extension: &str) {
    let kernel = &kernels["2.0"];
    let path = std::env::temp_dir().join(format!("conehead_kernel_2MeV.{extension}"));

    let loaded = match extension {
        "json" => {
            write_json(kernel, &path).unwrap();
            read_json(&path).unwrap()
        }
        _ => {
            write_binary(kernel, &path).unwrap();
            read_binary(&path).unwrap()
        }
    };
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.energy(), Some(2.0));
    assert_eq!(loaded.shape(), kernel.shape());
    for (a, b) in loaded.cumulative().iter().zip(kernel.cumulative().iter()) {
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1e-300));
    }
}

#[test]
fn inconsistent_saved_kernel() {
    let path = std::env::temp_dir().join("conehead_kernel_inconsistent.json");
    let kernel = Kernel::from_file("./data/listings/1.0MeV.egslst", &grid()).unwrap();
    write_json(&kernel, &path).unwrap();

    // claim a finer resample grid than the stored cumulative data
    let text = std::fs::read_to_string(&path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["grid"]["samples"] = serde_json::json!(40);
    std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

    let result = read_json(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(Error::JSONError(_))));
}
