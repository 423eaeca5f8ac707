//! Extraction of the angle/radius table from listing text

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::listing::Listing;
use crate::parsers::{beam_energy, data_triple, is_beam_energy, is_end_of_run, is_table_header};
use crate::Marker;

// conehead modules
use conehead_utils::SliceExt;

// external crates
use log::{debug, info, trace, warn};
use nalgebra::DMatrix;

/// Reader for EGSnrc kernel listings
///
/// The convenience [read_listing()](crate::read_listing) is the preferred API,
/// but the reader allows the expected grid dimensions to be enforced.
///
/// ```rust, no_run
/// # use conehead_egslst::ListingReader;
/// let mut reader = ListingReader::new();
/// reader.set_shape(48, 24); // 48 angles, 24 radii
///
/// let listing = reader.parse("path/to/6.0MeV.egslst").unwrap();
/// ```
#[derive(Debug, Default, Clone)]
pub struct ListingReader {
    shape: Option<(usize, usize)>,
}

impl ListingReader {
    /// Create a reader that accepts a grid of any shape
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the grid to have exactly `n_angles` × `n_radii` values
    pub fn set_shape(&mut self, n_angles: usize, n_radii: usize) {
        self.shape = Some((n_angles, n_radii));
    }

    /// Read the listing at `path`
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Listing> {
        let path = path.as_ref();
        info!("Reading {}", path.display());

        let reader = BufReader::new(File::open(path)?);
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        self.extract(&lines, &path.display().to_string())
    }

    /// Read listing content already held in memory
    ///
    /// Errors refer to the source as `<text>`.
    pub fn parse_str(&self, text: &str) -> Result<Listing> {
        let lines = text.lines().collect::<Vec<&str>>();
        self.extract(&lines, "<text>")
    }

    /// Single pass over the lines to find the markers, then the table
    fn extract<S: AsRef<str>>(&self, lines: &[S], file: &str) -> Result<Listing> {
        let mut energy = None;
        let mut header = None;
        let mut terminator = None;

        // later occurrences of any marker take precedence
        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if is_beam_energy(line) {
                let (_, e) = beam_energy(line).map_err(|_| invalid_line(file, i, line))?;
                debug!("Beam energy = {e} MeV (line {})", i + 1);
                energy = Some(e);
            }
            if is_table_header(line) {
                debug!("Table header on line {}", i + 1);
                header = Some(i);
            }
            if is_end_of_run(line) {
                debug!("End of run on line {}", i + 1);
                terminator = Some(i);
            }
        }

        let energy = energy.ok_or_else(|| missing(Marker::BeamEnergy, file))?;
        let header = header.ok_or_else(|| missing(Marker::TableHeader, file))?;
        let terminator = terminator.ok_or_else(|| missing(Marker::EndOfRun, file))?;

        // skip the separator below the header, and the footer above the end
        let start = header + 2;
        let end = terminator.saturating_sub(1);
        if start >= end {
            return Err(Error::EmptyDataBlock {
                file: file.to_string(),
                header: header + 1,
                end: terminator + 1,
            });
        }

        let mut triples = Vec::with_capacity(end - start);
        for (i, line) in lines.iter().enumerate().take(end).skip(start) {
            let line = line.as_ref();
            let (_, triple) = data_triple(line).map_err(|_| invalid_line(file, i, line))?;
            if !(triple.0.is_finite() && triple.1.is_finite() && triple.2.is_finite()) {
                return Err(invalid_line(file, i, line));
            }
            trace!("{triple:?}");
            triples.push(triple);
        }

        let (angles, radii, values) = build_grid(triples, file)?;
        debug!("Grid shape  = {:?}", values.shape());

        if let Some(expected) = self.shape {
            if expected != values.shape() {
                return Err(Error::UnexpectedShape {
                    file: file.to_string(),
                    expected,
                    found: values.shape(),
                });
            }
        }

        if let Ok(min) = values.as_slice().try_min() {
            if min < 0.0 {
                warn!("Negative energy deposition fraction ({min}) in {file}");
            }
        }

        Ok(Listing {
            energy,
            angles,
            radii,
            values,
        })
    }
}

/// Sort the (angle, radius, value) triples and reshape into a dense grid
///
/// Every angle must have a value for every radius, exactly once.
fn build_grid(
    mut triples: Vec<(f64, f64, f64)>,
    file: &str,
) -> Result<(Vec<f64>, Vec<f64>, DMatrix<f64>)> {
    triples.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut angles = triples.iter().map(|t| t.0).collect::<Vec<f64>>();
    angles.dedup();

    let mut radii = triples.iter().map(|t| t.1).collect::<Vec<f64>>();
    radii.sort_by(|a, b| a.total_cmp(b));
    radii.dedup();

    let (n_angles, n_radii) = (angles.len(), radii.len());
    let incomplete = || Error::IncompleteGrid {
        file: file.to_string(),
        n_angles,
        n_radii,
        found: triples.len(),
    };

    if triples.len() != n_angles * n_radii {
        return Err(incomplete());
    }

    // sorted angle-major, so position k must be (angles[k / R], radii[k % R])
    let complete = triples
        .iter()
        .enumerate()
        .all(|(k, t)| t.0 == angles[k / n_radii] && t.1 == radii[k % n_radii]);
    if !complete {
        return Err(incomplete());
    }

    let values = triples.iter().map(|t| t.2).collect::<Vec<f64>>();
    let grid = DMatrix::from_row_slice(n_angles, n_radii, &values);
    Ok((angles, radii, grid))
}

fn missing(marker: Marker, file: &str) -> Error {
    Error::MissingMarker {
        marker,
        file: file.to_string(),
    }
}

fn invalid_line(file: &str, index: usize, content: &str) -> Error {
    Error::InvalidLine {
        file: file.to_string(),
        line: index + 1,
        content: content.trim().to_string(),
    }
}
