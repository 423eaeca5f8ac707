//! Save and load built kernels
//!
//! Building the cumulative grid for a full set of listings is not free, so a
//! [Kernel] can be stored and loaded again without the source data. JSON is
//! readable by anything, while the binary format is compact and fast.
//!
//! Anything loaded is checked for consistent axes and grid shapes while it is
//! deserialised, so an inconsistent file is an error rather than a kernel.

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::kernel::Kernel;

// external crates
use log::info;

/// Write a [Kernel] to a JSON file
///
/// ```rust, no_run
/// # use conehead_kernel::{write_json, Kernel, ResampleGrid};
/// let kernel = Kernel::from_file("path/to/6.0MeV.egslst", &ResampleGrid::default()).unwrap();
/// write_json(&kernel, "./kernel_6MeV.json").unwrap();
/// ```
pub fn write_json<P: AsRef<Path>>(kernel: &Kernel, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;
    serde_json::to_writer_pretty(&mut writer, kernel)?;
    writer.flush()?;
    Ok(())
}

/// Read a [Kernel] back from a JSON file
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Kernel> {
    Ok(serde_json::from_reader(init_reader(path)?)?)
}

/// Write a [Kernel] to a binary file
///
/// ```rust, no_run
/// # use conehead_kernel::{write_binary, read_binary, Kernel, ResampleGrid};
/// let kernel = Kernel::from_file("path/to/6.0MeV.egslst", &ResampleGrid::default()).unwrap();
/// write_binary(&kernel, "./kernel_6MeV.bin").unwrap();
///
/// let loaded = read_binary("./kernel_6MeV.bin").unwrap();
/// assert_eq!(kernel, loaded);
/// ```
pub fn write_binary<P: AsRef<Path>>(kernel: &Kernel, path: P) -> Result<()> {
    let mut writer = init_writer(path)?;
    bincode::serialize_into(&mut writer, kernel)?;
    writer.flush()?;
    Ok(())
}

/// Read a [Kernel] back from a binary file
pub fn read_binary<P: AsRef<Path>>(path: P) -> Result<Kernel> {
    Ok(bincode::deserialize_from(init_reader(path)?)?)
}

/// Initialise a writer from anything that can be turned into a path
fn init_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    info!("Writing {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}

/// Initialise a reader from anything that can be turned into a path
fn init_reader<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    let path = path.as_ref();
    info!("Reading {}", path.display());
    Ok(BufReader::new(File::open(path)?))
}
