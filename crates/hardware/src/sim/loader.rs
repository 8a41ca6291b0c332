//! Trace and parameter file loading.
//!
//! Opens the files a run needs and maps failures onto [`SimError`]:
//! 1. **Traces:** Opened for buffered, lazy line reading.
//! 2. **Parameter files:** JSON objects using the command-line key names.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use super::trace::TraceReader;
use crate::common::SimError;
use crate::config::PartialSimParams;

/// Opens a trace file for lazy parsing.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be opened.
pub fn open_trace(path: impl AsRef<Path>) -> Result<TraceReader<BufReader<File>>, SimError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(TraceReader::new(BufReader::new(file), path))
}

/// Reads a JSON parameter file.
///
/// ```json
/// { "mem-cyc": 100, "bsize": 5, "wr-alloc": 1 }
/// ```
///
/// Keys may be omitted; they are expected to come from the command line.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read, [`SimError::Config`] if it is
/// not a JSON object of known keys.
pub fn load_params(path: impl AsRef<Path>) -> Result<PartialSimParams, SimError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PartialSimParams::from_json_str(&text)?)
}
