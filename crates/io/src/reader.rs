//! High-level entry points: file -> canonical grid -> point rows.

use std::path::Path;

use tracing::{debug, info_span};

use crate::error::IoError;
use crate::extract::{PointRow, extract_point};
use crate::gridded::GriddedSeries;
use crate::netcdf_read::read_dataset;
use crate::normalize::normalize;

/// Read a hindcast or operational file and normalize it to the canonical
/// schema.
///
/// `native` is the model-specific precipitation variable name, if any.
///
/// # Errors
///
/// Returns [`IoError::IncompatibleSchema`] when the file is readable but
/// cannot be normalized, or a read error otherwise.
pub fn read_gridded(path: &Path, native: Option<&str>) -> Result<GriddedSeries, IoError> {
    let dataset = read_dataset(path)?;
    normalize(dataset, native).map_err(|source| IoError::IncompatibleSchema {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `path`, normalize it and extract the rows nearest to (`lat`, `lon`).
///
/// The file is opened, read and closed inside this call.
///
/// # Errors
///
/// See [`read_gridded`].
pub fn read_point_series(
    path: &Path,
    lat: f64,
    lon: f64,
    native: Option<&str>,
) -> Result<Vec<PointRow>, IoError> {
    let span = info_span!("read_point_series", path = %path.display());
    let _guard = span.enter();

    let series = read_gridded(path, native)?;
    let rows = extract_point(&series, lat, lon);
    debug!(n_rows = rows.len(), "point rows extracted");
    Ok(rows)
}
