//! Observation reference reader.
//!
//! The reference file holds monthly precipitation on a `(time, lat, lon)`
//! grid, possibly with extra dimensions such as ERA5's `expver`.

use std::path::Path;

use ndarray::{Axis, IxDyn};
use skillcast_calendar::YearMonth;
use tracing::debug;

use crate::dataset::RawDataset;
use crate::error::{IoError, SchemaError};
use crate::extract::{align_longitude, nearest_index};
use crate::netcdf_read::read_dataset;
use crate::normalize::{
    CANONICAL_VARIABLE, LATITUDE_COORDINATES, LONGITUDE_COORDINATES, find_coordinate,
    nanmean_axis,
};

/// Preferred names of the reference time axis.
pub const TIME_COORDINATES: &[&str] = &["time", "valid_time", "date"];

/// Read the reference file at `path` and extract the series nearest to
/// (`lat`, `lon`), in file order. Values are in the file's native units.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file is missing, a NetCDF
/// error if it cannot be read, or [`IoError::IncompatibleSchema`] if no
/// precipitation variable, time axis or horizontal coordinate is found.
pub fn read_reference_point(
    path: &Path,
    lat: f64,
    lon: f64,
) -> Result<Vec<(YearMonth, f64)>, IoError> {
    let dataset = read_dataset(path)?;
    reference_point(dataset, lat, lon).map_err(|source| IoError::IncompatibleSchema {
        path: path.to_path_buf(),
        source,
    })
}

/// Point series from an already-read reference dataset.
pub fn reference_point(
    dataset: RawDataset,
    lat: f64,
    lon: f64,
) -> Result<Vec<(YearMonth, f64)>, SchemaError> {
    let name = match dataset.variable(CANONICAL_VARIABLE) {
        Some(v) => v.name.clone(),
        None => dataset
            .variables()
            .first()
            .map(|v| v.name.clone())
            .ok_or_else(|| SchemaError::NoPrecipitation {
                tried: vec![CANONICAL_VARIABLE.to_string()],
            })?,
    };
    let (coords, variable) = dataset.take_variable(&name);
    let variable = variable.ok_or_else(|| SchemaError::NoPrecipitation {
        tried: vec![name.clone()],
    })?;
    let mut dims = variable.dims;
    let mut data = variable.data;

    let is_time = |c: &crate::dataset::Coordinate| c.values.as_time().is_some();
    let (_, time) = find_coordinate(&coords, TIME_COORDINATES, &dims, is_time)
        .or_else(|| {
            coords
                .iter()
                .find(|(_, c)| dims.contains(&c.dim) && is_time(*c))
                .map(|(k, c)| (k.as_str(), c))
        })
        .ok_or(SchemaError::NoTimeCoordinate)?;
    let (_, lat_coord) = find_coordinate(&coords, LATITUDE_COORDINATES, &dims, |c| {
        c.values.as_numeric().is_some()
    })
    .ok_or(SchemaError::NoLatitude)?;
    let (_, lon_coord) = find_coordinate(&coords, LONGITUDE_COORDINATES, &dims, |c| {
        c.values.as_numeric().is_some()
    })
    .ok_or(SchemaError::NoLongitude)?;

    let keep = [&time.dim, &lat_coord.dim, &lon_coord.dim];
    for axis in (0..dims.len()).rev() {
        if keep.contains(&&dims[axis]) {
            continue;
        }
        data = nanmean_axis(&data, Axis(axis));
        let extra = dims.remove(axis);
        debug!(dimension = %extra, "collapsed extra reference dimension");
    }

    let axis_of = |dim: &String| dims.iter().position(|d| d == dim);
    let (Some(t_ax), Some(y_ax), Some(x_ax)) = (
        axis_of(&time.dim),
        axis_of(&lat_coord.dim),
        axis_of(&lon_coord.dim),
    ) else {
        return Err(SchemaError::Rank {
            expected: 3,
            got: dims.len(),
        });
    };

    let stamps = time.values.as_time().unwrap_or_default();
    let lats = lat_coord.values.as_numeric().unwrap_or_default();
    let lons = lon_coord.values.as_numeric().unwrap_or_default();
    for (name, coord_len, axis) in [
        ("time", stamps.len(), t_ax),
        ("latitude", lats.len(), y_ax),
        ("longitude", lons.len(), x_ax),
    ] {
        if coord_len != data.shape()[axis] {
            return Err(SchemaError::CoordinateLength {
                name: name.to_string(),
                expected: data.shape()[axis],
                got: coord_len,
            });
        }
    }

    let lon = align_longitude(lons, lon);
    let (Some(iy), Some(ix)) = (nearest_index(lats, lat), nearest_index(lons, lon)) else {
        return Ok(Vec::new());
    };

    let mut index = vec![0usize; dims.len()];
    index[y_ax] = iy;
    index[x_ax] = ix;
    let series = stamps
        .iter()
        .enumerate()
        .map(|(t, stamp)| {
            index[t_ax] = t;
            (YearMonth::from_date(stamp), data[IxDyn(&index)])
        })
        .collect::<Vec<_>>();

    debug!(
        variable = %name,
        n_months = series.len(),
        grid_lat = lats[iy],
        grid_lon = lons[ix],
        "reference point extracted"
    );
    Ok(series)
}
