//! Nearest-neighbour point extraction from a [`GriddedSeries`].

use skillcast_calendar::YearMonth;
use tracing::debug;

use crate::gridded::GriddedSeries;

/// One raw value at the extracted grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRow {
    /// Start month of the run.
    pub start: YearMonth,
    /// Lead time in months.
    pub lead: i32,
    /// Raw value, in the dataset's native units.
    pub value: f64,
}

/// Index of the coordinate value closest to `target`.
///
/// Ties go to the first index. NaN coordinates never win. `None` if
/// `values` has no finite entry.
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - target).abs();
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Bring a requested longitude onto the grid's convention.
///
/// A negative request against a 0..360 grid is shifted by +360.
pub fn align_longitude(grid: &[f64], lon: f64) -> f64 {
    let east_convention = grid.iter().any(|&v| v > 180.0) && grid.iter().all(|&v| v >= 0.0);
    if east_convention && lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Rows at the grid cell nearest to (`lat`, `lon`), in start then lead order.
///
/// An empty grid yields no rows.
pub fn extract_point(series: &GriddedSeries, lat: f64, lon: f64) -> Vec<PointRow> {
    let lon = align_longitude(series.longitudes(), lon);
    let (Some(iy), Some(ix)) = (
        nearest_index(series.latitudes(), lat),
        nearest_index(series.longitudes(), lon),
    ) else {
        return Vec::new();
    };

    debug!(
        lat,
        lon,
        grid_lat = series.latitudes()[iy],
        grid_lon = series.longitudes()[ix],
        "nearest grid cell"
    );

    let tp = series.tp();
    let mut rows = Vec::with_capacity(series.starts().len() * series.leads().len());
    for (is, &start) in series.starts().iter().enumerate() {
        for (il, &lead) in series.leads().iter().enumerate() {
            rows.push(PointRow {
                start,
                lead,
                value: tp[[is, il, iy, ix]],
            });
        }
    }
    rows
}
