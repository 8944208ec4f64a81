//! Schema normalization: heterogeneous model output -> [`GriddedSeries`].
//!
//! Each originating centre names its precipitation variable and its
//! lead/start coordinates differently. Names are resolved by testing fixed
//! priority lists in order and taking the first match.

use std::collections::BTreeMap;

use ndarray::{ArrayD, Axis, Ix4, IxDyn};
use skillcast_calendar::YearMonth;
use tracing::debug;

use crate::dataset::{Coordinate, RawDataset};
use crate::error::SchemaError;
use crate::gridded::GriddedSeries;

/// Canonical name of the precipitation variable.
pub const CANONICAL_VARIABLE: &str = "tp";

/// Known precipitation variable names, tested after [`CANONICAL_VARIABLE`].
pub const PRECIPITATION_VARIABLES: &[&str] = &[
    "tprate",
    "total_precipitation",
    "precip",
    "precipitation_flux",
];

/// Known lead-time coordinate names.
pub const LEAD_COORDINATES: &[&str] = &["lead", "forecastMonth", "leadtime_month", "step"];

/// Known start/reference-date coordinate names.
pub const START_COORDINATES: &[&str] = &[
    "start_date",
    "time",
    "forecast_reference_time",
    "indexing_time",
    "index",
];

/// Known latitude coordinate names.
pub const LATITUDE_COORDINATES: &[&str] = &["latitude", "lat"];

/// Known longitude coordinate names.
pub const LONGITUDE_COORDINATES: &[&str] = &["longitude", "lon"];

/// Ensemble-member dimension names.
pub const ENSEMBLE_DIMENSIONS: &[&str] = &["number", "realization", "member"];

/// Precipitation variable names in the order they are tested.
pub fn precipitation_candidates(native: Option<&str>) -> Vec<&str> {
    let mut names = Vec::with_capacity(PRECIPITATION_VARIABLES.len() + 2);
    names.push(CANONICAL_VARIABLE);
    names.extend_from_slice(PRECIPITATION_VARIABLES);
    if let Some(native) = native {
        if !names.contains(&native) {
            names.push(native);
        }
    }
    names
}

/// Map a raw dataset onto `tp[start_date, lead, latitude, longitude]`.
///
/// `native` is the model-specific variable name, tested last.
///
/// # Errors
///
/// Returns a [`SchemaError`] naming the first thing that could not be
/// resolved. Callers treat this as "model incompatible", not as fatal.
pub fn normalize(dataset: RawDataset, native: Option<&str>) -> Result<GriddedSeries, SchemaError> {
    let candidates = precipitation_candidates(native);
    let no_precipitation = || SchemaError::NoPrecipitation {
        tried: candidates.iter().map(|s| s.to_string()).collect(),
    };

    let name = candidates
        .iter()
        .find(|n| dataset.variable(n).is_some())
        .map(|n| n.to_string())
        .ok_or_else(no_precipitation)?;
    let (coords, variable) = dataset.take_variable(&name);
    let variable = variable.ok_or_else(no_precipitation)?;

    let mut dims = variable.dims;
    let mut data = variable.data;

    if let Some(axis) = dims
        .iter()
        .position(|d| ENSEMBLE_DIMENSIONS.contains(&d.as_str()))
    {
        if data.shape()[axis] == 0 {
            return Err(SchemaError::EmptyEnsemble {
                name: dims[axis].clone(),
            });
        }
        data = nanmean_axis(&data, Axis(axis));
        let member_dim = dims.remove(axis);
        debug!(variable = %name, dimension = %member_dim, "collapsed ensemble by mean");
    }

    let (lead_name, lead) = find_coordinate(&coords, LEAD_COORDINATES, &dims, |c| {
        c.values.as_numeric().is_some()
    })
    .ok_or(SchemaError::NoLeadCoordinate)?;
    let (start_name, start) = find_coordinate(&coords, START_COORDINATES, &dims, |c| {
        c.values.as_time().is_some() && c.dim != lead.dim
    })
    .ok_or(SchemaError::NoStartCoordinate)?;
    let (lat_name, lat) = find_coordinate(&coords, LATITUDE_COORDINATES, &dims, |c| {
        c.values.as_numeric().is_some()
    })
    .ok_or(SchemaError::NoLatitude)?;
    let (lon_name, lon) = find_coordinate(&coords, LONGITUDE_COORDINATES, &dims, |c| {
        c.values.as_numeric().is_some()
    })
    .ok_or(SchemaError::NoLongitude)?;

    let axes = [
        (start_name, start),
        (lead_name, lead),
        (lat_name, lat),
        (lon_name, lon),
    ];
    ensure_distinct_dims(&axes)?;

    squeeze_extra_dims(&mut data, &mut dims, &axes)?;

    let mut perm = Vec::with_capacity(axes.len());
    for (coord_name, coord) in &axes {
        let axis = dims
            .iter()
            .position(|d| *d == coord.dim)
            .ok_or(SchemaError::Rank {
                expected: axes.len(),
                got: dims.len(),
            })?;
        let expected = data.shape()[axis];
        if coord.values.len() != expected {
            return Err(SchemaError::CoordinateLength {
                name: coord_name.to_string(),
                expected,
                got: coord.values.len(),
            });
        }
        perm.push(axis);
    }

    let ndim = data.ndim();
    let tp = data
        .permuted_axes(IxDyn(&perm))
        .into_dimensionality::<Ix4>()
        .map_err(|_| SchemaError::Rank {
            expected: 4,
            got: ndim,
        })?
        .as_standard_layout()
        .into_owned();

    let starts = start
        .values
        .as_time()
        .unwrap_or_default()
        .iter()
        .map(YearMonth::from_date)
        .collect();
    let leads = lead
        .values
        .as_numeric()
        .unwrap_or_default()
        .iter()
        .map(|&v| whole_lead(v))
        .collect::<Result<Vec<_>, _>>()?;
    let latitudes = lat.values.as_numeric().unwrap_or_default().to_vec();
    let longitudes = lon.values.as_numeric().unwrap_or_default().to_vec();

    debug!(
        variable = %name,
        lead = %lead_name,
        start = %start_name,
        shape = ?tp.shape(),
        "normalized dataset"
    );

    Ok(GriddedSeries::new(tp, starts, leads, latitudes, longitudes))
}

/// First coordinate from `names` that lies on one of `dims` and passes `accept`.
pub(crate) fn find_coordinate<'a>(
    coords: &'a BTreeMap<String, Coordinate>,
    names: &[&str],
    dims: &[String],
    accept: impl Fn(&Coordinate) -> bool,
) -> Option<(&'a str, &'a Coordinate)> {
    names.iter().find_map(|&name| {
        let (key, coord) = coords.get_key_value(name)?;
        (dims.contains(&coord.dim) && accept(coord)).then_some((key.as_str(), coord))
    })
}

/// Mean along `axis`, skipping NaN. All-NaN lanes give NaN.
pub(crate) fn nanmean_axis(data: &ArrayD<f64>, axis: Axis) -> ArrayD<f64> {
    data.map_axis(axis, |lane| {
        let (sum, n) = lane
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
        if n == 0 { f64::NAN } else { sum / n as f64 }
    })
}

fn ensure_distinct_dims(axes: &[(&str, &Coordinate)]) -> Result<(), SchemaError> {
    for (i, (first, a)) in axes.iter().enumerate() {
        for (second, b) in &axes[i + 1..] {
            if a.dim == b.dim {
                return Err(SchemaError::SharedDimension {
                    first: first.to_string(),
                    second: second.to_string(),
                    dim: a.dim.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Drop length-1 dimensions that are not canonical axes.
fn squeeze_extra_dims(
    data: &mut ArrayD<f64>,
    dims: &mut Vec<String>,
    axes: &[(&str, &Coordinate)],
) -> Result<(), SchemaError> {
    for axis in (0..dims.len()).rev() {
        if axes.iter().any(|(_, c)| c.dim == dims[axis]) {
            continue;
        }
        let len = data.shape()[axis];
        if len != 1 {
            return Err(SchemaError::UnexpectedDimension {
                name: dims[axis].clone(),
                len,
            });
        }
        *data = data.index_axis(Axis(axis), 0).to_owned();
        dims.remove(axis);
    }
    Ok(())
}

fn whole_lead(value: f64) -> Result<i32, SchemaError> {
    let rounded = value.round();
    if !value.is_finite() || (value - rounded).abs() > 1e-6 || rounded.abs() > f64::from(i32::MAX) {
        return Err(SchemaError::InvalidLead { value });
    }
    Ok(rounded as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataVariable;
    use chrono::{NaiveDate, NaiveDateTime};
    use ndarray::ArrayD;

    fn first_of_month(year: i32, month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// 2 members x 3 starts x 2 leads x 1 lat x 2 lon, value = start*10 + lead + member*100
    fn ensemble_dataset(var_name: &str, lead_name: &str, start_name: &str) -> RawDataset {
        let shape = [2usize, 3, 2, 1, 2];
        let data = ArrayD::from_shape_fn(IxDyn(&shape), |ix| {
            (ix[1] * 10 + ix[2] + 1) as f64 + ix[0] as f64 * 100.0
        });
        let mut coords = BTreeMap::new();
        coords.insert(
            "number".to_string(),
            Coordinate::numeric("number", vec![0.0, 1.0]),
        );
        coords.insert(
            start_name.to_string(),
            Coordinate::time(
                start_name,
                vec![
                    first_of_month(1993, 1),
                    first_of_month(1994, 1),
                    first_of_month(1995, 1),
                ],
            ),
        );
        coords.insert(
            lead_name.to_string(),
            Coordinate::numeric(lead_name, vec![1.0, 2.0]),
        );
        coords.insert(
            "latitude".to_string(),
            Coordinate::numeric("latitude", vec![-35.5]),
        );
        coords.insert(
            "longitude".to_string(),
            Coordinate::numeric("longitude", vec![-60.0, -59.0]),
        );
        let variable = DataVariable {
            name: var_name.to_string(),
            dims: vec![
                "number".to_string(),
                start_name.to_string(),
                lead_name.to_string(),
                "latitude".to_string(),
                "longitude".to_string(),
            ],
            data,
        };
        RawDataset::new("test.nc", coords, vec![variable])
    }

    #[test]
    fn collapses_ensemble_and_renames() {
        let ds = ensemble_dataset("tprate", "forecastMonth", "forecast_reference_time");
        let series = normalize(ds, None).unwrap();

        assert_eq!(series.tp().shape(), &[3, 2, 1, 2]);
        assert_eq!(series.leads(), &[1, 2]);
        assert_eq!(series.starts()[2], YearMonth::new(1995, 1).unwrap());
        // mean of member 0 and member 1 (= +100) -> +50
        assert_eq!(series.tp()[[1, 1, 0, 0]], 12.0 + 50.0);
    }

    #[test]
    fn ensemble_mean_skips_nan_members() {
        let mut ds = ensemble_dataset("tp", "lead", "start_date");
        let (coords, variable) = ds.clone().take_variable("tp");
        let mut variable = variable.unwrap();
        variable.data[[1, 0, 0, 0, 0]] = f64::NAN;
        ds = RawDataset::new("test.nc", coords, vec![variable]);

        let series = normalize(ds, None).unwrap();
        assert_eq!(series.tp()[[0, 0, 0, 0]], 1.0);
    }

    #[test]
    fn permutes_to_canonical_order() {
        // dims stored as (longitude, lead, time, latitude)
        let shape = [2usize, 2, 3, 1];
        let data = ArrayD::from_shape_fn(IxDyn(&shape), |ix| {
            (ix[0] * 1000 + ix[1] * 100 + ix[2]) as f64
        });
        let mut coords = BTreeMap::new();
        coords.insert(
            "time".to_string(),
            Coordinate::time(
                "time",
                (1..=3).map(|m| first_of_month(2000, m)).collect(),
            ),
        );
        coords.insert(
            "leadtime_month".to_string(),
            Coordinate::numeric("leadtime_month", vec![1.0, 2.0]),
        );
        coords.insert("lat".to_string(), Coordinate::numeric("lat", vec![0.0]));
        coords.insert("lon".to_string(), Coordinate::numeric("lon", vec![10.0, 11.0]));
        let variable = DataVariable {
            name: "precip".to_string(),
            dims: vec![
                "lon".to_string(),
                "leadtime_month".to_string(),
                "time".to_string(),
                "lat".to_string(),
            ],
            data,
        };
        let series = normalize(RawDataset::new("x.nc", coords, vec![variable]), None).unwrap();

        assert_eq!(series.tp().shape(), &[3, 2, 1, 2]);
        // start=2, lead=1, lat=0, lon=1 -> stored at [lon=1, lead=1, time=2, lat=0]
        assert_eq!(series.tp()[[2, 1, 0, 1]], 1102.0);
        assert_eq!(series.longitudes(), &[10.0, 11.0]);
    }

    #[test]
    fn unknown_variable_is_incompatible() {
        let ds = ensemble_dataset("rainfall", "lead", "start_date");
        let err = normalize(ds, None).unwrap_err();
        assert!(matches!(err, SchemaError::NoPrecipitation { .. }));
    }

    #[test]
    fn native_name_is_tested_last() {
        let ds = ensemble_dataset("rainfall", "lead", "start_date");
        assert!(normalize(ds, Some("rainfall")).is_ok());
        assert_eq!(
            precipitation_candidates(Some("rainfall")).last(),
            Some(&"rainfall")
        );
    }

    #[test]
    fn missing_lead_is_incompatible() {
        let ds = ensemble_dataset("tp", "horizon", "start_date");
        assert_eq!(normalize(ds, None).unwrap_err(), SchemaError::NoLeadCoordinate);
    }

    #[test]
    fn numeric_start_is_rejected() {
        let ds = ensemble_dataset("tp", "lead", "start_date");
        let (mut coords, variable) = ds.take_variable("tp");
        coords.insert(
            "start_date".to_string(),
            Coordinate::numeric("start_date", vec![0.0, 1.0, 2.0]),
        );
        let ds = RawDataset::new("x.nc", coords, variable.into_iter().collect());
        assert_eq!(normalize(ds, None).unwrap_err(), SchemaError::NoStartCoordinate);
    }

    #[test]
    fn fractional_lead_is_rejected() {
        let ds = ensemble_dataset("tp", "lead", "start_date");
        let (mut coords, variable) = ds.take_variable("tp");
        coords.insert("lead".to_string(), Coordinate::numeric("lead", vec![1.0, 1.5]));
        let ds = RawDataset::new("x.nc", coords, variable.into_iter().collect());
        assert!(matches!(
            normalize(ds, None).unwrap_err(),
            SchemaError::InvalidLead { .. }
        ));
    }

    #[test]
    fn singleton_extra_dimension_is_squeezed() {
        let shape = [1usize, 2, 1, 1, 1];
        let data = ArrayD::from_shape_vec(IxDyn(&shape), vec![3.0, 4.0]).unwrap();
        let mut coords = BTreeMap::new();
        coords.insert(
            "time".to_string(),
            Coordinate::time("time", vec![first_of_month(2001, 5)]),
        );
        coords.insert("lead".to_string(), Coordinate::numeric("lead", vec![1.0, 2.0]));
        coords.insert("lat".to_string(), Coordinate::numeric("lat", vec![0.0]));
        coords.insert("lon".to_string(), Coordinate::numeric("lon", vec![0.0]));
        let variable = DataVariable {
            name: "tp".to_string(),
            dims: ["time", "lead", "surface", "lat", "lon"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            data,
        };
        let series = normalize(RawDataset::new("x.nc", coords, vec![variable]), None).unwrap();
        assert_eq!(series.tp().shape(), &[1, 2, 1, 1]);
        assert_eq!(series.tp()[[0, 1, 0, 0]], 4.0);
    }

    #[test]
    fn wide_extra_dimension_is_incompatible() {
        let shape = [1usize, 1, 2, 1, 1];
        let data = ArrayD::zeros(IxDyn(&shape));
        let mut coords = BTreeMap::new();
        coords.insert(
            "time".to_string(),
            Coordinate::time("time", vec![first_of_month(2001, 5)]),
        );
        coords.insert("lead".to_string(), Coordinate::numeric("lead", vec![1.0]));
        coords.insert("lat".to_string(), Coordinate::numeric("lat", vec![0.0]));
        coords.insert("lon".to_string(), Coordinate::numeric("lon", vec![0.0]));
        let variable = DataVariable {
            name: "tp".to_string(),
            dims: ["time", "lead", "expver", "lat", "lon"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            data,
        };
        let err = normalize(RawDataset::new("x.nc", coords, vec![variable]), None).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnexpectedDimension {
                name: "expver".to_string(),
                len: 2
            }
        );
    }
}
