//! Integration tests: reading, normalizing and extracting from NetCDF files.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use chrono::NaiveDate;
use skillcast_calendar::YearMonth;
use skillcast_io::{
    IoError, SchemaError, read_dataset, read_gridded, read_point_series, read_reference_point,
};
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// Helper: programmatic hindcast fixture builder
// ---------------------------------------------------------------------------

fn hours_since_1900(year: i32, month: u32) -> f64 {
    let base = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (date - base).num_hours() as f64
}

/// Minimal ensemble hindcast on `(number, forecast_reference_time,
/// forecastMonth, latitude, longitude)`.
struct HindcastFixture {
    var_name: String,
    members: usize,
    starts: Vec<(i32, u32)>,
    leads: Vec<f64>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    fill_value: Option<f64>,
    calendar: &'static str,
    /// Cell value for (member, start, lead, lat, lon) indices.
    value: fn(usize, usize, usize, usize, usize) -> f64,
}

impl HindcastFixture {
    fn new() -> Self {
        Self {
            var_name: "tprate".into(),
            members: 2,
            starts: (1993..1996).map(|y| (y, 1)).collect(),
            leads: vec![1.0, 2.0, 3.0],
            lats: vec![-35.0, -34.0],
            lons: vec![300.0, 301.0],
            fill_value: None,
            calendar: "proleptic_gregorian",
            value: |m, s, l, y, x| 1e-8 * (1 + s + 10 * l + 100 * y + 1000 * x + 10_000 * m) as f64,
        }
    }

    fn with_var_name(mut self, name: &str) -> Self {
        self.var_name = name.into();
        self
    }

    fn with_fill_value(mut self, fv: f64) -> Self {
        self.fill_value = Some(fv);
        self
    }

    fn with_calendar(mut self, calendar: &'static str) -> Self {
        self.calendar = calendar;
        self
    }

    fn with_value(mut self, value: fn(usize, usize, usize, usize, usize) -> f64) -> Self {
        self.value = value;
        self
    }

    fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("create file");

        let (nm, ns, nl, ny, nx) = (
            self.members,
            self.starts.len(),
            self.leads.len(),
            self.lats.len(),
            self.lons.len(),
        );
        file.add_dimension("number", nm).expect("dim number");
        file.add_dimension("forecast_reference_time", ns).expect("dim frt");
        file.add_dimension("forecastMonth", nl).expect("dim lead");
        file.add_dimension("latitude", ny).expect("dim lat");
        file.add_dimension("longitude", nx).expect("dim lon");

        {
            let members: Vec<f64> = (0..nm).map(|m| m as f64).collect();
            let mut var = file.add_variable::<f64>("number", &["number"]).expect("var number");
            var.put_values(&members, ..).expect("put number");
        }
        {
            let hours: Vec<f64> = self
                .starts
                .iter()
                .map(|&(y, m)| hours_since_1900(y, m))
                .collect();
            let mut var = file
                .add_variable::<f64>("forecast_reference_time", &["forecast_reference_time"])
                .expect("var frt");
            var.put_values(&hours, ..).expect("put frt");
            var.put_attribute("units", "hours since 1900-01-01 00:00:00.0")
                .expect("frt units");
            var.put_attribute("calendar", self.calendar)
                .expect("frt calendar");
        }
        {
            let mut var = file
                .add_variable::<f64>("forecastMonth", &["forecastMonth"])
                .expect("var lead");
            var.put_values(&self.leads, ..).expect("put lead");
        }
        {
            let mut var = file.add_variable::<f64>("latitude", &["latitude"]).expect("var lat");
            var.put_values(&self.lats, ..).expect("put lat");
            var.put_attribute("units", "degrees_north").expect("lat units");
        }
        {
            let mut var = file.add_variable::<f64>("longitude", &["longitude"]).expect("var lon");
            var.put_values(&self.lons, ..).expect("put lon");
        }
        {
            let mut data = Vec::with_capacity(nm * ns * nl * ny * nx);
            for m in 0..nm {
                for s in 0..ns {
                    for l in 0..nl {
                        for y in 0..ny {
                            for x in 0..nx {
                                data.push((self.value)(m, s, l, y, x));
                            }
                        }
                    }
                }
            }
            let mut var = file
                .add_variable::<f64>(
                    &self.var_name,
                    &[
                        "number",
                        "forecast_reference_time",
                        "forecastMonth",
                        "latitude",
                        "longitude",
                    ],
                )
                .expect("var data");
            if let Some(fv) = self.fill_value {
                var.put_attribute("_FillValue", fv).expect("fill value");
            }
            var.put_values(&data, ..).expect("put data");
        }

        path
    }
}

/// Create a one-cell monthly reference file from January 1993; the caller
/// adds `tp` on `(valid_time, latitude, longitude)`.
fn create_reference(path: &Path, n_months: usize) -> netcdf::FileMut {
    let mut file = netcdf::create(path).expect("create file");
    file.add_dimension("valid_time", n_months).expect("dim time");
    file.add_dimension("latitude", 1).expect("dim lat");
    file.add_dimension("longitude", 1).expect("dim lon");
    {
        let days: Vec<f64> = (0..n_months)
            .map(|i| {
                let year = 1993 + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
                (date - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as f64
            })
            .collect();
        let mut var = file
            .add_variable::<f64>("valid_time", &["valid_time"])
            .expect("var time");
        var.put_values(&days, ..).expect("put time");
        var.put_attribute("units", "days since 1970-01-01").expect("units");
    }
    {
        let mut var = file.add_variable::<f64>("latitude", &["latitude"]).expect("var lat");
        var.put_values(&[-34.5], ..).expect("put lat");
    }
    {
        let mut var = file.add_variable::<f64>("longitude", &["longitude"]).expect("var lon");
        var.put_values(&[-58.5], ..).expect("put lon");
    }
    file
}

const REFERENCE_DIMS: [&str; 3] = ["valid_time", "latitude", "longitude"];

fn write_reference(dir: &Path, values: &[f64]) -> PathBuf {
    let path = dir.join("obs.nc");
    let mut file = create_reference(&path, values.len());
    let mut var = file.add_variable::<f64>("tp", &REFERENCE_DIMS).expect("var tp");
    var.put_values(values, ..).expect("put tp");
    path
}

/// Reference with `tp` packed as `short`, as in legacy ERA5 downloads.
fn write_packed_reference(dir: &Path, raw: &[i16]) -> PathBuf {
    let path = dir.join("obs_packed.nc");
    let mut file = create_reference(&path, raw.len());
    let mut var = file.add_variable::<i16>("tp", &REFERENCE_DIMS).expect("var tp");
    var.put_attribute("scale_factor", 1.0e-4).expect("scale");
    var.put_attribute("add_offset", 0.01).expect("offset");
    var.put_attribute("_FillValue", -32767i16).expect("fill value");
    var.put_values(raw, ..).expect("put tp");
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn file_not_found() {
    let path = Path::new("/tmp/skillcast_test_nonexistent_file.nc");
    let err = read_point_series(path, 0.0, 0.0, None).unwrap_err();
    assert!(
        matches!(err, IoError::FileNotFound { .. }),
        "expected FileNotFound, got {err:?}",
    );
}

#[test]
fn time_coordinate_is_decoded() {
    let dir = tempdir().unwrap();
    let path = HindcastFixture::new().write(dir.path(), "hc_test_bsas.nc");

    let dataset = read_dataset(&path).unwrap();
    let frt = dataset.coordinate("forecast_reference_time").unwrap();
    let stamps = frt.values.as_time().expect("time-typed");
    assert_eq!(stamps[1].date(), NaiveDate::from_ymd_opt(1994, 1, 1).unwrap());
    assert!(dataset.coordinate("forecastMonth").unwrap().values.as_numeric().is_some());
}

#[test]
fn normalizes_ensemble_hindcast() {
    let dir = tempdir().unwrap();
    let path = HindcastFixture::new().write(dir.path(), "hc_test_bsas.nc");

    let series = read_gridded(&path, None).unwrap();
    assert_eq!(series.tp().shape(), &[3, 3, 2, 2]);
    assert_eq!(series.leads(), &[1, 2, 3]);
    assert_eq!(series.starts()[0], YearMonth::new(1993, 1).unwrap());

    // mean over members: +5000 on the integer part
    let expected = 1e-8 * (1 + 2 + 10 + 100 + 1000 + 5000) as f64;
    assert_relative_eq!(series.tp()[[2, 1, 1, 1]], expected, max_relative = 1e-12);
}

#[test]
fn point_rows_use_nearest_cell_on_east_longitudes() {
    let dir = tempdir().unwrap();
    let path = HindcastFixture::new().write(dir.path(), "hc_test_bsas.nc");

    // -59.2 -> 300.8, nearest 301.0; -34.4 nearest -34.0
    let rows = read_point_series(&path, -34.4, -59.2, None).unwrap();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0].lead, 1);
    assert_eq!(rows[3].start, YearMonth::new(1994, 1).unwrap());
    let expected = 1e-8 * (1 + 100 + 1000 + 5000) as f64;
    assert_relative_eq!(rows[0].value, expected, max_relative = 1e-12);
}

#[test]
fn fill_values_become_nan() {
    let dir = tempdir().unwrap();
    let path = HindcastFixture::new()
        .with_fill_value(-9999.0)
        .with_value(|m, s, _, _, _| if s == 0 { -9999.0 } else { (m + 1) as f64 })
        .write(dir.path(), "hc_test_bsas.nc");

    let rows = read_point_series(&path, -35.0, 300.0, None).unwrap();
    assert!(rows[0].value.is_nan());
    assert_eq!(rows[3].value, 1.5);
}

#[test]
fn unknown_variable_is_incompatible_schema() {
    let dir = tempdir().unwrap();
    let path = HindcastFixture::new()
        .with_var_name("rainfall")
        .write(dir.path(), "hc_test_bsas.nc");

    let err = read_point_series(&path, 0.0, 0.0, None).unwrap_err();
    assert!(err.is_incompatible_schema(), "got {err:?}");
    match err {
        IoError::IncompatibleSchema { source, .. } => {
            assert!(matches!(source, SchemaError::NoPrecipitation { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }

    // The same file is fine once the native name is known.
    assert!(read_point_series(&path, 0.0, 0.0, Some("rainfall")).is_ok());
}

#[test]
fn reference_series_at_point() {
    let dir = tempdir().unwrap();
    let values: Vec<f64> = (0..24).map(|i| 0.001 * i as f64).collect();
    let path = write_reference(dir.path(), &values);

    let series = read_reference_point(&path, -34.6, -58.4).unwrap();
    assert_eq!(series.len(), 24);
    assert_eq!(series[13].0, YearMonth::new(1994, 2).unwrap());
    assert_relative_eq!(series[13].1, 0.013);
}

#[test]
fn packed_values_are_unpacked() {
    let dir = tempdir().unwrap();
    let path = write_packed_reference(dir.path(), &[0, 100, -32767, 250]);

    let series = read_reference_point(&path, -34.5, -58.5).unwrap();
    assert_eq!(series.len(), 4);
    assert_relative_eq!(series[0].1, 0.01, epsilon = 1e-12);
    assert_relative_eq!(series[1].1, 0.02, epsilon = 1e-12);
    assert!(series[2].1.is_nan());
    assert_relative_eq!(series[3].1, 0.035, epsilon = 1e-12);
}

#[test]
fn missing_value_entries_become_nan() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("obs_missing.nc");
    {
        let mut file = create_reference(&path, 3);
        let mut var = file.add_variable::<f64>("tp", &REFERENCE_DIMS).expect("var tp");
        var.put_attribute("missing_value", -1.0).expect("missing value");
        var.put_values(&[0.05, -1.0, 0.07], ..).expect("put tp");
    }

    let dataset = read_dataset(&path).unwrap();
    let tp = &dataset.variable("tp").unwrap().data;
    let values: Vec<f64> = tp.iter().copied().collect();
    assert_eq!(values[0], 0.05);
    assert!(values[1].is_nan());
    assert_eq!(values[2], 0.07);
}

#[test]
fn non_gregorian_start_axis_is_not_a_start_coordinate() {
    let dir = tempdir().unwrap();
    let path = HindcastFixture::new()
        .with_calendar("noleap")
        .write(dir.path(), "hc_test_bsas.nc");

    let dataset = read_dataset(&path).unwrap();
    let frt = dataset.coordinate("forecast_reference_time").unwrap();
    assert!(frt.values.as_numeric().is_some());

    let err = read_point_series(&path, -35.0, 300.0, None).unwrap_err();
    match err {
        IoError::IncompatibleSchema { source, .. } => {
            assert_eq!(source, SchemaError::NoStartCoordinate);
        }
        other => panic!("unexpected {other:?}"),
    }
}
