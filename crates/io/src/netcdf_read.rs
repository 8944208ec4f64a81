//! Low-level NetCDF extraction helpers.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use ndarray::{ArrayD, IxDyn};
use netcdf::AttributeValue;
use tracing::debug;

use crate::dataset::{CoordValues, Coordinate, DataVariable, RawDataset};
use crate::error::IoError;

/// Calendars whose timestamps decode on the proleptic Gregorian calendar.
///
/// Anything else (`noleap`, `360_day`, ...) is left numeric, so such a
/// coordinate never qualifies as a start date.
const GREGORIAN_CALENDARS: &[&str] = &["standard", "gregorian", "proleptic_gregorian"];

/// Magnitudes at or above this are netCDF default fill values, not data.
const DEFAULT_FILL_THRESHOLD: f64 = 1.0e30;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Read every coordinate and data variable of the file at `path`.
///
/// 1-D variables become coordinates on their single dimension; variables
/// with two or more dimensions become data variables. CF packing
/// (`scale_factor`, `add_offset`) is undone and `_FillValue` /
/// `missing_value` entries become NaN. Variables that cannot be read as
/// floating point (strings, chars) are skipped.
///
/// The file handle is dropped before returning, on success and on error.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `path` does not exist, or
/// [`IoError::Netcdf`] / [`IoError::ShapeMismatch`] on read failures.
pub fn read_dataset(path: &Path) -> Result<RawDataset, IoError> {
    let file = open_file(path)?;

    let mut coords = BTreeMap::new();
    let mut variables = Vec::new();

    for var in file.variables() {
        let name = var.name();
        let dims: Vec<(String, usize)> = var
            .dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect();

        let raw = match var.get_values::<f64, _>(..) {
            Ok(values) => values,
            Err(e) => {
                debug!(variable = %name, error = %e, "skipping non-numeric variable");
                continue;
            }
        };
        let values = unpack(&var, raw);

        match dims.len() {
            0 => continue,
            1 => {
                let time = time_units(&var).and_then(|(base, unit_secs)| {
                    decode_offsets(base, unit_secs, &values)
                });
                let values = match time {
                    Some(stamps) => CoordValues::Time(stamps),
                    None => CoordValues::Numeric(values),
                };
                coords.insert(
                    name,
                    Coordinate {
                        dim: dims[0].0.clone(),
                        values,
                    },
                );
            }
            _ => {
                // Multi-dimensional timestamps (e.g. `valid_time`) are not data.
                if time_units(&var).is_some() {
                    continue;
                }
                let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();
                let expected: usize = shape.iter().product();
                let got = values.len();
                let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
                    IoError::ShapeMismatch {
                        name: name.clone(),
                        expected,
                        got,
                    }
                })?;
                variables.push(DataVariable {
                    name,
                    dims: dims.into_iter().map(|(d, _)| d).collect(),
                    data,
                });
            }
        }
    }

    debug!(
        path = %path.display(),
        n_coords = coords.len(),
        n_variables = variables.len(),
        "dataset read"
    );

    Ok(RawDataset::new(path, coords, variables))
}

/// Apply CF fill-value masking and packing to raw values.
fn unpack(var: &netcdf::Variable<'_>, mut values: Vec<f64>) -> Vec<f64> {
    let fill = numeric_attribute(var, "_FillValue");
    let missing = numeric_attribute(var, "missing_value");
    let scale = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    for v in &mut values {
        if fill.is_some_and(|f| *v == f)
            || missing.is_some_and(|m| *v == m)
            || v.abs() >= DEFAULT_FILL_THRESHOLD
        {
            *v = f64::NAN;
        } else {
            *v = *v * scale + offset;
        }
    }
    values
}

/// Read a scalar numeric attribute as `f64`.
fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    let value = var.attribute_value(name)?.ok()?;
    match value {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        _ => None,
    }
}

/// Read a string attribute.
fn string_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// CF time encoding of a variable: base timestamp and seconds per unit.
///
/// `None` if the variable is not date/time-typed (no `units` attribute of
/// the form `<unit> since <date>`, or a non-Gregorian calendar).
fn time_units(var: &netcdf::Variable<'_>) -> Option<(NaiveDateTime, f64)> {
    if let Some(calendar) = string_attribute(var, "calendar") {
        if !GREGORIAN_CALENDARS.contains(&calendar.to_lowercase().as_str()) {
            return None;
        }
    }
    parse_time_units(&string_attribute(var, "units")?)
}

/// Parse CF-convention strings like `"hours since 1900-01-01 00:00:00.0"`.
///
/// Returns the base timestamp and the length of one unit in seconds.
pub(crate) fn parse_time_units(units: &str) -> Option<(NaiveDateTime, f64)> {
    let (unit, reference) = units.trim().split_once(" since ")?;
    let unit_secs = match unit.trim().to_lowercase().as_str() {
        "seconds" | "second" | "secs" | "s" => 1.0,
        "minutes" | "minute" | "mins" => 60.0,
        "hours" | "hour" | "hrs" | "h" => 3_600.0,
        "days" | "day" | "d" => 86_400.0,
        _ => return None,
    };

    let reference = reference.trim().replace('T', " ");
    let mut parts = reference.split_whitespace();
    let date_str = parts.next()?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;

    let time = match parts.next() {
        Some(t) => {
            // Drop fractional seconds and any trailing zone designator.
            let t = t.trim_end_matches('Z');
            let t = t.split('.').next().unwrap_or(t);
            NaiveTime::parse_from_str(t, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()?
        }
        None => NaiveTime::MIN,
    };

    Some((date.and_time(time), unit_secs))
}

/// Convert numeric offsets into timestamps. `None` if any offset is not
/// finite or overflows the representable range.
pub(crate) fn decode_offsets(
    base: NaiveDateTime,
    unit_secs: f64,
    offsets: &[f64],
) -> Option<Vec<NaiveDateTime>> {
    offsets
        .iter()
        .map(|&offset| {
            if !offset.is_finite() {
                return None;
            }
            let millis = (offset * unit_secs * 1_000.0).round();
            if millis.abs() > i64::MAX as f64 {
                return None;
            }
            base.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
        })
        .collect()
}
