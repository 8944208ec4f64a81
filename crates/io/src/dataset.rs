//! In-memory view of one opened dataset file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use ndarray::ArrayD;

/// Values of a 1-D coordinate variable.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValues {
    /// Plain numbers (lead months, degrees, ensemble indices).
    Numeric(Vec<f64>),
    /// CF-decoded timestamps.
    Time(Vec<NaiveDateTime>),
}

impl CoordValues {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Numeric(v) => v.len(),
            CoordValues::Time(v) => v.len(),
        }
    }

    /// Whether the coordinate holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values, or `None` for a time coordinate.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            CoordValues::Numeric(v) => Some(v),
            CoordValues::Time(_) => None,
        }
    }

    /// Timestamps, or `None` for a numeric coordinate.
    pub fn as_time(&self) -> Option<&[NaiveDateTime]> {
        match self {
            CoordValues::Time(v) => Some(v),
            CoordValues::Numeric(_) => None,
        }
    }
}

/// A 1-D coordinate together with the dimension it lies on.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    /// Dimension name.
    pub dim: String,
    /// Coordinate values.
    pub values: CoordValues,
}

impl Coordinate {
    /// Numeric coordinate on `dim`.
    pub fn numeric(dim: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            dim: dim.into(),
            values: CoordValues::Numeric(values),
        }
    }

    /// Time coordinate on `dim`.
    pub fn time(dim: impl Into<String>, values: Vec<NaiveDateTime>) -> Self {
        Self {
            dim: dim.into(),
            values: CoordValues::Time(values),
        }
    }
}

/// A multi-dimensional data variable with named dimensions.
#[derive(Debug, Clone)]
pub struct DataVariable {
    /// Variable name.
    pub name: String,
    /// Dimension names, in array axis order.
    pub dims: Vec<String>,
    /// Values, with fill values already replaced by NaN.
    pub data: ArrayD<f64>,
}

/// Everything read from one dataset file: 1-D coordinates keyed by name and
/// multi-dimensional data variables in file order.
#[derive(Debug, Clone)]
pub struct RawDataset {
    source: PathBuf,
    coords: BTreeMap<String, Coordinate>,
    variables: Vec<DataVariable>,
}

impl RawDataset {
    /// Assembles a dataset from parts.
    pub fn new(
        source: impl Into<PathBuf>,
        coords: BTreeMap<String, Coordinate>,
        variables: Vec<DataVariable>,
    ) -> Self {
        Self {
            source: source.into(),
            coords,
            variables,
        }
    }

    /// Path the dataset was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Looks up a coordinate by name.
    pub fn coordinate(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    /// All coordinates, keyed by name.
    pub fn coordinates(&self) -> &BTreeMap<String, Coordinate> {
        &self.coords
    }

    /// Looks up a data variable by name.
    pub fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Data variables in file order.
    pub fn variables(&self) -> &[DataVariable] {
        &self.variables
    }

    /// Splits into coordinates and the named variable, dropping the rest.
    pub(crate) fn take_variable(
        self,
        name: &str,
    ) -> (BTreeMap<String, Coordinate>, Option<DataVariable>) {
        let variable = self.variables.into_iter().find(|v| v.name == name);
        (self.coords, variable)
    }
}
