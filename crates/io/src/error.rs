//! Error types for skillcast-io.

use std::path::PathBuf;

/// Reasons a dataset cannot be mapped onto the canonical
/// `tp[start_date, lead, latitude, longitude]` schema.
///
/// These are per-model soft failures: callers record the model as
/// incompatible and carry on with the others.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// None of the known precipitation variable names is present.
    #[error("no precipitation variable (tried {})", tried.join(", "))]
    NoPrecipitation {
        /// Names that were tested, in priority order.
        tried: Vec<String>,
    },

    /// No numeric lead-time coordinate lies on the variable's dimensions.
    #[error("no lead-time coordinate")]
    NoLeadCoordinate,

    /// No date/time-typed start coordinate lies on the variable's dimensions.
    #[error("no date-typed start coordinate")]
    NoStartCoordinate,

    /// No date/time-typed time axis (reference datasets).
    #[error("no date-typed time coordinate")]
    NoTimeCoordinate,

    /// No latitude coordinate.
    #[error("no latitude coordinate")]
    NoLatitude,

    /// No longitude coordinate.
    #[error("no longitude coordinate")]
    NoLongitude,

    /// Two canonical axes resolved to the same dimension.
    #[error("coordinates '{first}' and '{second}' share dimension '{dim}'")]
    SharedDimension {
        /// First coordinate name.
        first: String,
        /// Second coordinate name.
        second: String,
        /// The shared dimension.
        dim: String,
    },

    /// A non-canonical dimension with more than one element remains.
    #[error("unexpected dimension '{name}' of length {len}")]
    UnexpectedDimension {
        /// Dimension name.
        name: String,
        /// Dimension length.
        len: usize,
    },

    /// The ensemble dimension has no members.
    #[error("ensemble dimension '{name}' is empty")]
    EmptyEnsemble {
        /// Dimension name.
        name: String,
    },

    /// A coordinate's length disagrees with its dimension.
    #[error("coordinate '{name}' has {got} values but its dimension has {expected}")]
    CoordinateLength {
        /// Coordinate name.
        name: String,
        /// Dimension length.
        expected: usize,
        /// Coordinate length.
        got: usize,
    },

    /// The canonical axes did not produce a 4-D array.
    #[error("expected {expected} axes after normalization, got {got}")]
    Rank {
        /// Required number of axes.
        expected: usize,
        /// Number of axes present.
        got: usize,
    },

    /// A lead-time value is not a finite whole number.
    #[error("invalid lead value {value}")]
    InvalidLead {
        /// The offending value.
        value: f64,
    },
}

/// Error type for all fallible operations in the skillcast-io crate.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when a configuration fails validation.
    #[error("validation failed ({count} issue(s)): {details}")]
    Validation {
        /// Number of issues found.
        count: usize,
        /// Human-readable description of the issues.
        details: String,
    },

    /// Returned when a data directory cannot be listed.
    #[error("cannot list {}: {reason}", path.display())]
    Directory {
        /// Directory that was listed.
        path: PathBuf,
        /// Description of the underlying I/O failure.
        reason: String,
    },

    /// Returned when a variable's data does not match its dimensions.
    #[error("variable '{name}' has {got} values, dimensions imply {expected}")]
    ShapeMismatch {
        /// Variable name.
        name: String,
        /// Product of the dimension lengths.
        expected: usize,
        /// Number of values read.
        got: usize,
    },

    /// Returned when a dataset does not fit the canonical schema.
    #[error("incompatible schema in {}: {source}", path.display())]
    IncompatibleSchema {
        /// File that was normalized.
        path: PathBuf,
        /// What was missing or malformed.
        #[source]
        source: SchemaError,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl IoError {
    /// Whether this error is a schema mismatch rather than a read failure.
    pub fn is_incompatible_schema(&self) -> bool {
        matches!(self, IoError::IncompatibleSchema { .. })
    }
}
