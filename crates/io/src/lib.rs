//! # skillcast-io
//!
//! Read seasonal hindcast, operational and reference datasets from NetCDF,
//! map them onto one canonical `tp[start_date, lead, latitude, longitude]`
//! schema and extract the values nearest to a point.

mod catalog;
mod dataset;
mod error;
mod extract;
mod gridded;
mod netcdf_read;
mod normalize;
mod reader;
mod reference;

pub use catalog::{
    CatalogConfig, DatasetCatalog, HindcastFile, OperationalFile, hindcast_model,
    operational_parts,
};
pub use dataset::{CoordValues, Coordinate, DataVariable, RawDataset};
pub use error::{IoError, SchemaError};
pub use extract::{PointRow, align_longitude, extract_point, nearest_index};
pub use gridded::GriddedSeries;
pub use netcdf_read::read_dataset;
pub use normalize::{
    CANONICAL_VARIABLE, ENSEMBLE_DIMENSIONS, LATITUDE_COORDINATES, LEAD_COORDINATES,
    LONGITUDE_COORDINATES, PRECIPITATION_VARIABLES, START_COORDINATES, normalize,
    precipitation_candidates,
};
pub use reader::{read_gridded, read_point_series};
pub use reference::{TIME_COORDINATES, reference_point, read_reference_point};
