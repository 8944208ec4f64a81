//! Access to the reference, hindcast and operational datasets.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use skillcast_calendar::YearMonth;
use skillcast_io::{
    CatalogConfig, DatasetCatalog, IoError, PointRow, read_point_series, read_reference_point,
};
use tracing::debug;

/// Storage seam of the skill service.
///
/// Every method is called with the service's dataset lock held, so
/// implementations need no synchronization of their own.
pub trait DatasetSource {
    /// Where the observation reference is expected (for error messages).
    fn reference_location(&self) -> PathBuf;

    /// Whether the observation reference exists.
    fn reference_available(&self) -> bool;

    /// Raw reference series nearest to (`lat`, `lon`), native units.
    fn load_reference(&self, lat: f64, lon: f64) -> Result<Vec<(YearMonth, f64)>, IoError>;

    /// Ids of every discovered hindcast model, sorted.
    fn hindcast_models(&self) -> Result<Vec<String>, IoError>;

    /// Hindcast rows of `model` nearest to (`lat`, `lon`), native units.
    fn load_hindcast(&self, model: &str, lat: f64, lon: f64) -> Result<Vec<PointRow>, IoError>;

    /// Newest operational start month, if any operational data exists.
    fn latest_operational(&self) -> Result<Option<YearMonth>, IoError>;

    /// Operational rows of `model` started at `tag`; `Ok(None)` when the
    /// model has no operational file for that month.
    fn load_operational(
        &self,
        model: &str,
        tag: YearMonth,
        lat: f64,
        lon: f64,
    ) -> Result<Option<Vec<PointRow>>, IoError>;

    /// Everything that was discovered.
    fn inventory(&self) -> Result<Inventory, IoError>;
}

/// Summary of the available datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
    /// Expected path of the observation reference.
    pub reference: PathBuf,
    /// Whether the reference file exists.
    pub reference_present: bool,
    /// Hindcast files, one per model, sorted by model id.
    pub hindcasts: Vec<InventoryHindcast>,
    /// Operational forecast files, sorted by file name.
    pub operational: Vec<InventoryOperational>,
    /// Newest operational start month, `None` without operational files.
    pub latest_operational: Option<YearMonth>,
}

/// One hindcast in an [`Inventory`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryHindcast {
    /// Model id taken from the file name.
    pub model: String,
    /// Path of the hindcast file.
    pub file: PathBuf,
}

/// One operational forecast in an [`Inventory`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryOperational {
    /// Model id taken from the file name.
    pub model: String,
    /// Start month encoded in the file name.
    pub tag: YearMonth,
    /// Path of the operational file.
    pub file: PathBuf,
}

// ---------------------------------------------------------------------------
// NetcdfSource
// ---------------------------------------------------------------------------

/// [`DatasetSource`] over a directory of NetCDF files.
///
/// The directory is rescanned on every call, so files downloaded while the
/// service runs are picked up by the next request.
#[derive(Debug, Clone)]
pub struct NetcdfSource {
    catalog: CatalogConfig,
    native_variables: BTreeMap<String, String>,
}

impl NetcdfSource {
    /// Source over the directory described by `catalog`.
    pub fn new(catalog: CatalogConfig) -> Self {
        Self {
            catalog,
            native_variables: BTreeMap::new(),
        }
    }

    /// Add a model-specific precipitation variable name, tried after the
    /// standard ones.
    pub fn with_native_variable(
        mut self,
        model: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        self.native_variables.insert(model.into(), variable.into());
        self
    }

    /// The catalog configuration.
    pub fn catalog_config(&self) -> &CatalogConfig {
        &self.catalog
    }

    fn scan(&self) -> Result<DatasetCatalog, IoError> {
        DatasetCatalog::scan(&self.catalog)
    }

    fn native(&self, model: &str) -> Option<&str> {
        self.native_variables.get(model).map(String::as_str)
    }
}

impl DatasetSource for NetcdfSource {
    fn reference_location(&self) -> PathBuf {
        self.catalog.dir().join(self.catalog.reference_file())
    }

    fn reference_available(&self) -> bool {
        self.reference_location().is_file()
    }

    fn load_reference(&self, lat: f64, lon: f64) -> Result<Vec<(YearMonth, f64)>, IoError> {
        read_reference_point(&self.reference_location(), lat, lon)
    }

    fn hindcast_models(&self) -> Result<Vec<String>, IoError> {
        Ok(self
            .scan()?
            .hindcasts()
            .iter()
            .map(|h| h.model.clone())
            .collect())
    }

    fn load_hindcast(&self, model: &str, lat: f64, lon: f64) -> Result<Vec<PointRow>, IoError> {
        let catalog = self.scan()?;
        let file = catalog
            .hindcasts()
            .iter()
            .find(|h| h.model == model)
            .ok_or_else(|| IoError::FileNotFound {
                path: self.catalog.dir().join(model),
            })?;
        read_point_series(&file.path, lat, lon, self.native(model))
    }

    fn latest_operational(&self) -> Result<Option<YearMonth>, IoError> {
        Ok(self.scan()?.latest_operational())
    }

    fn load_operational(
        &self,
        model: &str,
        tag: YearMonth,
        lat: f64,
        lon: f64,
    ) -> Result<Option<Vec<PointRow>>, IoError> {
        let catalog = self.scan()?;
        let Some(file) = catalog.operational_file(model, tag) else {
            debug!(model = %model, %tag, "no operational file");
            return Ok(None);
        };
        let native = self.native(model).or_else(|| self.native(&file.model));
        read_point_series(&file.path, lat, lon, native).map(Some)
    }

    fn inventory(&self) -> Result<Inventory, IoError> {
        let catalog = self.scan()?;
        Ok(Inventory {
            reference: catalog.reference_path().to_path_buf(),
            reference_present: catalog.reference_exists(),
            hindcasts: catalog
                .hindcasts()
                .iter()
                .map(|h| InventoryHindcast {
                    model: h.model.clone(),
                    file: h.path.clone(),
                })
                .collect(),
            operational: catalog
                .operationals()
                .iter()
                .map(|o| InventoryOperational {
                    model: o.model.clone(),
                    tag: o.tag,
                    file: o.path.clone(),
                })
                .collect(),
            latest_operational: catalog.latest_operational(),
        })
    }
}
