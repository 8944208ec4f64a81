//! Discovery of cached datasets in the data directory.
//!
//! Files are found purely by name:
//!
//! * the observation reference (a fixed file name);
//! * hindcasts, `<hindcast_prefix><model>_<anything><hindcast_suffix>`;
//! * operational forecasts, `<operational_prefix><model>_<YYYYMM>.nc`.

use std::path::{Path, PathBuf};

use skillcast_calendar::YearMonth;
use tracing::debug;

use crate::error::IoError;

// ---------------------------------------------------------------------------
// CatalogConfig
// ---------------------------------------------------------------------------

/// Where datasets live and how their file names are formed.
///
/// Use the builder methods (`with_*`) to override the defaults, which match
/// the Buenos Aires cache layout.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Directory holding every dataset file.
    dir: PathBuf,
    /// File name of the observation reference.
    reference_file: String,
    /// File-name prefix of hindcast files.
    hindcast_prefix: String,
    /// File-name suffix of hindcast files.
    hindcast_suffix: String,
    /// File-name prefix of operational forecast files.
    operational_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data_bsas"),
            reference_file: "era5_obs_bsas_1993_2016.nc".into(),
            hindcast_prefix: "hc_".into(),
            hindcast_suffix: "_bsas.nc".into(),
            operational_prefix: "operational_".into(),
        }
    }
}

impl CatalogConfig {
    /// Set the data directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the reference file name.
    pub fn with_reference_file(mut self, name: impl Into<String>) -> Self {
        self.reference_file = name.into();
        self
    }

    /// Set the hindcast file-name prefix.
    pub fn with_hindcast_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hindcast_prefix = prefix.into();
        self
    }

    /// Set the hindcast file-name suffix.
    pub fn with_hindcast_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.hindcast_suffix = suffix.into();
        self
    }

    /// Set the operational file-name prefix.
    pub fn with_operational_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.operational_prefix = prefix.into();
        self
    }

    /// Data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reference file name.
    pub fn reference_file(&self) -> &str {
        &self.reference_file
    }

    /// Validate that every name pattern is usable.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every empty name part.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("reference_file", &self.reference_file),
            ("hindcast_prefix", &self.hindcast_prefix),
            ("hindcast_suffix", &self.hindcast_suffix),
            ("operational_prefix", &self.operational_prefix),
        ] {
            if value.is_empty() {
                issues.push(format!("{field} must not be empty"));
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: issues.len(),
                details: issues.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// A discovered hindcast file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HindcastFile {
    /// Model id, the first `_`-separated token after the prefix.
    pub model: String,
    /// Full path.
    pub path: PathBuf,
}

/// A discovered operational forecast file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationalFile {
    /// Everything between the prefix and the trailing `_YYYYMM` tag.
    pub model: String,
    /// Start month of the forecast.
    pub tag: YearMonth,
    /// Full path.
    pub path: PathBuf,
}

impl OperationalFile {
    /// Whether this file belongs to hindcast model `model`.
    ///
    /// Operational files may carry a longer name than the hindcast id
    /// (`meteo_france` vs `meteo`), so a `<model>_` prefix also matches.
    pub fn belongs_to(&self, model: &str) -> bool {
        self.model == model
            || self
                .model
                .strip_prefix(model)
                .is_some_and(|rest| rest.starts_with('_'))
    }
}

// ---------------------------------------------------------------------------
// DatasetCatalog
// ---------------------------------------------------------------------------

/// Snapshot of the data directory.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    reference: PathBuf,
    hindcasts: Vec<HindcastFile>,
    operationals: Vec<OperationalFile>,
}

impl DatasetCatalog {
    /// List the data directory once and classify every file.
    ///
    /// A missing directory yields an empty catalog. Hindcasts are sorted by
    /// model id; when several files map to one model, the first by file
    /// name is kept.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] for an invalid config, or
    /// [`IoError::Directory`] if an existing directory cannot be listed.
    pub fn scan(config: &CatalogConfig) -> Result<Self, IoError> {
        config.validate()?;

        let reference = config.dir.join(&config.reference_file);
        let mut names = list_file_names(&config.dir)?;
        names.sort();

        let mut hindcasts: Vec<HindcastFile> = Vec::new();
        let mut operationals = Vec::new();
        for name in names {
            if let Some(model) =
                hindcast_model(&name, &config.hindcast_prefix, &config.hindcast_suffix)
            {
                if hindcasts.iter().any(|h| h.model == model) {
                    debug!(file = %name, model = %model, "duplicate hindcast ignored");
                    continue;
                }
                hindcasts.push(HindcastFile {
                    model: model.to_string(),
                    path: config.dir.join(&name),
                });
            } else if let Some((model, tag)) = operational_parts(&name, &config.operational_prefix)
            {
                operationals.push(OperationalFile {
                    model: model.to_string(),
                    tag,
                    path: config.dir.join(&name),
                });
            }
        }
        hindcasts.sort_by(|a, b| a.model.cmp(&b.model));

        debug!(
            dir = %config.dir.display(),
            n_hindcasts = hindcasts.len(),
            n_operational = operationals.len(),
            "catalog scanned"
        );

        Ok(Self {
            reference,
            hindcasts,
            operationals,
        })
    }

    /// Path of the observation reference (may not exist).
    pub fn reference_path(&self) -> &Path {
        &self.reference
    }

    /// Whether the reference file exists.
    pub fn reference_exists(&self) -> bool {
        self.reference.is_file()
    }

    /// Hindcast files, sorted by model id.
    pub fn hindcasts(&self) -> &[HindcastFile] {
        &self.hindcasts
    }

    /// Operational files, sorted by file name.
    pub fn operationals(&self) -> &[OperationalFile] {
        &self.operationals
    }

    /// The newest operational tag, if any operational file exists.
    pub fn latest_operational(&self) -> Option<YearMonth> {
        self.operationals.iter().map(|o| o.tag).max()
    }

    /// Operational file for `model` at `tag`; an exact model match wins
    /// over a `<model>_` prefix match.
    pub fn operational_file(&self, model: &str, tag: YearMonth) -> Option<&OperationalFile> {
        self.operationals
            .iter()
            .find(|o| o.tag == tag && o.model == model)
            .or_else(|| {
                self.operationals
                    .iter()
                    .find(|o| o.tag == tag && o.belongs_to(model))
            })
    }
}

fn list_file_names(dir: &Path) -> Result<Vec<String>, IoError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "data directory missing");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(IoError::Directory {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::Directory {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Model id of a hindcast file name, or `None` if the name does not match.
pub fn hindcast_model<'a>(name: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    if !name.ends_with(suffix) || name.len() < prefix.len() + suffix.len() {
        return None;
    }
    let model = rest.split('_').next()?;
    let model = model.strip_suffix(".nc").unwrap_or(model);
    (!model.is_empty()).then_some(model)
}

/// Model name and start tag of an operational file name.
pub fn operational_parts<'a>(name: &'a str, prefix: &str) -> Option<(&'a str, YearMonth)> {
    let stem = name.strip_prefix(prefix)?.strip_suffix(".nc")?;
    let (model, tag) = stem.rsplit_once('_')?;
    if model.is_empty() {
        return None;
    }
    match YearMonth::parse_tag(tag) {
        Ok(tag) => Some((model, tag)),
        Err(e) => {
            debug!(file = %name, error = %e, "operational file without a valid tag");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u8) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn hindcast_model_is_first_token() {
        assert_eq!(hindcast_model("hc_ecmwf_bsas.nc", "hc_", "_bsas.nc"), Some("ecmwf"));
        assert_eq!(
            hindcast_model("hc_meteo_france_8_bsas.nc", "hc_", "_bsas.nc"),
            Some("meteo")
        );
        assert_eq!(hindcast_model("hc_ecmwf_global.nc", "hc_", "_bsas.nc"), None);
        assert_eq!(hindcast_model("ecmwf_bsas.nc", "hc_", "_bsas.nc"), None);
        assert_eq!(hindcast_model("hc__bsas.nc", "hc_", "_bsas.nc"), None);
    }

    #[test]
    fn operational_parts_parses_trailing_tag() {
        assert_eq!(
            operational_parts("operational_meteo_france_202503.nc", "operational_"),
            Some(("meteo_france", ym(2025, 3)))
        );
        assert_eq!(operational_parts("operational_jma_2025.nc", "operational_"), None);
        assert_eq!(operational_parts("operational_jma_202513.nc", "operational_"), None);
        assert_eq!(operational_parts("operational_202503.nc", "operational_"), None);
    }

    #[test]
    fn belongs_to_exact_or_underscore_prefix() {
        let file = OperationalFile {
            model: "meteo_france".into(),
            tag: ym(2025, 3),
            path: PathBuf::from("x.nc"),
        };
        assert!(file.belongs_to("meteo"));
        assert!(file.belongs_to("meteo_france"));
        assert!(!file.belongs_to("met"));
    }

    #[test]
    fn validate_rejects_empty_patterns() {
        let cfg = CatalogConfig::default()
            .with_hindcast_prefix("")
            .with_operational_prefix("");
        match cfg.validate() {
            Err(IoError::Validation { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(CatalogConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_directory_is_empty() {
        let cfg = CatalogConfig::default().with_dir("/nonexistent/skillcast/data");
        let catalog = DatasetCatalog::scan(&cfg).unwrap();
        assert!(catalog.hindcasts().is_empty());
        assert!(catalog.latest_operational().is_none());
        assert!(!catalog.reference_exists());
    }
}
