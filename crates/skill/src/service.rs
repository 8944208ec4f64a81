//! The skill/forecast service: the one entry point callers use.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use skillcast_calendar::{YearMonth, month_label};
use skillcast_io::{IoError, PointRow};
use tracing::{debug, info, info_span, warn};

use crate::calibrate::{Confidence, calibrate};
use crate::config::SkillConfig;
use crate::error::SkillError;
use crate::evaluator::{LEADS, evaluate, evaluate_all};
use crate::matrix::{ModelOutcome, SkillMatrix};
use crate::output::{ChampionRecord, ModelVerification, SkillMatrixReport, VerificationReport};
use crate::selector::{rank, select};
use crate::series::ObservationSeries;
use crate::source::{DatasetSource, Inventory};
use crate::units::prediction_mm;

/// Start month requested for a skill matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseMonth {
    /// A calendar month, 1..=12.
    Month(u8),
    /// The month of the newest operational forecast, January if none.
    Auto,
}

impl FromStr for BaseMonth {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(BaseMonth::Auto);
        }
        let month: u8 = s.parse().map_err(|_| SkillError::BadRequest {
            reason: format!("month must be 1..=12 or \"auto\", got {s:?}"),
        })?;
        validate_month(month)?;
        Ok(BaseMonth::Month(month))
    }
}

impl fmt::Display for BaseMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseMonth::Month(m) => write!(f, "{m}"),
            BaseMonth::Auto => f.write_str("auto"),
        }
    }
}

/// Skill evaluation, model selection and calibration over a
/// [`DatasetSource`].
///
/// Safe to share between threads. All dataset access of one request runs
/// under a single lock, held from the reference check to the last
/// operational read.
pub struct SkillService<S> {
    source: S,
    config: SkillConfig,
    datasets: Mutex<()>,
}

impl<S: DatasetSource> SkillService<S> {
    /// Service over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::Validation`] if `config` is inconsistent.
    pub fn new(source: S, config: SkillConfig) -> Result<Self, SkillError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            datasets: Mutex::new(()),
        })
    }

    /// The underlying dataset source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The active configuration.
    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    /// Skill of every model for runs starting in `base_month`.
    ///
    /// # Errors
    ///
    /// [`SkillError::BadRequest`] for invalid coordinates or month,
    /// [`SkillError::MissingReference`] / [`SkillError::Reference`] when
    /// observations are unavailable. Per-model failures yield null rows.
    pub fn skill_matrix(
        &self,
        lat: f64,
        lon: f64,
        base_month: BaseMonth,
    ) -> Result<SkillMatrixReport, SkillError> {
        validate_point(lat, lon)?;
        if let BaseMonth::Month(m) = base_month {
            validate_month(m)?;
        }

        let span = info_span!("skill_matrix", lat, lon, %base_month);
        let _enter = span.enter();
        let _datasets = self.lock_datasets();

        let observations = self.observations(lat, lon)?;
        let month = match base_month {
            BaseMonth::Month(m) => m,
            BaseMonth::Auto => self.latest_tag().map_or(1, YearMonth::month),
        };
        let matrix = self.matrix(&observations, lat, lon, month)?;
        Ok(SkillMatrixReport::from(&matrix))
    }

    /// Best model and calibrated forecast for leads 1..=6.
    ///
    /// Always evaluates the start month of the newest operational forecast
    /// (January if none); `base_month` is accepted but not used.
    ///
    /// # Errors
    ///
    /// As for [`skill_matrix`](Self::skill_matrix).
    pub fn best_models(
        &self,
        lat: f64,
        lon: f64,
        base_month: Option<u8>,
    ) -> Result<Vec<ChampionRecord>, SkillError> {
        validate_point(lat, lon)?;

        let span = info_span!("best_models", lat, lon);
        let _enter = span.enter();
        if let Some(m) = base_month {
            debug!(requested = m, "base month ignored, using latest operational");
        }
        let _datasets = self.lock_datasets();

        let observations = self.observations(lat, lon)?;
        let tag = self.latest_tag();
        let month = tag.map_or(1, YearMonth::month);
        let matrix = self.matrix(&observations, lat, lon, month)?;

        // Operational rows per model, loaded at most once per request.
        let mut operational: BTreeMap<String, OperationalRows> = BTreeMap::new();

        let mut records = Vec::with_capacity(LEADS);
        for lead in 1..=LEADS {
            let ranked = rank(&matrix, lead);
            let target = tag.map(|t| t.add_months(lead as u32));
            let label = target
                .map(YearMonth::label)
                .or_else(|| month_label(((month as usize - 1 + lead) % 12) as u8 + 1).ok())
                .unwrap_or("?");

            let selection = match (tag, target) {
                (Some(tag), Some(target)) => select(&ranked, |model| {
                    self.operational_mm(&mut operational, model, tag, target, lead, lat, lon)
                }),
                _ => None,
            };

            let model = selection
                .as_ref()
                .map(|s| s.model)
                .or_else(|| ranked.first().map(|(m, _)| m.as_str()));
            let cell = model.and_then(|m| matrix.cell(m, lead));
            let calibrated = match (&selection, &cell) {
                (Some(s), Some(c)) => Some(calibrate(s.operational_mm, c)),
                _ => None,
            };
            let skill = cell.map(|c| c.correlation);

            records.push(ChampionRecord {
                lead,
                month: label,
                target,
                model: model.map(str::to_string),
                skill,
                bias: cell.map(|c| c.bias),
                operational_mm: selection.as_ref().map(|s| s.operational_mm),
                forecast_mm: calibrated.map(|c| c.forecast_mm),
                anomaly_mm: calibrated.map(|c| c.anomaly_mm),
                p20: cell.map(|c| c.p20),
                p50: cell.map(|c| c.p50),
                p80: cell.map(|c| c.p80),
                confidence: Confidence::from_correlation(skill, &self.config),
            });
        }

        info!(
            n_models = matrix.len(),
            with_forecast = records.iter().filter(|r| r.forecast_mm.is_some()).count(),
            "champions selected"
        );
        Ok(records)
    }

    /// Full 12 start-month × 6 lead verification of every model.
    ///
    /// # Errors
    ///
    /// As for [`skill_matrix`](Self::skill_matrix).
    pub fn verification_table(&self, lat: f64, lon: f64) -> Result<VerificationReport, SkillError> {
        validate_point(lat, lon)?;

        let span = info_span!("verification_table", lat, lon);
        let _enter = span.enter();
        let _datasets = self.lock_datasets();

        let observations = self.observations(lat, lon)?;
        let mut models = BTreeMap::new();
        for model in self.models()? {
            let entry = match self.source.load_hindcast(&model, lat, lon) {
                Ok(rows) => {
                    ModelVerification::evaluated(&evaluate_all(&observations, &rows, &self.config))
                }
                Err(e) => ModelVerification::from_outcome(&failed_outcome(&model, e)),
            };
            models.insert(model, entry);
        }
        Ok(VerificationReport { models })
    }

    /// Datasets currently available.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::Catalog`] if the datasets cannot be listed.
    pub fn inventory(&self) -> Result<Inventory, SkillError> {
        let _datasets = self.lock_datasets();
        self.source.inventory().map_err(catalog_error)
    }

    // -- Internals (lock already held) --------------------------------------

    fn lock_datasets(&self) -> MutexGuard<'_, ()> {
        // The lock guards no data, so a poisoned lock is still usable.
        self.datasets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observations(&self, lat: f64, lon: f64) -> Result<ObservationSeries, SkillError> {
        if !self.source.reference_available() {
            let path = self.source.reference_location();
            warn!(path = %path.display(), "observation reference missing");
            return Err(SkillError::MissingReference { path });
        }
        let raw = self
            .source
            .load_reference(lat, lon)
            .map_err(|e| SkillError::Reference {
                reason: e.to_string(),
            })?;
        let observations = ObservationSeries::from_raw(raw);
        debug!(n_months = observations.len(), "observations loaded");
        Ok(observations)
    }

    fn latest_tag(&self) -> Option<YearMonth> {
        match self.source.latest_operational() {
            Ok(tag) => tag,
            Err(e) => {
                warn!(error = %e, "cannot list operational forecasts");
                None
            }
        }
    }

    fn models(&self) -> Result<Vec<String>, SkillError> {
        self.source.hindcast_models().map_err(catalog_error)
    }

    fn matrix(
        &self,
        observations: &ObservationSeries,
        lat: f64,
        lon: f64,
        base_month: u8,
    ) -> Result<SkillMatrix, SkillError> {
        let mut matrix = SkillMatrix::new(base_month);
        for model in self.models()? {
            let outcome = match self.source.load_hindcast(&model, lat, lon) {
                Ok(rows) => {
                    let cells = evaluate(observations, &rows, base_month, &self.config);
                    debug!(
                        model = %model,
                        n_rows = rows.len(),
                        n_cells = cells.iter().flatten().count(),
                        "model evaluated"
                    );
                    ModelOutcome::Evaluated(cells)
                }
                Err(e) => failed_outcome(&model, e),
            };
            matrix.insert(model, outcome);
        }
        info!(base_month, n_models = matrix.len(), "skill matrix built");
        Ok(matrix)
    }

    /// Operational mm for `model` at `lead`, loading its file on first use.
    ///
    /// Load failures are cached like successes, so a broken file is opened
    /// once per request. Only rows started at `tag` are used.
    #[allow(clippy::too_many_arguments)]
    fn operational_mm(
        &self,
        cache: &mut BTreeMap<String, OperationalRows>,
        model: &str,
        tag: YearMonth,
        target: YearMonth,
        lead: usize,
        lat: f64,
        lon: f64,
    ) -> Result<Option<f64>, String> {
        let loaded = cache.entry(model.to_string()).or_insert_with(|| {
            self.source
                .load_operational(model, tag, lat, lon)
                .map_err(|e| e.to_string())
        });
        let rows = match loaded {
            Ok(Some(rows)) => rows,
            Ok(None) => return Ok(None),
            Err(reason) => return Err(reason.clone()),
        };
        let lead = lead as i32;
        Ok(rows
            .iter()
            .find(|r| r.lead == lead && r.start == tag)
            .map(|r| prediction_mm(r.value, target)))
    }
}

/// Operational rows of one model as loaded during a request.
type OperationalRows = Result<Option<Vec<PointRow>>, String>;

fn failed_outcome(model: &str, e: IoError) -> ModelOutcome {
    if e.is_incompatible_schema() {
        warn!(model = %model, error = %e, "model incompatible");
        ModelOutcome::Incompatible(e.to_string())
    } else {
        warn!(model = %model, error = %e, "model failed");
        ModelOutcome::Failed(e.to_string())
    }
}

fn catalog_error(e: IoError) -> SkillError {
    SkillError::Catalog {
        reason: e.to_string(),
    }
}

fn validate_point(lat: f64, lon: f64) -> Result<(), SkillError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(SkillError::BadRequest {
            reason: format!("latitude {lat} outside -90..=90"),
        });
    }
    if !lon.is_finite() || !(-180.0..=360.0).contains(&lon) {
        return Err(SkillError::BadRequest {
            reason: format!("longitude {lon} outside -180..=360"),
        });
    }
    Ok(())
}

fn validate_month(month: u8) -> Result<(), SkillError> {
    if !(1..=12).contains(&month) {
        return Err(SkillError::BadRequest {
            reason: format!("month {month} outside 1..=12"),
        });
    }
    Ok(())
}
