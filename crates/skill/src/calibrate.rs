//! Bias correction and confidence tiers.

use serde::Serialize;

use crate::config::SkillConfig;
use crate::evaluator::SkillCell;

/// How far the historical skill supports the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Correlation above the high threshold.
    High,
    /// Correlation above the medium threshold.
    Medium,
    /// Anything else, including no skill at all.
    Low,
}

impl Confidence {
    /// Tier for a correlation; `None` is low.
    pub fn from_correlation(correlation: Option<f64>, config: &SkillConfig) -> Self {
        match correlation {
            Some(r) if r > config.high_confidence() => Confidence::High,
            Some(r) if r > config.medium_confidence() => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

/// A bias-corrected operational value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrated {
    /// `operational_mm - bias`.
    pub forecast_mm: f64,
    /// `forecast_mm - p50`.
    pub anomaly_mm: f64,
}

/// Correct `operational_mm` with the hindcast bias of `cell`.
pub fn calibrate(operational_mm: f64, cell: &SkillCell) -> Calibrated {
    let forecast_mm = operational_mm - cell.bias;
    Calibrated {
        forecast_mm,
        anomaly_mm: forecast_mm - cell.p50,
    }
}
