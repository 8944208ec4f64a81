//! Per (start month, lead) hindcast verification against observations.

use serde::Serialize;
use skillcast_io::PointRow;
use skillcast_stats::{mean, mean_bias, pearson_correlation, percentiles};
use tracing::trace;

use crate::config::SkillConfig;
use crate::series::ObservationSeries;
use crate::units::prediction_mm;

/// Number of lead months evaluated (1..=6).
pub const LEADS: usize = 6;

/// Skill of one model at one (start month, lead).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillCell {
    /// Pearson correlation of predicted vs observed mm.
    pub correlation: f64,
    /// `mean(predicted) - mean(observed)`, mm.
    pub bias: f64,
    /// 20th percentile of observed mm.
    pub p20: f64,
    /// Median of observed mm.
    pub p50: f64,
    /// 80th percentile of observed mm.
    pub p80: f64,
    /// Mean observed mm.
    pub mean: f64,
    /// Number of matched pairs.
    pub n: usize,
}

/// One row of skill cells, index `i` holding lead `i + 1`.
pub type LeadRow = [Option<SkillCell>; LEADS];

/// Evaluate every lead for runs starting in `start_month`.
pub fn evaluate(
    observations: &ObservationSeries,
    rows: &[PointRow],
    start_month: u8,
    config: &SkillConfig,
) -> LeadRow {
    std::array::from_fn(|i| evaluate_cell(observations, rows, start_month, i as i32 + 1, config))
}

/// Evaluate all twelve start months; index `m` holds start month `m + 1`.
pub fn evaluate_all(
    observations: &ObservationSeries,
    rows: &[PointRow],
    config: &SkillConfig,
) -> [LeadRow; 12] {
    std::array::from_fn(|m| evaluate(observations, rows, m as u8 + 1, config))
}

/// Evaluate a single (start month, lead) cell.
///
/// `None` when fewer than `config.min_pairs()` pairs match.
pub fn evaluate_cell(
    observations: &ObservationSeries,
    rows: &[PointRow],
    start_month: u8,
    lead: i32,
    config: &SkillConfig,
) -> Option<SkillCell> {
    let (predicted, observed) = matched_pairs(observations, rows, start_month, lead);
    if predicted.len() < config.min_pairs() {
        trace!(start_month, lead, n = predicted.len(), "too few pairs");
        return None;
    }

    // Constant series carry no correlation signal.
    let correlation = pearson_correlation(&predicted, &observed).unwrap_or(0.0);
    let bias = mean_bias(&predicted, &observed);
    let band = percentiles(&observed, &[0.2, 0.5, 0.8])?;

    Some(SkillCell {
        correlation,
        bias,
        p20: band[0],
        p50: band[1],
        p80: band[2],
        mean: mean(&observed),
        n: predicted.len(),
    })
}

/// Predicted and observed mm for every usable sample of one cell.
fn matched_pairs(
    observations: &ObservationSeries,
    rows: &[PointRow],
    start_month: u8,
    lead: i32,
) -> (Vec<f64>, Vec<f64>) {
    let Ok(offset) = u32::try_from(lead) else {
        return (Vec::new(), Vec::new());
    };
    let mut predicted = Vec::new();
    let mut observed = Vec::new();
    for row in rows
        .iter()
        .filter(|r| r.start.month() == start_month && r.lead == lead)
    {
        let target = row.start.add_months(offset);
        let Some(obs) = observations.get(target) else {
            continue;
        };
        let pred = prediction_mm(row.value, target);
        if !pred.is_finite() || !obs.is_finite() {
            continue;
        }
        predicted.push(pred);
        observed.push(obs);
    }
    (predicted, observed)
}
