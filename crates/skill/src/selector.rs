//! Ranking of models by skill and operational fallback.

use std::fmt::Display;

use tracing::{debug, warn};

use crate::matrix::SkillMatrix;

/// Models with a skill cell at `lead`, by correlation (highest first).
///
/// Ties are broken by model id so the order is deterministic.
pub fn rank(matrix: &SkillMatrix, lead: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = matrix
        .outcomes()
        .keys()
        .filter_map(|model| {
            let cell = matrix.cell(model, lead)?;
            Some((model.clone(), cell.correlation))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// A ranked model for which operational data was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    /// Model id.
    pub model: &'a str,
    /// Position in the ranking (0 = top).
    pub rank: usize,
    /// Hindcast correlation at the lead.
    pub correlation: f64,
    /// Operational value, mm.
    pub operational_mm: f64,
}

/// First model in `ranked` whose operational value `loader` can produce.
///
/// `loader` returns `Ok(None)` when the model has no operational data.
/// Loader errors and non-finite values are logged and the next model is
/// tried.
pub fn select<'a, E, F>(ranked: &'a [(String, f64)], mut loader: F) -> Option<Selection<'a>>
where
    E: Display,
    F: FnMut(&str) -> Result<Option<f64>, E>,
{
    for (rank, (model, correlation)) in ranked.iter().enumerate() {
        match loader(model.as_str()) {
            Ok(Some(value)) if value.is_finite() => {
                return Some(Selection {
                    model: model.as_str(),
                    rank,
                    correlation: *correlation,
                    operational_mm: value,
                });
            }
            Ok(Some(value)) => debug!(model = %model, value, "operational value unusable"),
            Ok(None) => debug!(model = %model, "no operational data"),
            Err(e) => warn!(model = %model, error = %e, "operational load failed"),
        }
    }
    None
}
