//! JSON output structures for skill and forecast results.
//!
//! Field names follow the wire format the existing web front end reads.

use std::collections::BTreeMap;

use serde::Serialize;
use skillcast_calendar::{YearMonth, month_label};

use crate::calibrate::Confidence;
use crate::error::SkillError;
use crate::evaluator::{LEADS, LeadRow};
use crate::matrix::{ModelOutcome, SkillMatrix};

/// Skill matrix as served: cells and biases per model, `null` where absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatrixReport {
    pub acc: BTreeMap<String, LeadRow>,
    pub bias: BTreeMap<String, [Option<f64>; LEADS]>,
    pub base_month: u8,
}

impl From<&SkillMatrix> for SkillMatrixReport {
    fn from(matrix: &SkillMatrix) -> Self {
        let mut acc = BTreeMap::new();
        let mut bias = BTreeMap::new();
        for (model, outcome) in matrix.outcomes() {
            let cells = outcome.cells();
            bias.insert(model.clone(), cells.map(|c| c.map(|c| c.bias)));
            acc.insert(model.clone(), cells);
        }
        Self {
            acc,
            bias,
            base_month: matrix.base_month(),
        }
    }
}

/// Best model and calibrated forecast for one lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionRecord {
    pub lead: usize,
    /// Three-letter label of the target month.
    #[serde(rename = "mes")]
    pub month: &'static str,
    /// Target month; `None` without operational data.
    pub target: Option<YearMonth>,
    #[serde(rename = "mejor_modelo")]
    pub model: Option<String>,
    pub skill: Option<f64>,
    pub bias: Option<f64>,
    pub operational_mm: Option<f64>,
    #[serde(rename = "acumulado_mm")]
    pub forecast_mm: Option<f64>,
    #[serde(rename = "anomalia_mm")]
    pub anomaly_mm: Option<f64>,
    pub p20: Option<f64>,
    pub p50: Option<f64>,
    pub p80: Option<f64>,
    #[serde(rename = "confianza")]
    pub confidence: Confidence,
}

/// Full 12 × 6 verification table for every model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub models: BTreeMap<String, ModelVerification>,
}

/// Verification of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelVerification {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub months: Vec<StartMonthSkill>,
}

/// Skill for runs starting in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartMonthSkill {
    pub start_month: u8,
    pub label: &'static str,
    pub leads: LeadRow,
}

impl ModelVerification {
    /// Entry for an evaluated model.
    pub fn evaluated(table: &[LeadRow; 12]) -> Self {
        let months = table
            .iter()
            .zip(1u8..)
            .map(|(leads, start_month)| StartMonthSkill {
                start_month,
                label: month_label(start_month).unwrap_or("?"),
                leads: *leads,
            })
            .collect();
        Self {
            status: "evaluated",
            reason: None,
            months,
        }
    }

    /// Entry for a model that could not be evaluated.
    pub fn from_outcome(outcome: &ModelOutcome) -> Self {
        Self {
            status: outcome.status(),
            reason: outcome.reason().map(str::to_string),
            months: Vec::new(),
        }
    }
}

/// Error body, `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl From<&SkillError> for ErrorReport {
    fn from(e: &SkillError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Serialize any output structure to pretty JSON.
pub fn to_json<T: Serialize>(output: &T) -> Result<String, SkillError> {
    serde_json::to_string_pretty(output).map_err(|e| SkillError::Serialization {
        reason: e.to_string(),
    })
}
