//! Per-model skill rows for one start month.

use std::collections::BTreeMap;

use crate::evaluator::{LEADS, LeadRow, SkillCell};

/// What happened to one discovered hindcast.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    /// The model was read and verified.
    Evaluated(LeadRow),
    /// The file does not fit the canonical schema.
    Incompatible(String),
    /// The file could not be read.
    Failed(String),
}

impl ModelOutcome {
    /// Skill cells, all `None` unless evaluated.
    pub fn cells(&self) -> LeadRow {
        match self {
            ModelOutcome::Evaluated(row) => *row,
            ModelOutcome::Incompatible(_) | ModelOutcome::Failed(_) => [None; LEADS],
        }
    }

    /// Short status word.
    pub fn status(&self) -> &'static str {
        match self {
            ModelOutcome::Evaluated(_) => "evaluated",
            ModelOutcome::Incompatible(_) => "incompatible",
            ModelOutcome::Failed(_) => "failed",
        }
    }

    /// Why the model was not evaluated.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ModelOutcome::Evaluated(_) => None,
            ModelOutcome::Incompatible(r) | ModelOutcome::Failed(r) => Some(r),
        }
    }
}

/// Skill of every discovered model for one start month.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatrix {
    base_month: u8,
    outcomes: BTreeMap<String, ModelOutcome>,
}

impl SkillMatrix {
    /// Empty matrix for `base_month`.
    pub fn new(base_month: u8) -> Self {
        Self {
            base_month,
            outcomes: BTreeMap::new(),
        }
    }

    /// Record the outcome for `model`, replacing any earlier one.
    pub fn insert(&mut self, model: impl Into<String>, outcome: ModelOutcome) {
        self.outcomes.insert(model.into(), outcome);
    }

    /// Start month the matrix was evaluated for.
    pub fn base_month(&self) -> u8 {
        self.base_month
    }

    /// Outcomes keyed by model id.
    pub fn outcomes(&self) -> &BTreeMap<String, ModelOutcome> {
        &self.outcomes
    }

    /// Cell for `model` at `lead` (1-based), if present.
    pub fn cell(&self, model: &str, lead: usize) -> Option<SkillCell> {
        let index = lead.checked_sub(1).filter(|&i| i < LEADS)?;
        self.outcomes.get(model)?.cells()[index]
    }

    /// Number of models with an outcome.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no model was discovered.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
