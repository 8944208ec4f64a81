//! # skillcast-skill
//!
//! Verification of seasonal precipitation hindcasts against observations at
//! a point, and bias correction of the most skilful operational forecast.
//!
//! ## Pipeline
//!
//! 1. [`ObservationSeries`] reconciles the reference series to mm.
//! 2. [`evaluate`] pairs each model's hindcast rows with observations per
//!    (start month, lead) and yields [`SkillCell`]s.
//! 3. [`rank`] and [`select`] pick the most skilful model with usable
//!    operational data.
//! 4. [`calibrate`] removes the hindcast bias and computes the anomaly.
//!
//! [`SkillService`] runs the whole pipeline over a [`DatasetSource`] and is
//! the entry point for callers.

mod calibrate;
mod config;
mod error;
mod evaluator;
mod matrix;
mod output;
mod selector;
mod series;
mod service;
mod source;
pub mod units;

pub use calibrate::{Calibrated, Confidence, calibrate};
pub use config::SkillConfig;
pub use error::SkillError;
pub use evaluator::{LEADS, LeadRow, SkillCell, evaluate, evaluate_all, evaluate_cell};
pub use matrix::{ModelOutcome, SkillMatrix};
pub use output::{
    ChampionRecord, ErrorReport, ModelVerification, SkillMatrixReport, StartMonthSkill,
    VerificationReport, to_json,
};
pub use selector::{Selection, rank, select};
pub use series::ObservationSeries;
pub use service::{BaseMonth, SkillService};
pub use source::{
    DatasetSource, Inventory, InventoryHindcast, InventoryOperational, NetcdfSource,
};
