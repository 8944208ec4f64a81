//! Conversion of raw magnitudes to millimetres per target month.
//!
//! Sources disagree on units. Observations arrive either as monthly totals
//! in metres or as mean daily rates in m/day; predictions arrive either as
//! mean rates in m/s or as totals in metres. The branch is chosen from the
//! magnitude alone.

use skillcast_calendar::YearMonth;
use tracing::warn;

/// |prediction| below this is a rate in m/s, otherwise a total in metres.
pub const PREDICTION_RATE_THRESHOLD: f64 = 0.01;

/// An observation below this many mm (after ×1000) is a daily rate in m/day.
pub const OBSERVATION_DAILY_RATE_THRESHOLD_MM: f64 = 20.0;

/// Largest plausible mean daily observation rate, in m/day.
pub const OBSERVATION_DAILY_RATE_CEILING_M: f64 = 0.02;

/// Largest plausible mean prediction rate, in m/s (about 8.6 m/day).
pub const PREDICTION_RATE_CEILING_M_S: f64 = 1.0e-4;

/// Largest plausible monthly total, in metres.
pub const ACCUMULATION_CEILING_M: f64 = 0.5;

const MM_PER_M: f64 = 1000.0;

/// Observation value to mm accumulated over `target`.
pub fn observation_mm(value: f64, target: YearMonth) -> f64 {
    let mm = value * MM_PER_M;
    if mm < OBSERVATION_DAILY_RATE_THRESHOLD_MM {
        if value.abs() > OBSERVATION_DAILY_RATE_CEILING_M {
            warn!(value, %target, "implausible daily observation rate");
        }
        mm * f64::from(target.days_in_month())
    } else {
        if value > ACCUMULATION_CEILING_M {
            warn!(value, %target, "implausible monthly observation total");
        }
        mm
    }
}

/// Prediction value to mm accumulated over `target`.
pub fn prediction_mm(value: f64, target: YearMonth) -> f64 {
    if value.abs() < PREDICTION_RATE_THRESHOLD {
        if value.abs() > PREDICTION_RATE_CEILING_M_S {
            warn!(value, %target, "implausible prediction rate");
        }
        value * target.seconds_in_month() * MM_PER_M
    } else {
        if value.abs() > ACCUMULATION_CEILING_M {
            warn!(value, %target, "implausible monthly prediction total");
        }
        value * MM_PER_M
    }
}
