//! Monthly observation series at one point.

use std::collections::BTreeMap;

use skillcast_calendar::YearMonth;
use tracing::debug;

use crate::units::observation_mm;

/// Observed monthly precipitation in mm, keyed by month.
///
/// Built once per request and shared read-only by every model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSeries {
    values: BTreeMap<YearMonth, f64>,
}

impl ObservationSeries {
    /// Reconcile raw reference values (native units) to mm.
    ///
    /// The first value seen for a month decides it; a NaN there leaves the
    /// month unavailable.
    pub fn from_raw(raw: impl IntoIterator<Item = (YearMonth, f64)>) -> Self {
        Self::collect(raw.into_iter().map(|(m, v)| (m, observation_mm(v, m))))
    }

    /// Build from values already in mm.
    pub fn from_mm(values: impl IntoIterator<Item = (YearMonth, f64)>) -> Self {
        Self::collect(values.into_iter())
    }

    fn collect(values: impl Iterator<Item = (YearMonth, f64)>) -> Self {
        let mut first = BTreeMap::new();
        let mut duplicates = 0usize;
        for (month, value) in values {
            if first.contains_key(&month) {
                duplicates += 1;
                continue;
            }
            first.insert(month, value);
        }
        first.retain(|_, v: &mut f64| !v.is_nan());
        if duplicates > 0 {
            debug!(duplicates, "duplicate observation months ignored");
        }
        Self { values: first }
    }

    /// Observed mm for `month`, if available.
    pub fn get(&self, month: YearMonth) -> Option<f64> {
        self.values.get(&month).copied()
    }

    /// Number of available months.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no month is available.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Months and values in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }
}
