//! Canonical hindcast/operational grid.

use ndarray::{Array4, ArrayView4};
use skillcast_calendar::YearMonth;

/// Precipitation on the canonical `tp[start_date, lead, latitude, longitude]`
/// layout, ensemble already collapsed.
#[derive(Debug, Clone)]
pub struct GriddedSeries {
    tp: Array4<f64>,
    starts: Vec<YearMonth>,
    leads: Vec<i32>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
}

impl GriddedSeries {
    /// Assembles a series; axis lengths must match the array shape.
    pub(crate) fn new(
        tp: Array4<f64>,
        starts: Vec<YearMonth>,
        leads: Vec<i32>,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(
            tp.shape(),
            &[starts.len(), leads.len(), latitudes.len(), longitudes.len()]
        );
        Self {
            tp,
            starts,
            leads,
            latitudes,
            longitudes,
        }
    }

    /// The `tp` array.
    pub fn tp(&self) -> ArrayView4<'_, f64> {
        self.tp.view()
    }

    /// Start months along axis 0.
    pub fn starts(&self) -> &[YearMonth] {
        &self.starts
    }

    /// Lead times (months) along axis 1.
    pub fn leads(&self) -> &[i32] {
        &self.leads
    }

    /// Latitudes along axis 2.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Longitudes along axis 3.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }
}
