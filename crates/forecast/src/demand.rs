//! Demand aggregation: trailing 90-day sales → monthly run-rate.

use std::collections::HashMap;

use opsboard_core::PartId;

use crate::model::DemandSample;

/// Months covered by the trailing sales window.
///
/// The run-rate divides the 90-day total by a flat 3 rather than by calendar
/// days / 30 so it stays in lockstep with the sampling window.
pub const DEMAND_WINDOW_MONTHS: f64 = 3.0;

/// Lookup `part → units_last_90_days`.
///
/// Absent parts read as zero demand; missing data is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandLookup {
    units: HashMap<PartId, f64>,
}

impl DemandLookup {
    /// Build the lookup from the raw samples.
    ///
    /// If a part appears more than once, the last sample wins.
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a DemandSample>) -> Self {
        let units = samples
            .into_iter()
            .map(|s| (s.part.clone(), s.units_last_90_days))
            .collect();
        Self { units }
    }

    pub fn units_last_90_days(&self, part: &PartId) -> f64 {
        self.units.get(part).copied().unwrap_or(0.0)
    }

    /// Default monthly demand for a part with no operator override.
    pub fn derived_monthly_demand(&self, part: &PartId) -> f64 {
        self.units_last_90_days(part) / DEMAND_WINDOW_MONTHS
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
