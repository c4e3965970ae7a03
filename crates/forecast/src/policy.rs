//! Stock health policy: row status and per-month cell health.
//!
//! The two classifications answer different questions and use different
//! formulas. Row status looks at months of supply today; cell health compares
//! a projected month-end balance to one month of demand.

use serde::{Deserialize, Serialize};

/// Months of supply above which a row is healthy.
pub const DEFAULT_HEALTHY_MONTHS_OF_SUPPLY: f64 = 3.0;

/// Months of supply above which a row only needs review (below it is at risk).
pub const DEFAULT_REVIEW_MONTHS_OF_SUPPLY: f64 = 1.5;

/// A projected balance below `avg × this` is flagged as caution.
pub const DEFAULT_CAUTION_MULTIPLE: f64 = 3.0;

/// Number of calendar months projected, starting at the current month.
pub const DEFAULT_HORIZON_MONTHS: usize = 6;

/// Thresholds used by [`ForecastStatus::classify`] and [`CellHealth::classify`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPolicy {
    pub healthy_months_of_supply: f64,
    pub review_months_of_supply: f64,
    pub caution_multiple: f64,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            healthy_months_of_supply: DEFAULT_HEALTHY_MONTHS_OF_SUPPLY,
            review_months_of_supply: DEFAULT_REVIEW_MONTHS_OF_SUPPLY,
            caution_multiple: DEFAULT_CAUTION_MULTIPLE,
        }
    }
}

/// Row-level stock status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastStatus {
    #[serde(rename = "no demand")]
    NoDemand,
    #[serde(rename = "healthy")]
    Healthy,
    #[serde(rename = "needs review")]
    NeedsReview,
    #[serde(rename = "at risk")]
    AtRisk,
}

impl ForecastStatus {
    pub const ALL: [ForecastStatus; 4] = [
        ForecastStatus::NoDemand,
        ForecastStatus::Healthy,
        ForecastStatus::NeedsReview,
        ForecastStatus::AtRisk,
    ];

    /// Classify a row by months of supply (`(on_hand + on_order) / avg`).
    pub fn classify(
        on_hand: f64,
        on_order: f64,
        avg_monthly_demand: f64,
        policy: &ForecastPolicy,
    ) -> Self {
        if avg_monthly_demand <= 0.0 {
            return ForecastStatus::NoDemand;
        }

        let months_of_supply = (on_hand + on_order) / avg_monthly_demand;
        if months_of_supply > policy.healthy_months_of_supply {
            ForecastStatus::Healthy
        } else if months_of_supply > policy.review_months_of_supply {
            ForecastStatus::NeedsReview
        } else {
            ForecastStatus::AtRisk
        }
    }

    /// Label shown to operators and matched by text search.
    pub fn label(&self) -> &'static str {
        match self {
            ForecastStatus::NoDemand => "no demand",
            ForecastStatus::Healthy => "healthy",
            ForecastStatus::NeedsReview => "needs review",
            ForecastStatus::AtRisk => "at risk",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl core::fmt::Display for ForecastStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Health of a single projected month.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellHealth {
    Critical,
    Caution,
    Healthy,
}

impl CellHealth {
    /// Classify a projected month-end balance against monthly demand.
    pub fn classify(projected: f64, avg_monthly_demand: f64, policy: &ForecastPolicy) -> Self {
        if projected < avg_monthly_demand {
            CellHealth::Critical
        } else if projected < avg_monthly_demand * policy.caution_multiple {
            CellHealth::Caution
        } else {
            CellHealth::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(on_hand: f64, on_order: f64, avg: f64) -> ForecastStatus {
        ForecastStatus::classify(on_hand, on_order, avg, &ForecastPolicy::default())
    }

    #[test]
    fn zero_or_negative_demand_is_no_demand() {
        assert_eq!(status(0.0, 0.0, 0.0), ForecastStatus::NoDemand);
        assert_eq!(status(500.0, 20.0, 0.0), ForecastStatus::NoDemand);
        assert_eq!(status(500.0, 20.0, -4.0), ForecastStatus::NoDemand);
    }

    #[test]
    fn months_of_supply_thresholds() {
        // 3.33 months
        assert_eq!(status(100.0, 0.0, 30.0), ForecastStatus::Healthy);
        // 1.67 months
        assert_eq!(status(50.0, 0.0, 30.0), ForecastStatus::NeedsReview);
        // 1.33 months
        assert_eq!(status(40.0, 0.0, 30.0), ForecastStatus::AtRisk);
    }

    #[test]
    fn thresholds_are_exclusive() {
        // Exactly 3 months is not healthy; exactly 1.5 is not "needs review".
        assert_eq!(status(90.0, 0.0, 30.0), ForecastStatus::NeedsReview);
        assert_eq!(status(45.0, 0.0, 30.0), ForecastStatus::AtRisk);
    }

    #[test]
    fn on_order_counts_towards_supply() {
        assert_eq!(status(40.0, 60.0, 30.0), ForecastStatus::Healthy);
    }

    #[test]
    fn custom_policy_moves_the_boundaries() {
        let policy = ForecastPolicy {
            healthy_months_of_supply: 6.0,
            review_months_of_supply: 2.0,
            caution_multiple: 2.0,
        };
        assert_eq!(
            ForecastStatus::classify(100.0, 0.0, 30.0, &policy),
            ForecastStatus::NeedsReview
        );
        assert_eq!(CellHealth::classify(50.0, 30.0, &policy), CellHealth::Caution);
        assert_eq!(CellHealth::classify(60.0, 30.0, &policy), CellHealth::Healthy);
    }

    #[test]
    fn cell_health_compares_projection_to_average() {
        let policy = ForecastPolicy::default();
        assert_eq!(CellHealth::classify(29.0, 30.0, &policy), CellHealth::Critical);
        assert_eq!(CellHealth::classify(-10.0, 30.0, &policy), CellHealth::Critical);
        assert_eq!(CellHealth::classify(30.0, 30.0, &policy), CellHealth::Caution);
        assert_eq!(CellHealth::classify(89.0, 30.0, &policy), CellHealth::Caution);
        assert_eq!(CellHealth::classify(90.0, 30.0, &policy), CellHealth::Healthy);
    }

    #[test]
    fn labels_round_trip_and_serialize() {
        for status in ForecastStatus::ALL {
            assert_eq!(ForecastStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(ForecastStatus::from_label(" At Risk "), Some(ForecastStatus::AtRisk));
        assert_eq!(ForecastStatus::from_label("all"), None);

        assert_eq!(
            serde_json::to_string(&ForecastStatus::NeedsReview).unwrap(),
            "\"needs review\""
        );
        assert_eq!(serde_json::to_string(&CellHealth::Caution).unwrap(), "\"caution\"");
    }
}
