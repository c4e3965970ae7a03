//! Depletion projection over a horizon of calendar months.
//!
//! Model:
//! - Month 0 (the current month) receives all on-order stock and is charged
//!   demand only for the days still ahead of `now`.
//! - Every later month is charged one full month of demand.
//! - No re-ordering beyond the single on-order quantity is modelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::month_fraction_remaining;
use crate::model::ForecastRow;
use crate::policy::{CellHealth, ForecastPolicy, ForecastStatus};

/// Projected available units at the end of each of the first `horizon` months.
///
/// Accumulates forward from month 0, so a full table costs O(horizon) per row.
pub fn project_horizon(row: &ForecastRow, horizon: usize, now: DateTime<Utc>) -> Vec<f64> {
    let fraction = month_fraction_remaining(now);
    let mut balance = row.on_hand - row.avg_monthly_demand * fraction + row.on_order;

    let mut months = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        months.push(balance);
        balance -= row.avg_monthly_demand;
    }
    months
}

/// Projected available units at the end of month `month_index` (0 = current).
pub fn project(row: &ForecastRow, month_index: usize, now: DateTime<Utc>) -> f64 {
    let fraction = month_fraction_remaining(now);
    let mut balance = row.on_hand - row.avg_monthly_demand * fraction + row.on_order;
    for _ in 0..month_index {
        balance -= row.avg_monthly_demand;
    }
    balance
}

/// `(on_hand + on_order) / avg`, or `None` when the row has no demand.
pub fn months_of_supply(row: &ForecastRow) -> Option<f64> {
    (row.avg_monthly_demand > 0.0).then(|| row.supply() / row.avg_monthly_demand)
}

/// One projected month of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthCell {
    pub projected: f64,
    pub health: CellHealth,
}

/// A forecast row together with its derived status and month curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub row: ForecastRow,
    pub status: ForecastStatus,
    pub months_of_supply: Option<f64>,
    pub cells: Vec<MonthCell>,
}

impl ProjectedRow {
    pub fn build(
        row: ForecastRow,
        horizon: usize,
        now: DateTime<Utc>,
        policy: &ForecastPolicy,
    ) -> Self {
        let status =
            ForecastStatus::classify(row.on_hand, row.on_order, row.avg_monthly_demand, policy);
        let cells = project_horizon(&row, horizon, now)
            .into_iter()
            .map(|projected| MonthCell {
                projected,
                health: CellHealth::classify(projected, row.avg_monthly_demand, policy),
            })
            .collect();

        Self {
            months_of_supply: months_of_supply(&row),
            status,
            cells,
            row,
        }
    }

    /// Text matched by the search box: part, name, fragrance and status label.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(64);
        text.push_str(self.row.part.as_str());
        text.push(' ');
        text.push_str(&self.row.display_name);
        if let Some(fragrance) = &self.row.fragrance {
            text.push(' ');
            text.push_str(fragrance);
        }
        text.push(' ');
        text.push_str(self.status.label());
        text
    }
}

/// Project every row for display.
pub fn project_rows<'a>(
    rows: impl IntoIterator<Item = &'a ForecastRow>,
    horizon: usize,
    now: DateTime<Utc>,
    policy: &ForecastPolicy,
) -> Vec<ProjectedRow> {
    rows.into_iter()
        .map(|row| ProjectedRow::build(row.clone(), horizon, now, policy))
        .collect()
}
