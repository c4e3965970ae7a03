//! Forecast merge: product config + latest snapshot + demand → `ForecastRow`.

use crate::demand::DemandLookup;
use crate::model::{ForecastRow, Product};
use crate::snapshot::SnapshotLookup;

/// Pick the monthly demand a row is projected with.
///
/// An operator override strictly greater than zero always wins over the
/// derived run-rate; zero (or less) means "not set".
pub fn resolve_monthly_demand(demand_override: f64, derived_demand: f64) -> f64 {
    if demand_override > 0.0 {
        demand_override
    } else {
        derived_demand
    }
}

/// Join the three sources into one row per forecasted product.
///
/// - Products with `is_forecasted = false` are skipped.
/// - Parts without a snapshot get zero on-hand/on-order and no snapshot id.
/// - Output order follows the product input order.
///
/// Pure: the same inputs always produce the same rows.
pub fn merge<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    snapshots: &SnapshotLookup,
    demand: &DemandLookup,
) -> Vec<ForecastRow> {
    products
        .into_iter()
        .filter(|p| p.is_forecasted)
        .map(|product| {
            let snapshot = snapshots.get(&product.part);
            let derived_demand = demand.derived_monthly_demand(&product.part);

            ForecastRow {
                part: product.part.clone(),
                display_name: product.display_name.clone(),
                fragrance: product.fragrance.clone(),
                on_hand: snapshot.map(|s| s.on_hand).unwrap_or(0.0),
                on_order: snapshot.map(|s| s.on_order).unwrap_or(0.0),
                snapshot_id: snapshot.map(|s| s.snapshot_id.clone()),
                avg_monthly_demand: resolve_monthly_demand(
                    product.avg_monthly_demand,
                    derived_demand,
                ),
                demand_override: product.avg_monthly_demand,
                derived_demand,
            }
        })
        .collect()
}
