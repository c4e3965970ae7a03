use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opsboard_core::{Entity, PartId, SnapshotId};

/// Product configuration row (owned by product admin).
///
/// Read-only to the forecast engine except `avg_monthly_demand`, the operator
/// override. A value of `0` means "use the demand derived from sales".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub part: PartId,
    pub display_name: String,
    #[serde(default)]
    pub fragrance: Option<String>,
    #[serde(default)]
    pub avg_monthly_demand: f64,
    pub is_forecasted: bool,
}

impl Entity for Product {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.part
    }
}

/// One line of an uploaded warehouse count.
///
/// Several snapshots accumulate per part over time; only the newest matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshotItem {
    pub id: SnapshotId,
    pub part: PartId,
    pub on_hand: f64,
    pub on_order: f64,
    pub created_at: DateTime<Utc>,
}

impl Entity for InventorySnapshotItem {
    type Id = SnapshotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Units sold per part over the trailing 90 days (computed upstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSample {
    pub part: PartId,
    pub units_last_90_days: f64,
}

/// Merged per-product forecast input.
///
/// Derived on load and never persisted as a whole; only the two override
/// fields (`avg_monthly_demand` on the product, `on_order` on the snapshot row)
/// are written back individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub part: PartId,
    pub display_name: String,
    pub fragrance: Option<String>,
    pub on_hand: f64,
    pub on_order: f64,
    /// `None` when the part has never been counted.
    pub snapshot_id: Option<SnapshotId>,
    /// Resolved monthly demand used by every projection.
    pub avg_monthly_demand: f64,
    /// Operator value from the product record (`0` = not set).
    pub demand_override: f64,
    /// Run-rate derived from trailing sales.
    pub derived_demand: f64,
}

impl ForecastRow {
    /// Total units available before any demand is charged.
    pub fn supply(&self) -> f64 {
        self.on_hand + self.on_order
    }
}

impl Entity for ForecastRow {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.part
    }
}
