//! Inventory forecast domain module.
//!
//! This crate turns three upstream record sets (product configuration, the
//! latest warehouse snapshot, trailing demand) into per-product depletion
//! forecasts. Everything here is deterministic domain logic (no IO, no
//! timers, no storage); callers pass `now` explicitly.

pub mod calendar;
pub mod demand;
pub mod filter;
pub mod merge;
pub mod model;
pub mod policy;
pub mod projection;
pub mod snapshot;

pub use calendar::{MonthLabel, days_in_month, month_axis, month_fraction_remaining};
pub use demand::{DEMAND_WINDOW_MONTHS, DemandLookup};
pub use filter::{FilterCriteria, StatusFilter, StatusSummary, filter};
pub use merge::{merge, resolve_monthly_demand};
pub use model::{DemandSample, ForecastRow, InventorySnapshotItem, Product};
pub use policy::{
    CellHealth, DEFAULT_CAUTION_MULTIPLE, DEFAULT_HEALTHY_MONTHS_OF_SUPPLY, DEFAULT_HORIZON_MONTHS,
    DEFAULT_REVIEW_MONTHS_OF_SUPPLY, ForecastPolicy, ForecastStatus,
};
pub use projection::{
    MonthCell, ProjectedRow, months_of_supply, project, project_horizon, project_rows,
};
pub use snapshot::{LatestSnapshot, SnapshotLookup};
