//! Board loading: fetch the three sources and merge them into an `OverrideStore`.

use std::sync::Arc;

use tracing::info;

use opsboard_forecast::{
    DemandLookup, DemandSample, ForecastRow, InventorySnapshotItem, Product, SnapshotLookup, merge,
};

use crate::config::ForecastConfig;
use crate::overrides::OverrideStore;
use crate::store::{ForecastStore, StoreError};

/// The three upstream record sets, already fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSources {
    pub products: Vec<Product>,
    pub snapshots: Vec<InventorySnapshotItem>,
    pub demand: Vec<DemandSample>,
}

impl ForecastSources {
    /// Run the three queries concurrently; any failure fails the load.
    pub async fn fetch(store: &dyn ForecastStore) -> Result<Self, StoreError> {
        let (products, snapshots, demand) = tokio::try_join!(
            store.forecasted_products(),
            store.snapshot_items(),
            store.demand_samples(),
        )?;

        Ok(Self {
            products,
            snapshots,
            demand,
        })
    }

    /// Resolve snapshots and demand, then join them onto the products.
    pub fn merge(&self) -> Vec<ForecastRow> {
        let snapshots = SnapshotLookup::resolve(&self.snapshots);
        let demand = DemandLookup::from_samples(&self.demand);
        merge(&self.products, &snapshots, &demand)
    }
}

/// Load the board from `store` and hand the rows to a new `OverrideStore`.
pub async fn load_board(
    store: Arc<dyn ForecastStore>,
    config: ForecastConfig,
) -> Result<OverrideStore, StoreError> {
    let sources = ForecastSources::fetch(store.as_ref()).await?;
    let rows = sources.merge();

    info!(
        products = sources.products.len(),
        snapshots = sources.snapshots.len(),
        demand_samples = sources.demand.len(),
        rows = rows.len(),
        "forecast board loaded"
    );

    Ok(OverrideStore::new(rows, store, config))
}
