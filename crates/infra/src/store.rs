//! Record store boundary for forecast inputs and override write-back.
//!
//! The backing database is an external collaborator: the engine only needs
//! three read queries and two by-key updates.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opsboard_core::{Entity, PartId, SnapshotId};
use opsboard_forecast::{DemandSample, InventorySnapshotItem, Product};

/// Record store operation error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Keyed record store holding products, snapshot rows and demand samples.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Products with `is_forecasted = true`, ordered by part.
    async fn forecasted_products(&self) -> Result<Vec<Product>, StoreError>;

    /// All snapshot rows, newest first.
    async fn snapshot_items(&self) -> Result<Vec<InventorySnapshotItem>, StoreError>;

    async fn demand_samples(&self) -> Result<Vec<DemandSample>, StoreError>;

    /// `updateProduct(part, { avg_monthly_demand })`.
    async fn update_product_demand(
        &self,
        part: &PartId,
        avg_monthly_demand: f64,
    ) -> Result<(), StoreError>;

    /// `updateSnapshotItem(id, { on_order })`.
    async fn update_snapshot_on_order(
        &self,
        snapshot_id: &SnapshotId,
        on_order: f64,
    ) -> Result<(), StoreError>;
}

/// One accepted write, as recorded by [`InMemoryForecastStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreWrite {
    ProductDemand { part: PartId, avg_monthly_demand: f64 },
    SnapshotOnOrder { snapshot_id: SnapshotId, on_order: f64 },
}

/// In-memory record store for tests/dev.
///
/// Accepted writes are appended to a log; `fail_writes(true)` makes every
/// update return `StoreError::Unavailable` to simulate an outage.
#[derive(Debug, Default)]
pub struct InMemoryForecastStore {
    products: RwLock<BTreeMap<PartId, Product>>,
    snapshots: RwLock<Vec<InventorySnapshotItem>>,
    demand: RwLock<Vec<DemandSample>>,
    writes: Mutex<Vec<StoreWrite>>,
    failing: AtomicBool,
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

impl InMemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: Product) {
        if let Ok(mut map) = self.products.write() {
            map.insert(product.id().clone(), product);
        }
    }

    pub fn insert_snapshot(&self, item: InventorySnapshotItem) {
        if let Ok(mut items) = self.snapshots.write() {
            items.push(item);
        }
    }

    pub fn insert_demand(&self, sample: DemandSample) {
        if let Ok(mut samples) = self.demand.write() {
            samples.push(sample);
        }
    }

    pub fn product(&self, part: &PartId) -> Option<Product> {
        self.products.read().ok()?.get(part).cloned()
    }

    pub fn snapshot(&self, snapshot_id: &SnapshotId) -> Option<InventorySnapshotItem> {
        let items = self.snapshots.read().ok()?;
        items.iter().find(|i| i.id() == snapshot_id).cloned()
    }

    /// Accepted writes in the order they landed.
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Toggle simulated write failures.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }

    fn record(&self, write: StoreWrite) -> Result<(), StoreError> {
        self.writes.lock().map_err(|_| poisoned())?.push(write);
        Ok(())
    }
}

#[async_trait]
impl ForecastStore for InMemoryForecastStore {
    async fn forecasted_products(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|p| p.is_forecasted).cloned().collect())
    }

    async fn snapshot_items(&self) -> Result<Vec<InventorySnapshotItem>, StoreError> {
        let mut items = self.snapshots.read().map_err(|_| poisoned())?.clone();
        // Stable: rows sharing a timestamp keep insertion order.
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn demand_samples(&self) -> Result<Vec<DemandSample>, StoreError> {
        Ok(self.demand.read().map_err(|_| poisoned())?.clone())
    }

    async fn update_product_demand(
        &self,
        part: &PartId,
        avg_monthly_demand: f64,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        {
            let mut map = self.products.write().map_err(|_| poisoned())?;
            let product = map
                .get_mut(part)
                .ok_or_else(|| StoreError::NotFound(format!("product {part}")))?;
            product.avg_monthly_demand = avg_monthly_demand;
        }
        self.record(StoreWrite::ProductDemand {
            part: part.clone(),
            avg_monthly_demand,
        })
    }

    async fn update_snapshot_on_order(
        &self,
        snapshot_id: &SnapshotId,
        on_order: f64,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        {
            let mut items = self.snapshots.write().map_err(|_| poisoned())?;
            let item = items
                .iter_mut()
                .find(|i| &i.id == snapshot_id)
                .ok_or_else(|| StoreError::NotFound(format!("snapshot item {snapshot_id}")))?;
            item.on_order = on_order;
        }
        self.record(StoreWrite::SnapshotOnOrder {
            snapshot_id: snapshot_id.clone(),
            on_order,
        })
    }
}
