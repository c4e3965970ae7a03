//! Operator overrides with optimistic in-memory updates and debounced writes.
//!
//! The store owns the board's rows; nothing else mutates them. Each edit:
//! 1. updates the row synchronously (callers see the new value immediately),
//! 2. parks a write under `"<field>-<part>"` in the debouncer, replacing any
//!    write still waiting on that key; released writes for one key reach the
//!    store in order,
//! 3. records the key as pending until the write lands.
//!
//! Failed writes are not rolled back in memory. They are logged, kept as
//! `SaveStatus::Failed` and can be re-sent with [`OverrideStore::retry_failed`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use opsboard_core::{DomainError, DomainResult, PartId, SnapshotId};
use opsboard_forecast::{
    FilterCriteria, ForecastRow, MonthLabel, ProjectedRow, StatusSummary, filter, month_axis,
    project_rows, resolve_monthly_demand,
};

use crate::config::ForecastConfig;
use crate::debounce::Debouncer;
use crate::store::{ForecastStore, StoreError};

/// The two fields an operator may override.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    AvgMonthlyDemand,
    OnOrder,
}

impl OverrideField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideField::AvgMonthlyDemand => "avg_monthly_demand",
            OverrideField::OnOrder => "on_order",
        }
    }
}

/// Debounce key: one field of one part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverrideKey {
    pub field: OverrideField,
    pub part: PartId,
}

impl OverrideKey {
    pub fn new(field: OverrideField, part: PartId) -> Self {
        Self { field, part }
    }
}

impl core::fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.field.as_str(), self.part)
    }
}

/// Persistence state of one override, for a "not yet saved" indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    Pending,
    Failed { error: String },
}

/// A write that reached the store and was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedWrite {
    pub key: OverrideKey,
    pub value: f64,
    pub error: String,
}

#[derive(Debug, Clone)]
enum SaveState {
    Pending { revision: u64 },
    Failed { value: f64, error: String },
}

type SaveStates = Arc<Mutex<HashMap<OverrideKey, SaveState>>>;

#[derive(Debug, Clone)]
enum WriteTarget {
    Product(PartId),
    Snapshot(SnapshotId),
}

/// Owner of the forecast rows and the only path that mutates them.
pub struct OverrideStore {
    rows: Vec<ForecastRow>,
    index: HashMap<PartId, usize>,
    store: Arc<dyn ForecastStore>,
    debouncer: Debouncer<OverrideKey>,
    saves: SaveStates,
    next_revision: u64,
    config: ForecastConfig,
}

impl core::fmt::Debug for OverrideStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverrideStore")
            .field("rows", &self.rows.len())
            .field("debouncer", &self.debouncer)
            .field("config", &self.config)
            .finish()
    }
}

impl OverrideStore {
    pub fn new(
        rows: Vec<ForecastRow>,
        store: Arc<dyn ForecastStore>,
        config: ForecastConfig,
    ) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.part.clone(), i))
            .collect();

        Self {
            rows,
            index,
            store,
            debouncer: Debouncer::new(config.debounce),
            saves: Arc::new(Mutex::new(HashMap::new())),
            next_revision: 1,
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn row(&self, part: &PartId) -> Option<&ForecastRow> {
        self.index.get(part).map(|&i| &self.rows[i])
    }

    /// Set the operator's monthly demand for `part`.
    ///
    /// `0` clears the override and the row falls back to the derived demand.
    pub fn update_avg_demand(&mut self, part: &PartId, value: f64) -> DomainResult<()> {
        validate_quantity(OverrideField::AvgMonthlyDemand, value)?;
        let row = self.row_mut(part)?;
        row.demand_override = value;
        row.avg_monthly_demand = resolve_monthly_demand(value, row.derived_demand);

        let key = OverrideKey::new(OverrideField::AvgMonthlyDemand, part.clone());
        self.schedule_write(key, value, WriteTarget::Product(part.clone()));
        Ok(())
    }

    /// Set the on-order quantity of `part`'s latest snapshot.
    ///
    /// Parts without a snapshot are updated in memory only.
    pub fn update_on_order(&mut self, part: &PartId, value: f64) -> DomainResult<()> {
        validate_quantity(OverrideField::OnOrder, value)?;
        let row = self.row_mut(part)?;
        row.on_order = value;

        match row.snapshot_id.clone() {
            Some(snapshot_id) => {
                let key = OverrideKey::new(OverrideField::OnOrder, part.clone());
                self.schedule_write(key, value, WriteTarget::Snapshot(snapshot_id));
            }
            None => debug!(part = %part, "no snapshot for part; on_order kept in memory only"),
        }
        Ok(())
    }

    pub fn save_status(&self, part: &PartId, field: OverrideField) -> SaveStatus {
        let key = OverrideKey::new(field, part.clone());
        let state = self.saves.lock().ok().and_then(|m| m.get(&key).cloned());
        match state {
            None => SaveStatus::Saved,
            Some(SaveState::Pending { .. }) => SaveStatus::Pending,
            Some(SaveState::Failed { error, .. }) => SaveStatus::Failed { error },
        }
    }

    /// Keys whose latest edit has not landed yet (waiting or in flight).
    pub fn unsaved_keys(&self) -> Vec<OverrideKey> {
        let mut keys: Vec<OverrideKey> = self
            .saves
            .lock()
            .map(|m| {
                m.iter()
                    .filter(|(_, s)| matches!(s, SaveState::Pending { .. }))
                    .map(|(k, _)| k.clone())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn failed_writes(&self) -> Vec<FailedWrite> {
        let mut failed: Vec<FailedWrite> = self
            .saves
            .lock()
            .map(|m| {
                m.iter()
                    .filter_map(|(key, state)| match state {
                        SaveState::Failed { value, error } => Some(FailedWrite {
                            key: key.clone(),
                            value: *value,
                            error: error.clone(),
                        }),
                        SaveState::Pending { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        failed.sort_by(|a, b| a.key.cmp(&b.key));
        failed
    }

    /// Re-send every failed write with its last value. Returns how many were scheduled.
    pub fn retry_failed(&mut self) -> usize {
        let mut retried = 0;
        for failed in self.failed_writes() {
            let target = match failed.key.field {
                OverrideField::AvgMonthlyDemand => {
                    Some(WriteTarget::Product(failed.key.part.clone()))
                }
                OverrideField::OnOrder => self
                    .row(&failed.key.part)
                    .and_then(|r| r.snapshot_id.clone())
                    .map(WriteTarget::Snapshot),
            };
            if let Some(target) = target {
                info!(key = %failed.key, value = failed.value, "retrying failed override write");
                self.schedule_write(failed.key, failed.value, target);
                retried += 1;
            }
        }
        retried
    }

    /// Send every waiting write now. Returns how many were sent.
    pub async fn flush(&self) -> usize {
        let flushed = self.debouncer.flush().await;
        if flushed > 0 {
            info!(flushed, "flushed pending override writes");
        }
        flushed
    }

    /// Teardown: drop every waiting write. Returns how many were dropped.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.debouncer.cancel_all();
        if let Ok(mut saves) = self.saves.lock() {
            saves.retain(|_, s| !matches!(s, SaveState::Pending { .. }));
        }
        if dropped > 0 {
            warn!(dropped, "override store shut down with unsaved edits");
        }
        dropped
    }

    pub fn projected(&self, now: DateTime<Utc>) -> Vec<ProjectedRow> {
        project_rows(&self.rows, self.config.horizon_months, now, &self.config.policy)
    }

    /// Projected rows narrowed by search text and status.
    pub fn visible(&self, now: DateTime<Utc>, criteria: &FilterCriteria) -> Vec<ProjectedRow> {
        let projected = self.projected(now);
        filter(&projected, criteria).into_iter().cloned().collect()
    }

    pub fn month_axis(&self, now: DateTime<Utc>) -> Vec<MonthLabel> {
        month_axis(now, self.config.horizon_months)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> StatusSummary {
        StatusSummary::tally(&self.projected(now))
    }

    fn row_mut(&mut self, part: &PartId) -> DomainResult<&mut ForecastRow> {
        let &i = self
            .index
            .get(part)
            .ok_or_else(|| DomainError::not_found(format!("forecast row {part}")))?;
        Ok(&mut self.rows[i])
    }

    fn schedule_write(&mut self, key: OverrideKey, value: f64, target: WriteTarget) {
        let revision = self.next_revision;
        self.next_revision += 1;

        if let Ok(mut saves) = self.saves.lock() {
            saves.insert(key.clone(), SaveState::Pending { revision });
        }

        let store = Arc::clone(&self.store);
        let saves = Arc::clone(&self.saves);
        let task_key = key.clone();
        let write = async move {
            let result = match &target {
                WriteTarget::Product(part) => store.update_product_demand(part, value).await,
                WriteTarget::Snapshot(snapshot_id) => {
                    store.update_snapshot_on_order(snapshot_id, value).await
                }
            };
            record_outcome(&saves, &task_key, revision, value, result);
        };

        if self.debouncer.schedule(key.clone(), write) {
            debug!(key = %key, value, "coalesced override write");
        } else {
            debug!(key = %key, value, "scheduled override write");
        }
    }
}

fn validate_quantity(field: OverrideField, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{} must be a finite number >= 0 (got {value})",
            field.as_str()
        )));
    }
    Ok(())
}

fn record_outcome(
    saves: &Mutex<HashMap<OverrideKey, SaveState>>,
    key: &OverrideKey,
    revision: u64,
    value: f64,
    result: Result<(), StoreError>,
) {
    if let Err(e) = &result {
        warn!(key = %key, value, error = %e, "override write failed; in-memory value kept");
    }

    let Ok(mut saves) = saves.lock() else {
        return;
    };
    // A newer edit owns the key; its own write will settle the state.
    let current =
        matches!(saves.get(key), Some(SaveState::Pending { revision: r }) if *r == revision);
    if !current {
        return;
    }

    match result {
        Ok(()) => {
            saves.remove(key);
            debug!(key = %key, value, "override write saved");
        }
        Err(e) => {
            saves.insert(
                key.clone(),
                SaveState::Failed {
                    value,
                    error: e.to_string(),
                },
            );
        }
    }
}
