//! Snapshot resolution: newest warehouse count per part.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opsboard_core::{PartId, SnapshotId};

use crate::model::InventorySnapshotItem;

/// The fields of the most recent snapshot row that feed a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    pub snapshot_id: SnapshotId,
    pub on_hand: f64,
    pub on_order: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&InventorySnapshotItem> for LatestSnapshot {
    fn from(item: &InventorySnapshotItem) -> Self {
        Self {
            snapshot_id: item.id.clone(),
            on_hand: item.on_hand,
            on_order: item.on_order,
            created_at: item.created_at,
        }
    }
}

/// Lookup `part → latest snapshot`.
///
/// Parts that were never counted are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotLookup {
    latest: HashMap<PartId, LatestSnapshot>,
}

impl SnapshotLookup {
    /// Resolve the newest snapshot per part.
    ///
    /// The snapshot query returns rows newest-first, but the winner is picked
    /// by comparing `created_at`, so unsorted input resolves the same way.
    /// Rows sharing a timestamp keep the one encountered first.
    pub fn resolve<'a>(items: impl IntoIterator<Item = &'a InventorySnapshotItem>) -> Self {
        let mut latest: HashMap<PartId, LatestSnapshot> = HashMap::new();

        for item in items {
            match latest.entry(item.part.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(LatestSnapshot::from(item));
                }
                Entry::Occupied(mut slot) => {
                    // Strictly newer only: ties go to the earlier arrival.
                    if item.created_at > slot.get().created_at {
                        slot.insert(LatestSnapshot::from(item));
                    }
                }
            }
        }

        Self { latest }
    }

    pub fn get(&self, part: &PartId) -> Option<&LatestSnapshot> {
        self.latest.get(part)
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, day, 12, 0, 0).unwrap()
    }

    fn item(
        id: &str,
        part: &str,
        on_hand: f64,
        on_order: f64,
        created_at: DateTime<Utc>,
    ) -> InventorySnapshotItem {
        InventorySnapshotItem {
            id: SnapshotId::new(id),
            part: PartId::new(part),
            on_hand,
            on_order,
            created_at,
        }
    }

    #[test]
    fn newest_first_input_keeps_first_row_per_part() {
        let items = vec![
            item("s3", "P1", 90.0, 5.0, at(20)),
            item("s2", "P2", 10.0, 0.0, at(15)),
            item("s1", "P1", 120.0, 0.0, at(1)),
        ];

        let lookup = SnapshotLookup::resolve(&items);
        let p1 = lookup.get(&PartId::new("P1")).unwrap();

        assert_eq!(p1.snapshot_id, SnapshotId::new("s3"));
        assert_eq!(p1.on_hand, 90.0);
        assert_eq!(p1.on_order, 5.0);
        assert_eq!(lookup.len(), 2);
    }

    #[test]
    fn unsorted_input_still_picks_newest() {
        let items = vec![
            item("old", "P1", 1.0, 0.0, at(1)),
            item("new", "P1", 2.0, 0.0, at(28)),
            item("mid", "P1", 3.0, 0.0, at(14)),
        ];

        let lookup = SnapshotLookup::resolve(&items);
        assert_eq!(lookup.get(&PartId::new("P1")).unwrap().snapshot_id, SnapshotId::new("new"));
    }

    #[test]
    fn equal_timestamps_keep_first_encountered() {
        let items = vec![
            item("first", "P1", 1.0, 0.0, at(10)),
            item("second", "P1", 2.0, 0.0, at(10)),
        ];

        let lookup = SnapshotLookup::resolve(&items);
        assert_eq!(lookup.get(&PartId::new("P1")).unwrap().snapshot_id, SnapshotId::new("first"));
    }

    #[test]
    fn uncounted_part_is_absent() {
        let lookup = SnapshotLookup::resolve(&[item("s1", "P1", 1.0, 0.0, at(1))]);

        assert!(lookup.get(&PartId::new("P9")).is_none());

        let none: [InventorySnapshotItem; 0] = [];
        assert!(SnapshotLookup::resolve(&none).is_empty());
    }
}
