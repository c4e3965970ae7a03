//! Per-key debounce scheduler.
//!
//! Lifecycle of a key:
//! 1. `schedule` parks a task behind a timer. Scheduling the same key again
//!    before the timer fires aborts the old timer and drops the old task, so
//!    only the last task scheduled within the window ever runs.
//! 2. When the timer fires the task is taken out of the pending map and runs
//!    to completion; a later `schedule` for that key starts a fresh window and
//!    does not cancel the running task.
//! 3. Tasks for one key never overlap. A task whose window ends while an
//!    earlier task for the same key is still running waits for it, so tasks
//!    for a key finish in the order they were released.
//! 4. `flush` runs every parked task immediately; `cancel`/`cancel_all`
//!    drop them. Dropping the scheduler aborts all timers.
//!
//! Timers are Tokio tasks, so scheduling requires a running Tokio runtime.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

struct Parked {
    ticket: u64,
    timer: JoinHandle<()>,
    task: Task,
}

type PendingMap<K> = Arc<Mutex<HashMap<K, Parked>>>;

/// One async lock per key; held while that key's task runs.
type Lanes<K> = Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>;

/// Coalesces rapid repeated work on the same key into one delayed run.
pub struct Debouncer<K> {
    delay: Duration,
    pending: PendingMap<K>,
    lanes: Lanes<K>,
    next_ticket: AtomicU64,
}

impl<K> core::fmt::Debug for Debouncer<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let pending = self.pending.lock().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &pending)
            .finish()
    }
}

impl<K> Debouncer<K>
where
    K: Clone + Eq + Hash + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            lanes: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Park `task` under `key`, replacing any task still waiting on that key.
    ///
    /// Returns `true` when an earlier pending task was replaced.
    pub fn schedule<F>(&self, key: K, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let Ok(mut map) = self.pending.lock() else {
            return false;
        };

        // The map lock is held until the entry is inserted, so the timer can
        // never observe the map before its own ticket is in place.
        let timer = {
            let pending = Arc::clone(&self.pending);
            let lanes = Arc::clone(&self.lanes);
            let key = key.clone();
            let delay = self.delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(task) = take_if_current(&pending, &key, ticket) {
                    run_in_lane(lane_for(&lanes, &key), task).await;
                }
            })
        };

        let replaced = map.insert(
            key,
            Parked {
                ticket,
                timer,
                task: Box::pin(task),
            },
        );

        match replaced {
            Some(old) => {
                old.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Drop the task waiting on `key`. Returns `false` if nothing was pending.
    pub fn cancel(&self, key: &K) -> bool {
        let removed = self.pending.lock().ok().and_then(|mut map| map.remove(key));
        match removed {
            Some(parked) => {
                parked.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Drop every waiting task. Returns how many were dropped.
    pub fn cancel_all(&self) -> usize {
        let drained = self.drain();
        for (_, parked) in &drained {
            parked.timer.abort();
        }
        drained.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.lock().map(|m| m.contains_key(key)).unwrap_or(false)
    }

    pub fn pending_keys(&self) -> Vec<K> {
        self.pending
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Run every waiting task now instead of at the end of its window.
    ///
    /// Tasks run one after another on the caller's task, each after any
    /// earlier task for its key has finished. Returns how many ran.
    pub async fn flush(&self) -> usize {
        let drained = self.drain();
        let count = drained.len();
        for (key, parked) in drained {
            parked.timer.abort();
            run_in_lane(lane_for(&self.lanes, &key), parked.task).await;
        }
        count
    }

    fn drain(&self) -> Vec<(K, Parked)> {
        self.pending
            .lock()
            .map(|mut m| m.drain().collect())
            .unwrap_or_default()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        if let Ok(mut map) = self.pending.lock() {
            for (_, parked) in map.drain() {
                parked.timer.abort();
            }
        }
    }
}

/// Claim the task for `key` if the firing timer is still the current one.
fn take_if_current<K: Eq + Hash>(
    pending: &Mutex<HashMap<K, Parked>>,
    key: &K,
    ticket: u64,
) -> Option<Task> {
    let mut map = pending.lock().ok()?;
    if map.get(key).is_some_and(|p| p.ticket == ticket) {
        map.remove(key).map(|p| p.task)
    } else {
        None
    }
}

fn lane_for<K: Clone + Eq + Hash>(lanes: &Lanes<K>, key: &K) -> Option<Arc<AsyncMutex<()>>> {
    lanes
        .lock()
        .ok()
        .map(|mut m| Arc::clone(m.entry(key.clone()).or_default()))
}

/// Run `task` once no other task holding `lane` is running.
async fn run_in_lane(lane: Option<Arc<AsyncMutex<()>>>, task: Task) {
    match lane {
        Some(lane) => {
            let _running = lane.lock().await;
            task.await;
        }
        None => task.await,
    }
}
