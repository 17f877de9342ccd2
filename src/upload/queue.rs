use crate::upload::types::{TrackingKey, UploadEntry, UploadStats, UploadStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Enqueued {
        key: TrackingKey,
    },
    Updated {
        key: TrackingKey,
        status: UploadStatus,
        progress: u8,
    },
    Cleared,
}

#[derive(Default)]
struct Entries {
    by_key: HashMap<TrackingKey, UploadEntry>,
    order: Vec<TrackingKey>,
}

/// Shared map of tracking key to entry, enumerated in insertion order.
///
/// Clones share the same entries and subscribers. The lock is never held
/// across an await point.
#[derive(Clone, Default)]
pub struct UploadQueue {
    entries: Arc<Mutex<Entries>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<QueueEvent>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<QueueEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Inserts a new entry. Returns `false` and leaves the queue untouched if
    /// the key is already tracked.
    pub fn insert(&self, key: TrackingKey, entry: UploadEntry) -> bool {
        {
            let mut entries = lock(&self.entries);
            if entries.by_key.contains_key(&key) {
                return false;
            }
            entries.order.push(key.clone());
            entries.by_key.insert(key.clone(), entry);
        }
        self.emit(QueueEvent::Enqueued { key });
        true
    }

    pub fn get(&self, key: &TrackingKey) -> Option<UploadEntry> {
        lock(&self.entries).by_key.get(key).cloned()
    }

    pub fn contains(&self, key: &TrackingKey) -> bool {
        lock(&self.entries).by_key.contains_key(key)
    }

    /// Mutates one entry in place. Returns `None` when the key is not tracked
    /// (for instance after a clear).
    pub fn update<R>(&self, key: &TrackingKey, f: impl FnOnce(&mut UploadEntry) -> R) -> Option<R> {
        let (result, status, progress) = {
            let mut entries = lock(&self.entries);
            let entry = entries.by_key.get_mut(key)?;
            let result = f(entry);
            (result, entry.status, entry.progress)
        };
        self.emit(QueueEvent::Updated {
            key: key.clone(),
            status,
            progress,
        });
        Some(result)
    }

    pub fn keys_with_status(&self, status: UploadStatus) -> Vec<TrackingKey> {
        let entries = lock(&self.entries);
        entries
            .order
            .iter()
            .filter(|key| {
                entries
                    .by_key
                    .get(*key)
                    .map_or(false, |entry| entry.status == status)
            })
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<(TrackingKey, UploadEntry)> {
        let entries = lock(&self.entries);
        entries
            .order
            .iter()
            .filter_map(|key| {
                entries
                    .by_key
                    .get(key)
                    .map(|entry| (key.clone(), entry.clone()))
            })
            .collect()
    }

    pub fn stats(&self) -> UploadStats {
        UploadStats::from_entries(lock(&self.entries).by_key.values())
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        {
            let mut entries = lock(&self.entries);
            entries.by_key.clear();
            entries.order.clear();
        }
        self.emit(QueueEvent::Cleared);
    }

    fn emit(&self, event: QueueEvent) {
        // Closed receivers are dropped on the next emit.
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }
}
