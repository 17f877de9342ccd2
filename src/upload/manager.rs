use crate::upload::error::UploadError;
use crate::upload::pipeline::{CompletionHook, UploadPipeline};
use crate::upload::queue::{QueueEvent, UploadQueue};
use crate::upload::types::{
    PhotoFile, TrackingKey, UploadEntry, UploadStats, UploadStatus, UploadTarget, UploadedPhoto,
};
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainPolicy {
    #[default]
    Sequential,
    /// Fixed-size chunks uploaded together; the next chunk starts once every
    /// member of the current one has settled.
    Concurrent { limit: usize },
}

impl DrainPolicy {
    pub fn with_concurrency(limit: usize) -> Self {
        if limit <= 1 {
            DrainPolicy::Sequential
        } else {
            DrainPolicy::Concurrent { limit }
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct UploadManager {
    queue: UploadQueue,
    pipeline: UploadPipeline,
    on_uploaded: Option<CompletionHook>,
    counter: AtomicU64,
    in_flight: AtomicUsize,
}

impl UploadManager {
    pub fn new(pipeline: UploadPipeline) -> Self {
        Self::with_queue(pipeline, UploadQueue::new())
    }

    pub fn with_queue(pipeline: UploadPipeline, queue: UploadQueue) -> Self {
        Self {
            queue,
            pipeline,
            on_uploaded: None,
            counter: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn on_uploaded<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UploadedPhoto) -> Result<(), UploadError> + Send + Sync + 'static,
    {
        self.on_uploaded = Some(Arc::new(hook));
        self
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<QueueEvent> {
        self.queue.subscribe()
    }

    /// Tracks every file under a fresh key with an `Idle` entry. Existing
    /// entries are never replaced, even for repeated file names.
    pub fn enqueue_batch(&self, files: Vec<PhotoFile>) -> Vec<TrackingKey> {
        files
            .into_iter()
            .map(|file| loop {
                let counter = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                let key = TrackingKey::generate(
                    &file.name,
                    counter,
                    chrono::Utc::now().timestamp_millis(),
                );
                if self.queue.insert(key.clone(), UploadEntry::idle(file.clone())) {
                    break key;
                }
            })
            .collect()
    }

    /// Enqueues `files` and drains them. Per-file failures end up on the
    /// entries; this call itself never fails.
    pub async fn upload_photos(
        &self,
        target: &UploadTarget,
        files: Vec<PhotoFile>,
        policy: DrainPolicy,
    ) -> Vec<TrackingKey> {
        let _in_flight = InFlight::enter(&self.in_flight);
        let keys = self.enqueue_batch(files);
        info!(
            "Uploading {} photo(s) to event {} ({:?})",
            keys.len(),
            target.event_id,
            policy
        );
        self.drain_batch(target, &keys, policy).await;
        keys
    }

    /// Runs the `Idle` entries among `keys`. Anything already started or
    /// settled is left alone; failed entries go through `retry_failed`.
    pub async fn drain_batch(&self, target: &UploadTarget, keys: &[TrackingKey], policy: DrainPolicy) {
        let _in_flight = InFlight::enter(&self.in_flight);

        let pending: Vec<TrackingKey> = keys
            .iter()
            .filter(|key| {
                self.queue
                    .get(key)
                    .map_or(false, |entry| entry.status == UploadStatus::Idle)
            })
            .cloned()
            .collect();
        if pending.len() < keys.len() {
            debug!("Skipping {} entries that are not idle", keys.len() - pending.len());
        }

        match policy {
            DrainPolicy::Sequential => {
                for key in &pending {
                    self.upload_one(target, key).await;
                }
            }
            DrainPolicy::Concurrent { limit } => {
                for chunk in pending.chunks(limit.max(1)) {
                    join_all(chunk.iter().map(|key| self.upload_one(target, key))).await;
                }
            }
        }

        let stats = self.stats();
        info!(
            "Batch finished: {} uploaded, {} failed, {} total in queue",
            stats.success, stats.error, stats.total
        );
    }

    /// Re-runs every `Error` entry, in queue order, one at a time. Keys and
    /// file payloads are reused; the target comes from the caller.
    pub async fn retry_failed(&self, target: &UploadTarget) -> usize {
        let _in_flight = InFlight::enter(&self.in_flight);
        let failed = self.queue.keys_with_status(UploadStatus::Error);
        info!("Retrying {} failed upload(s)", failed.len());

        for key in &failed {
            if let Err(e) = self
                .pipeline
                .upload_single(&self.queue, key, target, self.on_uploaded.as_ref())
                .await
            {
                warn!("Retry failed for {}: {}", key, e);
            }
        }

        failed.len()
    }

    pub fn stats(&self) -> UploadStats {
        self.queue.stats()
    }

    pub fn clear(&self) {
        self.queue.clear();
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    async fn upload_one(&self, target: &UploadTarget, key: &TrackingKey) {
        if let Err(e) = self
            .pipeline
            .upload_single(&self.queue, key, target, self.on_uploaded.as_ref())
            .await
        {
            warn!("Failed to upload {}: {}", key, e);
        }
    }
}
