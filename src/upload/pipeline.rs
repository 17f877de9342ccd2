use crate::upload::auth::AuthContext;
use crate::upload::compress::Compressor;
use crate::upload::error::UploadError;
use crate::upload::queue::UploadQueue;
use crate::upload::transport::{PhotoTransport, PhotoUploadRequest};
use crate::upload::types::{PhotoFile, TrackingKey, UploadTarget, UploadedPhoto};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification invoked with the server acknowledgement of each stored photo.
pub type CompletionHook = Arc<dyn Fn(&UploadedPhoto) -> Result<(), UploadError> + Send + Sync>;

/// Carries one queued photo through compress, transmit and acknowledge,
/// updating its queue entry at each phase.
#[derive(Clone)]
pub struct UploadPipeline {
    compressor: Arc<dyn Compressor>,
    transport: Arc<dyn PhotoTransport>,
    auth: Arc<dyn AuthContext>,
}

impl UploadPipeline {
    pub fn new(
        compressor: Arc<dyn Compressor>,
        transport: Arc<dyn PhotoTransport>,
        auth: Arc<dyn AuthContext>,
    ) -> Self {
        Self {
            compressor,
            transport,
            auth,
        }
    }

    /// Uploads the photo tracked under `key`.
    ///
    /// Any failure is recorded on the entry (`Error`, progress 0) and then
    /// returned. That includes an `Err` from `on_uploaded`, which runs once
    /// the entry has reached `Success`.
    pub async fn upload_single(
        &self,
        queue: &UploadQueue,
        key: &TrackingKey,
        target: &UploadTarget,
        on_uploaded: Option<&CompletionHook>,
    ) -> Result<UploadedPhoto, UploadError> {
        let file = queue
            .get(key)
            .map(|entry| entry.file)
            .ok_or_else(|| UploadError::Validation(format!("Unknown tracking key: {}", key)))?;

        self.run(queue, key, &file, target, on_uploaded)
            .await
            .map_err(|e| {
                warn!("Upload of {} failed: {}", file.name, e);
                queue.update(key, |entry| entry.fail(e.entry_message()));
                e
            })
    }

    async fn run(
        &self,
        queue: &UploadQueue,
        key: &TrackingKey,
        file: &PhotoFile,
        target: &UploadTarget,
        on_uploaded: Option<&CompletionHook>,
    ) -> Result<UploadedPhoto, UploadError> {
        queue.update(key, |entry| entry.begin_compressing());
        debug!("Compressing {} ({} bytes)", file.name, file.size());

        let payload = self.compressor.compress(&file.bytes).await?;

        queue.update(key, |entry| entry.begin_uploading(payload.len() as u64));
        debug!("Uploading {} ({} bytes)", file.name, payload.len());

        let access_token = self.auth.access_token().await?;
        let request = PhotoUploadRequest {
            event_id: target.event_id.clone(),
            location_id: target.location_id.clone(),
            file_name: file.name.clone(),
            payload,
            meta: Some(file.meta.clone()),
        };

        let photo = self
            .transport
            .send(request, &access_token)
            .await?
            .into_acknowledgement(key)?;

        let path = photo.photo_path.clone();
        if queue.update(key, |entry| entry.succeed(path)).is_none() {
            debug!("Entry {} was cleared while uploading", key);
        }
        info!("Uploaded {} to {}", file.name, photo.photo_path);

        if let Some(hook) = on_uploaded {
            hook(&photo)?;
        }

        Ok(photo)
    }
}
