// Fakes shared by the integration tests.
#![allow(dead_code)]

use race_photo_uploader::upload::{
    Compressor, PhotoFile, PhotoTransport, PhotoUploadRequest, Session, UploadEnvelope,
    UploadError, UploadManager, UploadPipeline,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Payloads starting with this marker fail to compress.
pub const CORRUPT: &[u8] = b"corrupt";

#[derive(Default)]
pub struct FakeCompressor {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Compressor for FakeCompressor {
    async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes.starts_with(CORRUPT) {
            return Err(UploadError::Compression(
                "Failed to compress image".to_string(),
            ));
        }
        Ok(bytes[..(bytes.len() + 1) / 2].to_vec())
    }
}

/// Transport whose behavior is scripted per file name. Every call logs
/// `start:<name>` and `end:<name>` into a shared log.
#[derive(Default)]
pub struct ScriptedTransport {
    delays: HashMap<String, Duration>,
    failures: Mutex<HashMap<String, usize>>,
    rejections: HashMap<String, String>,
    pub log: Arc<Mutex<Vec<String>>>,
    pub requests: Mutex<Vec<PhotoUploadRequest>>,
    pub tokens: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, name: &str, millis: u64) -> Self {
        self.delays
            .insert(name.to_string(), Duration::from_millis(millis));
        self
    }

    /// Fails the first `times` uploads of `name` with a network error naming
    /// the attempt.
    pub fn fail_times(self, name: &str, times: usize) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(name.to_string(), times);
        self
    }

    /// Answers `name` with a `success: false` envelope.
    pub fn reject(mut self, name: &str, message: &str) -> Self {
        self.rejections
            .insert(name.to_string(), message.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> usize {
        self.log()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{} not in log {:?}", entry, self.log()))
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.file_name == name)
            .count()
    }
}

#[async_trait::async_trait]
impl PhotoTransport for ScriptedTransport {
    async fn send(
        &self,
        request: PhotoUploadRequest,
        access_token: &str,
    ) -> Result<UploadEnvelope, UploadError> {
        let name = request.file_name.clone();
        self.log.lock().unwrap().push(format!("start:{}", name));
        self.tokens.lock().unwrap().push(access_token.to_string());

        if let Some(delay) = self.delays.get(&name) {
            tokio::time::sleep(*delay).await;
        }

        let path = format!("{}/photographer/{}", request.event_id, name);
        self.requests.lock().unwrap().push(request);
        self.log.lock().unwrap().push(format!("end:{}", name));

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&name) {
                if *remaining > 0 {
                    *remaining -= 1;
                    let attempt = self.calls_for(&name);
                    return Err(UploadError::Upload(format!(
                        "connection reset (attempt {})",
                        attempt
                    )));
                }
            }
        }

        if let Some(message) = self.rejections.get(&name) {
            return Ok(UploadEnvelope {
                success: false,
                error: Some(message.clone()),
                ..Default::default()
            });
        }

        Ok(UploadEnvelope {
            success: true,
            data: Some(serde_json::json!({ "id": 1, "photo_path": path })),
            ..Default::default()
        })
    }
}

pub fn photo(name: &str) -> PhotoFile {
    PhotoFile::new(name, format!("image-bytes-of-{}", name).into_bytes())
}

pub fn corrupt_photo(name: &str) -> PhotoFile {
    PhotoFile::new(name, CORRUPT.to_vec())
}

pub fn pipeline(transport: Arc<ScriptedTransport>) -> UploadPipeline {
    UploadPipeline::new(
        Arc::new(FakeCompressor::default()),
        transport,
        Arc::new(Session::with_token("test-token")),
    )
}

pub fn manager(transport: Arc<ScriptedTransport>) -> UploadManager {
    UploadManager::new(pipeline(transport))
}
