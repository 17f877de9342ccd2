use crate::upload::error::UploadError;
use crate::upload::types::{PhotoMeta, TrackingKey, UploadedPhoto};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

/// Multipart field set for `POST /api/events/{eventId}/photo`.
#[derive(Debug, Clone)]
pub struct PhotoUploadRequest {
    pub event_id: String,
    pub location_id: Option<String>,
    pub file_name: String,
    pub payload: Vec<u8>,
    pub meta: Option<PhotoMeta>,
}

impl PhotoUploadRequest {
    pub fn meta_json(&self) -> Result<Option<String>, UploadError> {
        self.meta
            .as_ref()
            .map(|meta| {
                serde_json::to_string(meta)
                    .map_err(|e| UploadError::Validation(format!("Invalid photo metadata: {}", e)))
            })
            .transpose()
    }
}

/// Response envelope of the upload endpoint. Older deployments answer with a
/// flat `photoPath`/`jobId`, newer ones with the inserted row under `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default, rename = "photoPath")]
    pub photo_path: Option<String>,
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadEnvelope {
    pub fn stored_path(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("photo_path"))
            .and_then(|path| path.as_str())
            .or(self.photo_path.as_deref())
            .filter(|path| !path.is_empty())
    }

    /// Checks the envelope reports success with a stored path.
    pub fn into_acknowledgement(self, key: &TrackingKey) -> Result<UploadedPhoto, UploadError> {
        let photo_path = self
            .stored_path()
            .filter(|_| self.success)
            .map(str::to_string);
        let Some(photo_path) = photo_path else {
            return Err(UploadError::Upload(
                self.error.unwrap_or_else(|| "Upload failed".to_string()),
            ));
        };

        let job_id = self.job_id.or_else(|| {
            self.data
                .as_ref()
                .and_then(|data| data.get("id"))
                .map(|id| match id {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        });

        Ok(UploadedPhoto {
            key: key.clone(),
            photo_path,
            job_id,
            payload: self.data.unwrap_or(serde_json::Value::Null),
        })
    }
}

/// Sends a compressed photo to the server.
#[async_trait::async_trait]
pub trait PhotoTransport: Send + Sync {
    async fn send(
        &self,
        request: PhotoUploadRequest,
        access_token: &str,
    ) -> Result<UploadEnvelope, UploadError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, event_id: &str) -> String {
        format!("{}/api/events/{}/photo", self.base_url, event_id)
    }

    fn build_form(request: PhotoUploadRequest) -> Result<Form, UploadError> {
        let meta = request.meta_json()?;
        let file = Part::bytes(request.payload)
            .file_name(request.file_name)
            .mime_str("image/jpeg")?;

        let mut form = Form::new().part("file", file);
        if let Some(location_id) = request.location_id {
            form = form.text("locationId", location_id);
        }
        if let Some(meta) = meta {
            form = form.text("meta", meta);
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl PhotoTransport for HttpTransport {
    async fn send(
        &self,
        request: PhotoUploadRequest,
        access_token: &str,
    ) -> Result<UploadEnvelope, UploadError> {
        let url = self.endpoint(&request.event_id);
        debug!("POST {} ({} bytes)", url, request.payload.len());

        let form = Self::build_form(request)?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Upload(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Upload rejected with status {}", status);
            return Err(UploadError::Upload(error_message_from_body(
                "Upload",
                status.as_u16(),
                &body,
            )));
        }

        serde_json::from_str::<UploadEnvelope>(&body)
            .map_err(|e| UploadError::Upload(format!("Failed to parse upload response: {}", e)))
    }
}

/// Picks the server's own message out of an error body when there is one.
pub fn error_message_from_body(action: &str, status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message", "statusMessage"]
                .iter()
                .find_map(|field| value.get(field).and_then(|v| v.as_str()).map(String::from))
        })
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| format!("{} failed with status: {}", action, status))
}
