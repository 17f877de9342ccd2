use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Progress checkpoint reported once the compressed payload is on the wire.
pub const UPLOADING_PROGRESS: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Idle,
    Compressing,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    pub fn is_active(self) -> bool {
        matches!(self, UploadStatus::Compressing | UploadStatus::Uploading)
    }

    pub fn label(self) -> &'static str {
        match self {
            UploadStatus::Idle => "Waiting",
            UploadStatus::Compressing => "Compressing",
            UploadStatus::Uploading => "Uploading",
            UploadStatus::Success => "Uploaded",
            UploadStatus::Error => "Failed",
        }
    }
}

/// Capture attributes sent alongside a photo as the JSON `meta` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMeta {
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cam_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cam_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
}

impl PhotoMeta {
    pub fn new(original_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            ..Default::default()
        }
    }
}

fn fmt_payload(bytes: &Arc<Vec<u8>>, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "<{} bytes>", bytes.len())
}

/// Original photo bytes, shared by queue snapshots and retries.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct PhotoFile {
    pub name: String,
    #[derivative(Debug(format_with = "fmt_payload"))]
    pub bytes: Arc<Vec<u8>>,
    pub meta: PhotoMeta,
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            meta: PhotoMeta::new(name.clone()),
            name,
            bytes: Arc::new(bytes),
        }
    }

    pub fn with_meta(mut self, meta: PhotoMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackingKey(String);

impl TrackingKey {
    /// `<file name>-<counter>-<unix millis>`
    pub fn generate(file_name: &str, counter: u64, timestamp_millis: i64) -> Self {
        Self(format!("{}-{}-{}", file_name, counter, timestamp_millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct UploadEntry {
    pub file: PhotoFile,
    pub status: UploadStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub result_path: Option<String>,
    pub compressed_size: Option<u64>,
}

impl UploadEntry {
    pub fn idle(file: PhotoFile) -> Self {
        Self {
            file,
            status: UploadStatus::Idle,
            progress: 0,
            error: None,
            result_path: None,
            compressed_size: None,
        }
    }

    pub fn begin_compressing(&mut self) {
        self.status = UploadStatus::Compressing;
        self.progress = 0;
        self.error = None;
        self.result_path = None;
        self.compressed_size = None;
    }

    pub fn begin_uploading(&mut self, compressed_size: u64) {
        self.status = UploadStatus::Uploading;
        self.progress = UPLOADING_PROGRESS;
        self.compressed_size = Some(compressed_size);
    }

    pub fn succeed(&mut self, result_path: String) {
        self.status = UploadStatus::Success;
        self.progress = 100;
        self.error = None;
        self.result_path = Some(result_path);
    }

    pub fn fail(&mut self, message: String) {
        self.status = UploadStatus::Error;
        self.progress = 0;
        self.error = Some(message);
        self.result_path = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub uploading: usize,
    pub idle: usize,
}

impl UploadStats {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a UploadEntry>) -> Self {
        entries
            .into_iter()
            .fold(UploadStats::default(), |mut stats, entry| {
                stats.total += 1;
                match entry.status {
                    UploadStatus::Idle => stats.idle += 1,
                    UploadStatus::Compressing | UploadStatus::Uploading => stats.uploading += 1,
                    UploadStatus::Success => stats.success += 1,
                    UploadStatus::Error => stats.error += 1,
                }
                stats
            })
    }

    pub fn settled(&self) -> usize {
        self.success + self.error
    }

    pub fn settled_fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.settled() as f32 / self.total as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub event_id: String,
    pub location_id: Option<String>,
}

impl UploadTarget {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            location_id: None,
        }
    }

    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub key: TrackingKey,
    pub photo_path: String,
    pub job_id: Option<String>,
    /// The envelope's `data` object, or `Null` for flat envelopes.
    pub payload: serde_json::Value,
}
