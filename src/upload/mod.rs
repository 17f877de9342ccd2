mod auth;
mod compress;
mod error;
mod file_processor;
mod manager;
mod metadata;
mod pipeline;
mod queue;
mod transport;
mod types;

pub use auth::{AuthContext, Session};
pub use compress::{
    CompressionOptions, Compressor, JpegCompressor, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION,
};
pub use error::UploadError;
pub use file_processor::FileProcessor;
pub use manager::{DrainPolicy, UploadManager};
pub use metadata::read_photo_meta;
pub use pipeline::{CompletionHook, UploadPipeline};
pub use queue::{QueueEvent, UploadQueue};
pub use transport::{
    error_message_from_body, HttpTransport, PhotoTransport, PhotoUploadRequest, UploadEnvelope,
};
pub use types::{
    PhotoFile, PhotoMeta, TrackingKey, UploadEntry, UploadStats, UploadStatus, UploadTarget,
    UploadedPhoto, UPLOADING_PROGRESS,
};
