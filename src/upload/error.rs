use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Compression error: {0}")]
    Compression(String),
    #[error("Auth error: {0}")]
    Auth(String),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Message recorded on a failed queue entry, without the variant prefix.
    pub fn entry_message(&self) -> String {
        match self {
            UploadError::Compression(msg)
            | UploadError::Auth(msg)
            | UploadError::Upload(msg)
            | UploadError::Validation(msg)
            | UploadError::Api(msg) => msg.clone(),
            UploadError::Io(e) => e.to_string(),
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Upload(format!("Failed to send request: {}", e))
    }
}
