use crate::upload::error::UploadError;
use crate::upload::metadata::read_photo_meta;
use crate::upload::types::PhotoFile;
use glob::Pattern;
use ignore::Walk;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "tif", "tiff", "bmp"];

/// Finds and loads the photos of a folder chosen by the photographer.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    folder_path: PathBuf,
    patterns: Vec<Pattern>,
}

impl FileProcessor {
    pub fn new(folder_path: impl Into<PathBuf>) -> Self {
        Self {
            folder_path: folder_path.into(),
            patterns: Vec::new(),
        }
    }

    /// Restricts the scan to files whose folder-relative path matches one of
    /// `patterns`. Patterns without a leading `**/` match at any depth.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self, UploadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            let processed = if pattern.starts_with("**/") {
                pattern.to_string()
            } else {
                format!("**/{}", pattern)
            };
            let compiled = Pattern::new(&processed).map_err(|e| {
                UploadError::Validation(format!("Invalid pattern '{}': {}", pattern, e))
            })?;
            self.patterns.push(compiled);
        }
        Ok(self)
    }

    pub fn folder_path(&self) -> &Path {
        &self.folder_path
    }

    pub fn count_supported_files(&self) -> usize {
        self.collect_photos().len()
    }

    /// Supported photos under the folder, sorted by path. Entries hidden by
    /// `.gitignore` or dot-files are skipped.
    pub fn collect_photos(&self) -> Vec<PathBuf> {
        let mut photos: Vec<PathBuf> = Walk::new(&self.folder_path)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file() && self.is_selected(path))
            .collect();
        photos.sort();
        debug!(
            "Found {} photo(s) in {}",
            photos.len(),
            self.folder_path.display()
        );
        photos
    }

    pub async fn load_photo(&self, path: &Path) -> Result<PhotoFile, UploadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UploadError::Validation(format!("Invalid file name: {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        let meta = read_photo_meta(&name, &bytes);

        Ok(PhotoFile::new(name, bytes).with_meta(meta))
    }

    pub fn is_supported_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn is_selected(&self, path: &Path) -> bool {
        if !Self::is_supported_file(path) {
            return false;
        }
        if self.patterns.is_empty() {
            return true;
        }
        let relative = path.strip_prefix(&self.folder_path).unwrap_or(path);
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}
