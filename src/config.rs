use crate::upload::{CompressionOptions, DrainPolicy, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Application configuration, read from `.env` and the process environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    /// Token for a preconfigured session; usually pasted in the UI instead.
    pub access_token: Option<String>,
    pub event_id: Option<String>,
    pub location_id: Option<String>,
    pub concurrency: usize,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    /// Public bucket URL used to open uploaded photos in a browser.
    pub public_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            event_id: None,
            location_id: None,
            concurrency: 1,
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            public_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("Config: loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let concurrency = parse(&text, "RACE_PHOTO_CONCURRENCY")?.unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "RACE_PHOTO_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        let jpeg_quality = parse(&text, "RACE_PHOTO_JPEG_QUALITY")?.unwrap_or(defaults.jpeg_quality);
        if !(1..=100).contains(&jpeg_quality) {
            return Err(ConfigError::Invalid {
                key: "RACE_PHOTO_JPEG_QUALITY",
                value: jpeg_quality.to_string(),
            });
        }

        let max_dimension =
            parse(&text, "RACE_PHOTO_MAX_DIMENSION")?.unwrap_or(defaults.max_dimension);
        if max_dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "RACE_PHOTO_MAX_DIMENSION",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_url: text("RACE_PHOTO_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            access_token: text("RACE_PHOTO_ACCESS_TOKEN"),
            event_id: text("RACE_PHOTO_EVENT_ID"),
            location_id: text("RACE_PHOTO_LOCATION_ID"),
            concurrency,
            max_dimension,
            jpeg_quality,
            public_url: text("RACE_PHOTO_PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    pub fn drain_policy(&self) -> DrainPolicy {
        DrainPolicy::with_concurrency(self.concurrency)
    }

    pub fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            max_dimension: self.max_dimension,
            quality: self.jpeg_quality,
        }
    }

    pub fn photo_url(&self, photo_path: &str) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{}/{}", base, photo_path.trim_start_matches('/')))
    }
}

fn parse<T, F>(text: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    text(key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}
