//! Configuration types for thumbnail-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP fetch behavior shared by thumbnail and listing requests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds (default: 30, None = wait forever)
    ///
    /// A fetch that never returns occupies the single worker and starves every
    /// other pending target, so leaving this unset is only useful to reproduce
    /// unbounded behavior.
    #[serde(
        default = "default_fetch_timeout",
        with = "optional_duration_serde"
    )]
    pub timeout: Option<Duration>,

    /// TCP connect timeout in seconds (default: 10, None = no limit)
    #[serde(
        default = "default_connect_timeout",
        with = "optional_duration_serde"
    )]
    pub connect_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Thumbnail engine settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name given to the worker thread (default: "ThumbnailDownloader")
    #[serde(default = "default_worker_name")]
    pub worker_name: String,

    /// Downscale decoded images so neither side exceeds this many pixels
    ///
    /// None keeps the decoded image at its original size.
    #[serde(default)]
    pub max_dimension: Option<u32>,
}

impl EngineConfig {
    /// Reject settings the worker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_name.trim().is_empty() {
            return Err(invalid("engine.worker_name", "worker name must not be empty"));
        }
        if self.max_dimension == Some(0) {
            return Err(invalid(
                "engine.max_dimension",
                "max dimension must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_name: default_worker_name(),
            max_dimension: None,
        }
    }
}

/// Remote photo listing settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// REST endpoint (default: Flickr's public REST API)
    #[serde(default = "default_gallery_endpoint")]
    pub endpoint: String,

    /// API method to call (default: "flickr.photos.getRecent")
    #[serde(default = "default_gallery_method")]
    pub method: String,

    /// API key, sent as `api_key` when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// Extra fields to request; must include the thumbnail URL field (default: "url_s")
    #[serde(default = "default_gallery_extras")]
    pub extras: String,

    /// Page size requested from the API
    #[serde(default)]
    pub per_page: Option<u32>,

    /// 1-based page number
    #[serde(default)]
    pub page: Option<u32>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gallery_endpoint(),
            method: default_gallery_method(),
            api_key: None,
            extras: default_gallery_extras(),
            per_page: None,
            page: None,
        }
    }
}

/// Main configuration
///
/// Every section has sensible defaults, so `Config::default()` is a working
/// configuration apart from the gallery API key.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Thumbnail engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Remote listing settings
    #[serde(default)]
    pub gallery: GalleryConfig,
}

impl Config {
    /// Parse a JSON configuration document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json(&content)
    }

    /// Check values that deserialize fine but cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.fetch.timeout == Some(Duration::ZERO) {
            return Err(invalid("fetch.timeout", "timeout must be greater than zero"));
        }
        if self.fetch.connect_timeout == Some(Duration::ZERO) {
            return Err(invalid(
                "fetch.connect_timeout",
                "connect timeout must be greater than zero",
            ));
        }
        if self.gallery.endpoint.trim().is_empty() {
            return Err(invalid("gallery.endpoint", "endpoint must not be empty"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

fn default_fetch_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_connect_timeout() -> Option<Duration> {
    Some(Duration::from_secs(10))
}

fn default_user_agent() -> String {
    concat!("thumbnail-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_worker_name() -> String {
    "ThumbnailDownloader".to_string()
}

fn default_gallery_endpoint() -> String {
    "https://api.flickr.com/services/rest/".to_string()
}

fn default_gallery_method() -> String {
    "flickr.photos.getRecent".to_string()
}

fn default_gallery_extras() -> String {
    "url_s".to_string()
}

// Optional Duration serialization helper (whole seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
