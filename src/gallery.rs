//! Gallery listing: which pictures exist and where their thumbnails live
//!
//! Talks to a Flickr-style REST endpoint and turns the JSON photo list into
//! [`GalleryItem`]s whose `url` can be handed straight to
//! [`ThumbnailEngine::enqueue`](crate::ThumbnailEngine::enqueue).

use crate::config::GalleryConfig;
use crate::error::{Error, NetworkError, Result};
use crate::fetcher::ByteFetcher;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// One picture in the gallery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryItem {
    /// Photo identifier
    pub id: String,

    /// Human-readable caption (may be empty)
    pub caption: String,

    /// Small-size thumbnail URL
    pub url: String,
}

impl std::fmt::Display for GalleryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.caption)
    }
}

#[derive(Deserialize)]
struct Envelope {
    photos: Option<PhotoPage>,
    #[serde(default)]
    stat: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct PhotoPage {
    #[serde(default)]
    photo: Vec<PhotoRecord>,
}

#[derive(Deserialize)]
struct PhotoRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url_s: Option<String>,
}

/// Client for the photo listing API
pub struct GalleryClient {
    config: GalleryConfig,
    fetcher: Arc<dyn ByteFetcher>,
}

impl GalleryClient {
    /// Create a client that fetches through `fetcher`
    pub fn new(config: GalleryConfig, fetcher: Arc<dyn ByteFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// The listing request URL for the configured method and page
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidUrl`] if the endpoint cannot be parsed
    pub fn build_url(&self) -> Result<url::Url> {
        let mut params: Vec<(&str, String)> = vec![("method", self.config.method.clone())];
        if let Some(api_key) = &self.config.api_key {
            params.push(("api_key", api_key.clone()));
        }
        params.push(("format", "json".to_string()));
        params.push(("nojsoncallback", "1".to_string()));
        params.push(("extras", self.config.extras.clone()));
        if let Some(per_page) = self.config.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        if let Some(page) = self.config.page {
            params.push(("page", page.to_string()));
        }

        url::Url::parse_with_params(&self.config.endpoint, &params).map_err(|e| {
            NetworkError::InvalidUrl {
                url: self.config.endpoint.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Fetch and parse the current photo list
    ///
    /// # Errors
    /// Returns the fetch error, a serialization error for malformed JSON, or
    /// [`Error::Other`] when the API reports a failure
    pub async fn fetch_items(&self) -> Result<Vec<GalleryItem>> {
        let url = self.build_url()?;
        debug!(url = %url, "fetching gallery listing");

        let body = self.fetcher.fetch(url.as_str()).await?;
        let items = parse_items(&body)?;

        info!(count = items.len(), "gallery listing fetched");
        Ok(items)
    }
}

/// Parse a listing response body
///
/// Records without a thumbnail URL are skipped.
///
/// # Errors
/// Returns [`Error::Serialization`] for malformed JSON and [`Error::Other`]
/// when the body is an API failure (`"stat": "fail"`)
pub fn parse_items(body: &[u8]) -> Result<Vec<GalleryItem>> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    let Some(page) = envelope.photos else {
        return Err(Error::Other(format!(
            "gallery API returned {} (code {}): {}",
            envelope.stat.as_deref().unwrap_or("no photos"),
            envelope.code.unwrap_or_default(),
            envelope.message.as_deref().unwrap_or("missing photo list"),
        )));
    };

    let total = page.photo.len();
    let items: Vec<GalleryItem> = page
        .photo
        .into_iter()
        .filter_map(|record| match record.url_s {
            Some(url) if !url.is_empty() => Some(GalleryItem {
                id: record.id,
                caption: record.title,
                url,
            }),
            _ => None,
        })
        .collect();

    if items.len() < total {
        debug!(
            skipped = total - items.len(),
            "gallery records without thumbnail URL skipped"
        );
    }

    Ok(items)
}
