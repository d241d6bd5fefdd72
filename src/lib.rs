//! # thumbnail-dl
//!
//! Background thumbnail downloader for scrolling image galleries.
//!
//! Callers record "target T should show the image at URL U" from any thread.
//! A single worker thread fetches and decodes those images one at a time and
//! hands each result back on a delivery context of the caller's choosing,
//! usually the UI thread. Requests are de-duplicated per target (last write
//! wins), can be withdrawn or cancelled wholesale, and stale results are
//! dropped before they ever reach the listener.
//!
//! ## Quick Start
//!
//! ```no_run
//! use thumbnail_dl::{Config, GalleryClient, HttpFetcher, Looper, Thumbnail, ThumbnailEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     // What is there to show?
//!     let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
//!     let items = GalleryClient::new(config.gallery.clone(), fetcher).fetch_items().await?;
//!
//!     // Thumbnails come back on this thread through the looper
//!     let (looper, handle) = Looper::new();
//!     let engine = ThumbnailEngine::new(&config, handle, |row: usize, image: Thumbnail| {
//!         println!("row {row}: {}x{}", image.width(), image.height());
//!     })?;
//!     engine.start()?;
//!
//!     for (row, item) in items.iter().enumerate() {
//!         engine.enqueue(row, Some(&item.url));
//!     }
//!
//!     // Failed fetches never deliver, so drain for a bounded time
//!     let _ = tokio::time::timeout(std::time::Duration::from_secs(10), looper.run()).await;
//!
//!     engine.shutdown()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Image decoding and downscaling
pub mod decode;
/// Background thumbnail engine (decomposed into focused submodules)
pub mod engine;
/// Error types
pub mod error;
/// URL to bytes
pub mod fetcher;
/// Photo listing client
pub mod gallery;

// Re-export commonly used types
pub use config::{Config, EngineConfig, FetchConfig, GalleryConfig};
pub use decode::{Thumbnail, decode_thumbnail};
pub use engine::{
    DeliveryContext, DeliveryTask, EngineState, Looper, LooperHandle, Target, ThumbnailEngine,
    ThumbnailListener,
};
pub use error::{DecodeError, Error, NetworkError, Result};
pub use fetcher::{ByteFetcher, HttpFetcher};
pub use gallery::{GalleryClient, GalleryItem, parse_items};
