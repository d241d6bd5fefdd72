//! Common test utilities for thumbnail-dl integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thumbnail_dl::{Config, Looper, Thumbnail, ThumbnailEngine};

/// Thumbnails seen by the listener, in delivery order
pub type Deliveries = Arc<Mutex<Vec<(usize, u32, u32)>>>;

/// HTTP-backed engine keyed by row index, with a recording listener
pub fn http_engine(config: &Config) -> (ThumbnailEngine<usize>, Looper, Deliveries) {
    let (looper, handle) = Looper::new();
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&deliveries);
    let engine = ThumbnailEngine::new(config, handle, move |row: usize, image: Thumbnail| {
        sink.lock().push((row, image.width(), image.height()));
    })
    .expect("engine config should be valid");

    (engine, looper, deliveries)
}

/// Drain the looper until `count` deliveries arrived or `timeout` elapsed
pub async fn pump_until(
    looper: &mut Looper,
    deliveries: &Deliveries,
    count: usize,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while deliveries.lock().len() < count {
        match tokio::time::timeout_at(deadline, looper.dispatch_next()).await {
            Ok(true) => continue,
            Ok(false) | Err(_) => return false,
        }
    }
    true
}

/// Drain the looper for a fixed window
pub async fn pump_for(looper: &mut Looper, window: Duration) {
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(true) = tokio::time::timeout_at(deadline, looper.dispatch_next()).await {}
}
