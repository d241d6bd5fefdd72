//! Gallery example
//!
//! Fetches the recent-photos listing, then simulates a scrolling list view:
//! - The first screen of rows asks for thumbnails
//! - The user flings past them (cancel_all) and a second screen asks instead
//! - Deliveries are drained once per "frame" on the main thread
//!
//! ```bash
//! FLICKR_API_KEY=... RUST_LOG=thumbnail_dl=debug cargo run --example gallery [config.json]
//! ```

use std::time::{Duration, Instant};
use thumbnail_dl::{Config, GalleryClient, HttpFetcher, Looper, Thumbnail, ThumbnailEngine};
use tracing_subscriber::EnvFilter;

const SCREEN_ROWS: usize = 6;
const FRAME: Duration = Duration::from_millis(16);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Ok(api_key) = std::env::var("FLICKR_API_KEY") {
        config.gallery.api_key = Some(api_key);
    }
    config.validate()?;

    let fetcher = std::sync::Arc::new(HttpFetcher::new(&config.fetch)?);
    let items = GalleryClient::new(config.gallery.clone(), fetcher)
        .fetch_items()
        .await?;
    println!("Listing returned {} photos with thumbnails", items.len());
    if items.is_empty() {
        return Ok(());
    }

    let (mut looper, handle) = Looper::new();
    let engine = ThumbnailEngine::new(&config, handle, |row: usize, image: Thumbnail| {
        println!("  row {row:>3}: {}x{}", image.width(), image.height());
    })?;
    engine.start()?;

    // First screen
    for (row, item) in items.iter().enumerate().take(SCREEN_ROWS) {
        engine.enqueue(row, Some(&item.url));
    }
    run_frames(&mut looper, Duration::from_millis(300)).await;

    // Fling: whatever the first screen still wanted is no longer visible
    println!("Scrolling to the next screen");
    engine.cancel_all();
    for (row, item) in items
        .iter()
        .enumerate()
        .skip(SCREEN_ROWS)
        .take(SCREEN_ROWS)
    {
        engine.enqueue(row, Some(&item.url));
    }
    run_frames(&mut looper, Duration::from_secs(5)).await;

    println!("{} requests still outstanding", engine.pending_requests());
    engine.shutdown()?;
    println!("Engine {}", engine.state());
    Ok(())
}

/// Frame loop: drain deliveries, then "render"
async fn run_frames(looper: &mut Looper, duration: Duration) {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        looper.run_pending();
        tokio::time::sleep(FRAME).await;
    }
}
