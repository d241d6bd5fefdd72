//! The single worker loop and the delivery-side staleness check.

use super::{Shared, Signal, Target};
use crate::decode::{Thumbnail, decode_thumbnail};
use crate::error::Result;
use crate::fetcher::ByteFetcher;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Everything the worker thread owns for its lifetime
pub(crate) struct Worker<K: Target> {
    pub(crate) shared: Arc<Shared<K>>,
    pub(crate) fetcher: Arc<dyn ByteFetcher>,
    pub(crate) signals: mpsc::UnboundedReceiver<Signal<K>>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) max_dimension: Option<u32>,
}

impl<K: Target> Worker<K> {
    /// Process signals one at a time until shutdown or until every sender is gone
    ///
    /// At most one fetch is in flight at any moment. An in-flight fetch is
    /// abandoned, not awaited, when shutdown is signalled.
    pub(crate) async fn run(mut self) {
        info!("thumbnail worker started");

        loop {
            let signal = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                signal = self.signals.recv() => match signal {
                    Some(signal) => signal,
                    None => break,
                },
            };

            let Some(url) = self
                .shared
                .table
                .desired_url(&signal.target, signal.generation)
            else {
                trace!(
                    generation = signal.generation,
                    "request withdrawn before fetch, skipping"
                );
                continue;
            };

            let acquired = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(url = %url, "abandoning in-flight fetch for shutdown");
                    break;
                }
                result = self.acquire(&url) => result,
            };

            match acquired {
                Ok(image) => self.hand_off(signal.target, url, image),
                Err(e) => {
                    warn!(url = %url, code = e.error_code(), error = %e, "thumbnail download failed");
                }
            }
        }

        info!("thumbnail worker stopped");
    }

    async fn acquire(&self, url: &str) -> Result<Thumbnail> {
        let bytes = self.fetcher.fetch(url).await?;
        let image = decode_thumbnail(&bytes, self.max_dimension)?;
        debug!(
            url = %url,
            width = image.width(),
            height = image.height(),
            "thumbnail decoded"
        );
        Ok(image)
    }

    /// Post the result to the delivery context; the listener never runs here
    fn hand_off(&self, target: K, url: String, image: Thumbnail) {
        let shared = Arc::clone(&self.shared);
        let posted = self.shared.delivery.post(Box::new(move || {
            shared.deliver(target, &url, image);
        }));

        if !posted {
            debug!("delivery context closed, dropping thumbnail");
        }
    }
}

impl<K: Target> Shared<K> {
    /// Staleness check plus listener call, run on the delivery context
    ///
    /// The image is handed over only if the engine is still running and the
    /// table still wants exactly `url` for `target`; the matching entry is
    /// consumed in the same step. The running check is not held across the
    /// listener call; see [`ThumbnailEngine::shutdown`](super::ThumbnailEngine::shutdown).
    pub(crate) fn deliver(&self, target: K, url: &str, image: Thumbnail) {
        if !self.state.is_running() {
            trace!(url = %url, state = %self.state.get(), "engine not running, discarding thumbnail");
            return;
        }

        if !self.table.take_if_current(&target, url) {
            trace!(url = %url, "stale thumbnail discarded");
            return;
        }

        self.listener.on_thumbnail_ready(target, image);
    }
}
