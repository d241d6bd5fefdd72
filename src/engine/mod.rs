//! Background thumbnail engine split into focused submodules.
//!
//! The `ThumbnailEngine` struct and its methods are organized by concern:
//! - [`table`] - Request table (target → desired URL) and cancel generations
//! - [`state`] - Atomic lifecycle state machine
//! - [`lifecycle`] - Worker startup and shutdown coordination
//! - [`control`] - `enqueue` / `cancel_all`
//! - [`worker`] - The single fetch/decode loop and the staleness check
//! - [`delivery`] - Delivery contexts and the `Looper` callers drain
//!
//! A result is only handed to the listener if, at delivery time, the engine
//! is still running and the table still wants exactly the URL that was
//! fetched. Superseded and cancelled fetches run to completion and are
//! dropped there instead of being aborted mid-flight.

mod control;
pub mod delivery;
mod lifecycle;
mod state;
mod table;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use delivery::{DeliveryContext, DeliveryTask, Looper, LooperHandle};
pub use state::EngineState;

use crate::config::{Config, EngineConfig};
use crate::decode::Thumbnail;
use crate::error::Result;
use crate::fetcher::{ByteFetcher, HttpFetcher};
use parking_lot::Mutex;
use state::LifecycleState;
use std::hash::Hash;
use std::sync::Arc;
use table::RequestTable;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Key identifying the visual slot a thumbnail is destined for
///
/// Blanket-implemented for every hashable, cloneable, thread-safe type. The
/// engine never inspects a target beyond equality and hashing.
pub trait Target: Eq + Hash + Clone + Send + Sync + 'static {}

impl<T> Target for T where T: Eq + Hash + Clone + Send + Sync + 'static {}

/// Receiver of delivered thumbnails
///
/// Called on the engine's delivery context, never on the worker thread.
/// The target may refer to a slot that has since been recycled by the
/// presentation layer; implementations should re-check relevance.
pub trait ThumbnailListener<K>: Send + Sync + 'static {
    /// A fresh thumbnail for `target` is ready
    fn on_thumbnail_ready(&self, target: K, image: Thumbnail);
}

impl<K, F> ThumbnailListener<K> for F
where
    F: Fn(K, Thumbnail) + Send + Sync + 'static,
{
    fn on_thumbnail_ready(&self, target: K, image: Thumbnail) {
        self(target, image)
    }
}

/// Wake-up hint for the worker: "look at this target"
///
/// `generation` is the table generation observed when the request was
/// recorded; signals from before the last `cancel_all` are ignored.
#[derive(Debug)]
pub(crate) struct Signal<K> {
    pub(crate) target: K,
    pub(crate) generation: u64,
}

/// State read by the worker thread and the delivery context
pub(crate) struct Shared<K: Target> {
    pub(crate) table: RequestTable<K>,
    pub(crate) state: LifecycleState,
    pub(crate) listener: Box<dyn ThumbnailListener<K>>,
    pub(crate) delivery: Box<dyn DeliveryContext>,
}

/// Caller-side ownership of the engine; dropped with the last handle
struct EngineInner<K: Target> {
    shared: Arc<Shared<K>>,
    config: EngineConfig,
    fetcher: Arc<dyn ByteFetcher>,
    /// Posting end of the pending-work signal
    signal_tx: mpsc::UnboundedSender<Signal<K>>,
    /// Receiving end, handed to the worker by `start()`
    signal_rx: Mutex<Option<mpsc::UnboundedReceiver<Signal<K>>>>,
    shutdown_token: CancellationToken,
    worker: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl<K: Target> Drop for EngineInner<K> {
    fn drop(&mut self) {
        // Dropped without shutdown(): suppress delivery and let the worker wind down
        if self.shared.state.get() == EngineState::Running {
            self.shared.state.force(EngineState::ShuttingDown);
        }
        self.shutdown_token.cancel();
    }
}

/// Background thumbnail downloader (cloneable - all state is Arc-wrapped)
///
/// # Example
///
/// ```no_run
/// use thumbnail_dl::{Config, Looper, Thumbnail, ThumbnailEngine};
///
/// # async fn example() -> thumbnail_dl::Result<()> {
/// let (mut looper, handle) = Looper::new();
/// let engine = ThumbnailEngine::new(&Config::default(), handle, |row: usize, image: Thumbnail| {
///     println!("row {row}: {}x{}", image.width(), image.height());
/// })?;
///
/// engine.start()?;
/// engine.enqueue(0, Some("https://example.com/a.jpg"));
///
/// // On the UI side, drain deliveries
/// looper.dispatch_next().await;
///
/// engine.cancel_all();
/// engine.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct ThumbnailEngine<K: Target> {
    inner: Arc<EngineInner<K>>,
}

impl<K: Target> Clone for ThumbnailEngine<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Target> ThumbnailEngine<K> {
    /// Create an engine that fetches over HTTP
    ///
    /// `delivery` is the context the listener runs on; `listener` receives
    /// every thumbnail that survives the staleness check. The worker is not
    /// started until [`start`](Self::start).
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be created
    pub fn new<D, L>(config: &Config, delivery: D, listener: L) -> Result<Self>
    where
        D: DeliveryContext,
        L: ThumbnailListener<K>,
    {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Self::with_fetcher(
            config.engine.clone(),
            Arc::new(fetcher),
            delivery,
            listener,
        )
    }

    /// Create an engine with a custom byte source
    ///
    /// # Errors
    /// Returns [`Error::Config`](crate::Error::Config) if the engine settings
    /// are invalid
    pub fn with_fetcher<D, L>(
        config: EngineConfig,
        fetcher: Arc<dyn ByteFetcher>,
        delivery: D,
        listener: L,
    ) -> Result<Self>
    where
        D: DeliveryContext,
        L: ThumbnailListener<K>,
    {
        config.validate()?;

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            table: RequestTable::new(),
            state: LifecycleState::new(),
            listener: Box::new(listener),
            delivery: Box::new(delivery),
        });

        Ok(Self {
            inner: Arc::new(EngineInner {
                shared,
                config,
                fetcher,
                signal_tx,
                signal_rx: Mutex::new(Some(signal_rx)),
                shutdown_token: CancellationToken::new(),
                worker: Mutex::new(None),
            }),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.inner.shared.state.get()
    }

    /// Number of targets that currently want a thumbnail
    pub fn pending_requests(&self) -> usize {
        self.inner.shared.table.len()
    }
}
