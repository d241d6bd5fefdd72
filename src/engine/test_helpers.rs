//! Shared test helpers: a scripted byte fetcher and an engine harness.

use crate::config::EngineConfig;
use crate::decode::{Thumbnail, png_bytes};
use crate::engine::{Looper, ThumbnailEngine};
use crate::error::{NetworkError, Result};
use crate::fetcher::ByteFetcher;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::ThreadId;
use std::time::Duration;
use tokio::sync::Notify;

/// How the scripted fetcher answers one URL
#[derive(Clone)]
pub(crate) enum Route {
    /// PNG of the given size, after an optional delay
    Image {
        width: u32,
        height: u32,
        delay: Duration,
    },
    /// PNG of the given size, held until the gate is notified
    Gated {
        width: u32,
        height: u32,
        gate: Arc<Notify>,
    },
    /// Bytes that are not an image
    Garbage,
}

/// In-memory [`ByteFetcher`] with instrumentation
///
/// Unknown URLs answer `404 Not Found`.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Route>>,
    started: Mutex<Vec<String>>,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    threads: Mutex<Vec<(ThreadId, Option<String>)>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn image(&self, url: &str, width: u32, height: u32) {
        self.route(
            url,
            Route::Image {
                width,
                height,
                delay: Duration::ZERO,
            },
        );
    }

    pub(crate) fn slow_image(&self, url: &str, width: u32, height: u32, delay: Duration) {
        self.route(
            url,
            Route::Image {
                width,
                height,
                delay,
            },
        );
    }

    /// Register a URL whose fetch blocks until the returned gate is notified
    pub(crate) fn gated_image(&self, url: &str, width: u32, height: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.route(
            url,
            Route::Gated {
                width,
                height,
                gate: Arc::clone(&gate),
            },
        );
        gate
    }

    pub(crate) fn route(&self, url: &str, route: Route) {
        self.routes.lock().insert(url.to_string(), route);
    }

    /// URLs in the order their fetch started
    pub(crate) fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    pub(crate) fn started_count(&self) -> usize {
        self.started.lock().len()
    }

    /// Number of fetches that returned (successfully or not)
    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Thread id and name of every fetch call
    pub(crate) fn fetch_threads(&self) -> Vec<(ThreadId, Option<String>)> {
        self.threads.lock().clone()
    }

    async fn respond(&self, url: &str) -> Result<Vec<u8>> {
        let route = self.routes.lock().get(url).cloned();
        match route {
            Some(Route::Image {
                width,
                height,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(png_bytes(width, height))
            }
            Some(Route::Gated {
                width,
                height,
                gate,
            }) => {
                gate.notified().await;
                Ok(png_bytes(width, height))
            }
            Some(Route::Garbage) => Ok(b"definitely not an image".to_vec()),
            None => Err(NetworkError::Status {
                status: "404 Not Found".to_string(),
                url: url.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl ByteFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let current = std::thread::current();
        self.threads
            .lock()
            .push((current.id(), current.name().map(str::to_string)));
        self.started.lock().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.respond(url).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// One delivered thumbnail, as seen by the listener
#[derive(Debug, Clone)]
pub(crate) struct Delivered {
    pub(crate) target: u32,
    pub(crate) image: Thumbnail,
    pub(crate) thread: ThreadId,
}

/// Engine keyed by `u32`, wired to a looper and a recording listener
pub(crate) struct Harness {
    pub(crate) engine: ThumbnailEngine<u32>,
    pub(crate) looper: Looper,
    pub(crate) fetcher: Arc<ScriptedFetcher>,
    pub(crate) delivered: Arc<Mutex<Vec<Delivered>>>,
}

pub(crate) fn harness(fetcher: Arc<ScriptedFetcher>) -> Harness {
    harness_with_config(fetcher, EngineConfig::default())
}

pub(crate) fn harness_with_config(fetcher: Arc<ScriptedFetcher>, config: EngineConfig) -> Harness {
    let (looper, handle) = Looper::new();
    let delivered = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&delivered);
    let engine = ThumbnailEngine::with_fetcher(
        config,
        Arc::clone(&fetcher) as Arc<dyn ByteFetcher>,
        handle,
        move |target: u32, image: Thumbnail| {
            sink.lock().push(Delivered {
                target,
                image,
                thread: std::thread::current().id(),
            });
        },
    )
    .expect("default engine config is valid");

    Harness {
        engine,
        looper,
        fetcher,
        delivered,
    }
}

impl Harness {
    pub(crate) fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().clone()
    }

    /// Drain the looper for `window`, running every delivery that arrives
    pub(crate) async fn pump_for(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.looper.dispatch_next()).await {
                Ok(true) => continue,
                Ok(false) | Err(_) => return,
            }
        }
    }

    /// Drain the looper until `count` thumbnails were delivered or `timeout` elapses
    pub(crate) async fn pump_until_delivered(&mut self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.delivered.lock().len() < count {
            match tokio::time::timeout_at(deadline, self.looper.dispatch_next()).await {
                Ok(true) => continue,
                Ok(false) | Err(_) => return false,
            }
        }
        true
    }
}

/// Poll `condition` until it holds or `timeout` elapses
pub(crate) async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    true
}

/// Generous upper bound for anything the worker should finish quickly
pub(crate) const SETTLE: Duration = Duration::from_secs(5);

/// Quiet period used to assert that nothing (more) gets delivered
pub(crate) const QUIET: Duration = Duration::from_millis(150);
