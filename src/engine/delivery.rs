//! Delivery contexts: where the thumbnail listener actually runs.
//!
//! The worker never calls the listener itself. It posts a [`DeliveryTask`]
//! to the engine's [`DeliveryContext`], and whoever owns that context runs
//! the task on its own thread, typically the same thread that issues
//! `enqueue` calls.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// A unit of work posted from the worker to the delivery context
pub type DeliveryTask = Box<dyn FnOnce() + Send + 'static>;

/// Execution context that runs posted delivery tasks
///
/// Implemented by [`LooperHandle`] and by any `Fn(DeliveryTask) -> bool`
/// closure, so a UI toolkit's own "run on main thread" hook can be plugged
/// in directly.
pub trait DeliveryContext: Send + Sync + 'static {
    /// Queue `task` to run on this context
    ///
    /// Returns `false` if the context is gone and the task was dropped.
    fn post(&self, task: DeliveryTask) -> bool;
}

impl<F> DeliveryContext for F
where
    F: Fn(DeliveryTask) -> bool + Send + Sync + 'static,
{
    fn post(&self, task: DeliveryTask) -> bool {
        self(task)
    }
}

/// Posting side of a [`Looper`]
#[derive(Clone, Debug)]
pub struct LooperHandle {
    tx: mpsc::UnboundedSender<DeliveryTask>,
}

impl DeliveryContext for LooperHandle {
    fn post(&self, task: DeliveryTask) -> bool {
        self.tx.send(task).is_ok()
    }
}

/// Task queue drained by the thread that owns it
///
/// Create one on the interactive thread, give the [`LooperHandle`] to the
/// engine, and drain the looper from that same thread: `run_pending()` once
/// per frame, or `run()` / `dispatch_next()` from an async event loop.
#[derive(Debug)]
pub struct Looper {
    rx: mpsc::UnboundedReceiver<DeliveryTask>,
}

impl Looper {
    /// Create a looper and its posting handle
    pub fn new() -> (Self, LooperHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, LooperHandle { tx })
    }

    /// Run every task already queued, without waiting
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        loop {
            match self.rx.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return ran,
            }
        }
    }

    /// Wait for the next task and run it
    ///
    /// Returns `false` once every handle is dropped and the queue is empty.
    pub async fn dispatch_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks until every handle is dropped
    pub async fn run(mut self) {
        while self.dispatch_next().await {}
    }

    /// Blocking variant of [`run`](Self::run) for a dedicated non-async thread
    ///
    /// # Panics
    /// Panics if called from within an asynchronous execution context.
    pub fn run_blocking(mut self) {
        while let Some(task) = self.rx.blocking_recv() {
            task();
        }
    }
}
