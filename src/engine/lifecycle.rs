//! Startup and shutdown coordination.

use super::worker::Worker;
use super::{EngineState, Target, ThumbnailEngine};
use crate::error::{Error, Result};
use std::sync::Arc;

impl<K: Target> ThumbnailEngine<K> {
    /// Bring up the worker thread
    ///
    /// The worker gets its own thread (named from
    /// [`EngineConfig::worker_name`](crate::config::EngineConfig::worker_name))
    /// running a single-threaded tokio runtime, so it never competes with the
    /// caller's executor. Requests enqueued before `start()` are processed
    /// once the worker is up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the engine was already started or
    /// shut down, or an I/O error if the thread or its runtime cannot be
    /// created.
    pub fn start(&self) -> Result<()> {
        let shared = &self.inner.shared;

        // Held until the handle is stored so shutdown() always finds it
        let mut worker_slot = self.inner.worker.lock();

        shared
            .state
            .transition(EngineState::Created, EngineState::Running)
            .map_err(|state| Error::InvalidState {
                operation: "start",
                state,
            })?;

        let Some(signals) = self.inner.signal_rx.lock().take() else {
            shared.state.force(EngineState::Stopped);
            return Err(Error::Other("worker signal queue already taken".to_string()));
        };

        let worker = Worker {
            shared: Arc::clone(shared),
            fetcher: Arc::clone(&self.inner.fetcher),
            signals,
            shutdown: self.inner.shutdown_token.clone(),
            max_dimension: self.inner.config.max_dimension,
        };

        // The worker reports whether its runtime came up before start() returns
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name(self.inner.config.worker_name.clone())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => {
                        let _ = ready_tx.send(Ok(()));
                        runtime
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                runtime.block_on(worker.run());
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                shared.state.force(EngineState::Stopped);
                tracing::error!(error = %e, "failed to spawn thumbnail worker thread");
                return Err(Error::Io(e));
            }
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                shared.state.force(EngineState::Stopped);
                let _ = handle.join();
                tracing::error!(error = %e, "failed to build worker runtime");
                return Err(Error::Io(e));
            }
            Err(_) => {
                shared.state.force(EngineState::Stopped);
                let _ = handle.join();
                return Err(Error::WorkerPanicked);
            }
        }

        *worker_slot = Some(handle);
        tracing::info!(worker = %self.inner.config.worker_name, "thumbnail engine started");
        Ok(())
    }

    /// Stop the engine
    ///
    /// Delivery is suppressed from the moment this is called. Pending
    /// requests are dropped, an in-flight fetch is abandoned, and the call
    /// returns once the worker thread has exited. Calling it again, or on an
    /// engine that was never started, is a no-op.
    ///
    /// Called on the delivery context itself, no listener call follows it.
    /// Called from any other thread, a delivery that has already passed its
    /// staleness check on the delivery context may still complete after this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] if the worker thread panicked.
    pub fn shutdown(&self) -> Result<()> {
        let shared = &self.inner.shared;

        match shared
            .state
            .transition(EngineState::Running, EngineState::ShuttingDown)
        {
            Ok(()) => {
                tracing::info!("thumbnail engine shutting down");
            }
            Err(EngineState::Created) => {
                // Never started: nothing to join
                if shared
                    .state
                    .transition(EngineState::Created, EngineState::Stopped)
                    .is_ok()
                {
                    shared.table.clear();
                    self.inner.shutdown_token.cancel();
                    tracing::info!("thumbnail engine stopped before start");
                    return Ok(());
                }
                // Lost a race with start(); retry against the new state
                return self.shutdown();
            }
            Err(state) => {
                tracing::debug!(state = %state, "shutdown already in progress");
                return Ok(());
            }
        }

        self.inner.shutdown_token.cancel();
        shared.table.clear();

        // Waits for a concurrent start() to store its handle
        let handle = self.inner.worker.lock().take();
        let joined = match handle {
            Some(handle) => handle.join(),
            None => Ok(()),
        };

        shared.state.force(EngineState::Stopped);

        if joined.is_err() {
            tracing::error!("thumbnail worker panicked");
            return Err(Error::WorkerPanicked);
        }

        tracing::info!("thumbnail engine stopped");
        Ok(())
    }
}
