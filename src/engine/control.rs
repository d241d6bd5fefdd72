//! Request control: enqueue and cancel.

use super::{Signal, Target, ThumbnailEngine};

impl<K: Target> ThumbnailEngine<K> {
    /// Ask for a thumbnail of `url` to be delivered for `target`
    ///
    /// A later call for the same target replaces the earlier URL; a fetch
    /// already running for the old URL still completes but its result is
    /// discarded. Passing `None` (or an empty URL) withdraws the target's
    /// request.
    ///
    /// Never blocks and never fails. After [`shutdown`](Self::shutdown) it
    /// has no effect.
    pub fn enqueue(&self, target: K, url: Option<&str>) {
        let shared = &self.inner.shared;

        let state = shared.state.get();
        if !state.accepts_requests() {
            tracing::debug!(state = %state, "engine stopped, ignoring thumbnail request");
            return;
        }

        match url.filter(|url| !url.is_empty()) {
            None => {
                shared.table.remove(&target);
                tracing::trace!("thumbnail request withdrawn");
            }
            Some(url) => {
                let generation = shared.table.insert(target.clone(), url.to_string());

                // shutdown() may have cleared the table between the state check and the insert
                if !shared.state.get().accepts_requests() {
                    shared.table.remove(&target);
                    tracing::debug!(url = %url, "engine stopped, thumbnail request dropped");
                    return;
                }

                if self
                    .inner
                    .signal_tx
                    .send(Signal { target, generation })
                    .is_err()
                {
                    tracing::debug!(url = %url, "worker gone, thumbnail request dropped");
                } else {
                    tracing::trace!(url = %url, generation, "thumbnail queued");
                }
            }
        }
    }

    /// Drop every pending request
    ///
    /// Pending signals are invalidated and the request table emptied. A fetch
    /// that is already running is not interrupted; its result fails the
    /// staleness check. Before [`start`](Self::start) it drops the requests
    /// recorded so far; after [`shutdown`](Self::shutdown) it is a no-op.
    pub fn cancel_all(&self) {
        let shared = &self.inner.shared;

        let state = shared.state.get();
        if !state.accepts_requests() {
            tracing::debug!(state = %state, "cancel_all ignored, engine stopped");
            return;
        }

        let generation = shared.table.clear();
        tracing::debug!(generation, "cleared all pending thumbnail requests");
    }
}
