//! Engine lifecycle state machine.
//!
//! `Created → Running → ShuttingDown → Stopped`, plus `Created → Stopped`
//! for an engine shut down before it was ever started. The state lives in a
//! single atomic so the worker loop, the delivery path and callers all
//! observe the same transition.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a [`ThumbnailEngine`](super::ThumbnailEngine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EngineState {
    /// Constructed, worker not yet started
    Created = 0,
    /// Worker running, requests accepted and delivered
    Running = 1,
    /// Shutdown requested; deliveries suppressed, worker exiting
    ShuttingDown = 2,
    /// Worker has exited
    Stopped = 3,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => EngineState::Created,
            1 => EngineState::Running,
            2 => EngineState::ShuttingDown,
            _ => EngineState::Stopped,
        }
    }

    /// Whether `enqueue` still records requests in this state
    pub fn accepts_requests(self) -> bool {
        matches!(self, EngineState::Created | EngineState::Running)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Created => "created",
            EngineState::Running => "running",
            EngineState::ShuttingDown => "shutting down",
            EngineState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Atomic holder for [`EngineState`]
#[derive(Debug)]
pub(crate) struct LifecycleState(AtomicU8);

impl LifecycleState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(EngineState::Created as u8))
    }

    pub(crate) fn get(&self) -> EngineState {
        EngineState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Move `from → to` if the current state is `from`
    ///
    /// On failure returns the state that was actually observed.
    pub(crate) fn transition(
        &self,
        from: EngineState,
        to: EngineState,
    ) -> std::result::Result<(), EngineState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(EngineState::from_u8)
    }

    pub(crate) fn force(&self, to: EngineState) {
        self.0.store(to as u8, Ordering::SeqCst);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.get() == EngineState::Running
    }
}
