//! Cancellable per-frame scheduling
//!
//! The host owns the display-refresh callback and calls
//! [`RenderLoop::tick`] once per refresh. The loop decides whether that tick
//! does anything: only a started, not yet cancelled loop runs its frame
//! closure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Scheduler state. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Cancelled,
}

/// Render loop errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopError {
    #[error("render loop already started")]
    AlreadyStarted,
    #[error("render loop was cancelled")]
    Cancelled,
}

/// Observer token for a running loop.
///
/// Clones share the same flag, so the host can check it from its refresh
/// callback (for instance to decide whether to request another repaint).
#[derive(Debug, Clone)]
pub struct RenderLoopHandle {
    active: Arc<AtomicBool>,
}

impl RenderLoopHandle {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stops the loop; the owning [`RenderLoop`] runs no tick after this.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Single-use frame scheduler.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    active: Arc<AtomicBool>,
    ticks: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            active: Arc::new(AtomicBool::new(false)),
            ticks: 0,
        }
    }

    /// Moves `Idle -> Running` and hands out the loop's token.
    pub fn start(&mut self) -> Result<RenderLoopHandle, LoopError> {
        match self.state {
            LoopState::Idle => {
                self.state = LoopState::Running;
                self.active.store(true, Ordering::Release);
                tracing::debug!("Render loop started");
                Ok(RenderLoopHandle {
                    active: Arc::clone(&self.active),
                })
            }
            LoopState::Running => Err(LoopError::AlreadyStarted),
            LoopState::Cancelled => Err(LoopError::Cancelled),
        }
    }

    /// Moves to `Cancelled`. Returns true if the loop was running.
    ///
    /// No tick runs after this returns, including ticks the host had
    /// already queued.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.state == LoopState::Running;
        self.active.store(false, Ordering::Release);
        if self.state != LoopState::Cancelled {
            self.state = LoopState::Cancelled;
            tracing::debug!("Render loop cancelled after {} ticks", self.ticks);
        }
        was_running
    }

    /// Runs `frame` if the loop is running. Returns true if it ran.
    pub fn tick<F: FnOnce(u64)>(&mut self, frame: F) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        if !self.active.load(Ordering::Acquire) {
            // Cancelled through a handle
            self.state = LoopState::Cancelled;
            return false;
        }
        frame(self.ticks);
        self.ticks += 1;
        true
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running && self.active.load(Ordering::Acquire)
    }

    /// Number of ticks that ran.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
