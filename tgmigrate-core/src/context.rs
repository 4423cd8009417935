//! Cancellation and deadline signal for a migration run
//!
//! A `RunContext` is handed to every gateway and executor call. Adapters
//! check it before each network round-trip and clip their request timeout
//! to the remaining deadline. A cancelled or expired run fails with a
//! transport error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::result::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct RunContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

/// Handle used from another thread (e.g. a signal handler) to cancel a run
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl RunContext {
    /// A context that never expires
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancelled: Arc::default(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before the deadline, `None` if there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the run was cancelled or its deadline has passed
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::transport("run cancelled"));
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(Error::transport("deadline exceeded"));
        }
        Ok(())
    }

    /// Request timeout for the next call: the default, clipped to the deadline
    pub fn request_timeout(&self, default: Duration) -> Duration {
        match self.remaining() {
            Some(remaining) => remaining.min(default),
            None => default,
        }
    }
}
