//! Per-session inactivity deadline.

use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep, sleep};

/// Countdown armed at `window` from the last observed activity.
///
/// It does not run on its own: the session loop polls [`expired`](Self::expired)
/// in the same `select!` as the transport read, so a read and a timeout can
/// never both be acted on.
#[derive(Debug)]
pub struct InactivityMonitor {
    window: Duration,
    deadline: Pin<Box<Sleep>>,
}

impl InactivityMonitor {
    pub fn arm(window: Duration) -> Self {
        Self {
            window,
            deadline: Box::pin(sleep(window)),
        }
    }

    /// Push the deadline to `window` from now.
    ///
    /// A window too large to add to the clock leaves the current deadline in
    /// place, which `sleep` has already parked in the far future.
    pub fn reset(&mut self) {
        if let Some(deadline) = Instant::now().checked_add(self.window) {
            self.deadline.as_mut().reset(deadline);
        }
    }

    /// Completes once the window has elapsed without a reset.
    pub async fn expired(&mut self) {
        self.deadline.as_mut().await;
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
