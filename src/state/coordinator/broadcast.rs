//! Fan-out of broadcast lines to registered sessions.

use super::Coordinator;
use crate::state::SessionId;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

impl Coordinator {
    /// Deliver `message` to every registered session except `exclude`.
    ///
    /// Uses `try_send` so a slow or departed session never stalls the
    /// coordinator; such deliveries are dropped and counted. Returns the number
    /// of sessions the message was queued for.
    pub(super) fn handle_broadcast(
        &mut self,
        message: Arc<str>,
        exclude: Option<SessionId>,
    ) -> usize {
        let mut delivered = 0;

        for (id, entry) in &self.sessions {
            if exclude.as_ref() == Some(id) {
                continue;
            }
            match entry.sender.try_send(Arc::clone(&message)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(identity = %entry.identity, "Outbound queue full - broadcast dropped");
                    crate::metrics::record_dropped_delivery();
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(identity = %entry.identity, "Outbound queue closed - broadcast dropped");
                    crate::metrics::record_dropped_delivery();
                }
            }
        }

        crate::metrics::record_fanout(delivered);
        delivered
    }
}
