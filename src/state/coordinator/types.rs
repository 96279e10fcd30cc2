use crate::error::CoordinatorError;
use crate::state::SessionId;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// What the coordinator keeps for each registered session: enough to address
/// it in logs and to queue broadcast lines for its connection task.
#[derive(Debug)]
pub struct SessionEntry {
    pub id: SessionId,
    pub identity: String,
    /// Outbound queue drained by the session's own connection task.
    pub sender: mpsc::Sender<Arc<str>>,
}

/// Events that can be sent to the Coordinator.
#[derive(Debug)]
pub enum CoordinatorEvent {
    /// Add a session to the registry.
    Register {
        entry: SessionEntry,
        /// Fired once the entry is visible to subsequent broadcasts.
        reply_tx: oneshot::Sender<()>,
    },
    /// Remove a session from the registry. Absent sessions are ignored.
    Unregister {
        id: SessionId,
        /// Carries whether the session was present.
        reply_tx: oneshot::Sender<bool>,
    },
    /// Fan a line out to every registered session except `exclude`.
    Broadcast {
        message: Arc<str>,
        exclude: Option<SessionId>,
    },
    /// Number of registered sessions.
    LiveCount { reply_tx: oneshot::Sender<usize> },
}

/// Cloneable handle used by connection tasks to reach the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    pub(super) fn new(tx: mpsc::Sender<CoordinatorEvent>) -> Self {
        Self { tx }
    }

    /// A handle whose coordinator has already stopped.
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        let (tx, _) = mpsc::channel(1);
        Self { tx }
    }

    /// Register a session. Returns once the registry contains it.
    pub async fn register(&self, entry: SessionEntry) -> Result<(), CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CoordinatorEvent::Register { entry, reply_tx })
            .await?;
        reply_rx.await?;
        Ok(())
    }

    /// Unregister a session. Returns once no later broadcast can reach it.
    ///
    /// The returned flag is `false` when the session was not registered.
    pub async fn unregister(&self, id: SessionId) -> Result<bool, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CoordinatorEvent::Unregister { id, reply_tx })
            .await?;
        Ok(reply_rx.await?)
    }

    /// Queue a broadcast. Delivery is best-effort and not acknowledged.
    pub async fn broadcast(
        &self,
        message: impl Into<Arc<str>>,
        exclude: Option<SessionId>,
    ) -> Result<(), CoordinatorError> {
        self.tx
            .send(CoordinatorEvent::Broadcast {
                message: message.into(),
                exclude,
            })
            .await?;
        Ok(())
    }

    /// Number of currently registered sessions.
    pub async fn live_count(&self) -> Result<usize, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(CoordinatorEvent::LiveCount { reply_tx }).await?;
        Ok(reply_rx.await?)
    }
}
