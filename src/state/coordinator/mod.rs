//! Actor owning the live-session registry.
//!
//! The `Coordinator` is the single authority over which sessions exist and the
//! order in which they observe broadcast traffic.
//!
//! # Architecture
//!
//! - **State Ownership**: The coordinator task owns the registry map; nothing
//!   else holds a reference to it.
//! - **Message Passing**: Register, unregister, broadcast and count requests
//!   arrive as [`CoordinatorEvent`]s on one channel and are handled one at a
//!   time, so every operation sees the registry between mutations, never
//!   during one.
//! - **Ordering**: Because there is one queue, all events are totally ordered.
//!   Two sessions racing to broadcast may land in either order, but every
//!   recipient observes the same order.

use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

mod broadcast;
mod types;

pub use types::{CoordinatorEvent, CoordinatorHandle, SessionEntry};

use super::SessionId;

/// The registry actor.
pub struct Coordinator {
    sessions: HashMap<SessionId, SessionEntry>,
}

impl Coordinator {
    /// Create a coordinator, spawn its task, and return the handle used to reach it.
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(capacity: usize) -> CoordinatorHandle {
        let (tx, rx) = mpsc::channel(capacity);
        let actor = Self {
            sessions: HashMap::new(),
        };

        tokio::spawn(async move {
            actor.run(rx).await;
        });

        CoordinatorHandle::new(tx)
    }

    /// The main actor loop.
    async fn run(mut self, mut rx: mpsc::Receiver<CoordinatorEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
        }
        debug!(remaining = self.sessions.len(), "Coordinator stopped");
    }

    fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::Register { entry, reply_tx } => {
                self.handle_register(entry);
                let _ = reply_tx.send(());
            }
            CoordinatorEvent::Unregister { id, reply_tx } => {
                let removed = self.handle_unregister(&id);
                let _ = reply_tx.send(removed);
            }
            CoordinatorEvent::Broadcast { message, exclude } => {
                self.handle_broadcast(message, exclude);
            }
            CoordinatorEvent::LiveCount { reply_tx } => {
                let _ = reply_tx.send(self.sessions.len());
            }
        }
    }

    fn handle_register(&mut self, entry: SessionEntry) {
        info!(session = %entry.id, identity = %entry.identity, "Client connected");
        self.sessions.insert(entry.id, entry);
        crate::metrics::set_connected_sessions(self.sessions.len());
    }

    /// Remove a session. Dropping the entry drops the coordinator's sender, so
    /// the session's outbound queue closes once its own task lets go too.
    fn handle_unregister(&mut self, id: &SessionId) -> bool {
        match self.sessions.remove(id) {
            Some(entry) => {
                info!(session = %entry.id, identity = %entry.identity, "Client disconnected");
                crate::metrics::set_connected_sessions(self.sessions.len());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoordinatorError;
    use std::sync::Arc;
    use uuid::Uuid;

    fn entry(identity: &str, capacity: usize) -> (SessionEntry, mpsc::Receiver<Arc<str>>) {
        let (sender, rx) = mpsc::channel(capacity);
        let entry = SessionEntry {
            id: Uuid::new_v4(),
            identity: identity.to_string(),
            sender,
        };
        (entry, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<Arc<str>>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg.to_string());
        }
        out
    }

    #[tokio::test]
    async fn broadcast_reaches_every_session_but_the_sender() {
        let coordinator = Coordinator::spawn(16);
        let (a, mut a_rx) = entry("a", 8);
        let (b, mut b_rx) = entry("b", 8);
        let (c, mut c_rx) = entry("c", 8);
        let a_id = a.id;
        for e in [a, b, c] {
            coordinator.register(e).await.unwrap();
        }

        coordinator.broadcast("a: hello", Some(a_id)).await.unwrap();
        // A count query is processed after the broadcast, so it acts as a barrier.
        assert_eq!(coordinator.live_count().await.unwrap(), 3);

        assert!(drain(&mut a_rx).is_empty());
        assert_eq!(drain(&mut b_rx), vec!["a: hello"]);
        assert_eq!(drain(&mut c_rx), vec!["a: hello"]);
    }

    #[tokio::test]
    async fn unregistered_sessions_receive_nothing_afterwards() {
        let coordinator = Coordinator::spawn(16);
        let (a, mut a_rx) = entry("a", 8);
        let (b, mut b_rx) = entry("b", 8);
        let b_id = b.id;
        coordinator.register(a).await.unwrap();
        coordinator.register(b).await.unwrap();

        coordinator.broadcast("first", None).await.unwrap();
        assert!(coordinator.unregister(b_id).await.unwrap());
        coordinator.broadcast("second", None).await.unwrap();
        assert_eq!(coordinator.live_count().await.unwrap(), 1);

        assert_eq!(drain(&mut a_rx), vec!["first", "second"]);
        assert_eq!(drain(&mut b_rx), vec!["first"]);
    }

    #[tokio::test]
    async fn late_registration_misses_earlier_broadcasts() {
        let coordinator = Coordinator::spawn(16);
        let (a, mut a_rx) = entry("a", 8);
        coordinator.register(a).await.unwrap();
        coordinator.broadcast("before", None).await.unwrap();

        let (b, mut b_rx) = entry("b", 8);
        coordinator.register(b).await.unwrap();
        coordinator.broadcast("after", None).await.unwrap();
        coordinator.live_count().await.unwrap();

        assert_eq!(drain(&mut a_rx), vec!["before", "after"]);
        assert_eq!(drain(&mut b_rx), vec!["after"]);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let coordinator = Coordinator::spawn(16);
        let (a, _a_rx) = entry("a", 8);
        let id = a.id;
        coordinator.register(a).await.unwrap();

        assert!(coordinator.unregister(id).await.unwrap());
        assert!(!coordinator.unregister(id).await.unwrap());
        assert!(!coordinator.unregister(Uuid::new_v4()).await.unwrap());
        assert_eq!(coordinator.live_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn full_queue_does_not_block_other_recipients() {
        let coordinator = Coordinator::spawn(16);
        let (slow, mut slow_rx) = entry("slow", 1);
        let (fast, mut fast_rx) = entry("fast", 8);
        coordinator.register(slow).await.unwrap();
        coordinator.register(fast).await.unwrap();

        for line in ["one", "two", "three"] {
            coordinator.broadcast(line, None).await.unwrap();
        }
        coordinator.live_count().await.unwrap();

        assert_eq!(drain(&mut slow_rx), vec!["one"]);
        assert_eq!(drain(&mut fast_rx), vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn closed_queue_is_skipped() {
        let coordinator = Coordinator::spawn(16);
        let (gone, gone_rx) = entry("gone", 8);
        let (live, mut live_rx) = entry("live", 8);
        coordinator.register(gone).await.unwrap();
        coordinator.register(live).await.unwrap();
        drop(gone_rx);

        coordinator.broadcast("still here", None).await.unwrap();
        coordinator.live_count().await.unwrap();
        assert_eq!(drain(&mut live_rx), vec!["still here"]);
    }

    #[tokio::test]
    async fn concurrent_broadcasts_arrive_in_one_order_for_everyone() {
        let coordinator = Coordinator::spawn(256);
        let mut receivers = Vec::new();
        for name in ["r1", "r2", "r3"] {
            let (e, rx) = entry(name, 256);
            coordinator.register(e).await.unwrap();
            receivers.push(rx);
        }

        let mut tasks = Vec::new();
        for sender in 0..4 {
            let handle = coordinator.clone();
            tasks.push(tokio::spawn(async move {
                for n in 0..25 {
                    handle
                        .broadcast(format!("s{sender}-{n}"), None)
                        .await
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        coordinator.live_count().await.unwrap();

        let seen: Vec<Vec<String>> = receivers.iter_mut().map(drain).collect();
        assert_eq!(seen[0].len(), 100);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[1], seen[2]);
    }

    #[tokio::test]
    async fn handle_reports_closed_after_actor_stops() {
        let handle = CoordinatorHandle::closed();
        assert_eq!(handle.live_count().await, Err(CoordinatorError::Closed));
    }
}
