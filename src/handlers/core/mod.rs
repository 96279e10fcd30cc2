//! Core handler infrastructure: the per-line context and the registry.

pub mod context;
pub mod registry;

pub use context::{Context, Flow, Handler, HandlerResult};
pub use registry::Registry;

#[cfg(test)]
pub(crate) mod test_support {
    //! In-process plumbing for handler tests: a session wired to a duplex
    //! transport and a live coordinator.

    use crate::network::{BoxedWriter, LineCodec, LineWriter};
    use crate::state::{Coordinator, CoordinatorHandle, Session, SessionEntry};
    use futures_util::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::DuplexStream;
    use tokio::sync::mpsc;
    use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

    pub struct Harness {
        pub session: Session,
        pub writer: LineWriter,
        pub coordinator: CoordinatorHandle,
        replies: FramedRead<DuplexStream, LinesCodec>,
    }

    impl Harness {
        pub async fn new(identity: &str) -> Self {
            let (client, server) = tokio::io::duplex(16 * 1024);
            let server: BoxedWriter = Box::pin(server);
            let coordinator = Coordinator::spawn(64);
            let session = Session::new(identity);
            Self {
                session,
                writer: FramedWrite::new(server, LineCodec::new(1024)),
                coordinator,
                replies: FramedRead::new(client, LinesCodec::new()),
            }
        }

        pub fn context(&mut self) -> super::Context<'_> {
            super::Context {
                session: &mut self.session,
                writer: &mut self.writer,
                coordinator: &self.coordinator,
            }
        }

        /// Register an extra listener session and return its outbound queue.
        pub async fn peer(&self, identity: &str) -> mpsc::Receiver<Arc<str>> {
            let (sender, rx) = mpsc::channel(16);
            let entry = SessionEntry {
                id: uuid::Uuid::new_v4(),
                identity: identity.to_string(),
                sender,
            };
            self.coordinator.register(entry).await.unwrap();
            rx
        }

        pub async fn reply(&mut self) -> String {
            tokio::time::timeout(Duration::from_secs(1), self.replies.next())
                .await
                .expect("timed out waiting for reply")
                .expect("transport closed")
                .expect("invalid reply line")
        }

        /// Close the client side of the transport and hand back the server side.
        pub fn disconnect(self) -> (Session, LineWriter, CoordinatorHandle) {
            let Self {
                session,
                writer,
                coordinator,
                replies,
            } = self;
            drop(replies);
            (session, writer, coordinator)
        }

        /// Assert nothing is waiting on the reply stream.
        pub async fn assert_silent(&mut self) {
            let next = tokio::time::timeout(Duration::from_millis(50), self.replies.next()).await;
            assert!(next.is_err(), "unexpected reply: {next:?}");
        }
    }
}
