//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!   open session log → register with coordinator
//!        ↓
//!   tokio::select! over
//!     ├─ transport read   → Registry::dispatch (reply / broadcast / quit)
//!     ├─ outbound queue   → write broadcast line
//!     └─ idle deadline    → notice, exit
//!        ↓
//!   unregister → append session metrics → close log
//! ```
//!
//! The task owns both transport halves, so replies and broadcast traffic
//! share a single writer.

mod codec;
mod context;
mod event_loop;
mod idle;

pub use codec::{BoxedReader, BoxedWriter, Line, LineCodec, LineReader, LineWriter};
pub use context::{ServerContext, SessionSettings};

use crate::error::SessionError;
use crate::state::{Session, SessionEntry};
use crate::storage::{MetricsStore, SessionLog};
use futures_util::SinkExt;
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, info, warn};

pub const LOG_OPEN_FAILED: &str = "Server error: unable to open log file";
pub const LOG_WRITE_FAILED: &str = "Server error: unable to write log";
pub const MESSAGE_TOO_LONG: &str = "Message too long.";
pub const IDLE_NOTICE: &str = "Disconnected due to inactivity";

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `bye` or `/quit`.
    Quit,
    /// The client closed the connection.
    Closed,
    ReadError,
    WriteError,
    /// The inactivity monitor fired.
    Idle,
    /// The coordinator stopped; only happens during shutdown.
    Shutdown,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Closed => "closed",
            Self::ReadError => "read_error",
            Self::WriteError => "write_error",
            Self::Idle => "idle",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client connection handler.
pub struct Connection {
    identity: String,
    reader: LineReader,
    writer: LineWriter,
    ctx: ServerContext,
}

impl Connection {
    /// Create a connection over arbitrary read and write halves.
    pub fn new<R, W>(identity: impl Into<String>, reader: R, writer: W, ctx: ServerContext) -> Self
    where
        R: AsyncRead + Send + 'static,
        W: AsyncWrite + Send + 'static,
    {
        let max_len = ctx.settings.max_message_len;
        let reader: BoxedReader = Box::pin(reader);
        let writer: BoxedWriter = Box::pin(writer);
        Self {
            identity: identity.into(),
            reader: FramedRead::new(reader, LineCodec::new(max_len)),
            writer: FramedWrite::new(writer, LineCodec::new(max_len)),
            ctx,
        }
    }

    /// Create a plaintext TCP connection handler.
    pub fn new_tcp(stream: TcpStream, addr: SocketAddr, ctx: ServerContext) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
        }
        let (reader, writer) = stream.into_split();
        Self::new(addr.to_string(), reader, writer, ctx)
    }

    /// Run the session to completion.
    ///
    /// Errors are only returned for failures before the session was
    /// registered; once registered, every exit path unregisters and records
    /// metrics before returning the [`ExitReason`].
    pub async fn run(self) -> Result<ExitReason, SessionError> {
        let session = Session::new(self.identity.clone());
        let span = crate::telemetry::spans::connection(&session.id, &session.identity);
        self.run_session(session).instrument(span).await
    }

    async fn run_session(mut self, mut session: Session) -> Result<ExitReason, SessionError> {
        crate::metrics::session_opened();

        let mut log = match SessionLog::open(&self.ctx.settings.log_dir, &session.identity).await {
            Ok(log) => {
                debug!(path = %log.path().display(), "Session log opened");
                Some(log)
            }
            Err(e) => {
                warn!(error = %e, "Failed to open session log");
                self.writer.send(LOG_OPEN_FAILED).await?;
                None
            }
        };

        let (sender, mut outbound) = mpsc::channel(self.ctx.settings.outbound_queue);
        self.ctx
            .coordinator
            .register(SessionEntry {
                id: session.id,
                identity: session.identity.clone(),
                sender,
            })
            .await?;
        session.mark_registered();

        let reason = self
            .event_loop(&mut session, &mut log, &mut outbound)
            .await;

        if let Err(e) = self.ctx.coordinator.unregister(session.id).await {
            debug!(error = %e, "Unregister skipped");
        }

        let record = session.summarize(Instant::now());
        if let Err(e) = self.ctx.metrics_store.append_record(&record).await {
            warn!(error = %e, "Failed to record session metrics");
        }

        if let Some(log) = log
            && let Err(e) = log.close().await
        {
            warn!(error = %e, "Failed to close session log");
        }

        info!(
            reason = %reason,
            sent = record.sent,
            acknowledged = record.acknowledged,
            duration_secs = record.duration_secs,
            "Session ended"
        );
        Ok(reason)
    }
}
