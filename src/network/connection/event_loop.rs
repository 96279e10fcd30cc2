//! The per-session `select!` loop.

use super::{Connection, ExitReason, IDLE_NOTICE, LOG_WRITE_FAILED, Line, MESSAGE_TOO_LONG};
use super::idle::InactivityMonitor;
use crate::error::HandlerError;
use crate::handlers::{Context, Flow};
use crate::state::Session;
use crate::storage::SessionLog;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outcome of one `select!` round.
enum SelectResult {
    Line(Line),
    Outgoing(Arc<str>),
    Closed,
    ReadError(std::io::Error),
    Idle,
}

impl Connection {
    /// Serve the session until one exit trigger fires.
    ///
    /// The read, the outbound queue, and the idle deadline race in a single
    /// `select!`; whichever completes first is the only one acted on.
    pub(super) async fn event_loop(
        &mut self,
        session: &mut Session,
        log: &mut Option<SessionLog>,
        outbound: &mut mpsc::Receiver<Arc<str>>,
    ) -> ExitReason {
        let mut idle = InactivityMonitor::arm(self.ctx.settings.idle_timeout);

        loop {
            let select_result = tokio::select! {
                frame = self.reader.next() => match frame {
                    Some(Ok(line)) => SelectResult::Line(line),
                    Some(Err(e)) => SelectResult::ReadError(e),
                    None => SelectResult::Closed,
                },

                Some(msg) = outbound.recv() => SelectResult::Outgoing(msg),

                () = idle.expired() => SelectResult::Idle,
            };

            match select_result {
                SelectResult::Line(line) => {
                    idle.reset();
                    session.touch();
                    if let Some(reason) = self.handle_line(session, log, line).await {
                        return reason;
                    }
                }

                SelectResult::Outgoing(msg) => {
                    if let Err(e) = self.writer.send(msg).await {
                        warn!(error = %e, "Write error");
                        return ExitReason::WriteError;
                    }
                }

                SelectResult::Closed => {
                    debug!("Client closed connection");
                    return ExitReason::Closed;
                }

                SelectResult::ReadError(e) => {
                    debug!(error = %e, "Read error");
                    return ExitReason::ReadError;
                }

                SelectResult::Idle => {
                    info!(
                        window = ?idle.window(),
                        idle_for = ?session.last_activity.elapsed(),
                        "Inactivity timeout"
                    );
                    crate::metrics::record_timeout();
                    if let Err(e) = self.writer.send(IDLE_NOTICE).await {
                        debug!(error = %e, "Failed to send inactivity notice");
                    }
                    return ExitReason::Idle;
                }
            }
        }
    }

    /// Process one input line. Returns `Some` when the session must end.
    async fn handle_line(
        &mut self,
        session: &mut Session,
        log: &mut Option<SessionLog>,
        line: Line,
    ) -> Option<ExitReason> {
        if line.truncated {
            crate::metrics::record_truncated_line();
            debug!(limit = self.ctx.settings.max_message_len, "Line truncated");
            if self.writer.send(MESSAGE_TOO_LONG).await.is_err() {
                return Some(ExitReason::WriteError);
            }
        }

        let text = line.text.trim();

        if let Some(log) = log.as_mut()
            && let Err(e) = log.append(Utc::now(), text).await
        {
            warn!(error = %e, "Failed to write session log");
            if self.writer.send(LOG_WRITE_FAILED).await.is_err() {
                return Some(ExitReason::WriteError);
            }
        }

        let mut ctx = Context {
            session,
            writer: &mut self.writer,
            coordinator: &self.ctx.coordinator,
        };

        match self.ctx.registry.dispatch(&mut ctx, text).await {
            Ok(Flow::Continue) => None,
            Ok(Flow::Quit) => Some(ExitReason::Quit),
            Err(HandlerError::Io(e)) => {
                warn!(error = %e, "Write error");
                Some(ExitReason::WriteError)
            }
            Err(HandlerError::Coordinator(e)) => {
                warn!(error = %e, "Coordinator unavailable");
                Some(ExitReason::Shutdown)
            }
        }
    }
}
