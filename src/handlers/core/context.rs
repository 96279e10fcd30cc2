//! Handler context and core types.

use crate::error::HandlerError;
use crate::network::LineWriter;
use crate::state::{CoordinatorHandle, Session};
use async_trait::async_trait;
use futures_util::SinkExt;

/// What the session loop should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The client asked to leave; the farewell has already been written.
    Quit,
}

pub type HandlerResult = Result<Flow, HandlerError>;

/// Per-line context passed to each handler.
pub struct Context<'a> {
    /// The session that sent the line.
    pub session: &'a mut Session,
    /// Write half of the session's transport.
    pub writer: &'a mut LineWriter,
    pub coordinator: &'a CoordinatorHandle,
}

impl Context<'_> {
    /// Write one reply line to this session only.
    pub async fn reply(&mut self, text: &str) -> Result<(), HandlerError> {
        self.writer.send(text).await?;
        Ok(())
    }
}

/// A command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one input line. `args` is whatever followed the command name,
    /// or the whole line for the fallback handler.
    async fn handle(&self, ctx: &mut Context<'_>, args: &str) -> HandlerResult;

    /// Whether a successful call counts as an acknowledged request.
    fn acknowledges(&self) -> bool {
        false
    }
}
