//! Fallback handler: anything that is not a command goes to everyone else.

use super::{Context, Flow, Handler, HandlerResult};
use async_trait::async_trait;

/// Broadcasts `identity: text` to every other registered session.
pub struct RelayHandler;

#[async_trait]
impl Handler for RelayHandler {
    async fn handle(&self, ctx: &mut Context<'_>, text: &str) -> HandlerResult {
        let line = format!("{}: {}", ctx.session.identity, text);
        ctx.coordinator.broadcast(line, Some(ctx.session.id)).await?;
        Ok(Flow::Continue)
    }
}
