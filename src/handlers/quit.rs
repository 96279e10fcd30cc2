//! `bye` and `/quit`.

use super::{Context, Flow, Handler, HandlerResult};
use async_trait::async_trait;

pub const FAREWELL: &str = "Later!";

/// Handler for the termination commands.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        tracing::info!(
            session = %ctx.session.id,
            identity = %ctx.session.identity,
            "Client quit"
        );

        ctx.reply(FAREWELL).await?;
        Ok(Flow::Quit)
    }
}
