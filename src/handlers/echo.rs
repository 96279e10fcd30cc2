//! Acknowledged requests: `/echo` and `/ping`.

use super::{Context, Flow, Handler, HandlerResult};
use async_trait::async_trait;
use std::time::Instant;

/// Handler for `/echo <text>`: sends the text back to its author only.
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &str) -> HandlerResult {
        ctx.reply(args).await?;
        Ok(Flow::Continue)
    }

    fn acknowledges(&self) -> bool {
        true
    }
}

/// Handler for `/ping`.
///
/// Latency is the time taken to write `Pong!` back to the client; it is kept
/// on the session as the last latency sample.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        let start = Instant::now();
        ctx.reply("Pong!").await?;
        let latency = start.elapsed();

        ctx.session.record_latency(latency);
        ctx.reply(&format!("Latency: {latency:?}")).await?;
        Ok(Flow::Continue)
    }

    fn acknowledges(&self) -> bool {
        true
    }
}
