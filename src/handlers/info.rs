//! Informational commands: fixed replies, server clock, client count, help.

use super::{Context, Flow, Handler, HandlerResult};
use async_trait::async_trait;
use chrono::{Local, Utc};

/// Replies with a fixed line.
pub struct StaticReply(pub &'static str);

#[async_trait]
impl Handler for StaticReply {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        ctx.reply(self.0).await?;
        Ok(Flow::Continue)
    }
}

/// Handler for `/time`: current server time in RFC 1123 form.
pub struct TimeHandler;

#[async_trait]
impl Handler for TimeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        let now = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        ctx.reply(&now).await?;
        Ok(Flow::Continue)
    }
}

/// Handler for `/date`: the server's local date as `YYYY-MM-DD`.
pub struct DateHandler;

#[async_trait]
impl Handler for DateHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        let today = Local::now().format("%Y-%m-%d").to_string();
        ctx.reply(&today).await?;
        Ok(Flow::Continue)
    }
}

/// Handler for `/clients`.
pub struct ClientsHandler;

#[async_trait]
impl Handler for ClientsHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        let count = ctx.coordinator.live_count().await?;
        ctx.reply(&format!("Connected clients: {count}")).await?;
        Ok(Flow::Continue)
    }
}

pub const HELP_LINES: &[&str] = &[
    "Available commands:",
    "/echo [message] - Echoes back your message",
    "/time - Shows current server time",
    "/date - Shows current server date",
    "/joke - Tells a joke",
    "/ping - Shows latency",
    "/clients - Number of connected clients",
    "/quit or bye - Disconnects you",
];

/// Handler for `/help`.
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
        for line in HELP_LINES {
            ctx.reply(line).await?;
        }
        Ok(Flow::Continue)
    }
}
