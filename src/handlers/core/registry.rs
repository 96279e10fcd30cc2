//! Command handler registry and dispatch.

use super::context::{Context, Handler, HandlerResult};
use crate::handlers::{
    ClientsHandler, DateHandler, EchoHandler, HelpHandler, PingHandler, QuitHandler, RelayHandler,
    StaticReply, TimeHandler,
};
use crate::telemetry::CommandTimer;
use std::collections::HashMap;
use tracing::{Instrument, Level, debug, span};

/// Reply to an empty line.
pub const GREETING: &str = "Wassup...";
pub const GIMME_REPLY: &str = "Brrrrrrrrrrrr!";
pub const JOKE_REPLY: &str = "If you wanted a joke you should have made one yourself";

/// Registry of command handlers.
pub struct Registry {
    /// Commands that must match the whole trimmed line.
    exact: HashMap<&'static str, Box<dyn Handler>>,
    /// Commands matched on the first word, with the rest passed as arguments.
    prefixed: HashMap<&'static str, Box<dyn Handler>>,
    /// Everything else.
    fallback: Box<dyn Handler>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut exact: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        exact.insert("", Box::new(StaticReply(GREETING)));
        exact.insert("GIMME 3", Box::new(StaticReply(GIMME_REPLY)));
        exact.insert("/joke", Box::new(StaticReply(JOKE_REPLY)));

        exact.insert("bye", Box::new(QuitHandler));
        exact.insert("/quit", Box::new(QuitHandler));

        exact.insert("/time", Box::new(TimeHandler));
        exact.insert("/date", Box::new(DateHandler));
        exact.insert("/ping", Box::new(PingHandler));
        exact.insert("/clients", Box::new(ClientsHandler));
        exact.insert("/help", Box::new(HelpHandler));

        let mut prefixed: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();
        prefixed.insert("/echo", Box::new(EchoHandler));

        Self {
            exact,
            prefixed,
            fallback: Box::new(RelayHandler),
        }
    }

    /// Pick the handler for a trimmed line, with its metrics label and arguments.
    fn resolve<'a>(&self, input: &'a str) -> (&'static str, &dyn Handler, &'a str) {
        if let Some((name, handler)) = self.exact.get_key_value(input) {
            let label = if name.is_empty() { "empty" } else { *name };
            return (label, handler.as_ref(), "");
        }

        if let Some((cmd, rest)) = input.split_once(' ')
            && let Some((name, handler)) = self.prefixed.get_key_value(cmd)
        {
            return (*name, handler.as_ref(), rest);
        }

        ("broadcast", self.fallback.as_ref(), input)
    }

    /// Dispatch one trimmed line and count it on the session.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, input: &str) -> HandlerResult {
        let (name, handler, args) = self.resolve(input);

        let command_span = span!(
            Level::DEBUG,
            "command",
            command = name,
            session = %ctx.session.id,
        );
        let _timer = CommandTimer::new(name);

        let result = handler.handle(ctx, args).instrument(command_span).await;

        ctx.session
            .record_line(result.is_ok() && handler.acknowledges());

        if let Err(ref e) = result {
            crate::metrics::record_command_error(name, e.error_code());
            debug!(command = name, error = %e, "Command error");
        }

        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
