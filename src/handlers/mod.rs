//! Command interpreter.
//!
//! Every trimmed input line is routed by the [`Registry`] to one [`Handler`]:
//! an exact command (`/time`, `bye`, the empty line, ...), a prefix command
//! (`/echo <text>`), or the relay fallback that broadcasts the line to the
//! other sessions.

mod core;
mod echo;
mod info;
mod quit;
mod relay;

pub use self::core::{Context, Flow, Handler, HandlerResult, Registry};
pub use echo::{EchoHandler, PingHandler};
pub use info::{ClientsHandler, DateHandler, HelpHandler, StaticReply, TimeHandler};
pub use quit::QuitHandler;
pub use relay::RelayHandler;
