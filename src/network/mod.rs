//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-client Connection loop, and
//! the connectionless UDP relay.

mod connection;
mod gateway;
mod udp;

pub use connection::{Connection, LineWriter, ServerContext, SessionSettings};
#[cfg(test)]
pub use connection::{BoxedWriter, LineCodec};
pub use gateway::Gateway;
pub use udp::UdpRelay;
