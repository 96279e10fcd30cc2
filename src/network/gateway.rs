//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket and spawns one Connection task per
//! accepted client.

use crate::network::{Connection, ServerContext};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    ctx: ServerContext,
}

impl Gateway {
    /// Bind the gateway to the specified address. Failure here is fatal.
    pub async fn bind(addr: SocketAddr, ctx: ServerContext) -> anyhow::Result<Self> {
        let gateway = Self {
            listener: TcpListener::bind(addr).await?,
            ctx,
        };
        info!(address = %gateway.local_addr()?, "TCP listener bound");
        Ok(gateway)
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    ///
    /// A failed accept is logged and the loop continues.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(%addr, "Connection accepted");

                    let connection = Connection::new_tcp(stream, addr, self.ctx.clone());
                    tokio::spawn(async move {
                        match connection.run().await {
                            Ok(reason) => info!(%addr, %reason, "Connection closed"),
                            Err(e) => warn!(%addr, error = %e, "Connection error"),
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
