//! Connectionless relay.
//!
//! Peers are identified by source address and exist only in the peer table:
//! any datagram marks its sender as seen, `PING` is answered with `PONG`,
//! and everything else is relayed as `addr: text` to every other known peer.
//! A periodic sweep forgets peers that have been silent for too long.

use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::{Instrument, debug, info, instrument, warn};

const MAX_DATAGRAM: usize = 64 * 1024;

/// UDP relay state shared by the receive loop and the sweeper.
pub struct UdpRelay {
    socket: UdpSocket,
    /// Last time each peer was heard from.
    peers: Arc<DashMap<SocketAddr, Instant>>,
    idle_timeout: Duration,
    sweep_interval: Duration,
}

impl UdpRelay {
    pub async fn bind(
        addr: SocketAddr,
        idle_timeout: Duration,
        sweep_interval: Duration,
    ) -> anyhow::Result<Self> {
        let relay = Self {
            socket: UdpSocket::bind(addr).await?,
            peers: Arc::new(DashMap::new()),
            idle_timeout,
            sweep_interval,
        };
        info!(address = %relay.local_addr()?, "UDP relay bound");
        Ok(relay)
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive and relay datagrams forever, with the sweeper running alongside.
    #[instrument(skip(self), name = "udp_relay")]
    pub async fn run(self) {
        tokio::spawn(sweep_loop(
            Arc::clone(&self.peers),
            self.idle_timeout,
            self.sweep_interval,
        ));

        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, from) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    // ICMP errors from earlier sends surface here on some platforms.
                    debug!(error = %e, "UDP receive error");
                    continue;
                }
            };

            crate::metrics::record_udp_datagram();
            let text = String::from_utf8_lossy(&buf[..len]);
            let span = crate::telemetry::spans::datagram(&from);
            self.handle_datagram(from, text.trim()).instrument(span).await;
        }
    }

    async fn handle_datagram(&self, from: SocketAddr, text: &str) {
        if self.peers.insert(from, Instant::now()).is_none() {
            info!("UDP peer joined");
            crate::metrics::set_udp_peers(self.peers.len());
        }

        if text == "PING" {
            self.send(b"PONG", from).await;
            return;
        }

        let line = format!("{from}: {text}\n");
        // Collect first so no map shard lock is held across an await.
        let targets: Vec<SocketAddr> = self
            .peers
            .iter()
            .map(|entry| *entry.key())
            .filter(|addr| *addr != from)
            .collect();

        crate::metrics::record_fanout(targets.len());
        for target in targets {
            self.send(line.as_bytes(), target).await;
        }
    }

    async fn send(&self, payload: &[u8], to: SocketAddr) {
        if let Err(e) = self.socket.send_to(payload, to).await {
            warn!(peer = %to, error = %e, "UDP send failed");
        }
    }
}

/// Remove peers not seen within `idle_timeout`. Returns how many were evicted.
fn sweep(peers: &DashMap<SocketAddr, Instant>, idle_timeout: Duration, now: Instant) -> usize {
    let before = peers.len();
    peers.retain(|addr, last_seen| {
        let keep = now.saturating_duration_since(*last_seen) <= idle_timeout;
        if !keep {
            info!(peer = %addr, "UDP peer timed out");
        }
        keep
    });
    before - peers.len()
}

async fn sweep_loop(
    peers: Arc<DashMap<SocketAddr, Instant>>,
    idle_timeout: Duration,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let evicted = sweep(&peers, idle_timeout, Instant::now());
        if evicted > 0 {
            crate::metrics::set_udp_peers(peers.len());
        }
    }
}
