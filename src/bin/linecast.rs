//! linecast - interactive client for linecastd.
//!
//! ```text
//! linecast [--udp] [addr]
//! ```
//!
//! TCP mode copies stdin lines to the server and server lines to stdout.
//! UDP mode does the same over datagrams and adds a `:ping` round-trip check.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::sleep;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_TCP_ADDR: &str = "127.0.0.1:9000";
const DEFAULT_UDP_ADDR: &str = "127.0.0.1:8080";
const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Tcp,
    Udp,
}

#[derive(Debug, PartialEq, Eq)]
struct ClientArgs {
    mode: Mode,
    addr: String,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<ClientArgs> {
    let mut mode = Mode::Tcp;
    let mut addr = None;

    for arg in args {
        match arg.as_str() {
            "--udp" => mode = Mode::Udp,
            "--tcp" => mode = Mode::Tcp,
            flag if flag.starts_with("--") => anyhow::bail!("unknown option {flag}"),
            _ if addr.is_some() => anyhow::bail!("unexpected argument {arg}"),
            _ => addr = Some(arg),
        }
    }

    let addr = addr.unwrap_or_else(|| match mode {
        Mode::Tcp => DEFAULT_TCP_ADDR.to_string(),
        Mode::Udp => DEFAULT_UDP_ADDR.to_string(),
    });
    Ok(ClientArgs { mode, addr })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so stdout carries only chat traffic.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    match args.mode {
        Mode::Tcp => run_tcp(&args.addr).await,
        Mode::Udp => run_udp(&args.addr).await,
    }
}

async fn run_tcp(addr: &str) -> anyhow::Result<()> {
    let stream = TcpStream::connect(addr).await?;
    debug!(peer = %stream.peer_addr()?, "Connected");

    let (r, w) = stream.into_split();
    let mut server = FramedRead::new(r, LinesCodec::new());
    let mut outgoing = FramedWrite::new(w, LinesCodec::new());
    let mut stdin = FramedRead::new(tokio::io::stdin(), LinesCodec::new());

    loop {
        tokio::select! {
            line = server.next() => match line {
                Some(Ok(line)) => println!("{line}"),
                Some(Err(e)) => return Err(e.into()),
                None => {
                    eprintln!("Server closed the connection");
                    return Ok(());
                }
            },

            input = stdin.next() => match input {
                Some(Ok(input)) => outgoing.send(input).await?,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}

async fn run_udp(addr: &str) -> anyhow::Result<()> {
    let server: SocketAddr = tokio::net::lookup_host(addr)
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("could not resolve {addr}"))?;

    let bind_addr: SocketAddr = if server.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server).await?;

    println!("Connected to chat server at {server}");
    println!("Type messages and press Enter to send.");
    println!("Type ':ping' to measure latency.");

    let mut stdin = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    let mut buf = vec![0u8; 64 * 1024];
    // Start of the outstanding `:ping`; the deadline only counts while it is set.
    let mut ping_started: Option<Instant> = None;
    let ping_deadline = sleep(PING_TIMEOUT);
    tokio::pin!(ping_deadline);

    loop {
        tokio::select! {
            received = socket.recv(&mut buf) => {
                let len = received?;
                let text = String::from_utf8_lossy(&buf[..len]);
                if text == "PONG"
                    && let Some(start) = ping_started.take()
                {
                    println!("Latency: {:?}", start.elapsed());
                } else {
                    print!("{text}");
                }
            }

            () = &mut ping_deadline, if ping_started.is_some() => {
                ping_started = None;
                println!("Timeout waiting for PONG");
            }

            input = stdin.next() => {
                let input = match input {
                    Some(line) => line?,
                    None => return Ok(()),
                };
                let text = input.trim();
                if text.is_empty() {
                    continue;
                }
                if text == ":ping" {
                    socket.send(b"PING").await?;
                    ping_started = Some(Instant::now());
                    ping_deadline
                        .as_mut()
                        .reset(tokio::time::Instant::now() + PING_TIMEOUT);
                    continue;
                }
                socket.send(text.as_bytes()).await?;
            }
        }
    }
}
