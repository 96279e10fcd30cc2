//! HTTP server for the Prometheus metrics endpoint.
//!
//! Runs on a separate tokio task. Serves `/metrics` for Prometheus scraping
//! and `/health`, which answers only while the coordinator is running.

use crate::state::CoordinatorHandle;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use tracing::{error, info};

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Handler for GET /health - `ok <live sessions>`, or 503 once the
/// coordinator has stopped.
async fn health_handler(State(coordinator): State<CoordinatorHandle>) -> (StatusCode, String) {
    match coordinator.live_count().await {
        Ok(count) => (StatusCode::OK, format!("ok {count}\n")),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("{e}\n")),
    }
}

fn router(coordinator: CoordinatorHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(coordinator)
}

/// Run the HTTP server on `addr` until it fails.
pub async fn run_http_server(addr: SocketAddr, coordinator: CoordinatorHandle) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind HTTP server");
            return;
        }
    };
    info!(%addr, "Metrics endpoint listening");

    if let Err(e) = axum::serve(listener, router(coordinator)).await {
        error!(error = %e, "HTTP server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Coordinator;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn get(coordinator: CoordinatorHandle, path: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(coordinator)).await.unwrap();
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn health_reports_live_sessions() {
        let response = get(Coordinator::spawn(8), "/health").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("ok 0\n"), "{response}");
    }

    #[tokio::test]
    async fn health_fails_once_coordinator_is_gone() {
        let response = get(CoordinatorHandle::closed(), "/health").await;
        assert!(response.starts_with("HTTP/1.1 503"), "{response}");
    }

    #[tokio::test]
    async fn metrics_route_is_served() {
        let response = get(Coordinator::spawn(8), "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    }
}
