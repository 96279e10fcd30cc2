//! Prometheus metrics collection for linecast.
//!
//! Metrics are optional: until [`init`] runs every recorder is a no-op, which
//! keeps unit tests and `metrics_port = 0` deployments free of registry work.
//!
//! - `linecast_connected_sessions` - Sessions currently in the registry (gauge)
//! - `linecast_sessions_total` - Sessions accepted since startup
//! - `linecast_broadcast_fanout` - Recipients per broadcast (histogram)
//! - `linecast_command_total{command}` - Lines processed by command

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Sessions accepted since startup.
pub static SESSIONS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Sessions closed by the inactivity monitor.
pub static SESSION_TIMEOUTS: OnceLock<IntCounter> = OnceLock::new();

/// Broadcast deliveries dropped because a recipient queue was full or closed.
pub static DROPPED_DELIVERIES: OnceLock<IntCounter> = OnceLock::new();

/// Lines that exceeded the length limit and were truncated.
pub static TRUNCATED_LINES: OnceLock<IntCounter> = OnceLock::new();

/// UDP datagrams received by the relay.
pub static UDP_DATAGRAMS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Sessions currently registered with the coordinator.
pub static CONNECTED_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

/// Peers currently tracked by the UDP relay.
pub static UDP_PEERS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Per-command and fan-out metrics
// ========================================================================

/// Lines processed by command name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command processing latency by command name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by command and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Recipients per broadcast.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(SESSIONS_TOTAL, IntCounter::new("linecast_sessions_total", "Sessions accepted since startup"));
    register!(SESSION_TIMEOUTS, IntCounter::new("linecast_session_timeouts_total", "Sessions closed for inactivity"));
    register!(DROPPED_DELIVERIES, IntCounter::new("linecast_broadcast_dropped_total", "Broadcast deliveries dropped"));
    register!(TRUNCATED_LINES, IntCounter::new("linecast_truncated_lines_total", "Input lines truncated to the length limit"));
    register!(UDP_DATAGRAMS, IntCounter::new("linecast_udp_datagrams_total", "Datagrams received by the UDP relay"));
    register!(CONNECTED_SESSIONS, IntGauge::new("linecast_connected_sessions", "Sessions currently registered"));
    register!(UDP_PEERS, IntGauge::new("linecast_udp_peers", "Peers tracked by the UDP relay"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("linecast_command_total", "Lines processed by command"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("linecast_command_duration_seconds", "Command latency by command")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("linecast_command_errors_total", "Command errors by kind"), &["command", "error"]));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("linecast_broadcast_fanout", "Recipients per broadcast")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
fn inc(metric: &OnceLock<IntCounter>) {
    if let Some(c) = metric.get() {
        c.inc();
    }
}

#[inline]
pub fn session_opened() {
    inc(&SESSIONS_TOTAL);
}

#[inline]
pub fn record_timeout() {
    inc(&SESSION_TIMEOUTS);
}

#[inline]
pub fn record_dropped_delivery() {
    inc(&DROPPED_DELIVERIES);
}

#[inline]
pub fn record_truncated_line() {
    inc(&TRUNCATED_LINES);
}

#[inline]
pub fn record_udp_datagram() {
    inc(&UDP_DATAGRAMS);
}

#[inline]
pub fn set_connected_sessions(count: usize) {
    if let Some(g) = CONNECTED_SESSIONS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn set_udp_peers(count: usize) {
    if let Some(g) = UDP_PEERS.get() {
        g.set(count as i64);
    }
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record broadcast fan-out (how many sessions a broadcast was queued for).
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}
