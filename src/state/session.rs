//! Per-connection session state and the metrics computed when it ends.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Registry key for a live session. Fresh for every accepted connection.
pub type SessionId = Uuid;

/// Server-side state for one connected client.
///
/// Owned and mutated only by the connection task that created it.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    /// Remote endpoint, stable for the session's lifetime.
    pub identity: String,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub sent_count: u64,
    pub acknowledged_count: u64,
    pub last_latency: Duration,
}

impl Session {
    pub fn new(identity: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            identity: identity.into(),
            connected_at: now,
            last_activity: now,
            sent_count: 0,
            acknowledged_count: 0,
            last_latency: Duration::ZERO,
        }
    }

    /// Restart the clocks once the session is visible to broadcasts. Duration
    /// is measured from this point.
    pub fn mark_registered(&mut self) {
        let now = Instant::now();
        self.connected_at = now;
        self.last_activity = now;
    }

    /// Mark input activity.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Count one processed line. `acknowledged` is set for requests that got a
    /// direct, synchronous answer (echo and `/ping`).
    pub fn record_line(&mut self, acknowledged: bool) {
        self.sent_count += 1;
        if acknowledged {
            self.acknowledged_count += 1;
        }
    }

    pub fn record_latency(&mut self, latency: Duration) {
        self.last_latency = latency;
    }

    /// Compute the metrics row for this session as of `now`.
    pub fn summarize(&self, now: Instant) -> SessionRecord {
        let duration = now.saturating_duration_since(self.connected_at);
        let duration_secs = duration.as_secs_f64();

        let throughput = if duration_secs > 0.0 {
            self.sent_count as f64 / duration_secs
        } else {
            0.0
        };

        let packet_loss = if self.sent_count > 0 {
            (self.sent_count - self.acknowledged_count) as f64 / self.sent_count as f64 * 100.0
        } else {
            0.0
        };

        SessionRecord {
            identity: self.identity.clone(),
            sent: self.sent_count,
            acknowledged: self.acknowledged_count,
            packet_loss,
            throughput,
            duration_secs,
            latency_ms: self.last_latency.as_secs_f64() * 1000.0,
            recorded_at: Utc::now(),
        }
    }
}

/// One finished session, as appended to the metrics store.
///
/// "Acknowledged" only counts echo and ping replies, so `packet_loss` is an
/// approximation rather than a transport-level measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub identity: String,
    pub sent: u64,
    pub acknowledged: u64,
    /// Percentage of lines without a direct reply.
    pub packet_loss: f64,
    /// Lines per second over the session.
    pub throughput: f64,
    pub duration_secs: f64,
    pub latency_ms: f64,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_get_distinct_ids() {
        let a = Session::new("127.0.0.1:1000");
        let b = Session::new("127.0.0.1:1000");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn counters_only_grow() {
        let mut session = Session::new("peer");
        session.record_line(false);
        session.record_line(true);
        session.record_line(false);
        assert_eq!(session.sent_count, 3);
        assert_eq!(session.acknowledged_count, 1);
    }

    #[test]
    fn summary_computes_loss_and_throughput() {
        let mut session = Session::new("peer");
        for acked in [true, false, false, false] {
            session.record_line(acked);
        }
        session.record_latency(Duration::from_micros(1500));

        let record = session.summarize(session.connected_at + Duration::from_secs(2));
        assert_eq!(record.identity, "peer");
        assert_eq!(record.sent, 4);
        assert_eq!(record.acknowledged, 1);
        assert!((record.packet_loss - 75.0).abs() < f64::EPSILON);
        assert!((record.throughput - 2.0).abs() < f64::EPSILON);
        assert!((record.duration_secs - 2.0).abs() < f64::EPSILON);
        assert!((record.latency_ms - 1.5).abs() < 1e-9);
    }

    #[test]
    fn registration_restarts_the_session_clock() {
        let mut session = Session::new("peer");
        let created = session.connected_at;
        std::thread::sleep(Duration::from_millis(5));

        session.mark_registered();
        assert!(session.connected_at > created);
        assert_eq!(session.last_activity, session.connected_at);

        let record = session.summarize(created + Duration::from_millis(5));
        assert_eq!(record.duration_secs, 0.0);
    }

    #[test]
    fn silent_session_reports_zero_loss() {
        let session = Session::new("peer");
        let record = session.summarize(session.connected_at);
        assert_eq!(record.sent, 0);
        assert_eq!(record.packet_loss, 0.0);
        assert_eq!(record.throughput, 0.0);
    }
}
