//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Heartbeats by outcome and activity-log appends
//! - Statistics generation latency by period
//! - Database pool gauges

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use crate::shared::error::AppError;

const NAMESPACE: &str = "room_presence";

/// Heartbeat outcome labels
pub const HEARTBEAT_ACCEPTED: &str = "accepted";
pub const HEARTBEAT_NOT_MEMBER: &str = "not_member";
pub const HEARTBEAT_INVALID: &str = "invalid";
pub const HEARTBEAT_ERROR: &str = "error";

/// Every collector, registered on a private registry.
pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    heartbeats_total: IntCounterVec,
    activity_entries_total: IntCounter,
    stats_duration_seconds: HistogramVec,
    db_pool_connections: GaugeVec,
}

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )?;
        let heartbeats_total = IntCounterVec::new(
            Opts::new("heartbeats_total", "Heartbeats received, by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        let activity_entries_total = IntCounter::with_opts(
            Opts::new(
                "activity_entries_total",
                "Activity log entries appended by heartbeats",
            )
            .namespace(NAMESPACE),
        )?;
        let stats_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "stats_duration_seconds",
                "Room statistics generation latency in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["period"],
        )?;
        let db_pool_connections = GaugeVec::new(
            Opts::new("db_pool_connections", "Database connection pool statistics")
                .namespace(NAMESPACE),
            &["state"], // "idle", "active", "max"
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(heartbeats_total.clone()))?;
        registry.register(Box::new(activity_entries_total.clone()))?;
        registry.register(Box::new(stats_duration_seconds.clone()))?;
        registry.register(Box::new(db_pool_connections.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            heartbeats_total,
            activity_entries_total,
            stats_duration_seconds,
            db_pool_connections,
        })
    }
}

/// Global metrics; `None` if the collectors could not be registered.
static METRICS: Lazy<Option<Metrics>> = Lazy::new(|| match Metrics::new() {
    Ok(metrics) => Some(metrics),
    Err(e) => {
        tracing::error!(error = %e, "Failed to register metrics, metrics disabled");
        None
    }
});

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, AppError> {
    let Some(metrics) = METRICS.as_ref() else {
        return Ok(String::new());
    };

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metrics.registry.gather(), &mut buffer)
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| AppError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    if let Some(metrics) = METRICS.as_ref() {
        metrics
            .http_requests_total
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
        metrics
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

/// Count a heartbeat and, when it was logged, the appended entry.
pub fn record_heartbeat(outcome: &str, logged: bool) {
    if let Some(metrics) = METRICS.as_ref() {
        metrics.heartbeats_total.with_label_values(&[outcome]).inc();
        if logged {
            metrics.activity_entries_total.inc();
        }
    }
}

/// Helper to record statistics latency
pub fn observe_stats_duration(period: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.as_ref() {
        metrics
            .stats_duration_seconds
            .with_label_values(&[period])
            .observe(duration_secs);
    }
}

/// Helper to update database pool stats
pub fn update_db_pool_stats(idle: u32, active: u32, max: u32) {
    if let Some(metrics) = METRICS.as_ref() {
        let pool = &metrics.db_pool_connections;
        pool.with_label_values(&["idle"]).set(idle as f64);
        pool.with_label_values(&["active"]).set(active as f64);
        pool.with_label_values(&["max"]).set(max as f64);
    }
}
