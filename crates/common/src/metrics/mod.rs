//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Arthub metrics
pub const METRICS_PREFIX: &str = "arthub";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_orders_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total orders placed"
    );

    describe_counter!(
        format!("{}_order_status_changes_total", METRICS_PREFIX),
        Unit::Count,
        "Order status transitions, labelled by target status"
    );

    describe_counter!(
        format!("{}_reviews_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviews submitted"
    );

    describe_counter!(
        format!("{}_likes_toggled_total", METRICS_PREFIX),
        Unit::Count,
        "Like toggles, labelled by target kind and direction"
    );

    describe_counter!(
        format!("{}_connection_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Community connection requests sent"
    );

    describe_counter!(
        format!("{}_posts_created_total", METRICS_PREFIX),
        Unit::Count,
        "Community posts created"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

pub fn record_order_created(payment_method: &str) {
    counter!(
        format!("{}_orders_created_total", METRICS_PREFIX),
        "payment_method" => payment_method.to_string()
    )
    .increment(1);
}

pub fn record_order_status(status: &str) {
    counter!(
        format!("{}_order_status_changes_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_review(rating: i32) {
    counter!(
        format!("{}_reviews_created_total", METRICS_PREFIX),
        "rating" => rating.to_string()
    )
    .increment(1);
}

/// Record a like toggle on `target` (artwork, post, comment)
pub fn record_like(target: &str, liked: bool) {
    let direction = if liked { "like" } else { "unlike" };

    counter!(
        format!("{}_likes_toggled_total", METRICS_PREFIX),
        "target" => target.to_string(),
        "direction" => direction.to_string()
    )
    .increment(1);
}

pub fn record_connection_request() {
    counter!(format!("{}_connection_requests_total", METRICS_PREFIX)).increment(1);
}

pub fn record_post_created(category: &str) {
    counter!(
        format!("{}_posts_created_total", METRICS_PREFIX),
        "category" => category.to_string()
    )
    .increment(1);
}
