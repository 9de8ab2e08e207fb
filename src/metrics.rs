//! Prometheus metrics for the tip pipeline.
//!
//! This module provides metrics for:
//! - Upstream feed latency and failures
//! - Events received and skipped during validation
//! - Tips selected, bucketed and dropped

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Feed Labels ===

/// Odds feed label.
pub const FEED_ODDS: &str = "odds";
/// Fixtures feed label.
pub const FEED_FIXTURES: &str = "fixtures";
/// Standings feed label.
pub const FEED_STANDINGS: &str = "standings";

// === Metric Name Constants ===

/// Feed request latency metric name.
pub const METRIC_FEED_REQUEST_LATENCY: &str = "feed_request_latency_ms";
/// Feed failures counter metric name.
pub const METRIC_FEED_FAILURES: &str = "feed_failures_total";
/// Events received counter metric name.
pub const METRIC_EVENTS_RECEIVED: &str = "events_received_total";
/// Events skipped counter metric name.
pub const METRIC_EVENTS_SKIPPED: &str = "events_skipped_total";
/// Tips selected counter metric name.
pub const METRIC_TIPS_SELECTED: &str = "tips_selected_total";
/// Tips bucketed counter metric name.
pub const METRIC_TIPS_BUCKETED: &str = "tips_bucketed_total";
/// Tips dropped counter metric name.
pub const METRIC_TIPS_DROPPED: &str = "tips_dropped_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_FEED_REQUEST_LATENCY,
        "Upstream feed request latency in milliseconds"
    );

    describe_counter!(
        METRIC_FEED_FAILURES,
        "Total number of failed upstream feed requests"
    );
    describe_counter!(
        METRIC_EVENTS_RECEIVED,
        "Total number of events received from the odds feed"
    );
    describe_counter!(
        METRIC_EVENTS_SKIPPED,
        "Total number of events dropped during validation"
    );
    describe_counter!(
        METRIC_TIPS_SELECTED,
        "Total number of tips selected"
    );
    describe_counter!(
        METRIC_TIPS_BUCKETED,
        "Total number of tips placed in a bucket"
    );
    describe_counter!(
        METRIC_TIPS_DROPPED,
        "Total number of tips that fit no bucket"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Increment events received counter.
pub fn inc_events_received(count: u64) {
    counter!(METRIC_EVENTS_RECEIVED).increment(count);
}

/// Increment events skipped counter.
pub fn inc_events_skipped(reason: &'static str) {
    counter!(METRIC_EVENTS_SKIPPED, "reason" => reason).increment(1);
}

/// Increment tips selected counter.
pub fn inc_tips_selected(market: &'static str) {
    counter!(METRIC_TIPS_SELECTED, "market" => market).increment(1);
}

/// Increment tips bucketed counter.
pub fn inc_tips_bucketed(market: &'static str) {
    counter!(METRIC_TIPS_BUCKETED, "market" => market).increment(1);
}

/// Increment tips dropped counter.
pub fn inc_tips_dropped(market: &'static str) {
    counter!(METRIC_TIPS_DROPPED, "market" => market).increment(1);
}

/// Increment feed failures counter.
pub fn inc_feed_failures(feed: &'static str) {
    counter!(METRIC_FEED_FAILURES, "feed" => feed).increment(1);
}

/// RAII guard for timing feed requests.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    feed: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and feed.
    pub fn new(metric_name: &'static str, feed: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            feed,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name, "feed" => self.feed).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a feed request.
pub fn timer_feed_request(feed: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_FEED_REQUEST_LATENCY, feed)
}
