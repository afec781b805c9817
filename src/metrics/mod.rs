// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Remote attempts and their outcomes
// - Fallbacks to the local path, by reason
// - Query latency per endpoint and answering source
// - Local store writes
// - The effective data mode
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Remote Metrics
    pub remote_requests_total: IntCounterVec,
    pub fallback_total: IntCounterVec,

    // Local Path Metrics
    pub local_queries_total: IntCounterVec,
    pub store_writes_total: IntCounterVec,

    // Latency
    pub query_duration: HistogramVec,

    /// 0 = local, 1 = remote
    pub data_mode: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let remote_requests_total = IntCounterVec::new(
            Opts::new("remote_requests_total", "Remote attempts by endpoint and outcome"),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(remote_requests_total.clone()))?;

        let fallback_total = IntCounterVec::new(
            Opts::new("fallback_total", "Queries re-run locally after a remote failure"),
            &["endpoint", "reason"],
        )?;
        registry.register(Box::new(fallback_total.clone()))?;

        let local_queries_total = IntCounterVec::new(
            Opts::new("local_queries_total", "Queries answered from the local store"),
            &["endpoint"],
        )?;
        registry.register(Box::new(local_queries_total.clone()))?;

        let store_writes_total = IntCounterVec::new(
            Opts::new("store_writes_total", "Local store mutations"),
            &["kind", "operation"],
        )?;
        registry.register(Box::new(store_writes_total.clone()))?;

        let query_duration = HistogramVec::new(
            HistogramOpts::new("query_duration_seconds", "Query duration by endpoint and answering source")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["endpoint", "source"],
        )?;
        registry.register(Box::new(query_duration.clone()))?;

        let data_mode = IntGauge::new("data_mode", "Effective data mode (0=local, 1=remote)")?;
        registry.register(Box::new(data_mode.clone()))?;

        Ok(Self {
            registry,
            remote_requests_total,
            fallback_total,
            local_queries_total,
            store_writes_total,
            query_duration,
            data_mode,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one remote attempt
    pub fn record_remote_attempt(&self, endpoint: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.remote_requests_total.with_label_values(&[endpoint, outcome]).inc();
    }

    /// Helper to record a fallback to the local path
    pub fn record_fallback(&self, endpoint: &str, reason: &str) {
        self.fallback_total.with_label_values(&[endpoint, reason]).inc();
    }

    /// Helper to record a query answered locally
    pub fn record_local_query(&self, endpoint: &str) {
        self.local_queries_total.with_label_values(&[endpoint]).inc();
    }

    pub fn record_query_duration(&self, endpoint: &str, source: &str, duration_secs: f64) {
        self.query_duration.with_label_values(&[endpoint, source]).observe(duration_secs);
    }

    pub fn record_store_write(&self, kind: &str, operation: &str) {
        self.store_writes_total.with_label_values(&[kind, operation]).inc();
    }

    pub fn set_data_mode(&self, remote: bool) {
        self.data_mode.set(i64::from(remote));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.set_data_mode(false);
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_remote_attempt() {
        let metrics = Metrics::new().unwrap();
        metrics.record_remote_attempt("orders.list", true);
        metrics.record_remote_attempt("orders.list", false);

        let gathered = metrics.registry.gather();
        let attempts = gathered.iter().find(|m| m.name() == "remote_requests_total").unwrap();
        assert_eq!(attempts.metric.len(), 2); // success and failure labels
    }

    #[test]
    fn test_record_fallback() {
        let metrics = Metrics::new().unwrap();
        metrics.record_fallback("analytics.sales", "transport");
        metrics.record_fallback("analytics.sales", "transport");

        let gathered = metrics.registry.gather();
        let fallbacks = gathered.iter().find(|m| m.name() == "fallback_total").unwrap();
        assert_eq!(fallbacks.metric[0].counter.value, Some(2.0));
    }

    #[test]
    fn test_data_mode_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.set_data_mode(true);

        let gathered = metrics.registry.gather();
        let mode = gathered.iter().find(|m| m.name() == "data_mode").unwrap();
        assert_eq!(mode.metric[0].gauge.value, Some(1.0));
    }

    #[test]
    fn test_query_duration_by_source() {
        let metrics = Metrics::new().unwrap();
        metrics.record_query_duration("products.list", "local", 0.002);
        metrics.record_local_query("products.list");
        metrics.record_store_write("order", "create");

        let gathered = metrics.registry.gather();
        let duration = gathered.iter().find(|m| m.name() == "query_duration_seconds").unwrap();
        assert_eq!(duration.metric[0].histogram.sample_count, Some(1));
    }
}
