//! Request metrics, recorded as a side effect of every proxy cycle and
//! exposed at `/metrics` in the prometheus text format.
//!
//! The recorder is injected through app state rather than living in a global
//! registry, so handlers stay testable without a metrics backend.

use std::time::Duration;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: Histogram,
}

impl Metrics {
    /// Build a fresh registry with the two collectors this service emits.
    /// Registration on a new registry cannot collide, so failure here means a
    /// programming error in the metric definitions.
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("api_requests_total", "Total API requests"),
            &["endpoint", "status"],
        )
        .expect("valid counter definition");

        let request_duration = Histogram::with_opts(HistogramOpts::new(
            "api_request_duration_seconds",
            "API request latency",
        ))
        .expect("valid histogram definition");

        registry
            .register(Box::new(requests_total.clone()))
            .expect("register api_requests_total");
        registry
            .register(Box::new(request_duration.clone()))
            .expect("register api_request_duration_seconds");

        Self {
            registry,
            requests_total,
            request_duration,
        }
    }

    /// Record one request outcome. Fire-and-forget: increments are atomic and
    /// infallible, so this can never affect the response being built.
    pub fn record(&self, endpoint: &str, status: &str, duration: Duration) {
        self.requests_total
            .with_label_values(&[endpoint, status])
            .inc();
        self.request_duration.observe(duration.as_secs_f64());
    }

    /// Render the registry in the prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_outcomes_show_up_in_exposition() {
        let metrics = Metrics::new();
        metrics.record("gemini-proxy", "success", Duration::from_millis(42));
        metrics.record("gemini-proxy", "error", Duration::from_millis(7));
        metrics.record("auth", "error", Duration::from_millis(1));

        let text = metrics.render().unwrap();
        assert!(text.contains(
            r#"api_requests_total{endpoint="gemini-proxy",status="success"} 1"#
        ));
        assert!(text.contains(r#"api_requests_total{endpoint="auth",status="error"} 1"#));
        assert!(text.contains("api_request_duration_seconds_count 3"));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = std::sync::Arc::new(Metrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        m.record("gemini-proxy", "success", Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let text = metrics.render().unwrap();
        assert!(text.contains(
            r#"api_requests_total{endpoint="gemini-proxy",status="success"} 800"#
        ));
    }
}
