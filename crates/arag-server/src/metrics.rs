//! Request metrics in Prometheus text format

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

use crate::state::AppState;

/// Label used for requests that matched no route
const UNMATCHED_HANDLER: &str = "none";

#[derive(Default)]
struct Latency {
    sum: f64,
    count: u64,
}

/// Request counters by method, handler and status class, and latency by handler
#[derive(Default)]
pub struct Metrics {
    requests: DashMap<(String, String, String), u64>,
    latency: DashMap<String, Latency>,
}

impl Metrics {
    pub fn record(&self, method: &str, handler: &str, status: u16, elapsed: Duration) {
        let status_class = format!("{}xx", status / 100);
        *self
            .requests
            .entry((handler.to_string(), method.to_string(), status_class))
            .or_insert(0) += 1;

        let mut latency = self.latency.entry(handler.to_string()).or_default();
        latency.sum += elapsed.as_secs_f64();
        latency.count += 1;
    }

    /// Render every series, sorted by labels
    pub fn render(&self) -> String {
        let mut requests: Vec<_> = self
            .requests
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        requests.sort();

        let mut latency: Vec<_> = self
            .latency
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().sum, entry.value().count))
            .collect();
        latency.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        out.push_str("# HELP http_requests_total Total number of requests by method, status and handler.\n");
        out.push_str("# TYPE http_requests_total counter\n");
        for ((handler, method, status), count) in requests {
            let _ = writeln!(
                out,
                "http_requests_total{{handler=\"{}\",method=\"{}\",status=\"{}\"}} {}",
                handler, method, status, count
            );
        }

        out.push_str("# HELP http_request_duration_seconds Latency of HTTP requests by handler.\n");
        out.push_str("# TYPE http_request_duration_seconds summary\n");
        for (handler, sum, count) in latency {
            let _ = writeln!(
                out,
                "http_request_duration_seconds_sum{{handler=\"{}\"}} {}",
                handler, sum
            );
            let _ = writeln!(
                out,
                "http_request_duration_seconds_count{{handler=\"{}\"}} {}",
                handler, count
            );
        }
        out
    }
}

pub async fn track(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let handler = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_HANDLER.to_string());

    let response = next.run(request).await;
    state
        .metrics
        .record(&method, &handler, response.status().as_u16(), started.elapsed());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_groups_status_classes() {
        let metrics = Metrics::default();
        metrics.record("POST", "/query", 200, Duration::from_millis(500));
        metrics.record("POST", "/query", 201, Duration::from_millis(250));
        metrics.record("GET", "/health", 503, Duration::from_millis(0));

        assert_eq!(
            metrics.render(),
            "# HELP http_requests_total Total number of requests by method, status and handler.\n\
             # TYPE http_requests_total counter\n\
             http_requests_total{handler=\"/health\",method=\"GET\",status=\"5xx\"} 1\n\
             http_requests_total{handler=\"/query\",method=\"POST\",status=\"2xx\"} 2\n\
             # HELP http_request_duration_seconds Latency of HTTP requests by handler.\n\
             # TYPE http_request_duration_seconds summary\n\
             http_request_duration_seconds_sum{handler=\"/health\"} 0\n\
             http_request_duration_seconds_count{handler=\"/health\"} 1\n\
             http_request_duration_seconds_sum{handler=\"/query\"} 0.75\n\
             http_request_duration_seconds_count{handler=\"/query\"} 2\n"
        );
    }
}
