//! Prometheus metrics for the service
//!
//! Each `Metrics` owns its own registry, so independent instances never share
//! counts. Handles are cheap to clone and all clones report into the same registry.

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::{AppError, AppResult};

const HTTP_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.0, 5.0];
const DB_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0];

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_request_duration: HistogramVec,
    http_request_errors: IntCounterVec,
    articles_created: IntCounterVec,
    recommendations_generated: IntCounterVec,
    ai_summaries_generated: IntCounterVec,
    db_query_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(HTTP_BUCKETS.to_vec()),
            &["method", "route", "status_code"],
        )?;
        let http_request_errors = IntCounterVec::new(
            Opts::new("http_request_errors_total", "Total number of HTTP request errors"),
            &["method", "route", "error_type"],
        )?;
        let articles_created = IntCounterVec::new(
            Opts::new("articles_created_total", "Total number of articles created"),
            &["with_ai_summary"],
        )?;
        let recommendations_generated = IntCounterVec::new(
            Opts::new(
                "recommendations_generated_total",
                "Total number of recommendation responses generated",
            ),
            &["strategy"],
        )?;
        let ai_summaries_generated = IntCounterVec::new(
            Opts::new(
                "ai_summaries_generated_total",
                "Total number of summarizer calls",
            ),
            &["provider", "success"],
        )?;
        let db_query_duration = HistogramVec::new(
            HistogramOpts::new(
                "db_query_duration_seconds",
                "Duration of store operations in seconds",
            )
            .buckets(DB_BUCKETS.to_vec()),
            &["operation", "collection"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(http_request_errors.clone()))?;
        registry.register(Box::new(articles_created.clone()))?;
        registry.register(Box::new(recommendations_generated.clone()))?;
        registry.register(Box::new(ai_summaries_generated.clone()))?;
        registry.register(Box::new(db_query_duration.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_request_duration,
            http_request_errors,
            articles_created,
            recommendations_generated,
            ai_summaries_generated,
            db_query_duration,
        })
    }

    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        let status = status.to_string();
        let labels = [method, route, status.as_str()];
        self.http_requests.with_label_values(&labels).inc();
        self.http_request_duration
            .with_label_values(&labels)
            .observe(duration.as_secs_f64());
    }

    pub fn record_http_error(&self, method: &str, route: &str, error_type: &str) {
        self.http_request_errors
            .with_label_values(&[method, route, error_type])
            .inc();
    }

    pub fn record_article_created(&self, with_ai_summary: bool) {
        self.articles_created
            .with_label_values(&[bool_label(with_ai_summary)])
            .inc();
    }

    pub fn record_recommendation_generated(&self, strategy: &str) {
        self.recommendations_generated
            .with_label_values(&[strategy])
            .inc();
    }

    pub fn record_ai_summary(&self, provider: &str, success: bool) {
        self.ai_summaries_generated
            .with_label_values(&[provider, bool_label(success)])
            .inc();
    }

    pub fn record_db_query(&self, operation: &str, collection: &str, duration: Duration) {
        self.db_query_duration
            .with_label_values(&[operation, collection])
            .observe(duration.as_secs_f64());
    }

    /// Content type of [`Metrics::render`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::Internal(format!("Metrics encoding error: {}", e)))
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Counts every request and its latency, labelled by the matched route
///
/// Requests that match no route are reported under `unmatched` so arbitrary
/// paths cannot inflate the label set.
pub async fn track_http_metrics(
    State(metrics): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status();
    metrics.record_http_request(&method, &route, status.as_u16(), start.elapsed());
    if status.is_client_error() || status.is_server_error() {
        let error_type = status.canonical_reason().unwrap_or("Unknown");
        metrics.record_http_error(&method, &route, error_type);
    }

    response
}
