use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::{
    metrics::track_http_metrics,
    middleware::request_id::{make_span_with_request_id, request_id_middleware, REQUEST_ID_HEADER},
};

/// Creates the application router with all routes
///
/// Every request gets a request id before the trace span is opened, so the
/// span and the response both carry it. Request metrics are recorded per
/// matched route.
pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes())
        .route_layer(middleware::from_fn_with_state(metrics, track_http_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Articles
        .route(
            "/articles",
            post(handlers::create_article).get(handlers::list_articles),
        )
        .route("/articles/:id", get(handlers::get_article))
        // Users
        .route("/users", post(handlers::create_user).get(handlers::list_users))
        .route("/users/:id", get(handlers::get_user))
        // Interactions
        .route("/interactions", post(handlers::create_interaction))
        .route(
            "/interactions/user/:user_id",
            get(handlers::get_user_interactions),
        )
        .route(
            "/interactions/article/:article_id",
            get(handlers::get_article_interactions),
        )
        // Recommendations
        .route(
            "/recommendations/:user_id",
            get(handlers::get_recommendations),
        )
}

/// CORS policy for the API; any origin when none is configured
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    Ok(match origin {
        Some(origin) => cors.allow_origin(origin.parse::<HeaderValue>()?),
        None => cors.allow_origin(Any),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_origins() {
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some("https://curator.example.com")).is_ok());
        assert!(cors_layer(Some("bad\norigin")).is_err());
    }
}
