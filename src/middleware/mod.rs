use axum::http::{header, HeaderValue, Method};
use axum::{http, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::config::Config;
use crate::state::AppState;

/// Default layers for the whole router: the CORS policy for browser clients
/// plus HTTP trace logging (request/response + latency).
pub fn with_defaults(router: Router<AppState>, config: &Config) -> Router<AppState> {
    let router = router.layer(cors_layer(config));
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().path().to_string();
                tracing::span!(Level::INFO, "http", %method, %uri)
            })
            .on_response(
                |res: &http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::info!(
                        status = %res.status(),
                        elapsed_ms = latency.as_millis() as u64,
                        "response"
                    );
                },
            ),
    )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
