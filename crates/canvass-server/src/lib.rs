//! Canvass Server — HTTP transport for the access decision service.
//!
//! Routes:
//! - `POST /v1/security-check` — decide whether a write may proceed
//! - `GET /health` — liveness probe

pub mod config;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::{get, post};
use canvass_access::AccessDecisionService;
use canvass_core::repository::{AuditLogRepository, DeviceStateRepository, IdentityRepository};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use handlers::{CheckResponse, HealthCheckResponse};

/// CORS for the mobile client. Any origin is allowed unless a list is
/// configured; unparsable entries are skipped.
pub fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origin = match allowed_origins {
        Some(origins) => AllowOrigin::list(origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::warn!(origin = %o, error = %e, "Ignoring invalid origin"))
                .ok()
        })),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

pub fn app<I, D, A>(service: Arc<AccessDecisionService<I, D, A>>, cors: CorsLayer) -> Router
where
    I: IdentityRepository + 'static,
    D: DeviceStateRepository + 'static,
    A: AuditLogRepository + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/v1/security-check",
            post(handlers::security_check::<I, D, A>),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
