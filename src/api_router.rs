//! API Router
//!
//! Combines the per-entity routers into the unified /api surface and wires
//! the cross-cutting layers (auth guard, CORS, request logging).

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::info;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::shared::state::AppState;

/// Entity and dashboard routes, bearer-guarded; login stays outside the
/// guard so a client can obtain a token.
pub fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let guarded = Router::new()
        .nest("/team-members", crate::team::configure())
        .nest("/leads", crate::leads::configure())
        .nest("/tasks", crate::tasks::configure())
        .nest("/bids", crate::bids::configure())
        .nest("/outreach", crate::outreach::configure())
        .nest("/dashboard", crate::dashboard::configure())
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::auth::require_auth,
        ));

    Router::new()
        .nest("/auth", crate::auth::configure())
        .merge(guarded)
}

pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// One log line per API request: method, path, status, duration.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    if path.starts_with("/api") {
        info!(
            "{} {} {} in {}ms",
            method,
            path,
            response.status().as_u16(),
            start.elapsed().as_millis()
        );
    }
    response
}

/// The full application: health endpoints, the /api surface, cross-cutting
/// layers and (when the bundle directory exists) SPA static hosting.
pub fn build_app(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(crate::web_server::health_check))
        .route("/healthz", get(crate::web_server::health_check_simple))
        .nest("/api", configure_api_routes(state.clone()))
        .layer(middleware::from_fn(log_requests))
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    if let Some(spa) = crate::web_server::spa_service(&state.config.ui) {
        app = app.fallback_service(spa);
    }
    app
}
