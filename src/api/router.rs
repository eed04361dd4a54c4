//! HTTP API router.
//!
//! Returns a composable `Router` with every endpoint nested under `/api/`.
//! Layers (outermost first): CORS, request tracing, identity.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router around shared core state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    // Static segments win over params, so `/history/export.csv` is not
    // captured by `/history/:id`.
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/suggestions", get(endpoints::suggestions::search))
        .route("/alerts", post(endpoints::alerts::scan))
        .route("/analyze", post(endpoints::analysis::analyze))
        .route("/render", post(endpoints::analysis::render))
        .route("/batch", post(endpoints::batch::submit))
        .route("/batch/:id", get(endpoints::batch::status))
        .route(
            "/history",
            get(endpoints::history::list).delete(endpoints::history::clear),
        )
        .route(
            "/history/export.csv",
            get(endpoints::history::export_history_csv),
        )
        .route(
            "/history/:id",
            get(endpoints::history::detail).delete(endpoints::history::remove),
        )
        .route(
            "/history/:id/export.csv",
            get(endpoints::history::export_entry_csv),
        )
        .route(
            "/history/:id/export.pdf",
            get(endpoints::history::export_entry_pdf),
        )
        .route("/fhir/import", post(endpoints::fhir::import))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::identity::attach_user));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
