use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{handlers, photos, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>, media_root: &Path) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Uploads. The pipeline enforces its own size limit; the body cap
        // only has to sit above it so oversized files get a 400, not a 413.
        .route(
            "/photos",
            post(photos::upload_photo).layer(DefaultBodyLimit::max(8 * 1024 * 1024)),
        )
        // Jobs
        .route("/jobs/{id}", get(photos::get_job))
        .route("/jobs/{id}/cancel", post(photos::cancel_job))
        // Records
        .route("/records/{owner_id}", get(photos::get_record))
        // Event stream
        .route("/events", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        // Originals and aged results are served straight from storage.
        .nest_service("/media", ServeDir::new(media_root))
        .layer(TraceLayer::new_for_http())
}
