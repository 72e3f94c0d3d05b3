use crate::handlers::{commentary, health, matches, ws};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/matches", get(matches::list_matches))
        .route("/matches/start", post(matches::start_match))
        .route("/matches/{id}", get(matches::get_match))
        .route("/matches/{id}/stats", get(matches::get_stats))
        .route("/matches/{id}/pause", post(matches::pause_match))
        .route("/matches/{id}/resume", post(matches::resume_match))
        .route(
            "/matches/{id}/commentary",
            get(commentary::list_commentary).post(commentary::add_commentary),
        )
        .route(
            "/matches/{id}/commentary/recent",
            get(commentary::recent_commentary),
        )
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
