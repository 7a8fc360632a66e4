use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::endpoints::{booking, courses, feedback, status};
use crate::types::AppState;

mod endpoints;
pub mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let feedback_router = Router::new()
        .route(
            "/feedback",
            get(feedback::get_feedback).post(feedback::post_feedback),
        )
        .route(
            "/feedback/mock",
            get(feedback::submit_mock).post(feedback::submit_mock),
        );

    let api_router = Router::new()
        .route("/health", get(status::get_health))
        .route("/courses", get(courses::get_courses))
        .route("/booking", post(booking::post_booking))
        .merge(feedback_router);

    Router::new()
        .route("/", get(status::get_index))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
