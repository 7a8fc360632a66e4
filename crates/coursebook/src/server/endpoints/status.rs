use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

/// GET /
///
/// Lists the available endpoints.
pub async fn get_index() -> Response {
    info!("GET /");

    (
        StatusCode::OK,
        Json(json!({
            "message": "theDev Backend API",
            "docs": {
                "health": "/api/health",
                "feedback": "/api/feedback",
                "feedback (submit)": "/api/feedback",
                "feedback (mock)": "/api/feedback/mock",
                "courses": "/api/courses",
                "booking": "/api/booking",
            },
        })),
    )
        .into_response()
}

/// GET /api/health
pub async fn get_health() -> Response {
    info!("GET /api/health");

    (
        StatusCode::OK,
        Json(json!({ "ok": true, "message": "Backend running" })),
    )
        .into_response()
}
