use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::courses::list_courses;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /api/courses
///
/// Returns every course record, or `[]` when the tab holds no data rows.
/// Failures are logged; the client only sees a generic message.
pub async fn get_courses(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /api/courses");

    match list_courses(s.store.as_ref()).await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => {
            error!("Failed to fetch courses: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch courses",
                None,
            ))
            .into_response()
        }
    }
}
