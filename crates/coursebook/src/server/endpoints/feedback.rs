use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::feedback::{list_feedback, submit_feedback, submit_mock_feedback, tab_for_query};
use crate::mapping::Record;
use crate::types::AppState;

/// POST /api/feedback
///
/// Appends one report to the tab named by the body's project field.
pub async fn post_feedback(
    State(s): State<Arc<AppState>>,
    body: Option<Json<Record>>,
) -> Response {
    info!("POST /api/feedback");

    let body = body.map(|Json(b)| b).unwrap_or_default();

    match submit_feedback(s.store.as_ref(), &body).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => {
            error!("Failed to write feedback: {}", e);
            e.into_response()
        }
    }
}

/// GET /api/feedback
///
/// Query parameters:
/// - `project` (or `专案` / `專案` / `项目`, optional): project whose tab to read
pub async fn get_feedback(
    State(s): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let tab = tab_for_query(|key| params.get(key).map(String::as_str));
    info!("GET /api/feedback (tab={})", tab);

    match list_feedback(s.store.as_ref(), &tab).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!("Failed to read feedback from {}: {}", tab, e);
            e.into_response()
        }
    }
}

/// GET|POST /api/feedback/mock
///
/// Writes one randomly generated report to the default tab.
pub async fn submit_mock(State(s): State<Arc<AppState>>) -> Response {
    info!("/api/feedback/mock");

    match submit_mock_feedback(s.store.as_ref()).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => {
            error!("Failed to write mock feedback: {}", e);
            e.into_response()
        }
    }
}
