use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::booking::{create_booking, BookingRequest};
use crate::types::AppState;

/// POST /api/booking
///
/// Records a booking and returns its assigned id. A missing or unparsable
/// body is treated as empty and fails the required-field check.
pub async fn post_booking(
    State(s): State<Arc<AppState>>,
    body: Option<Json<BookingRequest>>,
) -> Response {
    info!("POST /api/booking");

    let request = body.map(|Json(b)| b).unwrap_or_default();

    match create_booking(s.store.as_ref(), &request).await {
        Ok(confirmation) => (StatusCode::OK, Json(confirmation)).into_response(),
        Err(e) => {
            error!("Failed to create booking: {}", e);
            e.into_response()
        }
    }
}
