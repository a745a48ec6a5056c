//! Notification trigger endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::dispatch::SendNotificationRequest;
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    /// Whether the notification was queued; delivery happens out-of-band
    pub success: bool,
    /// The queued notification row
    pub id: Uuid,
}

/// POST /communications/notification - queue a notification for an event
#[tracing::instrument(
    name = "http.send_notification",
    skip(state, request),
    fields(event_id = %request.event_id)
)]
pub async fn send_notification(
    State(state): State<AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<SendNotificationResponse>), AppError> {
    let id = state.dispatch.send_notification(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SendNotificationResponse { success: true, id }),
    ))
}
