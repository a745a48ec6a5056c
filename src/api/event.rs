//! Event catalog CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::event::{
    CreateEventRequest, EventListResponse, EventStore, NotificationEvent, UpdateEventRequest,
};
use crate::server::AppState;

/// POST /communications/event - Create an event
#[tracing::instrument(name = "http.create_event", skip(state, request))]
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<NotificationEvent>), AppError> {
    let event: NotificationEvent = request.into();
    event.validate()?;

    state.events.upsert(event.clone()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /communications/event - List events
#[tracing::instrument(name = "http.list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<EventListResponse>, AppError> {
    let events = state.events.list().await?;
    let total = events.len();
    Ok(Json(EventListResponse { events, total }))
}

/// GET /communications/event/{id} - Get an event
#[tracing::instrument(name = "http.get_event", skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationEvent>, AppError> {
    state
        .events
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Event {id}")))
}

/// PUT /communications/event/{id} - Update an event
#[tracing::instrument(name = "http.update_event", skip(state, request))]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<NotificationEvent>, AppError> {
    let mut event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {id}")))?;

    if let Some(name) = request.name {
        event.name = name;
    }
    if let Some(description) = request.description {
        event.description = description;
    }
    if let Some(email) = request.email {
        event.email = email;
    }
    if let Some(sms) = request.sms {
        event.sms = sms;
    }
    if let Some(priority) = request.priority {
        event.priority = priority;
    }
    if let Some(parameters) = request.parameters {
        event.parameters = parameters;
    }

    event.updated_at = Utc::now();
    event.validate()?;

    state.events.upsert(event.clone()).await?;
    Ok(Json(event))
}

/// DELETE /communications/event/{id} - Delete an event
#[tracing::instrument(name = "http.delete_event", skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    // Refuses while a still-pending notification references the event
    state.dispatch.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
