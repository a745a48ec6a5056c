//! Template CRUD endpoints.
//!
//! Email and SMS templates share one storage model; the two endpoint
//! families pin the channel so an SMS handler can never touch an email
//! template and vice versa.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::server::AppState;
use crate::template::{
    CreateTemplateRequest, MessageTemplate, TemplateListResponse, TemplateStore, TemplateType,
    UpdateTemplateRequest,
};

async fn create_template(
    state: &AppState,
    request: CreateTemplateRequest,
    template_type: TemplateType,
) -> Result<(StatusCode, Json<MessageTemplate>), AppError> {
    let template = request.into_template(template_type);
    template.validate()?;

    state.templates.upsert(template.clone()).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn get_template(
    state: &AppState,
    id: Uuid,
    template_type: TemplateType,
) -> Result<Json<MessageTemplate>, AppError> {
    match state.templates.get(id).await? {
        Some(template) if template.template_type == template_type => Ok(Json(template)),
        _ => Err(AppError::NotFound(format!("{template_type} template {id}"))),
    }
}

async fn list_templates(
    state: &AppState,
    template_type: TemplateType,
) -> Result<Json<TemplateListResponse>, AppError> {
    let templates = state.templates.list(Some(template_type)).await?;
    let total = templates.len();
    Ok(Json(TemplateListResponse { templates, total }))
}

async fn update_template(
    state: &AppState,
    id: Uuid,
    updates: UpdateTemplateRequest,
    template_type: TemplateType,
) -> Result<Json<MessageTemplate>, AppError> {
    let mut template = match state.templates.get(id).await? {
        Some(template) if template.template_type == template_type => template,
        _ => return Err(AppError::NotFound(format!("{template_type} template {id}"))),
    };

    if let Some(name) = updates.name {
        template.name = name;
    }
    if let Some(content) = updates.content {
        template.content = content;
    }
    if let Some(variables) = updates.variables {
        template.variables = variables;
    }

    template.updated_at = Utc::now();
    template.validate()?;

    state.templates.upsert(template.clone()).await?;
    Ok(Json(template))
}

async fn delete_template(
    state: &AppState,
    id: Uuid,
    template_type: TemplateType,
) -> Result<StatusCode, AppError> {
    match state.templates.get(id).await? {
        Some(template) if template.template_type == template_type => {}
        _ => return Err(AppError::NotFound(format!("{template_type} template {id}"))),
    }

    // Refuses while a still-pending notification depends on the template
    state.dispatch.delete_template(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /communications/email - Create an email template
#[tracing::instrument(name = "http.create_email_template", skip(state, request))]
pub async fn create_email_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<MessageTemplate>), AppError> {
    create_template(&state, request, TemplateType::Email).await
}

/// GET /communications/email - List email templates
#[tracing::instrument(name = "http.list_email_templates", skip(state))]
pub async fn list_email_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    list_templates(&state, TemplateType::Email).await
}

/// GET /communications/email/{id} - Get an email template
#[tracing::instrument(name = "http.get_email_template", skip(state))]
pub async fn get_email_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageTemplate>, AppError> {
    get_template(&state, id, TemplateType::Email).await
}

/// PUT /communications/email/{id} - Update an email template
#[tracing::instrument(name = "http.update_email_template", skip(state, request))]
pub async fn update_email_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<MessageTemplate>, AppError> {
    update_template(&state, id, request, TemplateType::Email).await
}

/// DELETE /communications/email/{id} - Delete an email template
#[tracing::instrument(name = "http.delete_email_template", skip(state))]
pub async fn delete_email_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_template(&state, id, TemplateType::Email).await
}

/// POST /communications/sms - Create an SMS template
#[tracing::instrument(name = "http.create_sms_template", skip(state, request))]
pub async fn create_sms_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<MessageTemplate>), AppError> {
    create_template(&state, request, TemplateType::Sms).await
}

/// GET /communications/sms - List SMS templates
#[tracing::instrument(name = "http.list_sms_templates", skip(state))]
pub async fn list_sms_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    list_templates(&state, TemplateType::Sms).await
}

/// GET /communications/sms/{id} - Get an SMS template
#[tracing::instrument(name = "http.get_sms_template", skip(state))]
pub async fn get_sms_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageTemplate>, AppError> {
    get_template(&state, id, TemplateType::Sms).await
}

/// PUT /communications/sms/{id} - Update an SMS template
#[tracing::instrument(name = "http.update_sms_template", skip(state, request))]
pub async fn update_sms_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<MessageTemplate>, AppError> {
    update_template(&state, id, request, TemplateType::Sms).await
}

/// DELETE /communications/sms/{id} - Delete an SMS template
#[tracing::instrument(name = "http.delete_sms_template", skip(state))]
pub async fn delete_sms_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_template(&state, id, TemplateType::Sms).await
}
