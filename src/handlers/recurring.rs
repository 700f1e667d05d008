// src/handlers/recurring.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_owner_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::billing::{CreateRecurringPayload, Document, RecurringStatus, RecurringTemplate},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplatesQuery {
    pub status: Option<RecurringStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateStatusPayload {
    pub status: RecurringStatus,
}

// POST /api/billing/recurring
#[utoipa::path(
    post,
    path = "/api/billing/recurring",
    tag = "Recorrência",
    request_body = CreateRecurringPayload,
    responses(
        (status = 201, description = "Modelo de recorrência criado", body = RecurringTemplate),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateRecurringPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let template = app_state
        .recurrence_service
        .create_template(&mut *conn, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(template)))
}

// GET /api/billing/recurring
#[utoipa::path(
    get,
    path = "/api/billing/recurring",
    tag = "Recorrência",
    params(ListTemplatesQuery),
    responses(
        (status = 200, description = "Modelos de recorrência", body = Vec<RecurringTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let templates = app_state
        .recurrence_service
        .list_templates(&mut *conn, user.0.id, query.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(templates)))
}

// GET /api/billing/recurring/{id}
#[utoipa::path(
    get,
    path = "/api/billing/recurring/{id}",
    tag = "Recorrência",
    params(("id" = Uuid, Path, description = "ID do modelo")),
    responses(
        (status = 200, description = "Modelo de recorrência", body = RecurringTemplate),
        (status = 404, description = "Modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_template(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let template = app_state
        .recurrence_service
        .get_template(&mut *conn, user.0.id, template_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(template)))
}

// PATCH /api/billing/recurring/{id}/status
#[utoipa::path(
    patch,
    path = "/api/billing/recurring/{id}/status",
    tag = "Recorrência",
    params(("id" = Uuid, Path, description = "ID do modelo")),
    request_body = UpdateTemplateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado (pausa/retomada)", body = RecurringTemplate),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_template_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let template = app_state
        .recurrence_service
        .set_template_status(&mut *conn, user.0.id, template_id, payload.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(template)))
}

// POST /api/billing/recurring/run
#[utoipa::path(
    post,
    path = "/api/billing/recurring/run",
    tag = "Recorrência",
    responses(
        (status = 200, description = "Faturas geradas (inclui o catch-up de instâncias atrasadas)", body = Vec<Document>)
    ),
    security(("api_jwt" = []))
)]
pub async fn run_recurrence(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let generated = app_state
        .recurrence_service
        .run_for_owner(&mut *conn, user.0.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(generated)))
}
