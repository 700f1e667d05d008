// src/handlers/billing.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_owner_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::billing::{
        CreateDocumentPayload, Document, DocumentDetail, DocumentKind, DocumentStatus,
        LineItemPayload,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub kind: Option<DocumentKind>,
    pub status: Option<DocumentStatus>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    // Default: hoje
    #[schema(value_type = Option<String>, format = Date)]
    pub paid_date: Option<NaiveDate>,
}

// =============================================================================
//  DOCUMENTOS (Faturas e Notas de Crédito)
// =============================================================================

// POST /api/billing/documents
#[utoipa::path(
    post,
    path = "/api/billing/documents",
    tag = "Faturamento",
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Documento criado com número sequencial e totais derivados", body = DocumentDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .billing_service
        .create_document(&mut *conn, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/billing/documents
#[utoipa::path(
    get,
    path = "/api/billing/documents",
    tag = "Faturamento",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Documentos (faturas vencidas já marcadas OVERDUE)", body = Vec<Document>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let documents = app_state
        .billing_service
        .list_documents(&mut *conn, user.0.id, query.kind, query.status, query.client_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(documents)))
}

// GET /api/billing/documents/{id}
#[utoipa::path(
    get,
    path = "/api/billing/documents/{id}",
    tag = "Faturamento",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Documento completo", body = DocumentDetail),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .billing_service
        .get_document(&mut *conn, user.0.id, document_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/billing/documents/{id}/send
#[utoipa::path(
    post,
    path = "/api/billing/documents/{id}/send",
    tag = "Faturamento",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Fatura enviada (ou nota de crédito emitida)", body = Document),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .billing_service
        .send_document(&mut *conn, user.0.id, document_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(document)))
}

// POST /api/billing/documents/{id}/payment
#[utoipa::path(
    post,
    path = "/api/billing/documents/{id}/payment",
    tag = "Faturamento",
    params(("id" = Uuid, Path, description = "ID do documento")),
    request_body = RecordPaymentPayload,
    responses(
        (status = 200, description = "Pagamento registrado", body = Document),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .billing_service
        .record_payment(&mut *conn, user.0.id, document_id, payload.paid_date)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(document)))
}

// =============================================================================
//  ITENS DE LINHA
// =============================================================================

// POST /api/billing/documents/{id}/items
#[utoipa::path(
    post,
    path = "/api/billing/documents/{id}/items",
    tag = "Faturamento",
    params(("id" = Uuid, Path, description = "ID do documento")),
    request_body = LineItemPayload,
    responses(
        (status = 200, description = "Item adicionado; totais recalculados", body = DocumentDetail),
        (status = 409, description = "Documento não é rascunho")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_line_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<LineItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .billing_service
        .add_line_item(&mut *conn, user.0.id, document_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/billing/documents/{id}/items/{item_id}
#[utoipa::path(
    put,
    path = "/api/billing/documents/{id}/items/{item_id}",
    tag = "Faturamento",
    params(
        ("id" = Uuid, Path, description = "ID do documento"),
        ("item_id" = Uuid, Path, description = "ID do item")
    ),
    request_body = LineItemPayload,
    responses(
        (status = 200, description = "Item atualizado; totais recalculados", body = DocumentDetail),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Documento não é rascunho")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_line_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((document_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<LineItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .billing_service
        .update_line_item(&mut *conn, user.0.id, document_id, item_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// DELETE /api/billing/documents/{id}/items/{item_id}
#[utoipa::path(
    delete,
    path = "/api/billing/documents/{id}/items/{item_id}",
    tag = "Faturamento",
    params(
        ("id" = Uuid, Path, description = "ID do documento"),
        ("item_id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 200, description = "Item removido; totais recalculados", body = DocumentDetail),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Documento não é rascunho")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_line_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((document_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .billing_service
        .remove_line_item(&mut *conn, user.0.id, document_id, item_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}
