// src/handlers/academics.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_owner_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::academics::{
        Assessment, CreateAssessmentPayload, CreateReportCardPayload, ReportCard,
        ReportCardDetail, ReportCardStatus,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAssessmentsQuery {
    pub term: Option<i16>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverageQuery {
    pub term: i16,
    pub year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverageResponse {
    #[schema(example = "Matemática")]
    pub subject: String,
    #[schema(example = "70.00")]
    pub average: rust_decimal::Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportCardStatusPayload {
    pub status: ReportCardStatus,
}

// =============================================================================
//  AVALIAÇÕES
// =============================================================================

// POST /api/academics/assessments
#[utoipa::path(
    post,
    path = "/api/academics/assessments",
    tag = "Acadêmico",
    request_body = CreateAssessmentPayload,
    responses(
        (status = 201, description = "Avaliação lançada", body = Assessment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_assessment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateAssessmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assessment = app_state
        .academics_service
        .create_assessment(&mut *conn, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(assessment)))
}

// GET /api/academics/students/{id}/assessments
#[utoipa::path(
    get,
    path = "/api/academics/students/{id}/assessments",
    tag = "Acadêmico",
    params(
        ("id" = Uuid, Path, description = "ID do aluno"),
        ListAssessmentsQuery
    ),
    responses(
        (status = 200, description = "Avaliações do aluno", body = Vec<Assessment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_assessments(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Query(query): Query<ListAssessmentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assessments = app_state
        .academics_service
        .list_assessments(&mut *conn, user.0.id, student_id, query.term, query.year)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(assessments)))
}

// DELETE /api/academics/assessments/{id}
#[utoipa::path(
    delete,
    path = "/api/academics/assessments/{id}",
    tag = "Acadêmico",
    params(("id" = Uuid, Path, description = "ID da avaliação")),
    responses(
        (status = 204, description = "Avaliação removida"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_assessment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(assessment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .academics_service
        .delete_assessment(&mut *conn, user.0.id, assessment_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/academics/students/{id}/subjects/{subject}/average
#[utoipa::path(
    get,
    path = "/api/academics/students/{id}/subjects/{subject}/average",
    tag = "Acadêmico",
    params(
        ("id" = Uuid, Path, description = "ID do aluno"),
        ("subject" = String, Path, description = "Matéria"),
        SubjectAverageQuery
    ),
    responses(
        (status = 200, description = "Média ponderada da matéria no período", body = SubjectAverageResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn subject_average(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((student_id, subject)): Path<(Uuid, String)>,
    Query(query): Query<SubjectAverageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let average = app_state
        .academics_service
        .subject_average(&mut *conn, user.0.id, student_id, &subject, query.term, query.year)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(SubjectAverageResponse { subject, average })))
}

// =============================================================================
//  BOLETINS
// =============================================================================

// POST /api/academics/report-cards
#[utoipa::path(
    post,
    path = "/api/academics/report-cards",
    tag = "Acadêmico",
    request_body = CreateReportCardPayload,
    responses(
        (status = 201, description = "Boletim gerado com as médias congeladas", body = ReportCardDetail),
        (status = 404, description = "Aluno não encontrado"),
        (status = 409, description = "Já existe boletim para o período")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_report_card(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateReportCardPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .academics_service
        .create_report_card(&mut *conn, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/academics/report-cards/{id}
#[utoipa::path(
    get,
    path = "/api/academics/report-cards/{id}",
    tag = "Acadêmico",
    params(("id" = Uuid, Path, description = "ID do boletim")),
    responses(
        (status = 200, description = "Boletim completo", body = ReportCardDetail),
        (status = 404, description = "Boletim não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report_card(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(report_card_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .academics_service
        .get_report_card(&mut *conn, user.0.id, report_card_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// GET /api/academics/students/{id}/report-cards
#[utoipa::path(
    get,
    path = "/api/academics/students/{id}/report-cards",
    tag = "Acadêmico",
    params(("id" = Uuid, Path, description = "ID do aluno")),
    responses(
        (status = 200, description = "Boletins do aluno", body = Vec<ReportCard>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_report_cards(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let cards = app_state
        .academics_service
        .list_report_cards(&mut *conn, user.0.id, student_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(cards)))
}

// PATCH /api/academics/report-cards/{id}/status
#[utoipa::path(
    patch,
    path = "/api/academics/report-cards/{id}/status",
    tag = "Acadêmico",
    params(("id" = Uuid, Path, description = "ID do boletim")),
    request_body = UpdateReportCardStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = ReportCard),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_report_card_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(report_card_id): Path<Uuid>,
    Json(payload): Json<UpdateReportCardStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let card = app_state
        .academics_service
        .update_report_card_status(&mut *conn, user.0.id, report_card_id, payload.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(card)))
}
