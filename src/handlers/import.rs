// src/handlers/import.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{db_utils::get_owner_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{clients::Client, students::Student},
};

// O corpo é o CSV bruto (text/csv). A importação é atômica: uma linha
// inválida e nada é persistido.

// POST /api/import/students
#[utoipa::path(
    post,
    path = "/api/import/students",
    tag = "Importação",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "Alunos importados", body = Vec<Student>),
        (status = 400, description = "CSV inválido (colunas faltando ou linha malformada)")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_students(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let students = app_state
        .import_service
        .import_students(&mut *conn, user.0.id, &body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(students)))
}

// POST /api/import/clients
#[utoipa::path(
    post,
    path = "/api/import/clients",
    tag = "Importação",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "Clientes importados", body = Vec<Client>),
        (status = 400, description = "CSV inválido (colunas faltando ou linha malformada)")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let clients = app_state
        .import_service
        .import_clients(&mut *conn, user.0.id, &body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(clients)))
}
