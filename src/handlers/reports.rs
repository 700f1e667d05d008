// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{db_utils::get_owner_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::reports::{MonthlyRevenueEntry, TopClientEntry},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TopClientsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub limit: Option<i64>,
}

// GET /api/reports/revenue/monthly
#[utoipa::path(
    get,
    path = "/api/reports/revenue/monthly",
    tag = "Relatórios",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Receita paga agregada por mês", body = Vec<MonthlyRevenueEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let data = app_state
        .reports_service
        .monthly_revenue(&mut *conn, user.0.id, query.start_date, query.end_date)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(data)))
}

// GET /api/reports/clients/top
#[utoipa::path(
    get,
    path = "/api/reports/clients/top",
    tag = "Relatórios",
    params(TopClientsQuery),
    responses(
        (status = 200, description = "Clientes por receita paga no período", body = Vec<TopClientEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn top_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<TopClientsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_owner_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let data = app_state
        .reports_service
        .top_clients(&mut *conn, user.0.id, query.start_date, query.end_date, query.limit)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(data)))
}
