// src/services/reports_service.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ReportsRepository,
    models::reports::{MonthlyRevenueEntry, TopClientEntry},
};

// Relatórios agregados: o trabalho pesado é do Postgres; aqui só
// aplicamos os defaults da API.

const DEFAULT_TOP_CLIENTS: i64 = 10;

#[derive(Clone)]
pub struct ReportsService {
    repo: ReportsRepository,
}

impl ReportsService {
    pub fn new(repo: ReportsRepository) -> Self {
        Self { repo }
    }

    pub async fn monthly_revenue<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<MonthlyRevenueEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .monthly_revenue(executor, owner_id, start_date, end_date)
            .await
    }

    pub async fn top_clients<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: Option<i64>,
    ) -> Result<Vec<TopClientEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let limit = limit.unwrap_or(DEFAULT_TOP_CLIENTS).clamp(1, 100);
        self.repo
            .top_clients(executor, owner_id, start_date, end_date, limit)
            .await
    }
}
