// src/db/reports_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reports::{MonthlyRevenueEntry, TopClientEntry},
};

#[derive(Clone)]
pub struct ReportsRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Receita (faturas pagas) agregada por mês de pagamento.
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
        let data = sqlx::query_as::<_, MonthlyRevenueEntry>(
            r#"
            SELECT
                to_char(paid_date, 'YYYY-MM') AS month,
                SUM(total) AS total
            FROM documents
            WHERE owner_id = $1 AND kind = 'INVOICE' AND status = 'PAID'
              AND paid_date BETWEEN $2 AND $3
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(owner_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(executor)
        .await?;

        Ok(data)
    }

    /// Ranking de clientes por receita paga no período.
    pub async fn top_clients<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TopClientEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data = sqlx::query_as::<_, TopClientEntry>(
            r#"
            SELECT
                c.id AS client_id,
                c.name AS client_name,
                COUNT(d.id) AS invoice_count,
                SUM(d.total) AS total_revenue
            FROM documents d
            JOIN clients c ON d.client_id = c.id
            WHERE d.owner_id = $1 AND d.kind = 'INVOICE' AND d.status = 'PAID'
              AND d.paid_date BETWEEN $2 AND $3
            GROUP BY c.id, c.name
            ORDER BY total_revenue DESC
            LIMIT $4
            "#,
        )
        .bind(owner_id)
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(data)
    }
}
