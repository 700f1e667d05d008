// src/db/academics_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::academics::{
        Assessment, CreateAssessmentPayload, CreateReportCardPayload, ReportCard,
        ReportCardStatus, ReportCardSubject,
    },
};

#[derive(Clone)]
pub struct AcademicsRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl AcademicsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  AVALIAÇÕES
    // =========================================================================

    pub async fn create_assessment<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateAssessmentPayload,
    ) -> Result<Assessment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            INSERT INTO assessments
                (owner_id, student_id, subject, term, year, kind, weight, score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(input.student_id)
        .bind(&input.subject)
        .bind(input.term)
        .bind(input.year)
        .bind(&input.kind)
        .bind(input.weight)
        .bind(input.score)
        .fetch_one(executor)
        .await?;

        Ok(assessment)
    }

    pub async fn list_assessments<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        term: Option<i16>,
        year: Option<i32>,
    ) -> Result<Vec<Assessment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assessments = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT * FROM assessments
            WHERE owner_id = $1 AND student_id = $2
              AND ($3::smallint IS NULL OR term = $3)
              AND ($4::integer IS NULL OR year = $4)
            ORDER BY subject ASC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .bind(student_id)
        .bind(term)
        .bind(year)
        .fetch_all(executor)
        .await?;

        Ok(assessments)
    }

    /// Avaliações de uma matéria em um período (entrada da média ponderada).
    pub async fn assessments_for_subject<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        subject: &str,
        term: i16,
        year: i32,
    ) -> Result<Vec<Assessment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assessments = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT * FROM assessments
            WHERE owner_id = $1 AND student_id = $2 AND subject = $3
              AND term = $4 AND year = $5
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .bind(student_id)
        .bind(subject)
        .bind(term)
        .bind(year)
        .fetch_all(executor)
        .await?;

        Ok(assessments)
    }

    /// Matérias distintas que o aluno tem avaliadas no período.
    pub async fn subjects_for_term<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        term: i16,
        year: i32,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subjects = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT subject FROM assessments
            WHERE owner_id = $1 AND student_id = $2 AND term = $3 AND year = $4
            ORDER BY subject ASC
            "#,
        )
        .bind(owner_id)
        .bind(student_id)
        .bind(term)
        .bind(year)
        .fetch_all(executor)
        .await?;

        Ok(subjects)
    }

    pub async fn delete_assessment<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        assessment_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM assessments WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(assessment_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  BOLETINS
    // =========================================================================

    /// Insere o cabeçalho do boletim. A unicidade (dono, aluno, bimestre,
    /// ano) é garantida pela constraint; a violação vira erro 409, nunca
    /// sobrescrita silenciosa.
    pub async fn insert_report_card<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateReportCardPayload,
    ) -> Result<ReportCard, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReportCard>(
            r#"
            INSERT INTO report_cards
                (owner_id, student_id, term, year, days_present, days_absent, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(input.student_id)
        .bind(input.term)
        .bind(input.year)
        .bind(input.days_present)
        .bind(input.days_absent)
        .bind(&input.comments)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ReportCardAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn insert_report_card_subject<'e, E>(
        &self,
        executor: E,
        report_card_id: Uuid,
        subject: &str,
        average: Decimal,
        comment: &str,
    ) -> Result<ReportCardSubject, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ReportCardSubject>(
            r#"
            INSERT INTO report_card_subjects (report_card_id, subject, average, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(report_card_id)
        .bind(subject)
        .bind(average)
        .bind(comment)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    pub async fn find_report_card<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        report_card_id: Uuid,
    ) -> Result<Option<ReportCard>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let card = sqlx::query_as::<_, ReportCard>(
            "SELECT * FROM report_cards WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(report_card_id)
        .fetch_optional(executor)
        .await?;

        Ok(card)
    }

    pub async fn list_report_cards<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<ReportCard>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cards = sqlx::query_as::<_, ReportCard>(
            r#"
            SELECT * FROM report_cards
            WHERE owner_id = $1 AND student_id = $2
            ORDER BY year DESC, term DESC
            "#,
        )
        .bind(owner_id)
        .bind(student_id)
        .fetch_all(executor)
        .await?;

        Ok(cards)
    }

    pub async fn list_report_card_subjects<'e, E>(
        &self,
        executor: E,
        report_card_id: Uuid,
    ) -> Result<Vec<ReportCardSubject>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subjects = sqlx::query_as::<_, ReportCardSubject>(
            r#"
            SELECT * FROM report_card_subjects
            WHERE report_card_id = $1
            ORDER BY subject ASC
            "#,
        )
        .bind(report_card_id)
        .fetch_all(executor)
        .await?;

        Ok(subjects)
    }

    pub async fn update_report_card_status<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        report_card_id: Uuid,
        status: ReportCardStatus,
    ) -> Result<Option<ReportCard>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let card = sqlx::query_as::<_, ReportCard>(
            r#"
            UPDATE report_cards SET status = $3, updated_at = NOW()
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(report_card_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(card)
    }
}
