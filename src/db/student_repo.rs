// src/db/student_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::students::{CreateStudentPayload, Student, UpdateStudentPayload},
};

#[derive(Clone)]
pub struct StudentRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insere o aluno com o número já alocado pela sequência (o serviço
    /// aloca e formata dentro da mesma transação).
    pub async fn insert_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_number: &str,
        input: &CreateStudentPayload,
    ) -> Result<Student, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students
                (owner_id, student_number, first_name, last_name, grade,
                 language, parent_name, parent_contact)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'en'), $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(student_number)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.grade)
        .bind(&input.language)
        .bind(&input.parent_name)
        .bind(&input.parent_contact)
        .fetch_one(executor)
        .await?;

        Ok(student)
    }

    /// Lista os alunos do dono; `search` filtra por nome ou número.
    pub async fn list_students<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE owner_id = $1
              AND ($2::text IS NULL
                   OR first_name ILIKE '%' || $2 || '%'
                   OR last_name ILIKE '%' || $2 || '%'
                   OR student_number ILIKE '%' || $2 || '%')
            ORDER BY last_name ASC, first_name ASC
            "#,
        )
        .bind(owner_id)
        .bind(search)
        .fetch_all(executor)
        .await?;

        Ok(students)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(student_id)
        .fetch_optional(executor)
        .await?;

        Ok(student)
    }

    pub async fn update_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        input: &UpdateStudentPayload,
    ) -> Result<Option<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                first_name     = COALESCE($3, first_name),
                last_name      = COALESCE($4, last_name),
                grade          = COALESCE($5, grade),
                language       = COALESCE($6, language),
                parent_name    = COALESCE($7, parent_name),
                parent_contact = COALESCE($8, parent_contact),
                updated_at     = NOW()
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(student_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.grade)
        .bind(&input.language)
        .bind(&input.parent_name)
        .bind(&input.parent_contact)
        .fetch_optional(executor)
        .await?;

        Ok(student)
    }

    pub async fn delete_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM students WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(student_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
