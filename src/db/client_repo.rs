// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::clients::{Client, CreateClientPayload, UpdateClientPayload},
};

#[derive(Clone)]
pub struct ClientRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients
                (owner_id, name, email, phone, address, currency, payment_terms_days)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'BRL'), COALESCE($7, 30))
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.currency)
        .bind(input.payment_terms_days)
        .fetch_one(executor)
        .await?;

        Ok(client)
    }

    /// Lista os clientes do dono; `search` filtra por nome/e-mail.
    pub async fn list_clients<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE owner_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR email ILIKE '%' || $2 || '%')
            ORDER BY name ASC
            "#,
        )
        .bind(owner_id)
        .bind(search)
        .fetch_all(executor)
        .await?;

        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(client_id)
        .fetch_optional(executor)
        .await?;

        Ok(client)
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        client_id: Uuid,
        input: &UpdateClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name               = COALESCE($3, name),
                email              = COALESCE($4, email),
                phone              = COALESCE($5, phone),
                address            = COALESCE($6, address),
                currency           = COALESCE($7, currency),
                payment_terms_days = COALESCE($8, payment_terms_days),
                updated_at         = NOW()
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.currency)
        .bind(input.payment_terms_days)
        .fetch_optional(executor)
        .await?;

        Ok(client)
    }

    pub async fn delete_client<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
