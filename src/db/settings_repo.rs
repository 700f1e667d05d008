// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::{AccountSettings, UpdateSettingsPayload},
};

#[derive(Clone)]
pub struct SettingsRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca as configurações da conta; contas novas recebem o default.
    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
    ) -> Result<AccountSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, AccountSettings>(
            "SELECT * FROM account_settings WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;

        Ok(settings.unwrap_or_else(|| AccountSettings::empty(owner_id)))
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: UpdateSettingsPayload,
    ) -> Result<AccountSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT: COALESCE mantém o valor atual quando o campo não veio
        let settings = sqlx::query_as::<_, AccountSettings>(
            r#"
            INSERT INTO account_settings
                (owner_id, company_name, email, phone, address, currency,
                 default_tax_rate, invoice_prefix, credit_note_prefix, updated_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'BRL'),
                    COALESCE($7, 0), COALESCE($8, 'INV'), COALESCE($9, 'CN'), NOW())
            ON CONFLICT (owner_id)
            DO UPDATE SET
                company_name       = COALESCE($2, account_settings.company_name),
                email              = COALESCE($3, account_settings.email),
                phone              = COALESCE($4, account_settings.phone),
                address            = COALESCE($5, account_settings.address),
                currency           = COALESCE($6, account_settings.currency),
                default_tax_rate   = COALESCE($7, account_settings.default_tax_rate),
                invoice_prefix     = COALESCE($8, account_settings.invoice_prefix),
                credit_note_prefix = COALESCE($9, account_settings.credit_note_prefix),
                updated_at         = NOW()
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(input.company_name)
        .bind(input.email)
        .bind(input.phone)
        .bind(input.address)
        .bind(input.currency)
        .bind(input.default_tax_rate)
        .bind(input.invoice_prefix)
        .bind(input.credit_note_prefix)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
