// src/db/billing_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::billing::{
        CreateRecurringPayload, Document, DocumentKind, DocumentStatus, LineItem,
        LineItemPayload, RecurringStatus, RecurringTemplate,
    },
};

// Colunas de item de linha: o `amount` é SEMPRE derivado no SELECT,
// nunca lido de uma coluna cacheada.
const LINE_ITEM_COLUMNS: &str =
    "id, document_id, description, quantity, rate, \
     (quantity * rate)::numeric(12,2) AS amount, position";

/// Aloca o próximo valor da sequência (dono, classe, ano) com um único
/// UPSERT atômico. Duas requisições simultâneas nunca recebem o mesmo
/// número, e uma transação abortada não consome valor.
pub async fn allocate_sequence<'e, E>(
    executor: E,
    owner_id: Uuid,
    kind: &str,
    year: i32,
) -> Result<i32, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let value = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO document_sequences (owner_id, kind, year, last_value)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (owner_id, kind, year)
        DO UPDATE SET last_value = document_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(owner_id)
    .bind(kind)
    .bind(year)
    .fetch_one(executor)
    .await?;

    Ok(value)
}

#[derive(Clone)]
pub struct BillingRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  DOCUMENTOS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_document<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        client_id: Uuid,
        kind: DocumentKind,
        number: &str,
        issue_date: NaiveDate,
        due_date: Option<NaiveDate>,
        currency: &str,
        tax_rate: Decimal,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents
                (owner_id, client_id, kind, number, issue_date, due_date, currency, tax_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .bind(kind)
        .bind(number)
        .bind(issue_date)
        .bind(due_date)
        .bind(currency)
        .bind(tax_rate)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    pub async fn find_document<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(document_id)
        .fetch_optional(executor)
        .await?;

        Ok(document)
    }

    /// Igual a `find_document`, mas trava a linha (`FOR UPDATE`): usado
    /// dentro das transações de recálculo para evitar updates perdidos.
    pub async fn find_document_for_update<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE owner_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(owner_id)
        .bind(document_id)
        .fetch_optional(executor)
        .await?;

        Ok(document)
    }

    pub async fn list_documents<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        kind: Option<DocumentKind>,
        status: Option<DocumentStatus>,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE owner_id = $1
              AND ($2::document_kind IS NULL OR kind = $2)
              AND ($3::document_status IS NULL OR status = $3)
              AND ($4::uuid IS NULL OR client_id = $4)
            ORDER BY issue_date DESC, number DESC
            "#,
        )
        .bind(owner_id)
        .bind(kind)
        .bind(status)
        .bind(client_id)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }

    /// Persiste os totais derivados. Chamado apenas dentro da transação
    /// que alterou os itens de linha.
    pub async fn update_document_totals<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        subtotal: Decimal,
        tax_amount: Decimal,
        total: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE documents
            SET subtotal = $2, tax_amount = $3, total = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(document_id)
        .bind(subtotal)
        .bind(tax_amount)
        .bind(total)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn update_document_status<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
        status: DocumentStatus,
        paid_date: Option<NaiveDate>,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET status = $3, paid_date = COALESCE($4, paid_date), updated_at = NOW()
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(status)
        .bind(paid_date)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    /// Varredura de vencimento: SENT com due_date no passado vira OVERDUE.
    pub async fn mark_overdue<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        today: NaiveDate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = 'OVERDUE', updated_at = NOW()
            WHERE owner_id = $1 AND kind = 'INVOICE' AND status = 'SENT'
              AND due_date IS NOT NULL AND due_date < $2
            "#,
        )
        .bind(owner_id)
        .bind(today)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Faturas de um cliente relevantes para o extrato do período:
    /// emitidas OU pagas dentro do intervalo.
    pub async fn invoices_for_statement<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        client_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE owner_id = $1 AND client_id = $2 AND kind = 'INVOICE'
              AND (issue_date BETWEEN $3 AND $4
                   OR (paid_date IS NOT NULL AND paid_date BETWEEN $3 AND $4))
            ORDER BY issue_date ASC, number ASC
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }

    // =========================================================================
    //  ITENS DE LINHA
    // =========================================================================

    pub async fn insert_line_item<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        input: &LineItemPayload,
        position: i32,
    ) -> Result<LineItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            INSERT INTO line_items (document_id, description, quantity, rate, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LINE_ITEM_COLUMNS}
            "#
        ))
        .bind(document_id)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.rate)
        .bind(position)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn list_line_items<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
    ) -> Result<Vec<LineItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            SELECT {LINE_ITEM_COLUMNS} FROM line_items
            WHERE document_id = $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(document_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    pub async fn update_line_item<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        line_item_id: Uuid,
        input: &LineItemPayload,
    ) -> Result<Option<LineItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            UPDATE line_items
            SET description = $3, quantity = $4, rate = $5
            WHERE document_id = $1 AND id = $2
            RETURNING {LINE_ITEM_COLUMNS}
            "#
        ))
        .bind(document_id)
        .bind(line_item_id)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.rate)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    pub async fn delete_line_item<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        line_item_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM line_items WHERE document_id = $1 AND id = $2")
            .bind(document_id)
            .bind(line_item_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  MODELOS DE RECORRÊNCIA
    // =========================================================================

    pub async fn insert_template<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateRecurringPayload,
    ) -> Result<RecurringTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, RecurringTemplate>(
            r#"
            INSERT INTO recurring_templates
                (owner_id, client_id, description, amount, tax_rate,
                 frequency, start_date, end_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(input.client_id)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.tax_rate)
        .bind(input.frequency)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }

    pub async fn list_templates<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        status: Option<RecurringStatus>,
    ) -> Result<Vec<RecurringTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let templates = sqlx::query_as::<_, RecurringTemplate>(
            r#"
            SELECT * FROM recurring_templates
            WHERE owner_id = $1
              AND ($2::recurring_status IS NULL OR status = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(templates)
    }

    pub async fn find_template<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        template_id: Uuid,
    ) -> Result<Option<RecurringTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, RecurringTemplate>(
            "SELECT * FROM recurring_templates WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(template_id)
        .fetch_optional(executor)
        .await?;

        Ok(template)
    }

    pub async fn update_template_status<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        template_id: Uuid,
        status: RecurringStatus,
    ) -> Result<RecurringTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, RecurringTemplate>(
            r#"
            UPDATE recurring_templates
            SET status = $3, updated_at = NOW()
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(template_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }

    /// Avança a âncora de cadenciamento após gerar uma fatura (e completa
    /// o modelo quando o fim foi atingido), em um único UPDATE.
    pub async fn advance_template<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
        last_generated: NaiveDate,
        status: RecurringStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE recurring_templates
            SET last_generated = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(template_id)
        .bind(last_generated)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(())
    }
}
