// src/services/billing_service.rs

use chrono::{Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{validation_error, AppError},
    db::{
        billing_repo::allocate_sequence, BillingRepository, ClientRepository, SettingsRepository,
    },
    models::billing::{
        CreateDocumentPayload, DocumentDetail, DocumentKind, DocumentStatus, LineItem,
        LineItemPayload,
    },
    services::sequence::format_document_number,
};

// --- O AGREGADOR DE ITENS DE LINHA ---
// Função pura: é a ÚNICA fonte dos campos derivados de um documento.
// Aritmética decimal de ponta a ponta (nada de float em dinheiro).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Valor de um item: quantidade * tarifa.
pub fn line_amount(quantity: i32, rate: Decimal) -> Decimal {
    Decimal::from(quantity) * rate
}

/// (subtotal, imposto, total) a partir dos itens e da alíquota.
/// O imposto é arredondado a 2 casas (meio para cima); lista vazia
/// resulta em zeros.
pub fn document_totals(items: &[LineItem], tax_rate: Decimal) -> DocumentTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| line_amount(item.quantity, item.rate))
        .sum();

    let tax_amount = (subtotal * tax_rate / Decimal::from(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    DocumentTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

/// Valida as faixas de Decimal que o derive do `validator` não cobre.
fn validate_line_item(input: &LineItemPayload) -> Result<(), AppError> {
    validator::Validate::validate(input)?;
    if input.rate < Decimal::ZERO {
        return Err(validation_error("rate", "A tarifa não pode ser negativa"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BillingService {
    repo: BillingRepository,
    client_repo: ClientRepository,
    settings_repo: SettingsRepository,
}

impl BillingService {
    pub fn new(
        repo: BillingRepository,
        client_repo: ClientRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self {
            repo,
            client_repo,
            settings_repo,
        }
    }

    // =========================================================================
    //  CRIAÇÃO DE DOCUMENTOS
    // =========================================================================

    /// Cria fatura ou nota de crédito: aloca o número sequencial, insere os
    /// itens e persiste os totais derivados — tudo em UMA transação. Se
    /// qualquer passo falhar, nenhum número é consumido.
    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateDocumentPayload,
    ) -> Result<DocumentDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if let Some(tax_rate) = input.tax_rate {
            if tax_rate < Decimal::ZERO {
                return Err(validation_error("taxRate", "A alíquota não pode ser negativa"));
            }
        }
        for item in &input.line_items {
            validate_line_item(item)?;
        }

        let mut tx = executor.begin().await?;

        let client = self
            .client_repo
            .find_by_id(&mut *tx, owner_id, input.client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let settings = self.settings_repo.get_settings(&mut *tx, owner_id).await?;

        let issue_date = input.issue_date.unwrap_or_else(|| Utc::now().date_naive());

        // Vencimento só existe para faturas; default = prazo do cliente
        let due_date = match input.kind {
            DocumentKind::Invoice => Some(input.due_date.unwrap_or_else(|| {
                issue_date + chrono::Duration::days(i64::from(client.payment_terms_days))
            })),
            DocumentKind::CreditNote => None,
        };

        let tax_rate = input.tax_rate.unwrap_or(settings.default_tax_rate);

        let prefix = match input.kind {
            DocumentKind::Invoice => &settings.invoice_prefix,
            DocumentKind::CreditNote => &settings.credit_note_prefix,
        };
        let year = issue_date.year();
        let value =
            allocate_sequence(&mut *tx, owner_id, input.kind.sequence_kind(), year).await?;
        let number = format_document_number(prefix, year, value);

        let document = self
            .repo
            .insert_document(
                &mut *tx,
                owner_id,
                client.id,
                input.kind,
                &number,
                issue_date,
                due_date,
                &client.currency,
                tax_rate,
            )
            .await?;

        let mut line_items = Vec::with_capacity(input.line_items.len());
        for (position, item) in input.line_items.iter().enumerate() {
            let inserted = self
                .repo
                .insert_line_item(&mut *tx, document.id, item, position as i32)
                .await?;
            line_items.push(inserted);
        }

        let totals = document_totals(&line_items, tax_rate);
        self.repo
            .update_document_totals(&mut *tx, document.id, totals.subtotal, totals.tax_amount, totals.total)
            .await?;

        // Relê para devolver os totais persistidos
        let document = self
            .repo
            .find_document(&mut *tx, owner_id, document.id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        tx.commit().await?;

        tracing::info!("Documento {} criado para o cliente {}", document.number, client.id);

        Ok(DocumentDetail {
            document,
            line_items,
        })
    }

    pub async fn get_document<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> Result<DocumentDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let document = self
            .repo
            .find_document(&mut *tx, owner_id, document_id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        let line_items = self.repo.list_line_items(&mut *tx, document.id).await?;

        tx.commit().await?;

        Ok(DocumentDetail {
            document,
            line_items,
        })
    }

    /// Lista documentos, antes marcando como OVERDUE as faturas enviadas
    /// cujo vencimento já passou.
    pub async fn list_documents<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        kind: Option<DocumentKind>,
        status: Option<DocumentStatus>,
        client_id: Option<Uuid>,
    ) -> Result<Vec<crate::models::billing::Document>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let today = Utc::now().date_naive();
        self.repo.mark_overdue(&mut *tx, owner_id, today).await?;

        let documents = self
            .repo
            .list_documents(&mut *tx, owner_id, kind, status, client_id)
            .await?;

        tx.commit().await?;

        Ok(documents)
    }

    // =========================================================================
    //  ITENS DE LINHA (sempre com recálculo atômico dos totais)
    // =========================================================================

    pub async fn add_line_item<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
        input: &LineItemPayload,
    ) -> Result<DocumentDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validate_line_item(input)?;

        let mut tx = executor.begin().await?;

        let document = self.draft_for_update(&mut tx, owner_id, document_id).await?;

        let existing = self.repo.list_line_items(&mut *tx, document.id).await?;
        self.repo
            .insert_line_item(&mut *tx, document.id, input, existing.len() as i32)
            .await?;

        let detail = self.recompute(&mut tx, owner_id, document.id, document.tax_rate).await?;

        tx.commit().await?;

        Ok(detail)
    }

    pub async fn update_line_item<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
        line_item_id: Uuid,
        input: &LineItemPayload,
    ) -> Result<DocumentDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validate_line_item(input)?;

        let mut tx = executor.begin().await?;

        let document = self.draft_for_update(&mut tx, owner_id, document_id).await?;

        self.repo
            .update_line_item(&mut *tx, document.id, line_item_id, input)
            .await?
            .ok_or(AppError::LineItemNotFound)?;

        let detail = self.recompute(&mut tx, owner_id, document.id, document.tax_rate).await?;

        tx.commit().await?;

        Ok(detail)
    }

    pub async fn remove_line_item<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
        line_item_id: Uuid,
    ) -> Result<DocumentDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let document = self.draft_for_update(&mut tx, owner_id, document_id).await?;

        let removed = self
            .repo
            .delete_line_item(&mut *tx, document.id, line_item_id)
            .await?;
        if !removed {
            return Err(AppError::LineItemNotFound);
        }

        let detail = self.recompute(&mut tx, owner_id, document.id, document.tax_rate).await?;

        tx.commit().await?;

        Ok(detail)
    }

    /// Trava o documento e garante que ainda é rascunho.
    async fn draft_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> Result<crate::models::billing::Document, AppError> {
        let document = self
            .repo
            .find_document_for_update(&mut **tx, owner_id, document_id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        if document.status != DocumentStatus::Draft {
            return Err(AppError::DocumentNotDraft);
        }

        Ok(document)
    }

    /// Recalcula e persiste os campos derivados a partir dos itens atuais.
    async fn recompute(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        owner_id: Uuid,
        document_id: Uuid,
        tax_rate: Decimal,
    ) -> Result<DocumentDetail, AppError> {
        let line_items = self.repo.list_line_items(&mut **tx, document_id).await?;

        let totals = document_totals(&line_items, tax_rate);
        self.repo
            .update_document_totals(&mut **tx, document_id, totals.subtotal, totals.tax_amount, totals.total)
            .await?;

        let document = self
            .repo
            .find_document(&mut **tx, owner_id, document_id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        Ok(DocumentDetail {
            document,
            line_items,
        })
    }

    // =========================================================================
    //  CICLO DE VIDA
    // =========================================================================

    /// DRAFT -> SENT (fatura) ou DRAFT -> ISSUED (nota de crédito).
    pub async fn send_document<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> Result<crate::models::billing::Document, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let target = |kind| match kind {
            DocumentKind::Invoice => DocumentStatus::Sent,
            DocumentKind::CreditNote => DocumentStatus::Issued,
        };
        self.transition(executor, owner_id, document_id, target, None)
            .await
    }

    /// SENT/OVERDUE -> PAID, registrando a data do pagamento.
    pub async fn record_payment<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
        paid_date: Option<chrono::NaiveDate>,
    ) -> Result<crate::models::billing::Document, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let paid_date = paid_date.unwrap_or_else(|| Utc::now().date_naive());
        self.transition(
            executor,
            owner_id,
            document_id,
            |_| DocumentStatus::Paid,
            Some(paid_date),
        )
        .await
    }

    async fn transition<'e, E, F>(
        &self,
        executor: E,
        owner_id: Uuid,
        document_id: Uuid,
        target: F,
        paid_date: Option<chrono::NaiveDate>,
    ) -> Result<crate::models::billing::Document, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
        F: Fn(DocumentKind) -> DocumentStatus,
    {
        let mut tx = executor.begin().await?;

        let document = self
            .repo
            .find_document_for_update(&mut *tx, owner_id, document_id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        let next = target(document.kind);
        if !document.status.can_become(next, document.kind) {
            return Err(AppError::InvalidStatusTransition(
                document.status.as_str(),
                next.as_str(),
            ));
        }

        let updated = self
            .repo
            .update_document_status(&mut *tx, owner_id, document_id, next, paid_date)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn item(quantity: i32, rate: Decimal) -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            description: "item".to_string(),
            quantity,
            rate,
            amount: line_amount(quantity, rate),
            position: 0,
        }
    }

    #[test]
    fn subtotal_e_a_soma_de_quantidade_vezes_tarifa() {
        let items = vec![item(2, dec!(100.00)), item(1, dec!(50.00))];
        let totals = document_totals(&items, Decimal::ZERO);

        assert_eq!(totals.subtotal, dec!(250.00));
        assert_eq!(totals.tax_amount, dec!(0.00));
        assert_eq!(totals.total, dec!(250.00));
    }

    #[test]
    fn imposto_e_total_derivam_do_subtotal() {
        let items = vec![item(2, dec!(100.00))];
        let totals = document_totals(&items, dec!(5.00));

        assert_eq!(totals.subtotal, dec!(200.00));
        assert_eq!(totals.tax_amount, dec!(10.00));
        assert_eq!(totals.total, dec!(210.00));
        // total == subtotal * (1 + aliquota/100)
        assert_eq!(totals.total, totals.subtotal + totals.tax_amount);
    }

    #[test]
    fn imposto_arredonda_a_duas_casas() {
        // 33.33 * 7.5% = 2.49975 -> 2.50
        let items = vec![item(1, dec!(33.33))];
        let totals = document_totals(&items, dec!(7.5));

        assert_eq!(totals.tax_amount, dec!(2.50));
        assert_eq!(totals.total, dec!(35.83));
    }

    #[test]
    fn sem_itens_todos_os_totais_sao_zero() {
        let totals = document_totals(&[], dec!(15.00));

        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn centavos_nao_derivam_em_somas_longas() {
        // 10 itens de 0.10: em float isso acumularia erro binário
        let items: Vec<LineItem> = (0..10).map(|_| item(1, dec!(0.10))).collect();
        let totals = document_totals(&items, Decimal::ZERO);

        assert_eq!(totals.subtotal, dec!(1.00));
    }

    #[test]
    fn tarifa_negativa_e_rejeitada_na_validacao() {
        let payload = LineItemPayload {
            description: "x".to_string(),
            quantity: 1,
            rate: dec!(-1.00),
        };
        assert!(validate_line_item(&payload).is_err());
    }

    #[test]
    fn quantidade_zero_e_rejeitada_na_validacao() {
        let payload = LineItemPayload {
            description: "x".to_string(),
            quantity: 0,
            rate: dec!(1.00),
        };
        assert!(validate_line_item(&payload).is_err());
    }
}
