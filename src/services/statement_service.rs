// src/services/statement_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillingRepository, ClientRepository},
    models::{
        billing::{Document, DocumentStatus},
        reports::{ClientStatement, EntryKind, StatementEntry, StatementSummary},
    },
};

// --- O LIVRO-RAZÃO DO EXTRATO ---
// Função pura: recebe as faturas relevantes e produz as linhas com saldo
// acumulado mais o resumo, numa única passada. Débito = fatura emitida no
// período; crédito = pagamento recebido no período (a mesma fatura pode
// gerar os dois). Empate de data: débito antes do crédito, depois o
// número do documento.

pub fn build_statement(
    client_id: Uuid,
    invoices: &[Document],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> ClientStatement {
    let mut raw: Vec<(NaiveDate, EntryKind, &Document)> = Vec::new();

    for invoice in invoices {
        if invoice.issue_date >= start_date && invoice.issue_date <= end_date {
            raw.push((invoice.issue_date, EntryKind::Debit, invoice));
        }
        if let Some(paid) = invoice.paid_date {
            if paid >= start_date && paid <= end_date {
                raw.push((paid, EntryKind::Credit, invoice));
            }
        }
    }

    raw.sort_by(|a, b| {
        let kind_rank = |k: EntryKind| match k {
            EntryKind::Debit => 0,
            EntryKind::Credit => 1,
        };
        (a.0, kind_rank(a.1), &a.2.number).cmp(&(b.0, kind_rank(b.1), &b.2.number))
    });

    let mut entries = Vec::with_capacity(raw.len());
    let mut balance = Decimal::ZERO;
    let mut summary = StatementSummary {
        invoice_count: 0,
        total_paid: Decimal::ZERO,
        total_outstanding: Decimal::ZERO,
        first_invoice_date: None,
        last_invoice_date: None,
    };

    for (date, kind, invoice) in raw {
        match kind {
            EntryKind::Debit => {
                balance += invoice.total;
                summary.invoice_count += 1;
                if summary.first_invoice_date.is_none() {
                    summary.first_invoice_date = Some(date);
                }
                summary.last_invoice_date = Some(date);
                if matches!(invoice.status, DocumentStatus::Sent | DocumentStatus::Overdue) {
                    summary.total_outstanding += invoice.total;
                }
            }
            EntryKind::Credit => {
                balance -= invoice.total;
                summary.total_paid += invoice.total;
            }
        }

        entries.push(StatementEntry {
            date,
            kind,
            number: invoice.number.clone(),
            description: match kind {
                EntryKind::Debit => "Fatura emitida".to_string(),
                EntryKind::Credit => "Pagamento recebido".to_string(),
            },
            amount: invoice.total,
            balance,
        });
    }

    ClientStatement {
        client_id,
        start_date,
        end_date,
        entries,
        summary,
    }
}

#[derive(Clone)]
pub struct StatementService {
    billing_repo: BillingRepository,
    client_repo: ClientRepository,
}

impl StatementService {
    pub fn new(billing_repo: BillingRepository, client_repo: ClientRepository) -> Self {
        Self {
            billing_repo,
            client_repo,
        }
    }

    pub async fn client_statement<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        client_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ClientStatement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.client_repo
            .find_by_id(&mut *tx, owner_id, client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        // O extrato reflete o vencimento real, não o último acesso à lista
        let today = Utc::now().date_naive();
        self.billing_repo.mark_overdue(&mut *tx, owner_id, today).await?;

        let invoices = self
            .billing_repo
            .invoices_for_statement(&mut *tx, owner_id, client_id, start_date, end_date)
            .await?;

        tx.commit().await?;

        Ok(build_statement(client_id, &invoices, start_date, end_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::billing::DocumentKind;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(
        number: &str,
        issue: NaiveDate,
        paid: Option<NaiveDate>,
        total: Decimal,
        status: DocumentStatus,
    ) -> Document {
        let now: DateTime<Utc> = Utc::now();
        Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            kind: DocumentKind::Invoice,
            number: number.to_string(),
            issue_date: issue,
            due_date: Some(issue),
            paid_date: paid,
            currency: "BRL".to_string(),
            tax_rate: Decimal::ZERO,
            subtotal: total,
            tax_amount: Decimal::ZERO,
            total,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn saldo_acumula_debito_menos_credito_em_ordem() {
        let client_id = Uuid::new_v4();
        let invoices = vec![
            invoice(
                "INV-2026-001",
                date(2026, 8, 1),
                Some(date(2026, 8, 10)),
                dec!(100.00),
                DocumentStatus::Paid,
            ),
            invoice(
                "INV-2026-002",
                date(2026, 8, 15),
                None,
                dec!(50.00),
                DocumentStatus::Sent,
            ),
        ];

        let statement =
            build_statement(client_id, &invoices, date(2026, 8, 1), date(2026, 8, 31));

        let balances: Vec<Decimal> =
            statement.entries.iter().map(|e| e.balance).collect();
        assert_eq!(balances, vec![dec!(100.00), dec!(0.00), dec!(50.00)]);

        assert_eq!(statement.summary.invoice_count, 2);
        assert_eq!(statement.summary.total_paid, dec!(100.00));
        assert_eq!(statement.summary.total_outstanding, dec!(50.00));
        assert_eq!(statement.summary.first_invoice_date, Some(date(2026, 8, 1)));
        assert_eq!(statement.summary.last_invoice_date, Some(date(2026, 8, 15)));
    }

    #[test]
    fn no_mesmo_dia_o_debito_vem_antes_do_credito() {
        let client_id = Uuid::new_v4();
        let invoices = vec![invoice(
            "INV-2026-001",
            date(2026, 8, 5),
            Some(date(2026, 8, 5)),
            dec!(80.00),
            DocumentStatus::Paid,
        )];

        let statement =
            build_statement(client_id, &invoices, date(2026, 8, 1), date(2026, 8, 31));

        assert_eq!(statement.entries.len(), 2);
        assert_eq!(statement.entries[0].kind, EntryKind::Debit);
        assert_eq!(statement.entries[0].balance, dec!(80.00));
        assert_eq!(statement.entries[1].kind, EntryKind::Credit);
        assert_eq!(statement.entries[1].balance, dec!(0.00));
    }

    #[test]
    fn pagamento_fora_do_periodo_fica_de_fora() {
        let client_id = Uuid::new_v4();
        let invoices = vec![invoice(
            "INV-2026-001",
            date(2026, 8, 20),
            Some(date(2026, 9, 3)),
            dec!(120.00),
            DocumentStatus::Paid,
        )];

        let statement =
            build_statement(client_id, &invoices, date(2026, 8, 1), date(2026, 8, 31));

        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].kind, EntryKind::Debit);
        assert_eq!(statement.summary.total_paid, dec!(0.00));
    }

    #[test]
    fn extrato_vazio_zera_o_resumo() {
        let statement =
            build_statement(Uuid::new_v4(), &[], date(2026, 1, 1), date(2026, 1, 31));

        assert!(statement.entries.is_empty());
        assert_eq!(statement.summary.invoice_count, 0);
        assert_eq!(statement.summary.total_paid, dec!(0));
        assert_eq!(statement.summary.total_outstanding, dec!(0));
        assert_eq!(statement.summary.first_invoice_date, None);
    }
}
