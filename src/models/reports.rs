// src/models/reports.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- EXTRATO DO CLIENTE ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Debit,  // Fatura emitida
    Credit, // Pagamento recebido
}

// Uma linha do extrato, já com o saldo acumulado até ela
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementEntry {
    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub date: NaiveDate,

    pub kind: EntryKind,

    #[schema(example = "INV-2026-001")]
    pub number: String,

    #[schema(example = "Fatura emitida")]
    pub description: String,

    #[schema(example = "100.00")]
    pub amount: Decimal,

    // Soma acumulada de débito - crédito em ordem cronológica
    #[schema(example = "100.00")]
    pub balance: Decimal,
}

// Totais do extrato: acumulados na MESMA passada que gera as linhas,
// para concordar com elas por construção.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummary {
    #[schema(example = 3)]
    pub invoice_count: i64,

    #[schema(example = "150.00")]
    pub total_paid: Decimal,

    // Faturas enviadas + vencidas
    #[schema(example = "50.00")]
    pub total_outstanding: Decimal,

    #[schema(value_type = Option<String>, format = Date)]
    pub first_invoice_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub last_invoice_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatement {
    pub client_id: Uuid,

    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,

    pub entries: Vec<StatementEntry>,
    pub summary: StatementSummary,
}

// --- RECEITA E RANKING ---

// Receita (faturas pagas) agregada por mês
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenueEntry {
    #[schema(example = "2026-08")]
    pub month: Option<String>,

    #[schema(example = "1250.00")]
    pub total: Option<Decimal>,
}

// Clientes ordenados por receita paga no período
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopClientEntry {
    pub client_id: Uuid,
    pub client_name: String,

    #[schema(example = 4)]
    pub invoice_count: Option<i64>,

    #[schema(example = "1400.00")]
    pub total_revenue: Option<Decimal>,
}
