// src/models/billing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Invoice,    // Fatura
    CreditNote, // Nota de crédito
}

impl DocumentKind {
    /// Chave usada na tabela de sequências.
    pub fn sequence_kind(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::CreditNote => "CREDIT_NOTE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Issued, // Apenas notas de crédito
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "DRAFT",
            DocumentStatus::Sent => "SENT",
            DocumentStatus::Paid => "PAID",
            DocumentStatus::Overdue => "OVERDUE",
            DocumentStatus::Issued => "ISSUED",
        }
    }

    /// Ciclo de vida: fatura DRAFT -> SENT -> PAID/OVERDUE (e OVERDUE -> PAID);
    /// nota de crédito DRAFT -> ISSUED.
    pub fn can_become(&self, next: DocumentStatus, kind: DocumentKind) -> bool {
        use DocumentStatus::*;
        match kind {
            DocumentKind::Invoice => matches!(
                (self, next),
                (Draft, Sent) | (Sent, Paid) | (Sent, Overdue) | (Overdue, Paid)
            ),
            DocumentKind::CreditNote => matches!((self, next), (Draft, Issued)),
        }
    }
}

// --- DOCUMENTO (Fatura | Nota de Crédito) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,

    #[schema(ignore)]
    pub owner_id: Uuid,

    pub client_id: Uuid,
    pub kind: DocumentKind,

    // Sequencial legível por humanos: "INV-2026-001"
    #[schema(example = "INV-2026-001")]
    pub number: String,

    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub issue_date: NaiveDate,

    // Apenas faturas têm vencimento
    #[schema(value_type = Option<String>, format = Date, example = "2026-08-31")]
    pub due_date: Option<NaiveDate>,

    // Preenchida quando o pagamento é registrado
    #[schema(value_type = Option<String>, format = Date)]
    pub paid_date: Option<NaiveDate>,

    #[schema(example = "BRL")]
    pub currency: String,

    #[schema(example = "5.00")]
    pub tax_rate: Decimal,

    // Derivados: recalculados em transação a cada mutação de item,
    // nunca alterados diretamente.
    #[schema(example = "200.00")]
    pub subtotal: Decimal,
    #[schema(example = "10.00")]
    pub tax_amount: Decimal,
    #[schema(example = "210.00")]
    pub total: Decimal,

    pub status: DocumentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Item de linha. O `amount` não é armazenado: é sempre derivado de
// quantity * rate no SELECT, eliminando a classe de bugs de cache velho.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Uuid,
    pub document_id: Uuid,

    #[schema(example = "Mensalidade - Agosto")]
    pub description: String,

    #[schema(example = 1)]
    pub quantity: i32,

    #[schema(example = "200.00")]
    pub rate: Decimal,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    pub position: i32,
}

// Documento completo (cabeçalho + itens), como a API devolve
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub line_items: Vec<LineItem>,
}

// --- RECORRÊNCIA ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recurring_frequency", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recurring_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringStatus {
    Active,
    Paused,
    Completed, // Definido pelo sistema quando end_date passa
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    pub id: Uuid,

    #[schema(ignore)]
    pub owner_id: Uuid,

    pub client_id: Uuid,

    #[schema(example = "Mensalidade escolar")]
    pub description: String,

    #[schema(example = "350.00")]
    pub amount: Decimal,

    #[schema(example = "0.00")]
    pub tax_rate: Decimal,

    pub frequency: Frequency,

    #[schema(value_type = String, format = Date, example = "2026-01-31")]
    pub start_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,

    // Data da última fatura GERADA (âncora do cadenciamento). Guardamos a
    // data da instância, não o timestamp da geração, para o cronograma não
    // derivar quando o job roda atrasado.
    #[schema(value_type = Option<String>, format = Date)]
    pub last_generated: Option<NaiveDate>,

    pub status: RecurringStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mensalidade - Agosto")]
    pub description: String,

    // Quantidade mínima 1: nunca "clampamos" valores inválidos
    #[validate(range(min = 1, message = "A quantidade deve ser no mínimo 1"))]
    #[schema(example = 1)]
    pub quantity: i32,

    // rate >= 0 é validado no serviço (faixa de Decimal)
    #[schema(example = "200.00")]
    pub rate: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentPayload {
    pub client_id: Uuid,

    pub kind: DocumentKind,

    // Default: hoje
    #[schema(value_type = Option<String>, format = Date)]
    pub issue_date: Option<NaiveDate>,

    // Default para faturas: issue_date + prazo do cliente
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    // Default: alíquota padrão das configurações da conta
    #[schema(example = "5.00")]
    pub tax_rate: Option<Decimal>,

    pub line_items: Vec<LineItemPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringPayload {
    pub client_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mensalidade escolar")]
    pub description: String,

    // amount >= 0 e tax_rate >= 0 validados no serviço
    #[schema(example = "350.00")]
    pub amount: Decimal,

    #[schema(example = "0.00")]
    pub tax_rate: Option<Decimal>,

    pub frequency: Frequency,

    #[schema(value_type = String, format = Date, example = "2026-01-31")]
    pub start_date: NaiveDate,

    // Precisa ser estritamente depois de start_date
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
}
