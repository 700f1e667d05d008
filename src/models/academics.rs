// src/models/academics.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- AVALIAÇÕES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: Uuid,

    #[schema(ignore)]
    pub owner_id: Uuid,

    pub student_id: Uuid,

    #[schema(example = "Matemática")]
    pub subject: String,

    // Bimestre (1 a 4)
    #[schema(example = 1)]
    pub term: i16,

    #[schema(example = 2026)]
    pub year: i32,

    // Tipo livre: "prova", "trabalho", "participação"...
    #[schema(example = "prova")]
    pub kind: String,

    // Contribuição percentual (0-100). Não precisa somar 100 na matéria.
    #[schema(example = "50.00")]
    pub weight: Decimal,

    #[schema(example = "80.00")]
    pub score: Decimal,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentPayload {
    pub student_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Matemática")]
    pub subject: String,

    #[validate(range(min = 1, max = 4, message = "O bimestre deve estar entre 1 e 4"))]
    #[schema(example = 1)]
    pub term: i16,

    #[validate(range(min = 2000, max = 2100, message = "Ano fora do intervalo aceito"))]
    #[schema(example = 2026)]
    pub year: i32,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "prova")]
    pub kind: String,

    // Faixas de Decimal são validadas no serviço (0-100)
    #[schema(example = "50.00")]
    pub weight: Decimal,

    #[schema(example = "80.00")]
    pub score: Decimal,
}

// --- BOLETINS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_card_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCardStatus {
    Draft,     // Em elaboração
    Published, // Entregue aos responsáveis
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub id: Uuid,

    #[schema(ignore)]
    pub owner_id: Uuid,

    pub student_id: Uuid,

    #[schema(example = 1)]
    pub term: i16,

    #[schema(example = 2026)]
    pub year: i32,

    pub status: ReportCardStatus,

    #[schema(example = 48)]
    pub days_present: i32,

    #[schema(example = 2)]
    pub days_absent: i32,

    pub comments: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Nota consolidada de uma matéria dentro de um boletim
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportCardSubject {
    pub id: Uuid,
    pub report_card_id: Uuid,

    #[schema(example = "Matemática")]
    pub subject: String,

    // Média ponderada das avaliações do período
    #[schema(example = "70.00")]
    pub average: Decimal,

    #[schema(example = "Bom desempenho em Matemática.")]
    pub comment: String,
}

// Boletim completo (cabeçalho + matérias), como a API devolve
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportCardDetail {
    #[serde(flatten)]
    pub report_card: ReportCard,
    pub subjects: Vec<ReportCardSubject>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportCardPayload {
    pub student_id: Uuid,

    #[validate(range(min = 1, max = 4, message = "O bimestre deve estar entre 1 e 4"))]
    #[schema(example = 1)]
    pub term: i16,

    #[validate(range(min = 2000, max = 2100, message = "Ano fora do intervalo aceito"))]
    #[schema(example = 2026)]
    pub year: i32,

    #[validate(range(min = 0, message = "must_be_non_negative"))]
    #[schema(example = 48)]
    pub days_present: i32,

    #[validate(range(min = 0, message = "must_be_non_negative"))]
    #[schema(example = 2)]
    pub days_absent: i32,

    pub comments: Option<String>,
}
