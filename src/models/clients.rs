// src/models/clients.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE (quem recebe faturas) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(ignore)]
    pub owner_id: Uuid,

    #[schema(example = "Família Oliveira")]
    pub name: String,

    #[schema(example = "oliveira@exemplo.com")]
    pub email: Option<String>,

    #[schema(example = "(11) 98888-7777")]
    pub phone: Option<String>,

    pub address: Option<String>,

    #[schema(example = "BRL")]
    pub currency: String,

    // Prazo de pagamento em dias (vira o vencimento padrão das faturas)
    #[schema(example = 30)]
    pub payment_terms_days: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Família Oliveira")]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[validate(length(equal = 3, message = "A moeda deve ser um código de 3 letras"))]
    #[schema(example = "BRL")]
    pub currency: Option<String>,

    #[validate(range(min = 0, max = 365, message = "O prazo deve estar entre 0 e 365 dias"))]
    #[schema(example = 30)]
    pub payment_terms_days: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[validate(length(equal = 3, message = "A moeda deve ser um código de 3 letras"))]
    pub currency: Option<String>,

    #[validate(range(min = 0, max = 365, message = "O prazo deve estar entre 0 e 365 dias"))]
    pub payment_terms_days: Option<i32>,
}
