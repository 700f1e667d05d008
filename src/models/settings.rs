// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Perfil da empresa/escola + padrões de faturamento. É o objeto de
// configuração explícito que os serviços recebem (moeda, prefixos,
// alíquota padrão) em vez de estado global.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    #[schema(ignore)] // O contexto (token) já define o dono
    pub owner_id: Uuid,

    #[schema(example = "Escola Modelo Ltda")]
    pub company_name: Option<String>,

    #[schema(example = "contato@escolamodelo.com")]
    pub email: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,

    #[schema(example = "BRL")]
    pub currency: String,

    #[schema(example = "0.00")]
    pub default_tax_rate: Decimal,

    #[schema(example = "INV")]
    pub invoice_prefix: String,

    #[schema(example = "CN")]
    pub credit_note_prefix: String,

    pub updated_at: Option<DateTime<Utc>>,
}

impl AccountSettings {
    /// Configuração "vazia" para contas que ainda não salvaram o perfil.
    pub fn empty(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            company_name: None,
            email: None,
            phone: None,
            address: None,
            currency: "BRL".to_string(),
            default_tax_rate: Decimal::ZERO,
            invoice_prefix: "INV".to_string(),
            credit_note_prefix: "CN".to_string(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[schema(example = "Escola Modelo Ltda")]
    pub company_name: Option<String>,

    #[schema(example = "contato@escolamodelo.com")]
    pub email: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    #[schema(example = "Av. Paulista, 1000")]
    pub address: Option<String>,

    #[schema(example = "BRL")]
    pub currency: Option<String>,

    #[schema(example = "5.00")]
    pub default_tax_rate: Option<Decimal>,

    #[schema(example = "INV")]
    pub invoice_prefix: Option<String>,

    #[schema(example = "CN")]
    pub credit_note_prefix: Option<String>,
}
