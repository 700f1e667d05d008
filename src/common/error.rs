// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::middleware::i18n::{I18nStore, Locale};

// Nosso tipo de erro interno, com `thiserror` para melhor ergonomia.
// A mensagem do `#[error]` é o que vai para os logs; o que vai para o
// usuário é sempre a versão traduzida (sem vazar detalhes do backend).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Aluno não encontrado")]
    StudentNotFound,

    #[error("Avaliação não encontrada")]
    AssessmentNotFound,

    #[error("Documento não encontrado")]
    DocumentNotFound,

    #[error("Item de linha não encontrado")]
    LineItemNotFound,

    #[error("Modelo de recorrência não encontrado")]
    TemplateNotFound,

    #[error("Boletim não encontrado")]
    ReportCardNotFound,

    #[error("Já existe um boletim para este aluno neste período")]
    ReportCardAlreadyExists,

    #[error("Apenas documentos em rascunho podem ser alterados")]
    DocumentNotDraft,

    #[error("Transição de status inválida: {0} -> {1}")]
    InvalidStatusTransition(&'static str, &'static str),

    #[error("CSV sem as colunas obrigatórias: {0:?}")]
    CsvMissingColumns(Vec<String>),

    #[error("CSV com linha inválida: {line} ({reason})")]
    CsvInvalidRow { line: usize, reason: String },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro "de borda": já localizado e pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Converte o erro interno em um `ApiError` localizado. Os detalhes
    /// brutos (SQL, JWT etc.) ficam só nos logs.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, code) = match self {
            AppError::ValidationError(errors) => {
                // Retornamos todos os detalhes da validação, campo a campo.
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    message: store.message(locale, "validation"),
                    details: Some(json!(details)),
                };
            }
            AppError::CsvMissingColumns(columns) => {
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    message: store.message(locale, "csv_missing_columns"),
                    details: Some(json!({ "missingColumns": columns })),
                };
            }
            AppError::CsvInvalidRow { line, .. } => {
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    message: store.message(locale, "csv_invalid_row"),
                    details: Some(json!({ "line": line })),
                };
            }

            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),

            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::ClientNotFound => (StatusCode::NOT_FOUND, "client_not_found"),
            AppError::StudentNotFound => (StatusCode::NOT_FOUND, "student_not_found"),
            AppError::AssessmentNotFound => (StatusCode::NOT_FOUND, "assessment_not_found"),
            AppError::DocumentNotFound => (StatusCode::NOT_FOUND, "document_not_found"),
            AppError::LineItemNotFound => (StatusCode::NOT_FOUND, "line_item_not_found"),
            AppError::TemplateNotFound => (StatusCode::NOT_FOUND, "template_not_found"),
            AppError::ReportCardNotFound => (StatusCode::NOT_FOUND, "report_card_not_found"),

            AppError::ReportCardAlreadyExists => (StatusCode::CONFLICT, "report_card_exists"),
            AppError::DocumentNotDraft => (StatusCode::CONFLICT, "document_not_draft"),
            AppError::InvalidStatusTransition(..) => (StatusCode::CONFLICT, "invalid_transition"),

            // Todos os outros erros (DatabaseError, InternalServerError...)
            // viram 500. O `tracing` guarda a causa raiz.
            e => {
                tracing::error!("Erro interno do servidor: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        ApiError {
            status,
            message: store.message(locale, code),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Helper para erros de validação construídos à mão (faixas de `Decimal`
/// que o derive do `validator` não cobre).
pub fn validation_error(field: &str, message: &str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut error = validator::ValidationError::new("invalid_value");
    error.message = Some(message.to_string().into());

    // Leak seguro para erro estático
    let static_field: &'static str = Box::leak(field.to_string().into_boxed_str());
    errors.add(static_field, error);

    AppError::ValidationError(errors)
}
