// src/middleware/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Nosso extrator de idioma
pub struct Locale(pub String);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let default_lang = "en".to_string();

        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first() // Pega o primeiro idioma (ex: "pt-BR")
                    .map(|tag_string| {
                        // "pt-BR" -> split vira ["pt", "BR"] -> next() pega "pt"
                        tag_string.split('-').next().unwrap_or(tag_string).to_string()
                    })
            })
            .unwrap_or(default_lang);

        Ok(Locale(lang))
    }
}

// O dicionário de mensagens de erro por idioma. Carregado uma vez no
// AppState e compartilhado por Arc.
#[derive(Clone)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en: HashMap<&'static str, &'static str> = HashMap::new();
        let mut pt: HashMap<&'static str, &'static str> = HashMap::new();

        en.insert("validation", "One or more fields are invalid.");
        pt.insert("validation", "Um ou mais campos são inválidos.");

        en.insert("email_exists", "This e-mail is already in use.");
        pt.insert("email_exists", "Este e-mail já está em uso.");

        en.insert("invalid_credentials", "Invalid e-mail or password.");
        pt.insert("invalid_credentials", "E-mail ou senha inválidos.");

        en.insert("invalid_token", "Missing or invalid authentication token.");
        pt.insert("invalid_token", "Token de autenticação inválido ou ausente.");

        en.insert("user_not_found", "User not found.");
        pt.insert("user_not_found", "Usuário não encontrado.");

        en.insert("client_not_found", "Client not found.");
        pt.insert("client_not_found", "Cliente não encontrado.");

        en.insert("student_not_found", "Student not found.");
        pt.insert("student_not_found", "Aluno não encontrado.");

        en.insert("assessment_not_found", "Assessment not found.");
        pt.insert("assessment_not_found", "Avaliação não encontrada.");

        en.insert("document_not_found", "Document not found.");
        pt.insert("document_not_found", "Documento não encontrado.");

        en.insert("line_item_not_found", "Line item not found.");
        pt.insert("line_item_not_found", "Item de linha não encontrado.");

        en.insert("template_not_found", "Recurring template not found.");
        pt.insert("template_not_found", "Modelo de recorrência não encontrado.");

        en.insert("report_card_not_found", "Report card not found.");
        pt.insert("report_card_not_found", "Boletim não encontrado.");

        en.insert(
            "report_card_exists",
            "A report card already exists for this student, term and year.",
        );
        pt.insert(
            "report_card_exists",
            "Já existe um boletim para este aluno neste período.",
        );

        en.insert("document_not_draft", "Only draft documents can be edited.");
        pt.insert("document_not_draft", "Apenas documentos em rascunho podem ser alterados.");

        en.insert("invalid_transition", "This status change is not allowed.");
        pt.insert("invalid_transition", "Esta mudança de status não é permitida.");

        en.insert("csv_missing_columns", "The CSV file is missing required columns.");
        pt.insert("csv_missing_columns", "O arquivo CSV não tem as colunas obrigatórias.");

        en.insert("csv_invalid_row", "The CSV file has an invalid row; nothing was imported.");
        pt.insert("csv_invalid_row", "O arquivo CSV tem uma linha inválida; nada foi importado.");

        en.insert("internal", "An unexpected error occurred. Please try again.");
        pt.insert("internal", "Ocorreu um erro inesperado. Tente novamente.");

        let mut messages = HashMap::new();
        messages.insert("en", en);
        messages.insert("pt", pt);

        Self {
            messages: Arc::new(messages),
        }
    }

    /// Busca a mensagem para o código no idioma pedido, caindo para o
    /// inglês (e por fim para o próprio código) se não houver tradução.
    pub fn message(&self, locale: &Locale, code: &str) -> String {
        self.messages
            .get(locale.0.as_str())
            .and_then(|table| table.get(code))
            .or_else(|| self.messages.get("en").and_then(|table| table.get(code)))
            .map(|msg| (*msg).to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traduz_para_o_idioma_pedido() {
        let store = I18nStore::new();
        let pt = Locale("pt".to_string());
        assert_eq!(store.message(&pt, "client_not_found"), "Cliente não encontrado.");
    }

    #[test]
    fn idioma_desconhecido_cai_para_ingles() {
        let store = I18nStore::new();
        let de = Locale("de".to_string());
        assert_eq!(store.message(&de, "client_not_found"), "Client not found.");
    }

    #[test]
    fn codigo_desconhecido_retorna_o_proprio_codigo() {
        let store = I18nStore::new();
        let en = Locale("en".to_string());
        assert_eq!(store.message(&en, "nao_existe"), "nao_existe");
    }
}
