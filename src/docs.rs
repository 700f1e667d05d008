// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Clientes ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::client_statement,

        // --- Alunos ---
        handlers::students::create_student,
        handlers::students::list_students,
        handlers::students::get_student,
        handlers::students::update_student,
        handlers::students::delete_student,

        // --- Acadêmico ---
        handlers::academics::create_assessment,
        handlers::academics::list_assessments,
        handlers::academics::delete_assessment,
        handlers::academics::subject_average,
        handlers::academics::create_report_card,
        handlers::academics::get_report_card,
        handlers::academics::list_report_cards,
        handlers::academics::update_report_card_status,

        // --- Faturamento ---
        handlers::billing::create_document,
        handlers::billing::list_documents,
        handlers::billing::get_document,
        handlers::billing::send_document,
        handlers::billing::record_payment,
        handlers::billing::add_line_item,
        handlers::billing::update_line_item,
        handlers::billing::remove_line_item,

        // --- Recorrência ---
        handlers::recurring::create_template,
        handlers::recurring::list_templates,
        handlers::recurring::get_template,
        handlers::recurring::update_template_status,
        handlers::recurring::run_recurrence,

        // --- Relatórios ---
        handlers::reports::monthly_revenue,
        handlers::reports::top_clients,

        // --- Importação ---
        handlers::import::import_students,
        handlers::import::import_clients,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Settings ---
            models::settings::AccountSettings,
            models::settings::UpdateSettingsPayload,

            // --- Clientes ---
            models::clients::Client,
            models::clients::CreateClientPayload,
            models::clients::UpdateClientPayload,

            // --- Alunos ---
            models::students::Student,
            models::students::CreateStudentPayload,
            models::students::UpdateStudentPayload,

            // --- Acadêmico ---
            models::academics::Assessment,
            models::academics::CreateAssessmentPayload,
            models::academics::ReportCardStatus,
            models::academics::ReportCard,
            models::academics::ReportCardSubject,
            models::academics::ReportCardDetail,
            models::academics::CreateReportCardPayload,
            handlers::academics::SubjectAverageResponse,
            handlers::academics::UpdateReportCardStatusPayload,

            // --- Faturamento ---
            models::billing::DocumentKind,
            models::billing::DocumentStatus,
            models::billing::Document,
            models::billing::LineItem,
            models::billing::DocumentDetail,
            models::billing::LineItemPayload,
            models::billing::CreateDocumentPayload,
            models::billing::Frequency,
            models::billing::RecurringStatus,
            models::billing::RecurringTemplate,
            models::billing::CreateRecurringPayload,
            handlers::billing::RecordPaymentPayload,
            handlers::recurring::UpdateTemplateStatusPayload,

            // --- Relatórios ---
            models::reports::EntryKind,
            models::reports::StatementEntry,
            models::reports::StatementSummary,
            models::reports::ClientStatement,
            models::reports::MonthlyRevenueEntry,
            models::reports::TopClientEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Configurações", description = "Perfil da conta e padrões de faturamento"),
        (name = "Clientes", description = "Clientes de faturamento e extratos"),
        (name = "Alunos", description = "Matrículas"),
        (name = "Acadêmico", description = "Avaliações, médias e boletins"),
        (name = "Faturamento", description = "Faturas, notas de crédito e itens de linha"),
        (name = "Recorrência", description = "Modelos de faturamento recorrente"),
        (name = "Relatórios", description = "Receita mensal e ranking de clientes"),
        (name = "Importação", description = "Importação em massa via CSV")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
