// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AcademicsRepository, BillingRepository, ClientRepository, ReportsRepository,
        SettingsRepository, StudentRepository, UserRepository,
    },
    middleware::i18n::I18nStore,
    services::{
        academics_service::AcademicsService, auth::AuthService, billing_service::BillingService,
        import_service::ImportService, recurrence_service::RecurrenceService,
        reports_service::ReportsService, statement_service::StatementService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,

    // Serviços
    pub auth_service: AuthService,
    pub billing_service: BillingService,
    pub recurrence_service: RecurrenceService,
    pub statement_service: StatementService,
    pub academics_service: AcademicsService,
    pub import_service: ImportService,
    pub reports_service: ReportsService,

    // Repositórios usados direto pelos handlers (CRUD simples)
    pub client_repo: ClientRepository,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let student_repo = StudentRepository::new(db_pool.clone());
        let academics_repo = AcademicsRepository::new(db_pool.clone());
        let billing_repo = BillingRepository::new(db_pool.clone());
        let reports_repo = ReportsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let billing_service = BillingService::new(
            billing_repo.clone(),
            client_repo.clone(),
            settings_repo.clone(),
        );
        let recurrence_service = RecurrenceService::new(
            billing_repo.clone(),
            client_repo.clone(),
            settings_repo.clone(),
        );
        let statement_service = StatementService::new(billing_repo, client_repo.clone());
        let academics_service = AcademicsService::new(academics_repo, student_repo.clone());
        let import_service = ImportService::new(student_repo, client_repo.clone());
        let reports_service = ReportsService::new(reports_repo);

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            billing_service,
            recurrence_service,
            statement_service,
            academics_service,
            import_service,
            reports_service,
            client_repo,
            settings_repo,
        })
    }
}
