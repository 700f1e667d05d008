// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new().route("/me", get(handlers::auth::me));

    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    );

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/{id}/statement", get(handlers::clients::client_statement));

    let student_routes = Router::new()
        .route(
            "/",
            post(handlers::students::create_student).get(handlers::students::list_students),
        )
        .route(
            "/{id}",
            get(handlers::students::get_student)
                .put(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        );

    let academics_routes = Router::new()
        .route("/assessments", post(handlers::academics::create_assessment))
        .route(
            "/assessments/{id}",
            axum::routing::delete(handlers::academics::delete_assessment),
        )
        .route(
            "/students/{id}/assessments",
            get(handlers::academics::list_assessments),
        )
        .route(
            "/students/{id}/subjects/{subject}/average",
            get(handlers::academics::subject_average),
        )
        .route(
            "/students/{id}/report-cards",
            get(handlers::academics::list_report_cards),
        )
        .route(
            "/report-cards",
            post(handlers::academics::create_report_card),
        )
        .route(
            "/report-cards/{id}",
            get(handlers::academics::get_report_card),
        )
        .route(
            "/report-cards/{id}/status",
            patch(handlers::academics::update_report_card_status),
        );

    let billing_routes = Router::new()
        .route(
            "/documents",
            post(handlers::billing::create_document).get(handlers::billing::list_documents),
        )
        .route("/documents/{id}", get(handlers::billing::get_document))
        .route("/documents/{id}/send", post(handlers::billing::send_document))
        .route(
            "/documents/{id}/payment",
            post(handlers::billing::record_payment),
        )
        .route(
            "/documents/{id}/items",
            post(handlers::billing::add_line_item),
        )
        .route(
            "/documents/{id}/items/{item_id}",
            put(handlers::billing::update_line_item)
                .delete(handlers::billing::remove_line_item),
        )
        .route(
            "/recurring",
            post(handlers::recurring::create_template).get(handlers::recurring::list_templates),
        )
        .route("/recurring/run", post(handlers::recurring::run_recurrence))
        .route("/recurring/{id}", get(handlers::recurring::get_template))
        .route(
            "/recurring/{id}/status",
            patch(handlers::recurring::update_template_status),
        );

    let reports_routes = Router::new()
        .route("/revenue/monthly", get(handlers::reports::monthly_revenue))
        .route("/clients/top", get(handlers::reports::top_clients));

    let import_routes = Router::new()
        .route("/students", post(handlers::import::import_students))
        .route("/clients", post(handlers::import::import_clients));

    // Tudo depois de /api/auth exige o Bearer token
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/students", student_routes)
        .nest("/api/academics", academics_routes)
        .nest("/api/billing", billing_routes)
        .nest("/api/reports", reports_routes)
        .nest("/api/import", import_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
