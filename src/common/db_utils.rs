// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define a variável RLS `app.owner_id`.
/// As políticas do Postgres usam esse valor para isolar os registros do
/// dono autenticado, mesmo que algum WHERE seja esquecido em uma query.
pub(crate) async fn get_owner_connection(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // 1. Adquire conexão
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    // 2. Define o dono da sessão (is_local = false: vale até a próxima
    //    aquisição redefinir; dentro de transações continua visível)
    sqlx::query("SELECT set_config('app.owner_id', $1, false)")
        .bind(user.0.id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
