use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Helper RLS: a "chave" da empresa para o banco de dados
// ---
/// Abre uma transação e define `app.company_id` para as políticas RLS.
/// O `set_config(..., true)` vale só até o fim da transação.
pub(crate) async fn begin_company_transaction(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT set_config('app.company_id', $1, true)")
        .bind(company_id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
