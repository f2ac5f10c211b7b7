// src/db/tenancy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use crate::{common::error::AppError, models::tenancy::Company};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verifica se o usuário é dono da empresa e devolve a empresa.
    /// Esta é a verificação de autorização mais importante: uma empresa de
    /// outro usuário é tratada como inexistente.
    pub async fn find_for_user(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND user_id = $2",
        )
            .bind(company_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }
}
