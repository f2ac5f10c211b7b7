// src/db/variant_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::catalog::{ProductScope, ProductVariant, VariantOption, VariantValue},
};

// Linha devolvida pelo upsert de variante: `inserted` vem de `xmax = 0`,
// verdadeiro apenas quando o INSERT não caiu no ON CONFLICT.
#[derive(FromRow)]
struct UpsertedVariant {
    #[sqlx(flatten)]
    variant: ProductVariant,
    inserted: bool,
}

#[derive(Clone, Default)]
pub struct VariantRepository;

impl VariantRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Opções
    // ---

    /// "UPSERT" pela chave natural (empresa, produto, nome).
    /// Se já existir, só atualiza a posição: o id é preservado.
    pub async fn upsert_option<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        name: &str,
        position: i32,
    ) -> Result<VariantOption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let option = sqlx::query_as::<_, VariantOption>(
            r#"
            INSERT INTO variant_options (company_id, product_id, name, position)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id, product_id, name)
            DO UPDATE SET position = EXCLUDED.position, updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(name)
            .bind(position)
            .fetch_one(executor)
            .await?;
        Ok(option)
    }

    pub async fn delete_options_except<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        keep: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // `<> ALL` com array vazio é verdadeiro: remove todas as opções
        let result = sqlx::query(
            "DELETE FROM variant_options WHERE company_id = $1 AND product_id = $2 AND id <> ALL($3)",
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(keep)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_options<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
    ) -> Result<Vec<VariantOption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let options = sqlx::query_as::<_, VariantOption>(
            r#"
            SELECT * FROM variant_options
            WHERE company_id = $1 AND product_id = $2
            ORDER BY position ASC, seq ASC
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .fetch_all(executor)
            .await?;
        Ok(options)
    }

    // ---
    // Valores
    // ---

    pub async fn upsert_value<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        option_id: Uuid,
        value: &str,
        position: i32,
    ) -> Result<VariantValue, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, VariantValue>(
            r#"
            INSERT INTO variant_values (company_id, product_id, option_id, value, position)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (company_id, product_id, option_id, value)
            DO UPDATE SET position = EXCLUDED.position, updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(option_id)
            .bind(value)
            .bind(position)
            .fetch_one(executor)
            .await?;
        Ok(row)
    }

    pub async fn delete_values_except<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        option_id: Uuid,
        keep: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM variant_values
            WHERE company_id = $1 AND product_id = $2 AND option_id = $3 AND id <> ALL($4)
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(option_id)
            .bind(keep)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_values<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        option_id: Uuid,
    ) -> Result<Vec<VariantValue>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let values = sqlx::query_as::<_, VariantValue>(
            r#"
            SELECT * FROM variant_values
            WHERE company_id = $1 AND product_id = $2 AND option_id = $3
            ORDER BY position ASC, seq ASC
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(option_id)
            .fetch_all(executor)
            .await?;
        Ok(values)
    }

    // ---
    // Variantes
    // ---

    /// Get-or-create atômico. Uma variante existente volta intacta
    /// (sku/custo/preço preservados); uma nova nasce zerada.
    pub async fn upsert_variant<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        name: &str,
    ) -> Result<(ProductVariant, bool), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, UpsertedVariant>(
            r#"
            INSERT INTO product_variants (company_id, product_id, name, cost, price, stock_quantity)
            VALUES ($1, $2, $3, 0, 0, 0)
            ON CONFLICT (company_id, product_id, name)
            DO UPDATE SET name = EXCLUDED.name
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(name)
            .fetch_one(executor)
            .await?;
        Ok((row.variant, row.inserted))
    }

    pub async fn delete_variants_except<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        keep: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM product_variants WHERE company_id = $1 AND product_id = $2 AND id <> ALL($3)",
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(keep)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_variant_by_name<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        name: &str,
    ) -> Result<Option<ProductVariant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant = sqlx::query_as::<_, ProductVariant>(
            "SELECT * FROM product_variants WHERE company_id = $1 AND product_id = $2 AND name = $3",
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(variant)
    }

    /// Aplica sku/custo/preço; `None` mantém o valor atual.
    /// Estoque e código de barras não são tocados.
    pub async fn update_variant_details<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        variant_id: Uuid,
        sku: Option<&str>,
        cost: Option<Decimal>,
        price: Option<Decimal>,
    ) -> Result<ProductVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ProductVariant>(
            r#"
            UPDATE product_variants SET
                sku = COALESCE($4, sku),
                cost = COALESCE($5, cost),
                price = COALESCE($6, price),
                updated_at = NOW()
            WHERE company_id = $1 AND product_id = $2 AND id = $3
            RETURNING *
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(variant_id)
            .bind(sku)
            .bind(cost)
            .bind(price)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::VariantNotFound(variant_id.to_string()))
    }

    pub async fn list_variants<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
    ) -> Result<Vec<ProductVariant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT * FROM product_variants
            WHERE company_id = $1 AND product_id = $2
            ORDER BY seq ASC
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .fetch_all(executor)
            .await?;
        Ok(variants)
    }
}
