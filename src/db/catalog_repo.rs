// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::catalog::{Brand, Product, ProductFields, ProductScope, UnitOfMeasure},
};

// Não guarda a pool: todas as funções recebem o executor (transação RLS).
#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Referências (Marca / Unidade)
    // ---

    pub async fn find_brand<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        brand_id: Uuid,
    ) -> Result<Option<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT * FROM brands WHERE company_id = $1 AND id = $2",
        )
            .bind(company_id)
            .bind(brand_id)
            .fetch_optional(executor)
            .await?;
        Ok(brand)
    }

    pub async fn find_unit_of_measure<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<UnitOfMeasure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, UnitOfMeasure>(
            "SELECT * FROM units_of_measure WHERE company_id = $1 AND id = $2",
        )
            .bind(company_id)
            .bind(unit_id)
            .fetch_optional(executor)
            .await?;
        Ok(unit)
    }

    /// Nome de produto é único por empresa. No update, o próprio produto não conta.
    pub async fn product_name_taken<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        exclude_product: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM products
                WHERE company_id = $1
                  AND name = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
            .bind(company_id)
            .bind(name)
            .bind(exclude_product)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // ---
    // Produto
    // ---

    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                company_id, brand_id, unit_of_measure_id, sku, barcode, name, description,
                base_cost, base_price, minimum_sale_unit, minimum_unit_price, stock_quantity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
            .bind(company_id)
            .bind(fields.brand_id)
            .bind(fields.unit_of_measure_id)
            .bind(fields.sku.as_deref())
            .bind(fields.barcode.as_deref())
            .bind(&fields.name)
            .bind(fields.description.as_deref())
            .bind(fields.base_cost)
            .bind(fields.base_price)
            .bind(fields.minimum_sale_unit)
            .bind(fields.minimum_unit_price)
            .bind(fields.stock_quantity)
            .fetch_one(executor)
            .await
            .map_err(|e| map_name_conflict(e, &fields.name))
    }

    /// `FOR UPDATE`: segura a linha do produto até o commit, serializando
    /// atualizações concorrentes do mesmo produto.
    pub async fn lock_product<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE company_id = $1 AND id = $2 FOR UPDATE",
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        fields: &ProductFields,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                brand_id = $3,
                unit_of_measure_id = $4,
                sku = $5,
                barcode = $6,
                name = $7,
                description = $8,
                base_cost = $9,
                base_price = $10,
                minimum_sale_unit = $11,
                minimum_unit_price = $12,
                stock_quantity = $13,
                updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(fields.brand_id)
            .bind(fields.unit_of_measure_id)
            .bind(fields.sku.as_deref())
            .bind(fields.barcode.as_deref())
            .bind(&fields.name)
            .bind(fields.description.as_deref())
            .bind(fields.base_cost)
            .bind(fields.base_price)
            .bind(fields.minimum_sale_unit)
            .bind(fields.minimum_unit_price)
            .bind(fields.stock_quantity)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_name_conflict(e, &fields.name))?
            .ok_or(AppError::ProductNotFound)
    }

    /// Grava apenas a flag derivada `has_variants`.
    pub async fn set_has_variants<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
        has_variants: bool,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET has_variants = $3, updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .bind(has_variants)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE company_id = $1 AND id = $2",
        )
            .bind(scope.company_id)
            .bind(scope.product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE company_id = $1 ORDER BY created_at DESC, name ASC",
        )
            .bind(company_id)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    /// Opções, valores e variantes caem junto via `ON DELETE CASCADE`.
    pub async fn delete_product<'e, E>(
        &self,
        executor: E,
        scope: ProductScope,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE company_id = $1 AND id = $2")
            .bind(scope.company_id)
            .bind(scope.product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Converte a violação de (company_id, name) num erro mais amigável
fn map_name_conflict(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::ProductNameAlreadyExists(name.to_string());
        }
    }
    e.into()
}
