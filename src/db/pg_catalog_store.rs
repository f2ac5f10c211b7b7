// src/db/pg_catalog_store.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_company_transaction, error::AppError},
    db::{ProductRepository, VariantRepository},
    models::catalog::{
        Brand, Product, ProductFields, ProductScope, ProductVariant, UnitOfMeasure,
        VariantOption, VariantValue,
    },
    services::catalog_store::{CatalogStore, CatalogTx},
};

/// Implementação Postgres do catálogo.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    product_repo: ProductRepository,
    variant_repo: VariantRepository,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            product_repo: ProductRepository::new(),
            variant_repo: VariantRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn begin(&self, company_id: Uuid) -> Result<Box<dyn CatalogTx>, AppError> {
        let tx = begin_company_transaction(&self.pool, company_id).await?;
        Ok(Box::new(PgCatalogTx {
            tx,
            product_repo: self.product_repo.clone(),
            variant_repo: self.variant_repo.clone(),
        }))
    }
}

// Se for dropada sem commit, o sqlx faz rollback automaticamente.
pub struct PgCatalogTx {
    tx: Transaction<'static, Postgres>,
    product_repo: ProductRepository,
    variant_repo: VariantRepository,
}

#[async_trait]
impl CatalogTx for PgCatalogTx {
    async fn find_brand(&mut self, company_id: Uuid, brand_id: Uuid) -> Result<Option<Brand>, AppError> {
        self.product_repo.find_brand(&mut *self.tx, company_id, brand_id).await
    }

    async fn find_unit_of_measure(
        &mut self,
        company_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<UnitOfMeasure>, AppError> {
        self.product_repo.find_unit_of_measure(&mut *self.tx, company_id, unit_id).await
    }

    async fn product_name_taken(
        &mut self,
        company_id: Uuid,
        name: &str,
        exclude_product: Option<Uuid>,
    ) -> Result<bool, AppError> {
        self.product_repo
            .product_name_taken(&mut *self.tx, company_id, name, exclude_product)
            .await
    }

    async fn insert_product(&mut self, company_id: Uuid, fields: &ProductFields) -> Result<Product, AppError> {
        self.product_repo.insert_product(&mut *self.tx, company_id, fields).await
    }

    async fn lock_product(&mut self, scope: ProductScope) -> Result<Option<Product>, AppError> {
        self.product_repo.lock_product(&mut *self.tx, scope).await
    }

    async fn update_product(&mut self, scope: ProductScope, fields: &ProductFields) -> Result<Product, AppError> {
        self.product_repo.update_product(&mut *self.tx, scope, fields).await
    }

    async fn set_has_variants(&mut self, scope: ProductScope, has_variants: bool) -> Result<Product, AppError> {
        self.product_repo.set_has_variants(&mut *self.tx, scope, has_variants).await
    }

    async fn find_product(&mut self, scope: ProductScope) -> Result<Option<Product>, AppError> {
        self.product_repo.find_product(&mut *self.tx, scope).await
    }

    async fn list_products(&mut self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.product_repo.list_products(&mut *self.tx, company_id).await
    }

    async fn delete_product(&mut self, scope: ProductScope) -> Result<bool, AppError> {
        self.product_repo.delete_product(&mut *self.tx, scope).await
    }

    async fn upsert_option(&mut self, scope: ProductScope, name: &str, position: i32) -> Result<VariantOption, AppError> {
        self.variant_repo.upsert_option(&mut *self.tx, scope, name, position).await
    }

    async fn upsert_value(
        &mut self,
        scope: ProductScope,
        option_id: Uuid,
        value: &str,
        position: i32,
    ) -> Result<VariantValue, AppError> {
        self.variant_repo
            .upsert_value(&mut *self.tx, scope, option_id, value, position)
            .await
    }

    async fn delete_values_except(&mut self, scope: ProductScope, option_id: Uuid, keep: &[Uuid]) -> Result<u64, AppError> {
        self.variant_repo
            .delete_values_except(&mut *self.tx, scope, option_id, keep)
            .await
    }

    async fn delete_options_except(&mut self, scope: ProductScope, keep: &[Uuid]) -> Result<u64, AppError> {
        self.variant_repo.delete_options_except(&mut *self.tx, scope, keep).await
    }

    async fn list_options(&mut self, scope: ProductScope) -> Result<Vec<VariantOption>, AppError> {
        self.variant_repo.list_options(&mut *self.tx, scope).await
    }

    async fn list_values(&mut self, scope: ProductScope, option_id: Uuid) -> Result<Vec<VariantValue>, AppError> {
        self.variant_repo.list_values(&mut *self.tx, scope, option_id).await
    }

    async fn upsert_variant(&mut self, scope: ProductScope, name: &str) -> Result<(ProductVariant, bool), AppError> {
        self.variant_repo.upsert_variant(&mut *self.tx, scope, name).await
    }

    async fn delete_variants_except(&mut self, scope: ProductScope, keep: &[Uuid]) -> Result<u64, AppError> {
        self.variant_repo.delete_variants_except(&mut *self.tx, scope, keep).await
    }

    async fn find_variant_by_name(&mut self, scope: ProductScope, name: &str) -> Result<Option<ProductVariant>, AppError> {
        self.variant_repo.find_variant_by_name(&mut *self.tx, scope, name).await
    }

    async fn update_variant_details(
        &mut self,
        scope: ProductScope,
        variant_id: Uuid,
        sku: Option<&str>,
        cost: Option<Decimal>,
        price: Option<Decimal>,
    ) -> Result<ProductVariant, AppError> {
        self.variant_repo
            .update_variant_details(&mut *self.tx, scope, variant_id, sku, cost, price)
            .await
    }

    async fn list_variants(&mut self, scope: ProductScope) -> Result<Vec<ProductVariant>, AppError> {
        self.variant_repo.list_variants(&mut *self.tx, scope).await
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
