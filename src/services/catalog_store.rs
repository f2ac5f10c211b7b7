// src/services/catalog_store.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{
        Brand, Product, ProductFields, ProductScope, ProductVariant, UnitOfMeasure,
        VariantOption, VariantValue,
    },
};

/// Fonte de transações do catálogo. Cada transação já nasce amarrada a uma
/// empresa; nada é gravado antes do `commit`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn begin(&self, company_id: Uuid) -> Result<Box<dyn CatalogTx>, AppError>;
}

/// Operações do catálogo dentro de uma transação.
///
/// Todas as buscas filtram por empresa (e por produto, quando há escopo):
/// uma linha de outra empresa simplesmente não é encontrada.
/// Dropar a transação sem `commit` desfaz tudo.
#[async_trait]
pub trait CatalogTx: Send {
    // --- Referências ---
    async fn find_brand(&mut self, company_id: Uuid, brand_id: Uuid) -> Result<Option<Brand>, AppError>;

    async fn find_unit_of_measure(
        &mut self,
        company_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<UnitOfMeasure>, AppError>;

    async fn product_name_taken(
        &mut self,
        company_id: Uuid,
        name: &str,
        exclude_product: Option<Uuid>,
    ) -> Result<bool, AppError>;

    // --- Produto ---
    async fn insert_product(&mut self, company_id: Uuid, fields: &ProductFields) -> Result<Product, AppError>;

    /// Busca o produto travando a linha até o fim da transação.
    async fn lock_product(&mut self, scope: ProductScope) -> Result<Option<Product>, AppError>;

    async fn update_product(&mut self, scope: ProductScope, fields: &ProductFields) -> Result<Product, AppError>;

    async fn set_has_variants(&mut self, scope: ProductScope, has_variants: bool) -> Result<Product, AppError>;

    async fn find_product(&mut self, scope: ProductScope) -> Result<Option<Product>, AppError>;

    async fn list_products(&mut self, company_id: Uuid) -> Result<Vec<Product>, AppError>;

    /// Remove o produto e, em cascata, opções, valores e variantes.
    async fn delete_product(&mut self, scope: ProductScope) -> Result<bool, AppError>;

    // --- Opções e valores ---
    async fn upsert_option(&mut self, scope: ProductScope, name: &str, position: i32) -> Result<VariantOption, AppError>;

    async fn upsert_value(
        &mut self,
        scope: ProductScope,
        option_id: Uuid,
        value: &str,
        position: i32,
    ) -> Result<VariantValue, AppError>;

    async fn delete_values_except(&mut self, scope: ProductScope, option_id: Uuid, keep: &[Uuid]) -> Result<u64, AppError>;

    /// Remove as opções fora de `keep` (e os seus valores).
    async fn delete_options_except(&mut self, scope: ProductScope, keep: &[Uuid]) -> Result<u64, AppError>;

    /// Opções na ordem estável: posição do último pedido, depois criação.
    async fn list_options(&mut self, scope: ProductScope) -> Result<Vec<VariantOption>, AppError>;

    async fn list_values(&mut self, scope: ProductScope, option_id: Uuid) -> Result<Vec<VariantValue>, AppError>;

    // --- Variantes ---
    /// Get-or-create pelo nome canônico. O `bool` indica se a linha foi criada agora.
    async fn upsert_variant(&mut self, scope: ProductScope, name: &str) -> Result<(ProductVariant, bool), AppError>;

    async fn delete_variants_except(&mut self, scope: ProductScope, keep: &[Uuid]) -> Result<u64, AppError>;

    async fn find_variant_by_name(&mut self, scope: ProductScope, name: &str) -> Result<Option<ProductVariant>, AppError>;

    /// Campos `None` mantêm o valor gravado.
    async fn update_variant_details(
        &mut self,
        scope: ProductScope,
        variant_id: Uuid,
        sku: Option<&str>,
        cost: Option<Decimal>,
        price: Option<Decimal>,
    ) -> Result<ProductVariant, AppError>;

    async fn list_variants(&mut self, scope: ProductScope) -> Result<Vec<ProductVariant>, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}
