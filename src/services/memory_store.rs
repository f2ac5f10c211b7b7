// src/services/memory_store.rs
//
// Catálogo em memória para os testes: mesma semântica de escopo e de
// transação do Postgres (cópia de trabalho, gravada só no commit).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{
        round_to_column, Brand, Product, ProductFields, ProductScope, ProductVariant,
        UnitOfMeasure, VariantOption, VariantValue, MONEY_SCALE, QUANTITY_SCALE,
    },
    services::catalog_store::{CatalogStore, CatalogTx},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryState {
    pub brands: Vec<Brand>,
    pub units: Vec<UnitOfMeasure>,
    pub products: Vec<Product>,
    pub options: Vec<VariantOption>,
    pub values: Vec<VariantValue>,
    pub variants: Vec<ProductVariant>,
}

impl MemoryState {
    pub fn options_of(&self, product_id: Uuid) -> Vec<&VariantOption> {
        self.options.iter().filter(|o| o.product_id == product_id).collect()
    }

    pub fn values_of(&self, product_id: Uuid) -> Vec<&VariantValue> {
        self.values.iter().filter(|v| v.product_id == product_id).collect()
    }

    pub fn variants_of(&self, product_id: Uuid) -> Vec<&ProductVariant> {
        self.variants.iter().filter(|v| v.product_id == product_id).collect()
    }
}

#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().expect("estado em memória envenenado").clone()
    }

    pub fn add_brand(&self, company_id: Uuid, name: &str) -> Brand {
        let now = Utc::now();
        let brand = Brand {
            id: Uuid::new_v4(),
            company_id,
            name: name.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().expect("estado em memória envenenado").brands.push(brand.clone());
        brand
    }

    pub fn add_unit(&self, company_id: Uuid, name: &str, abbreviation: &str) -> UnitOfMeasure {
        let now = Utc::now();
        let unit = UnitOfMeasure {
            id: Uuid::new_v4(),
            company_id,
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().expect("estado em memória envenenado").units.push(unit.clone());
        unit
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn begin(&self, _company_id: Uuid) -> Result<Box<dyn CatalogTx>, AppError> {
        Ok(Box::new(MemoryTx {
            working: self.snapshot(),
            target: Arc::clone(&self.state),
        }))
    }
}

pub struct MemoryTx {
    working: MemoryState,
    target: Arc<Mutex<MemoryState>>,
}

// As colunas NUMERIC(10, 2) arredondam na gravação; aqui também.
fn money(val: Decimal) -> Decimal {
    round_to_column(val, MONEY_SCALE)
}

fn in_scope(company_id: Uuid, product_id: Uuid, scope: ProductScope) -> bool {
    company_id == scope.company_id && product_id == scope.product_id
}

#[async_trait]
impl CatalogTx for MemoryTx {
    async fn find_brand(&mut self, company_id: Uuid, brand_id: Uuid) -> Result<Option<Brand>, AppError> {
        Ok(self
            .working
            .brands
            .iter()
            .find(|b| b.company_id == company_id && b.id == brand_id)
            .cloned())
    }

    async fn find_unit_of_measure(
        &mut self,
        company_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<UnitOfMeasure>, AppError> {
        Ok(self
            .working
            .units
            .iter()
            .find(|u| u.company_id == company_id && u.id == unit_id)
            .cloned())
    }

    async fn product_name_taken(
        &mut self,
        company_id: Uuid,
        name: &str,
        exclude_product: Option<Uuid>,
    ) -> Result<bool, AppError> {
        Ok(self.working.products.iter().any(|p| {
            p.company_id == company_id && p.name == name && Some(p.id) != exclude_product
        }))
    }

    async fn insert_product(&mut self, company_id: Uuid, fields: &ProductFields) -> Result<Product, AppError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            company_id,
            brand_id: fields.brand_id,
            unit_of_measure_id: fields.unit_of_measure_id,
            sku: fields.sku.clone(),
            barcode: fields.barcode.clone(),
            name: fields.name.clone(),
            description: fields.description.clone(),
            base_cost: money(fields.base_cost),
            base_price: money(fields.base_price),
            minimum_sale_unit: round_to_column(fields.minimum_sale_unit, QUANTITY_SCALE),
            minimum_unit_price: money(fields.minimum_unit_price),
            stock_quantity: fields.stock_quantity,
            has_variants: false,
            created_at: now,
            updated_at: now,
        };
        self.working.products.push(product.clone());
        Ok(product)
    }

    async fn lock_product(&mut self, scope: ProductScope) -> Result<Option<Product>, AppError> {
        self.find_product(scope).await
    }

    async fn update_product(&mut self, scope: ProductScope, fields: &ProductFields) -> Result<Product, AppError> {
        let product = self
            .working
            .products
            .iter_mut()
            .find(|p| p.company_id == scope.company_id && p.id == scope.product_id)
            .ok_or(AppError::ProductNotFound)?;
        product.brand_id = fields.brand_id;
        product.unit_of_measure_id = fields.unit_of_measure_id;
        product.sku = fields.sku.clone();
        product.barcode = fields.barcode.clone();
        product.name = fields.name.clone();
        product.description = fields.description.clone();
        product.base_cost = money(fields.base_cost);
        product.base_price = money(fields.base_price);
        product.minimum_sale_unit = round_to_column(fields.minimum_sale_unit, QUANTITY_SCALE);
        product.minimum_unit_price = money(fields.minimum_unit_price);
        product.stock_quantity = fields.stock_quantity;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn set_has_variants(&mut self, scope: ProductScope, has_variants: bool) -> Result<Product, AppError> {
        let product = self
            .working
            .products
            .iter_mut()
            .find(|p| p.company_id == scope.company_id && p.id == scope.product_id)
            .ok_or(AppError::ProductNotFound)?;
        product.has_variants = has_variants;
        Ok(product.clone())
    }

    async fn find_product(&mut self, scope: ProductScope) -> Result<Option<Product>, AppError> {
        Ok(self
            .working
            .products
            .iter()
            .find(|p| p.company_id == scope.company_id && p.id == scope.product_id)
            .cloned())
    }

    async fn list_products(&mut self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        // Mais recentes primeiro, como no Postgres
        Ok(self
            .working
            .products
            .iter()
            .rev()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn delete_product(&mut self, scope: ProductScope) -> Result<bool, AppError> {
        let before = self.working.products.len();
        self.working
            .products
            .retain(|p| !(p.company_id == scope.company_id && p.id == scope.product_id));
        if self.working.products.len() == before {
            return Ok(false);
        }
        // ON DELETE CASCADE
        self.working.options.retain(|o| !in_scope(o.company_id, o.product_id, scope));
        self.working.values.retain(|v| !in_scope(v.company_id, v.product_id, scope));
        self.working.variants.retain(|v| !in_scope(v.company_id, v.product_id, scope));
        Ok(true)
    }

    async fn upsert_option(&mut self, scope: ProductScope, name: &str, position: i32) -> Result<VariantOption, AppError> {
        if let Some(option) = self
            .working
            .options
            .iter_mut()
            .find(|o| in_scope(o.company_id, o.product_id, scope) && o.name == name)
        {
            option.position = position;
            return Ok(option.clone());
        }

        let now = Utc::now();
        let option = VariantOption {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            product_id: scope.product_id,
            name: name.to_string(),
            position,
            created_at: now,
            updated_at: now,
        };
        self.working.options.push(option.clone());
        Ok(option)
    }

    async fn upsert_value(
        &mut self,
        scope: ProductScope,
        option_id: Uuid,
        value: &str,
        position: i32,
    ) -> Result<VariantValue, AppError> {
        if let Some(row) = self.working.values.iter_mut().find(|v| {
            in_scope(v.company_id, v.product_id, scope) && v.option_id == option_id && v.value == value
        }) {
            row.position = position;
            return Ok(row.clone());
        }

        let now = Utc::now();
        let row = VariantValue {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            product_id: scope.product_id,
            option_id,
            value: value.to_string(),
            position,
            created_at: now,
            updated_at: now,
        };
        self.working.values.push(row.clone());
        Ok(row)
    }

    async fn delete_values_except(&mut self, scope: ProductScope, option_id: Uuid, keep: &[Uuid]) -> Result<u64, AppError> {
        let before = self.working.values.len();
        self.working.values.retain(|v| {
            !(in_scope(v.company_id, v.product_id, scope) && v.option_id == option_id && !keep.contains(&v.id))
        });
        Ok((before - self.working.values.len()) as u64)
    }

    async fn delete_options_except(&mut self, scope: ProductScope, keep: &[Uuid]) -> Result<u64, AppError> {
        let removed: Vec<Uuid> = self
            .working
            .options
            .iter()
            .filter(|o| in_scope(o.company_id, o.product_id, scope) && !keep.contains(&o.id))
            .map(|o| o.id)
            .collect();

        self.working.options.retain(|o| !removed.contains(&o.id));
        self.working.values.retain(|v| !removed.contains(&v.option_id));
        Ok(removed.len() as u64)
    }

    async fn list_options(&mut self, scope: ProductScope) -> Result<Vec<VariantOption>, AppError> {
        let mut options: Vec<VariantOption> = self
            .working
            .options
            .iter()
            .filter(|o| in_scope(o.company_id, o.product_id, scope))
            .cloned()
            .collect();
        // sort estável: empates mantêm a ordem de criação
        options.sort_by_key(|o| o.position);
        Ok(options)
    }

    async fn list_values(&mut self, scope: ProductScope, option_id: Uuid) -> Result<Vec<VariantValue>, AppError> {
        let mut values: Vec<VariantValue> = self
            .working
            .values
            .iter()
            .filter(|v| in_scope(v.company_id, v.product_id, scope) && v.option_id == option_id)
            .cloned()
            .collect();
        values.sort_by_key(|v| v.position);
        Ok(values)
    }

    async fn upsert_variant(&mut self, scope: ProductScope, name: &str) -> Result<(ProductVariant, bool), AppError> {
        if let Some(variant) = self
            .working
            .variants
            .iter()
            .find(|v| in_scope(v.company_id, v.product_id, scope) && v.name == name)
        {
            return Ok((variant.clone(), false));
        }

        let now = Utc::now();
        let variant = ProductVariant {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            product_id: scope.product_id,
            sku: None,
            barcode: None,
            name: name.to_string(),
            cost: Decimal::ZERO,
            price: Decimal::ZERO,
            stock_quantity: 0,
            created_at: now,
            updated_at: now,
        };
        self.working.variants.push(variant.clone());
        Ok((variant, true))
    }

    async fn delete_variants_except(&mut self, scope: ProductScope, keep: &[Uuid]) -> Result<u64, AppError> {
        let before = self.working.variants.len();
        self.working
            .variants
            .retain(|v| !(in_scope(v.company_id, v.product_id, scope) && !keep.contains(&v.id)));
        Ok((before - self.working.variants.len()) as u64)
    }

    async fn find_variant_by_name(&mut self, scope: ProductScope, name: &str) -> Result<Option<ProductVariant>, AppError> {
        Ok(self
            .working
            .variants
            .iter()
            .find(|v| in_scope(v.company_id, v.product_id, scope) && v.name == name)
            .cloned())
    }

    async fn update_variant_details(
        &mut self,
        scope: ProductScope,
        variant_id: Uuid,
        sku: Option<&str>,
        cost: Option<Decimal>,
        price: Option<Decimal>,
    ) -> Result<ProductVariant, AppError> {
        let variant = self
            .working
            .variants
            .iter_mut()
            .find(|v| in_scope(v.company_id, v.product_id, scope) && v.id == variant_id)
            .ok_or_else(|| AppError::VariantNotFound(variant_id.to_string()))?;
        if let Some(sku) = sku {
            variant.sku = Some(sku.to_string());
        }
        if let Some(cost) = cost {
            variant.cost = money(cost);
        }
        if let Some(price) = price {
            variant.price = money(price);
        }
        variant.updated_at = Utc::now();
        Ok(variant.clone())
    }

    async fn list_variants(&mut self, scope: ProductScope) -> Result<Vec<ProductVariant>, AppError> {
        Ok(self
            .working
            .variants
            .iter()
            .filter(|v| in_scope(v.company_id, v.product_id, scope))
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let mut target = self.target.lock().expect("estado em memória envenenado");
        *target = self.working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, price: Decimal) -> ProductFields {
        ProductFields {
            brand_id: None,
            unit_of_measure_id: None,
            sku: None,
            barcode: None,
            name: name.to_string(),
            description: None,
            base_cost: Decimal::ZERO,
            base_price: price,
            minimum_sale_unit: Decimal::new(1_0005, 4),
            minimum_unit_price: Decimal::ZERO,
            stock_quantity: 0,
        }
    }

    #[tokio::test]
    async fn amounts_are_rounded_like_numeric_columns() {
        let store = MemoryCatalogStore::new();
        let company_id = Uuid::new_v4();
        let mut tx = store.begin(company_id).await.unwrap();

        let product = tx
            .insert_product(company_id, &fields("Caneca", Decimal::new(19_999, 3)))
            .await
            .unwrap();
        assert_eq!(product.base_price, Decimal::new(2_000, 2));
        assert_eq!(product.minimum_sale_unit, Decimal::new(1_001, 3));

        let scope = product.scope();
        let (variant, inserted) = tx.upsert_variant(scope, "Size - S").await.unwrap();
        assert!(inserted);

        let variant = tx
            .update_variant_details(scope, variant.id, None, Some(Decimal::new(125, 3)), None)
            .await
            .unwrap();
        assert_eq!(variant.cost, Decimal::new(13, 2));
        assert_eq!(variant.price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn nothing_is_visible_before_commit() {
        let store = MemoryCatalogStore::new();
        let company_id = Uuid::new_v4();

        let mut tx = store.begin(company_id).await.unwrap();
        tx.insert_product(company_id, &fields("Caneca", Decimal::ONE)).await.unwrap();
        assert!(store.snapshot().products.is_empty());

        tx.commit().await.unwrap();
        assert_eq!(store.snapshot().products.len(), 1);
    }
}
