// src/services/product_service.rs

use std::{fmt, str::FromStr, sync::Arc};

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{
        Product, ProductDetail, ProductFields, ProductPayload, ProductScope, ProductVariantView,
        VariantOptionView,
    },
    services::{
        catalog_store::{CatalogStore, CatalogTx},
        variant_service::{apply_variant_overrides, generate_variants, reconcile_options},
    },
};

/// Como decidir `Product.has_variants` depois da geração.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HasVariantsPolicy {
    /// Verdadeiro se o pedido trouxe ao menos uma opção (mesmo sem valores).
    #[default]
    SubmittedOptions,
    /// Verdadeiro se a geração deixou ao menos uma variante viva.
    GeneratedVariants,
}

impl HasVariantsPolicy {
    pub fn resolve(self, submitted_options: usize, live_variants: usize) -> bool {
        match self {
            HasVariantsPolicy::SubmittedOptions => submitted_options > 0,
            HasVariantsPolicy::GeneratedVariants => live_variants > 0,
        }
    }
}

impl FromStr for HasVariantsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submitted" => Ok(HasVariantsPolicy::SubmittedOptions),
            "generated" => Ok(HasVariantsPolicy::GeneratedVariants),
            other => Err(format!(
                "HAS_VARIANTS_POLICY inválida: '{other}' (use 'submitted' ou 'generated')"
            )),
        }
    }
}

impl fmt::Display for HasVariantsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HasVariantsPolicy::SubmittedOptions => f.write_str("submitted"),
            HasVariantsPolicy::GeneratedVariants => f.write_str("generated"),
        }
    }
}

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
    has_variants_policy: HasVariantsPolicy,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>, has_variants_policy: HasVariantsPolicy) -> Self {
        Self { store, has_variants_policy }
    }

    /// LÓGICA DE NEGÓCIO: cria o produto e, atomicamente, as suas opções,
    /// valores e variantes.
    #[tracing::instrument(
        skip(self, payload),
        fields(company_id = %company_id, product_name = %payload.name),
        err
    )]
    pub async fn create_product(
        &self,
        company_id: Uuid,
        payload: ProductPayload,
    ) -> Result<ProductDetail, AppError> {
        // 1. Inicia a transação (já com a chave RLS da empresa)
        let mut tx = self.store.begin(company_id).await?;

        // 2. Resolve marca/unidade e valida o nome
        let fields = resolve_fields(tx.as_mut(), company_id, &payload, None).await?;

        // 3. Cria o produto. A linha nova fica presa a esta transação até o commit.
        let product = tx.insert_product(company_id, &fields).await?;

        // 4. Opções -> Variantes -> Overrides -> has_variants
        let detail = self.sync_variants(tx.as_mut(), product, &payload).await?;

        // 5. Commit. Qualquer '?' acima derruba a transação (rollback no drop).
        tx.commit().await?;

        tracing::info!(product_id = %detail.product.id, "✅ Produto criado");
        Ok(detail)
    }

    #[tracing::instrument(
        skip(self, payload),
        fields(company_id = %company_id, product_id = %product_id),
        err
    )]
    pub async fn update_product(
        &self,
        company_id: Uuid,
        product_id: Uuid,
        payload: ProductPayload,
    ) -> Result<ProductDetail, AppError> {
        let scope = ProductScope { company_id, product_id };
        let mut tx = self.store.begin(company_id).await?;

        // Trava o produto: dois updates do mesmo produto nunca se intercalam.
        // Produto de outra empresa = não encontrado.
        tx.lock_product(scope).await?.ok_or(AppError::ProductNotFound)?;

        let fields = resolve_fields(tx.as_mut(), company_id, &payload, Some(product_id)).await?;
        let product = tx.update_product(scope, &fields).await?;

        let detail = self.sync_variants(tx.as_mut(), product, &payload).await?;

        tx.commit().await?;

        tracing::info!("✅ Produto atualizado");
        Ok(detail)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_product(&self, company_id: Uuid, product_id: Uuid) -> Result<ProductDetail, AppError> {
        let scope = ProductScope { company_id, product_id };
        let mut tx = self.store.begin(company_id).await?;

        let product = tx.find_product(scope).await?.ok_or(AppError::ProductNotFound)?;
        let detail = load_detail(tx.as_mut(), product).await?;

        tx.commit().await?;
        Ok(detail)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn list_products(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        let mut tx = self.store.begin(company_id).await?;
        let products = tx.list_products(company_id).await?;
        tx.commit().await?;
        Ok(products)
    }

    /// Remove o produto; opções, valores e variantes vão junto.
    #[tracing::instrument(skip(self), err)]
    pub async fn delete_product(&self, company_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        let scope = ProductScope { company_id, product_id };
        let mut tx = self.store.begin(company_id).await?;

        if !tx.delete_product(scope).await? {
            return Err(AppError::ProductNotFound);
        }

        tx.commit().await?;
        tracing::info!("🗑️ Produto removido");
        Ok(())
    }

    // Sequência estrita: cada etapa depende das escritas da anterior,
    // todas dentro da mesma transação.
    async fn sync_variants(
        &self,
        tx: &mut dyn CatalogTx,
        product: Product,
        payload: &ProductPayload,
    ) -> Result<ProductDetail, AppError> {
        let scope = product.scope();

        reconcile_options(tx, scope, &payload.variant_options_data).await?;
        let live_variants = generate_variants(tx, scope).await?;
        apply_variant_overrides(tx, scope, &payload.product_variants_data).await?;

        let has_variants = self
            .has_variants_policy
            .resolve(payload.variant_options_data.len(), live_variants);
        let product = tx.set_has_variants(scope, has_variants).await?;

        load_detail(tx, product).await
    }
}

// Valida nome único e resolve as referências dentro da empresa.
async fn resolve_fields(
    tx: &mut dyn CatalogTx,
    company_id: Uuid,
    payload: &ProductPayload,
    current_product: Option<Uuid>,
) -> Result<ProductFields, AppError> {
    if tx.product_name_taken(company_id, &payload.name, current_product).await? {
        return Err(AppError::ProductNameAlreadyExists(payload.name.clone()));
    }

    let brand_id = match payload.brand_uuid {
        Some(id) => Some(tx.find_brand(company_id, id).await?.ok_or(AppError::BrandNotFound)?.id),
        None => None,
    };

    let unit_of_measure_id = match payload.unit_of_measure_uuid {
        Some(id) => Some(
            tx.find_unit_of_measure(company_id, id)
                .await?
                .ok_or(AppError::UnitOfMeasureNotFound)?
                .id,
        ),
        None => None,
    };

    Ok(ProductFields::from_payload(payload, brand_id, unit_of_measure_id))
}

// Monta as visões `variant_options` e `product_variants` a partir do estado gravado.
async fn load_detail(tx: &mut dyn CatalogTx, product: Product) -> Result<ProductDetail, AppError> {
    let scope = product.scope();

    let options = tx.list_options(scope).await?;
    let mut variant_options = Vec::with_capacity(options.len());
    for option in options {
        let values = tx.list_values(scope, option.id).await?;
        variant_options.push(VariantOptionView {
            name: option.name,
            values: values.into_iter().map(|v| v.value).collect(),
        });
    }

    let product_variants = tx
        .list_variants(scope)
        .await?
        .iter()
        .map(ProductVariantView::from)
        .collect();

    Ok(ProductDetail {
        product,
        variant_options,
        product_variants,
    })
}
