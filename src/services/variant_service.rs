// src/services/variant_service.rs

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{ProductScope, VariantOptionInput, VariantOverrideInput},
    services::catalog_store::CatalogTx,
};

/// Produto cartesiano em ordem lexicográfica: o primeiro conjunto varia
/// mais devagar. Sem conjuntos, ou com algum conjunto vazio, não há combinações.
pub fn cartesian_product<T: Clone>(sets: &[Vec<T>]) -> Vec<Vec<T>> {
    if sets.is_empty() {
        return Vec::new();
    }

    sets.iter().fold(vec![Vec::new()], |combinations, set| {
        combinations
            .iter()
            .flat_map(|prefix| {
                set.iter().map(move |item| {
                    let mut combination = Vec::with_capacity(prefix.len() + 1);
                    combination.extend_from_slice(prefix);
                    combination.push(item.clone());
                    combination
                })
            })
            .collect()
    })
}

/// `"Color Size - Red S"`: nomes das opções, um hífen, valores na mesma ordem.
pub fn canonical_variant_name<A, B>(option_names: &[A], values: &[B]) -> String
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let names: Vec<&str> = option_names.iter().map(AsRef::as_ref).collect();
    let values: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
    format!("{} - {}", names.join(" "), values.join(" "))
}

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Deixa as opções/valores gravados iguais ao pedido: upsert de cada
/// opção e valor (na ordem recebida) e remoção do que ficou de fora.
/// Não toca nas variantes. Devolve os ids das opções mantidas, na ordem do pedido.
#[tracing::instrument(
    skip(tx, scope, requested),
    fields(company_id = %scope.company_id, product_id = %scope.product_id, options = requested.len()),
    err
)]
pub async fn reconcile_options(
    tx: &mut dyn CatalogTx,
    scope: ProductScope,
    requested: &[VariantOptionInput],
) -> Result<Vec<Uuid>, AppError> {
    let mut retained = Vec::with_capacity(requested.len());

    for (option_index, option_input) in requested.iter().enumerate() {
        let option = tx
            .upsert_option(scope, &option_input.name, position(option_index))
            .await?;

        let mut kept_values = Vec::with_capacity(option_input.values.len());
        for (value_index, value) in option_input.values.iter().enumerate() {
            let row = tx
                .upsert_value(scope, option.id, value, position(value_index))
                .await?;
            kept_values.push(row.id);
        }

        let stale_values = tx.delete_values_except(scope, option.id, &kept_values).await?;
        if stale_values > 0 {
            tracing::debug!(option = %option.name, stale_values, "valores removidos da opção");
        }

        retained.push(option.id);
    }

    let removed = tx.delete_options_except(scope, &retained).await?;
    if removed > 0 {
        tracing::info!(removed, "opções de variante removidas");
    }

    Ok(retained)
}

/// Gera as variantes a partir das opções atuais e remove as órfãs.
/// Variantes que já existem (mesmo nome) ficam intactas; as novas nascem
/// com custo, preço e estoque zerados. Devolve quantas variantes ficaram vivas.
///
/// Renomear uma opção ou valor muda o nome canônico: a variante antiga é
/// removida e a nova nasce zerada (sku/preço antigos se perdem).
#[tracing::instrument(
    skip(tx, scope),
    fields(company_id = %scope.company_id, product_id = %scope.product_id),
    err
)]
pub async fn generate_variants(
    tx: &mut dyn CatalogTx,
    scope: ProductScope,
) -> Result<usize, AppError> {
    let options = tx.list_options(scope).await?;

    let mut value_sets = Vec::with_capacity(options.len());
    for option in &options {
        let values = tx.list_values(scope, option.id).await?;
        value_sets.push(values.into_iter().map(|v| v.value).collect::<Vec<_>>());
    }

    let option_names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    let combinations = cartesian_product(&value_sets);

    let mut seen_names = HashSet::with_capacity(combinations.len());
    let mut live = Vec::with_capacity(combinations.len());
    let mut created = 0usize;

    for combination in &combinations {
        let name = canonical_variant_name(&option_names, combination);
        // Valores com espaços podem colidir no nome; a variante é uma só.
        if !seen_names.insert(name.clone()) {
            continue;
        }

        let (variant, inserted) = tx.upsert_variant(scope, &name).await?;
        if inserted {
            created += 1;
        }
        live.push(variant.id);
    }

    let removed = tx.delete_variants_except(scope, &live).await?;

    tracing::info!(live = live.len(), created, removed, "variantes reconciliadas");

    Ok(live.len())
}

/// Aplica sku/custo/preço informados pelo cliente, casando pelo nome canônico.
/// Um nome que não existe depois da geração aborta a operação inteira.
#[tracing::instrument(
    skip(tx, scope, overrides),
    fields(company_id = %scope.company_id, product_id = %scope.product_id, overrides = overrides.len()),
    err
)]
pub async fn apply_variant_overrides(
    tx: &mut dyn CatalogTx,
    scope: ProductScope,
    overrides: &[VariantOverrideInput],
) -> Result<(), AppError> {
    for item in overrides {
        let variant = tx
            .find_variant_by_name(scope, &item.name)
            .await?
            .ok_or_else(|| AppError::VariantNotFound(item.name.clone()))?;

        tx.update_variant_details(scope, variant.id, item.sku.as_deref(), item.cost, item.price)
            .await?;
    }
    Ok(())
}
