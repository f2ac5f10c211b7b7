// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// 1. Referências simples (Marca e Unidade de Medida)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UnitOfMeasure {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Produto
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub unit_of_measure_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub base_cost: Decimal,
    pub base_price: Decimal,
    pub minimum_sale_unit: Decimal,
    pub minimum_unit_price: Decimal,
    pub stock_quantity: i32,
    // Derivado: definido pelo orquestrador a cada create/update
    pub has_variants: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn scope(&self) -> ProductScope {
        ProductScope {
            company_id: self.company_id,
            product_id: self.id,
        }
    }
}

/// Par (empresa, produto). Toda leitura ou escrita de opções, valores e
/// variantes filtra pelos dois campos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductScope {
    pub company_id: Uuid,
    pub product_id: Uuid,
}

/// Campos "planos" do produto, já com as referências resolvidas.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub brand_id: Option<Uuid>,
    pub unit_of_measure_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub base_cost: Decimal,
    pub base_price: Decimal,
    pub minimum_sale_unit: Decimal,
    pub minimum_unit_price: Decimal,
    pub stock_quantity: i32,
}

impl ProductFields {
    pub fn from_payload(
        payload: &ProductPayload,
        brand_id: Option<Uuid>,
        unit_of_measure_id: Option<Uuid>,
    ) -> Self {
        Self {
            brand_id,
            unit_of_measure_id,
            sku: payload.sku.clone(),
            barcode: payload.barcode.clone(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            base_cost: payload.base_cost,
            base_price: payload.base_price,
            minimum_sale_unit: payload.minimum_sale_unit,
            minimum_unit_price: payload.minimum_unit_price,
            stock_quantity: payload.stock_quantity,
        }
    }
}

// ---
// 3. Opções, Valores e Variantes
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VariantOption {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    // Índice da opção no último pedido (define a ordem dos nomes)
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VariantValue {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub option_id: Uuid,
    pub value: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductVariant {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    // Nome canônico: chave natural da variante
    pub name: String,
    pub cost: Decimal,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 4. Payload de entrada
// ---
// Valor não negativo que cabe em NUMERIC(10, scale), já arredondado como o Postgres arredonda.
fn validate_numeric(val: &Decimal, scale: u32) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }

    let max = Decimal::new(9_999_999_999, scale);
    if round_to_column(*val, scale) > max {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &max);
        err.message = Some(format!("O valor não pode passar de {max}.").into());
        return Err(err);
    }
    Ok(())
}

fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    validate_numeric(val, MONEY_SCALE)
}

fn validate_quantity(val: &Decimal) -> Result<(), ValidationError> {
    validate_numeric(val, QUANTITY_SCALE)
}

/// Casas decimais das colunas de dinheiro (`NUMERIC(10, 2)`).
pub const MONEY_SCALE: u32 = 2;
/// Casas decimais de `minimum_sale_unit` (`NUMERIC(10, 3)`).
pub const QUANTITY_SCALE: u32 = 3;

/// Arredonda como o Postgres ao gravar em `NUMERIC(p, scale)`: metade para longe do zero.
pub fn round_to_column(val: Decimal, scale: u32) -> Decimal {
    val.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VariantOptionInput {
    #[validate(length(min = 1, max = 255, message = "O nome da opção é obrigatório."))]
    #[schema(example = "Color")]
    pub name: String,

    #[serde(default)]
    #[schema(example = json!(["Red", "Blue"]))]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VariantOverrideInput {
    #[validate(length(min = 1, message = "O nome da variante é obrigatório."))]
    #[schema(example = "Color Size - Red S")]
    pub name: String,

    // Campos ausentes (ou null) mantêm o valor gravado na variante.
    #[validate(length(max = 50, message = "O SKU deve ter no máximo 50 caracteres."))]
    #[serde(default)]
    pub sku: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    pub cost: Option<Decimal>,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(max = 50, message = "O SKU deve ter no máximo 50 caracteres."))]
    pub sku: Option<String>,

    #[validate(length(max = 50, message = "O código de barras deve ter no máximo 50 caracteres."))]
    pub barcode: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    pub base_cost: Decimal,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    pub base_price: Decimal,

    #[validate(custom(function = "validate_quantity"))]
    #[serde(default)]
    pub minimum_sale_unit: Decimal,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    pub minimum_unit_price: Decimal,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)]
    pub stock_quantity: i32,

    pub brand_uuid: Option<Uuid>,
    pub unit_of_measure_uuid: Option<Uuid>,

    #[validate(nested)]
    #[serde(default)]
    pub variant_options_data: Vec<VariantOptionInput>,

    #[validate(nested)]
    #[serde(default)]
    pub product_variants_data: Vec<VariantOverrideInput>,
}

impl ProductPayload {
    /// Regras que cruzam itens da lista: nomes de opção únicos e valores
    /// não vazios e sem repetição dentro de cada opção.
    pub fn validate_consistency(&self) -> Result<(), ValidationError> {
        let mut seen_options = HashSet::new();
        for option in &self.variant_options_data {
            if !seen_options.insert(option.name.as_str()) {
                let mut err = ValidationError::new("duplicate_option");
                err.message = Some(format!("A opção '{}' foi enviada mais de uma vez.", option.name).into());
                return Err(err);
            }

            let mut seen_values = HashSet::new();
            for value in &option.values {
                if value.trim().is_empty() {
                    let mut err = ValidationError::new("empty_value");
                    err.message = Some(format!("A opção '{}' contém um valor vazio.", option.name).into());
                    return Err(err);
                }
                if !seen_values.insert(value.as_str()) {
                    let mut err = ValidationError::new("duplicate_value");
                    err.message = Some(
                        format!("O valor '{}' se repete na opção '{}'.", value, option.name).into(),
                    );
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

// ---
// 5. Visões de leitura (resposta)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VariantOptionView {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductVariantView {
    pub sku: Option<String>,
    pub name: String,
    pub cost: Decimal,
    pub price: Decimal,
}

impl From<&ProductVariant> for ProductVariantView {
    fn from(variant: &ProductVariant) -> Self {
        Self {
            sku: variant.sku.clone(),
            name: variant.name.clone(),
            cost: variant.cost,
            price: variant.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variant_options: Vec<VariantOptionView>,
    pub product_variants: Vec<ProductVariantView>,
}
