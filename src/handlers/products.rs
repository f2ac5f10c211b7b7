// src/handlers/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::CompanyContext,
    models::catalog::{Product, ProductDetail, ProductPayload},
};

// Validação do validator + a validação de consistência manual.
// Os erros cruzados das opções ficam no campo `variant_options_data`.
fn validate_payload(payload: &ProductPayload) -> Result<(), AppError> {
    payload.validate()?;

    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("variant_options_data", e);
        AppError::ValidationError(errors)
    })
}

// ---
// Handler: create_product
// ---
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Produtos",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado com opções e variantes", body = ProductDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Marca, unidade ou variante não encontrada"),
        (status = 409, description = "Já existe um produto com esse nome")
    ),
    params(
        ("x-company-uuid" = Uuid, Header, description = "ID da Empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    CompanyContext(company): CompanyContext,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_payload(&payload)?;

    let detail = app_state
        .product_service
        .create_product(company.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Produtos",
    responses(
        (status = 200, description = "Produtos da empresa", body = Vec<Product>)
    ),
    params(
        ("x-company-uuid" = Uuid, Header, description = "ID da Empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    CompanyContext(company): CompanyContext,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list_products(company.id).await?;
    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Produtos",
    responses(
        (status = 200, description = "Produto com opções e variantes", body = ProductDetail),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto"),
        ("x-company-uuid" = Uuid, Header, description = "ID da Empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    CompanyContext(company): CompanyContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .product_service
        .get_product(company.id, product_id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Handler: update_product
// ---
// Substitui o conjunto de opções: o que não vier no corpo é removido.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Produtos",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = ProductDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto, marca, unidade ou variante não encontrado"),
        (status = 409, description = "Já existe um produto com esse nome")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto"),
        ("x-company-uuid" = Uuid, Header, description = "ID da Empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    CompanyContext(company): CompanyContext,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_payload(&payload)?;

    let detail = app_state
        .product_service
        .update_product(company.id, product_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Produtos",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto"),
        ("x-company-uuid" = Uuid, Header, description = "ID da Empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    CompanyContext(company): CompanyContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .product_service
        .delete_product(company.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
