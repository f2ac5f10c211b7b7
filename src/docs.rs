// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Produtos ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::catalog::Brand,
            models::catalog::UnitOfMeasure,
            models::catalog::Product,
            models::catalog::ProductDetail,
            models::catalog::VariantOptionView,
            models::catalog::ProductVariantView,

            // --- Payloads ---
            models::catalog::ProductPayload,
            models::catalog::VariantOptionInput,
            models::catalog::VariantOverrideInput,
        )
    ),
    tags(
        (name = "Produtos", description = "Catálogo de Produtos, Opções e Variantes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
