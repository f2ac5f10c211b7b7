pub mod auth;
pub mod catalog_store;
pub mod product_service;
pub mod variant_service;

#[cfg(test)]
pub mod memory_store;
