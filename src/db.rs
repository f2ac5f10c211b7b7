pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::CompanyRepository;
pub mod catalog_repo;
pub use catalog_repo::ProductRepository;
pub mod variant_repo;
pub use variant_repo::VariantRepository;
pub mod pg_catalog_store;
pub use pg_catalog_store::PgCatalogStore;
