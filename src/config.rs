// src/config.rs

use crate::{
    db::{CompanyRepository, PgCatalogStore, UserRepository},
    services::{
        auth::AuthService,
        product_service::{HasVariantsPolicy, ProductService},
    },
};
use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub has_variants_policy: HasVariantsPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} deve ser definida"));

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{raw}'"))?,
            None => 5,
        };

        let db_acquire_timeout_secs = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS inválido: '{raw}'"))?,
            None => 3,
        };

        let has_variants_policy = match lookup("HAS_VARIANTS_POLICY") {
            Some(raw) => raw.parse::<HasVariantsPolicy>().map_err(|e| anyhow!(e))?,
            None => HasVariantsPolicy::default(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            db_acquire_timeout_secs,
            has_variants_policy,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub company_repo: CompanyRepository,
    pub product_service: ProductService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());

        let catalog_store = PgCatalogStore::new(db_pool.clone());
        let product_service = ProductService::new(Arc::new(catalog_store), config.has_variants_policy);

        tracing::info!(policy = %config.has_variants_policy, "política de has_variants");

        Ok(Self {
            db_pool,
            auth_service,
            company_repo,
            product_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/erp"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout_secs, 3);
        assert_eq!(config.has_variants_policy, HasVariantsPolicy::SubmittedOptions);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/erp"),
            ("JWT_SECRET", "segredo"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("HAS_VARIANTS_POLICY", "generated"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.has_variants_policy, HasVariantsPolicy::GeneratedVariants);
    }

    #[test]
    fn missing_secret_or_bad_numbers_fail() {
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/erp")])).is_err());

        assert!(Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/erp"),
            ("JWT_SECRET", "segredo"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]))
        .is_err());

        assert!(Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/erp"),
            ("JWT_SECRET", "segredo"),
            ("HAS_VARIANTS_POLICY", "talvez"),
        ]))
        .is_err());
    }
}
