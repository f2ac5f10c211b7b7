// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Representa um usuário vindo do banco de dados.
// Senhas e emissão de tokens ficam no serviço de autenticação externo.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tipo do token: o par access/refresh é emitido pelo mesmo serviço,
/// mas só o `access` abre as rotas da API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,              // Subject (ID do usuário)
    pub email: String,          // O par de tokens é emitido por e-mail
    pub token_type: TokenType,
    pub exp: usize,             // Expiration time
    pub iat: usize,             // Issued At
}
