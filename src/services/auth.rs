// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, TokenType, User},
};

/// Decodifica e valida o JWT (assinatura + expiração) e exige `token_type == access`.
/// Um refresh token nunca abre as rotas da API.
pub fn decode_access_claims(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT rejeitado: {}", e);
        AppError::InvalidToken
    })?;

    if token_data.claims.token_type != TokenType::Access {
        return Err(AppError::InvalidToken);
    }

    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_access_claims(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste";

    fn token(token_type: TokenType, expires_in: Duration, secret: &str) -> (Uuid, String) {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id,
            email: "dono@empresa.com".into(),
            token_type,
            exp: (now + expires_in).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        let jwt = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();
        (user_id, jwt)
    }

    #[test]
    fn access_token_is_accepted() {
        let (user_id, jwt) = token(TokenType::Access, Duration::minutes(15), SECRET);
        let claims = decode_access_claims(&jwt, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "dono@empresa.com");
    }

    #[test]
    fn refresh_token_is_rejected() {
        let (_, jwt) = token(TokenType::Refresh, Duration::days(7), SECRET);
        assert!(matches!(decode_access_claims(&jwt, SECRET), Err(AppError::InvalidToken)));
    }

    #[test]
    fn wrong_secret_and_expired_tokens_are_rejected() {
        let (_, forged) = token(TokenType::Access, Duration::minutes(15), "outro-segredo");
        assert!(matches!(decode_access_claims(&forged, SECRET), Err(AppError::InvalidToken)));

        let (_, expired) = token(TokenType::Access, Duration::hours(-2), SECRET);
        assert!(matches!(decode_access_claims(&expired, SECRET), Err(AppError::InvalidToken)));

        assert!(matches!(decode_access_claims("nem-um-jwt", SECRET), Err(AppError::InvalidToken)));
    }
}
