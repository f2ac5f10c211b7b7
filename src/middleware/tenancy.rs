// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::tenancy::Company,
};

// O nome do nosso cabeçalho HTTP customizado
pub const COMPANY_HEADER: &str = "x-company-uuid";

/// Lê e converte o cabeçalho da empresa.
pub fn company_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get(COMPANY_HEADER)
        .ok_or(AppError::InvalidCompanyHeader("cabeçalho ausente"))?;

    let value = value
        .to_str()
        .map_err(|_| AppError::InvalidCompanyHeader("caracteres inválidos"))?;

    Uuid::parse_str(value.trim()).map_err(|_| AppError::InvalidCompanyHeader("não é um UUID"))
}

/// Roda depois do `auth_guard`: confere se a empresa do cabeçalho pertence
/// ao usuário autenticado e a deixa disponível para os handlers.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|AuthenticatedUser(user)| user.id)
        .ok_or(AppError::InvalidToken)?;

    let company_id = company_id_from_headers(request.headers())?;

    let company = app_state
        .company_repo
        .find_for_user(company_id, user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(%company_id, %user_id, "empresa inexistente ou de outro usuário");
            AppError::CompanyNotFound
        })?;

    request.extensions_mut().insert(CompanyContext(company));
    Ok(next.run(request).await)
}

// O contexto da empresa já verificada pelo `tenant_guard`.
#[derive(Debug, Clone)]
pub struct CompanyContext(pub Company);

impl<S> FromRequestParts<S> for CompanyContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CompanyContext>()
            .cloned()
            .ok_or(AppError::CompanyNotFound)
    }
}
