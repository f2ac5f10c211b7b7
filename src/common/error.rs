use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cabeçalho x-company-uuid inválido: {0}")]
    InvalidCompanyHeader(&'static str),

    // Empresa inexistente ou de outro usuário: as duas situações viram 404
    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Marca não encontrada")]
    BrandNotFound,

    #[error("Unidade de medida não encontrada")]
    UnitOfMeasureNotFound,

    #[error("Variante '{0}' não encontrada neste produto")]
    VariantNotFound(String),

    #[error("Já existe um produto com o nome '{0}'")]
    ProductNameAlreadyExists(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidCompanyHeader(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::CompanyNotFound
            | AppError::ProductNotFound
            | AppError::BrandNotFound
            | AppError::UnitOfMeasureNotFound
            | AppError::VariantNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProductNameAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                // Erros de listas aninhadas (opções, variantes) só aparecem no resumo
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                    "summary": errors.to_string(),
                })
            }
            // O detalhe de erros internos vai para o log, nunca para o cliente.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", self);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
