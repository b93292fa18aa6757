// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::router::view::PaywallPresentation;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // Entrada que passa no `validator` mas não faz sentido (filtro, atalho)
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Lead {0} não encontrado")]
    LeadNotFound(uuid::Uuid),

    // `complete` chamado sem follow-up pendente (estado NoPlan)
    #[error("Nenhum follow-up pendente")]
    NoPendingFollowUp,

    #[error("Acesso bloqueado pelo paywall")]
    PaymentRequired(PaywallPresentation),

    #[error("Perfil incompleto")]
    ProfileIncomplete,

    #[error("Operação indisponível no modo local")]
    UnavailableInLocalMode,

    // Cobrança aprovada mas a assinatura não foi gravada: reconciliação manual.
    #[error("Pagamento {payment_id} aprovado sem atualização da conta")]
    PaymentReconciliation { payment_id: String },

    #[error("Falha ao concluir o follow-up")]
    FollowUpUpdateFailed,

    #[error("Registro inválido no banco: {0}")]
    CorruptRow(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento local: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::PaymentRequired(presentation) => {
                let body = Json(json!({
                    "error": "Your trial has ended. Upgrade to continue.",
                    "paywall": presentation,
                }));
                return (StatusCode::PAYMENT_REQUIRED, body).into_response();
            }
            AppError::PaymentReconciliation { ref payment_id } => {
                tracing::error!("Pagamento {} sem assinatura gravada", payment_id);
                let body = Json(json!({
                    "error": format!(
                        "Payment received but your account could not be updated. \
                         Please contact support with payment reference {}.",
                        payment_id
                    ),
                    "paymentId": payment_id,
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            AppError::InvalidInput(ref message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "This e-mail is already in use."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid e-mail or password."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Missing or invalid authentication token."),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found."),
            AppError::LeadNotFound(_) => (StatusCode::NOT_FOUND, "Lead not found."),
            AppError::NoPendingFollowUp => (StatusCode::CONFLICT, "This lead has no pending follow-up."),
            AppError::ProfileIncomplete => (StatusCode::CONFLICT, "Complete your profile first."),
            AppError::UnavailableInLocalMode => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Not available while running in local mode.",
            ),
            AppError::FollowUpUpdateFailed => (StatusCode::BAD_GATEWAY, "Update failed. Check your connection."),

            // Todos os outros erros viram 500. O `tracing` loga a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
