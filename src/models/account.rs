// src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// Credenciais do provedor de autenticação (tabela 'users')
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Assinatura do usuário. Só o callback de pagamento escreve aqui.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: Uuid,
    pub is_active: bool,
    pub paid_until: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    // Âncora do trial
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

impl Profile {
    /// Nome e telefone são obrigatórios para sair do profile-setup.
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty() && !self.phone.trim().is_empty()
    }
}

// --- PAYLOADS DE AUTENTICAÇÃO ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "Invalid e-mail address."))]
    #[schema(example = "agent@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: String,
    // Metadados do cadastro, copiados para o profile
    #[serde(default)]
    #[schema(example = "Priya Sharma")]
    pub full_name: String,
    #[serde(default)]
    #[schema(example = "+91 98765 43210")]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Invalid e-mail address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// --- PERFIL ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    #[validate(custom(function = "validate_not_blank", message = "required"))]
    #[schema(example = "Priya Sharma")]
    pub full_name: String,
    #[validate(custom(function = "validate_not_blank", message = "required"))]
    #[schema(example = "+91 98765 43210")]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FeedbackPayload {
    #[validate(custom(function = "validate_not_blank", message = "required"))]
    #[schema(example = "Please add a calendar export.")]
    pub message: String,
}
