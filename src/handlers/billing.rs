// src/handlers/billing.rs

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::account::Subscription,
    services::billing_service::CheckoutOptions,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "pay_29QQoUBi66xm2f")]
    pub payment_id: String,
}

// GET /api/billing/checkout
#[utoipa::path(
    get,
    path = "/api/billing/checkout",
    tag = "Billing",
    responses(
        (status = 200, description = "Opções do widget de pagamento", body = CheckoutOptions)
    ),
    security(("api_jwt" = []))
)]
pub async fn checkout(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CheckoutOptions>, AppError> {
    let options = app_state
        .billing_service
        .checkout(user.id, user.email.as_deref())
        .await?;
    Ok(Json(options))
}

// POST /api/billing/payment-success
#[utoipa::path(
    post,
    path = "/api/billing/payment-success",
    tag = "Billing",
    request_body = PaymentSuccessPayload,
    responses(
        (status = 200, description = "Assinatura estendida", body = Subscription),
        (status = 502, description = "Pagamento sem assinatura gravada; guarde o ID do pagamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn payment_success(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<PaymentSuccessPayload>,
) -> Result<Json<Subscription>, AppError> {
    payload.validate()?;
    let subscription = app_state
        .billing_service
        .payment_success(user.id, payload.payment_id.trim(), Utc::now())
        .await?;
    Ok(Json(subscription))
}
