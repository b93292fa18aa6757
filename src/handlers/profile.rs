// src/handlers/profile.rs

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::account::{FeedbackPayload, Profile, ProfilePayload},
};

// GET /api/profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Perfil com a assinatura", body = Profile)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(app_state.profile_service.get(user.id).await?))
}

// PUT /api/profile
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = ProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Profile),
        (status = 400, description = "Nome e telefone são obrigatórios"),
        (status = 409, description = "Perfil ainda não configurado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(app_state.profile_service.update(user.id, payload).await?))
}

// POST /api/profile/setup
#[utoipa::path(
    post,
    path = "/api/profile/setup",
    tag = "Profile",
    request_body = ProfilePayload,
    responses(
        (status = 200, description = "Perfil criado ou completado", body = Profile),
        (status = 400, description = "Nome e telefone são obrigatórios")
    ),
    security(("api_jwt" = []))
)]
pub async fn setup_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(app_state.profile_service.setup(user.id, payload).await?))
}

// POST /api/feedback
#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "Profile",
    request_body = FeedbackPayload,
    responses(
        (status = 204, description = "Feedback registrado"),
        (status = 503, description = "Modo local")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_feedback(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<FeedbackPayload>,
) -> Result<StatusCode, AppError> {
    app_state.profile_service.send_feedback(user.id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
