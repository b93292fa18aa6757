// src/handlers/session.rs

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    services::session_service::{NavigationQuery, SessionSnapshot},
};

// GET /api/session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Tela atual, paywall e banner do trial", body = SessionSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(navigation): Query<NavigationQuery>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = app_state
        .session_service
        .snapshot(user.id, &navigation, Utc::now())
        .await?;
    Ok(Json(snapshot))
}
