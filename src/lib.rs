// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta o roteador completo. No modo local o `auth_guard` injeta o dono fixo.
pub fn app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let me_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let lead_routes = Router::new()
        .route(
            "/",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route(
            "/{id}",
            get(handlers::leads::get_lead).delete(handlers::leads::delete_lead),
        )
        .route("/{id}/status", patch(handlers::leads::update_status))
        .route("/{id}/notes", post(handlers::leads::add_note))
        .route("/{id}/follow-ups", post(handlers::leads::schedule_follow_up))
        .route("/{id}/follow-ups/complete", post(handlers::leads::complete_follow_up))
        .route("/{id}/whatsapp", get(handlers::leads::whatsapp_link));

    let profile_routes = Router::new()
        .route(
            "/",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/setup", post(handlers::profile::setup_profile));

    let billing_routes = Router::new()
        .route("/checkout", get(handlers::billing::checkout))
        .route("/payment-success", post(handlers::billing::payment_success));

    // Tudo que depende de um usuário
    let protected_routes = Router::new()
        .route("/session", get(handlers::session::get_session))
        .route("/dashboard", get(handlers::dashboard::get_summary))
        .route("/feedback", post(handlers::profile::send_feedback))
        .nest("/leads", lead_routes)
        .nest("/profile", profile_routes)
        .nest("/billing", billing_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(me_routes))
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
