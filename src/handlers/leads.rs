// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::lead::{
        CompletePayload, CreateLeadPayload, Lead, LeadDetail, LeadFilter, Note, NotePayload, SchedulePayload,
        UpdateStatusPayload, WhatsAppLink,
    },
};

// =============================================================================
//  ÁREA 1: LEADS
// =============================================================================

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadFilter),
    responses(
        (status = 200, description = "Leads do usuário, mais novos primeiro", body = Vec<Lead>),
        (status = 400, description = "Filtro de status desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<LeadFilter>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = app_state.lead_service.list(user.id, &filter).await?;
    Ok(Json(leads))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado (sem follow-up)", body = LeadDetail),
        (status = 400, description = "Nome e telefone são obrigatórios"),
        (status = 402, description = "Trial encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state.lead_service.create(user.id, payload, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com estado do follow-up", body = LeadDetail),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<LeadDetail>, AppError> {
    let detail = app_state.lead_service.detail(user.id, lead_id, Utc::now()).await?;
    Ok(Json(detail))
}

// PATCH /api/leads/{id}/status
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<Lead>, AppError> {
    let lead = app_state
        .lead_service
        .update_status(user.id, lead_id, payload.status)
        .await?;
    Ok(Json(lead))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead arquivado"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.lead_service.delete(user.id, lead_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: NOTAS E FOLLOW-UPS
// =============================================================================

// POST /api/leads/{id}/notes
#[utoipa::path(
    post,
    path = "/api/leads/{id}/notes",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = NotePayload,
    responses(
        (status = 201, description = "Nota adicionada", body = Note),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_note(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let note = app_state.lead_service.add_note(user.id, lead_id, &payload.text).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

// POST /api/leads/{id}/follow-ups
#[utoipa::path(
    post,
    path = "/api/leads/{id}/follow-ups",
    tag = "Follow-ups",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = SchedulePayload,
    responses(
        (status = 201, description = "Follow-up agendado; o anterior foi encerrado", body = LeadDetail),
        (status = 400, description = "Sem data nem atalho"),
        (status = 402, description = "Trial encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn schedule_follow_up(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<SchedulePayload>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .lead_service
        .schedule(user.id, lead_id, payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

// POST /api/leads/{id}/follow-ups/complete
#[utoipa::path(
    post,
    path = "/api/leads/{id}/follow-ups/complete",
    tag = "Follow-ups",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = CompletePayload,
    responses(
        (status = 200, description = "Follow-up concluído", body = LeadDetail),
        (status = 409, description = "Nenhum follow-up pendente"),
        (status = 502, description = "Falha ao gravar")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_follow_up(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<CompletePayload>,
) -> Result<Json<LeadDetail>, AppError> {
    let detail = app_state
        .lead_service
        .complete(user.id, lead_id, payload, Utc::now())
        .await?;
    Ok(Json(detail))
}

// GET /api/leads/{id}/whatsapp
#[utoipa::path(
    get,
    path = "/api/leads/{id}/whatsapp",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Link wa.me com mensagem pronta", body = WhatsAppLink),
        (status = 402, description = "Trial encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn whatsapp_link(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<WhatsAppLink>, AppError> {
    let link = app_state
        .lead_service
        .whatsapp_link(user.id, lead_id, Utc::now())
        .await?;
    Ok(Json(link))
}
