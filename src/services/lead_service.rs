// src/services/lead_service.rs

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::DataStore,
    models::lead::{
        CompletePayload, CreateLeadPayload, FollowUpDraft, Lead, LeadDetail, LeadFilter, LeadStatus, Note,
        SchedulePayload, WhatsAppLink,
    },
    services::{access::AccessService, lifecycle},
};

#[derive(Clone)]
pub struct LeadService {
    store: DataStore,
    access: AccessService,
    tz: FixedOffset,
}

impl LeadService {
    pub fn new(store: DataStore, access: AccessService, tz: FixedOffset) -> Self {
        Self { store, access, tz }
    }

    // Todo lead que sai daqui já tem o `next_action_id` recalculado
    async fn load(&self, user_id: Uuid, lead_id: Uuid) -> Result<Lead, AppError> {
        let mut lead = self
            .store
            .leads
            .find(user_id, lead_id)
            .await?
            .ok_or(AppError::LeadNotFound(lead_id))?;
        lifecycle::reconcile(&mut lead);
        Ok(lead)
    }

    pub async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let mut leads = self.store.leads.fetch_all(user_id).await?;
        leads.iter_mut().for_each(lifecycle::reconcile);
        Ok(leads)
    }

    pub async fn list(&self, user_id: Uuid, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
        let status = filter.status()?;
        let leads = self.fetch_all(user_id).await?;
        Ok(leads.into_iter().filter(|l| filter.matches(l, status)).collect())
    }

    pub async fn detail(&self, user_id: Uuid, lead_id: Uuid, now: DateTime<Utc>) -> Result<LeadDetail, AppError> {
        let lead = self.load(user_id, lead_id).await?;
        Ok(lifecycle::detail(lead, now, &self.tz))
    }

    /// Novo lead começa sem follow-up; o detalhe devolvido já pede o agendamento.
    pub async fn create(
        &self,
        user_id: Uuid,
        payload: CreateLeadPayload,
        now: DateTime<Utc>,
    ) -> Result<LeadDetail, AppError> {
        self.access.ensure_access(user_id, now).await?;

        let mut lead = self.store.leads.create(user_id, &payload.into_draft()).await?;
        lifecycle::reconcile(&mut lead);

        tracing::info!("Lead {} criado", lead.id);
        Ok(lifecycle::detail(lead, now, &self.tz))
    }

    pub async fn update_status(&self, user_id: Uuid, lead_id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        self.store.leads.update_status(user_id, lead_id, status).await?;
        self.load(user_id, lead_id).await
    }

    pub async fn delete(&self, user_id: Uuid, lead_id: Uuid) -> Result<(), AppError> {
        self.store.leads.delete(user_id, lead_id).await?;
        tracing::info!("Lead {} arquivado", lead_id);
        Ok(())
    }

    pub async fn add_note(&self, user_id: Uuid, lead_id: Uuid, text: &str) -> Result<Note, AppError> {
        self.store.leads.add_note(user_id, lead_id, text.trim()).await
    }

    /// Transição `schedule`. Fechar o pendente anterior e inserir o novo é uma
    /// única operação do repositório, então o lead nunca fica com dois pendentes.
    pub async fn schedule(
        &self,
        user_id: Uuid,
        lead_id: Uuid,
        payload: SchedulePayload,
        now: DateTime<Utc>,
    ) -> Result<LeadDetail, AppError> {
        self.access.ensure_access(user_id, now).await?;

        let date = match (payload.date, payload.preset) {
            (Some(date), _) => date,
            (None, Some(preset)) => time::quick_date(preset, now, &self.tz),
            (None, None) => return Err(AppError::InvalidInput("Pick a date or a quick option.".into())),
        };

        let draft = FollowUpDraft {
            date,
            kind: payload.kind,
            notes: payload.notes.trim().to_owned(),
        };
        let inserted = self.store.leads.schedule_follow_up(user_id, lead_id, &draft).await?;
        tracing::debug!("Follow-up {} agendado para o lead {}", inserted.id, lead_id);

        self.detail(user_id, lead_id, now).await
    }

    /// Transição `complete`. Se a coluna `outcome` for rejeitada, grava só `completed`.
    pub async fn complete(
        &self,
        user_id: Uuid,
        lead_id: Uuid,
        payload: CompletePayload,
        now: DateTime<Utc>,
    ) -> Result<LeadDetail, AppError> {
        let mut lead = self.load(user_id, lead_id).await?;
        let target = lifecycle::completion_target(&lead)?;

        if let Err(e) = self
            .store
            .leads
            .mark_completed(user_id, target, Some(payload.outcome))
            .await
        {
            tracing::warn!("Falha ao gravar outcome do follow-up {}: {}. Tentando só completed.", target, e);
            if let Err(e) = self.store.leads.mark_completed(user_id, target, None).await {
                tracing::error!("Follow-up {} não foi concluído: {}", target, e);
                return Err(AppError::FollowUpUpdateFailed);
            }
        }

        lifecycle::apply_completion(&mut lead, payload.outcome)?;
        Ok(lifecycle::detail(lead, now, &self.tz))
    }

    pub async fn whatsapp_link(&self, user_id: Uuid, lead_id: Uuid, now: DateTime<Utc>) -> Result<WhatsAppLink, AppError> {
        self.access.ensure_access(user_id, now).await?;
        let lead = self.load(user_id, lead_id).await?;
        Ok(WhatsAppLink {
            url: time::whatsapp_link(&lead.phone, &lead.full_name),
        })
    }
}
