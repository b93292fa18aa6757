// src/db/local_store.rs

//! Modo local: todos os leads num único blob JSON em disco.
//! Cada mutação reescreve o blob inteiro (última escrita vence).

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{account_repo::AccountRepository, lead_repo::LeadRepository},
    models::{
        account::{Profile, Subscription},
        lead::{FollowUp, FollowUpDraft, FollowUpOutcome, Lead, LeadDraft, LeadStatus, Note},
    },
    services::lifecycle,
};

/// Dono de todos os registros no modo local.
pub const LOCAL_USER_ID: Uuid = Uuid::nil();

pub struct LocalLeadStore {
    path: PathBuf,
    leads: RwLock<Vec<Lead>>,
}

impl LocalLeadStore {
    /// Arquivo inexistente começa vazio. Arquivo ilegível aborta: sobrescrevê-lo perderia os dados.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let leads: Vec<Lead> = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("💾 Modo local: {} leads carregados de {}", leads.len(), path.display());

        Ok(Self {
            path,
            leads: RwLock::new(leads),
        })
    }

    async fn persist(&self, leads: &[Lead]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec(leads)?;
        // Escreve ao lado e renomeia, para nunca deixar um blob pela metade
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    // Aplica a mutação numa cópia e só publica depois de gravar em disco
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<Lead>) -> Result<T, AppError> + Send,
    ) -> Result<T, AppError> {
        let mut guard = self.leads.write().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

fn owned_lead(leads: &mut [Lead], user_id: Uuid, lead_id: Uuid) -> Result<&mut Lead, AppError> {
    leads
        .iter_mut()
        .find(|l| l.id == lead_id && l.user_id == user_id)
        .ok_or(AppError::LeadNotFound(lead_id))
}

#[async_trait]
impl LeadRepository for LocalLeadStore {
    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let leads = self.leads.read().await;
        Ok(leads.iter().filter(|l| l.user_id == user_id).cloned().collect())
    }

    async fn find(&self, user_id: Uuid, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        let leads = self.leads.read().await;
        Ok(leads.iter().find(|l| l.id == lead_id && l.user_id == user_id).cloned())
    }

    async fn create(&self, user_id: Uuid, draft: &LeadDraft) -> Result<Lead, AppError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let notes = draft
            .initial_note
            .iter()
            .map(|text| Note {
                id: Uuid::new_v4(),
                lead_id: id,
                text: text.clone(),
                created_at: now,
            })
            .collect();

        let lead = Lead {
            id,
            user_id,
            full_name: draft.full_name.clone(),
            phone: draft.phone.clone(),
            interest_type: draft.interest_type,
            budget: draft.budget,
            area: draft.area.clone(),
            status: draft.status,
            notes,
            follow_ups: Vec::new(),
            created_at: now,
            next_action_id: None,
        };

        let stored = lead.clone();
        self.mutate(move |leads| {
            // Mais novo primeiro, igual ao remoto
            leads.insert(0, stored);
            Ok(())
        })
        .await?;

        Ok(lead)
    }

    async fn update_status(&self, user_id: Uuid, lead_id: Uuid, status: LeadStatus) -> Result<(), AppError> {
        self.mutate(|leads| {
            owned_lead(leads, user_id, lead_id)?.status = status;
            Ok(())
        })
        .await
    }

    async fn delete(&self, user_id: Uuid, lead_id: Uuid) -> Result<(), AppError> {
        self.mutate(|leads| {
            let before = leads.len();
            leads.retain(|l| !(l.id == lead_id && l.user_id == user_id));
            if leads.len() == before {
                return Err(AppError::LeadNotFound(lead_id));
            }
            Ok(())
        })
        .await
    }

    async fn add_note(&self, user_id: Uuid, lead_id: Uuid, text: &str) -> Result<Note, AppError> {
        let note = Note {
            id: Uuid::new_v4(),
            lead_id,
            text: text.to_owned(),
            created_at: Utc::now(),
        };
        let stored = note.clone();
        self.mutate(move |leads| {
            owned_lead(leads, user_id, lead_id)?.notes.insert(0, stored);
            Ok(())
        })
        .await?;
        Ok(note)
    }

    async fn schedule_follow_up(
        &self,
        user_id: Uuid,
        lead_id: Uuid,
        draft: &FollowUpDraft,
    ) -> Result<FollowUp, AppError> {
        let follow_up = FollowUp {
            id: Uuid::new_v4(),
            lead_id,
            date: draft.date,
            kind: draft.kind,
            notes: draft.notes.clone(),
            completed: false,
            outcome: None,
        };
        let stored = follow_up.clone();
        // Fechar e inserir sob o mesmo lock de escrita
        self.mutate(move |leads| {
            lifecycle::apply_schedule(owned_lead(leads, user_id, lead_id)?, stored);
            Ok(())
        })
        .await?;
        Ok(follow_up)
    }

    async fn mark_completed(
        &self,
        user_id: Uuid,
        follow_up_id: Uuid,
        outcome: Option<FollowUpOutcome>,
    ) -> Result<(), AppError> {
        self.mutate(|leads| {
            let target = leads
                .iter_mut()
                .filter(|l| l.user_id == user_id)
                .flat_map(|l| l.follow_ups.iter_mut())
                .find(|f| f.id == follow_up_id);
            // Igual ao UPDATE remoto: id desconhecido não é erro
            if let Some(f) = target {
                f.completed = true;
                if outcome.is_some() {
                    f.outcome = outcome;
                }
            }
            Ok(())
        })
        .await
    }
}

/// Perfil e assinatura do modo local. Vivem só em memória.
#[derive(Default)]
pub struct LocalAccountStore {
    profile: RwLock<Option<Profile>>,
    subscription: RwLock<Option<Subscription>>,
}

impl LocalAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for LocalAccountStore {
    async fn find_profile(&self, _user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.profile.read().await.clone())
    }

    async fn find_subscription(&self, _user_id: Uuid) -> Result<Option<Subscription>, AppError> {
        Ok(self.subscription.read().await.clone())
    }

    async fn upsert_profile(&self, user_id: Uuid, full_name: &str, phone: &str) -> Result<Profile, AppError> {
        let mut guard = self.profile.write().await;
        let created_at = guard.as_ref().and_then(|p| p.created_at).unwrap_or_else(Utc::now);
        let profile = Profile {
            id: user_id,
            full_name: full_name.to_owned(),
            phone: phone.to_owned(),
            created_at: Some(created_at),
            subscription: None,
        };
        *guard = Some(profile.clone());
        Ok(profile)
    }

    async fn upsert_subscription(&self, user_id: Uuid, paid_until: DateTime<Utc>) -> Result<Subscription, AppError> {
        let subscription = Subscription {
            user_id,
            is_active: true,
            paid_until: Some(paid_until),
            updated_at: Some(Utc::now()),
        };
        *self.subscription.write().await = Some(subscription.clone());
        Ok(subscription)
    }

    async fn insert_feedback(&self, _user_id: Uuid, _message: &str) -> Result<(), AppError> {
        Err(AppError::UnavailableInLocalMode)
    }
}
