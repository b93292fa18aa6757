// src/db/lead_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        lead::{FollowUp, FollowUpDraft, FollowUpOutcome, Lead, LeadDraft, LeadStatus, Note},
        wire::{FollowUpRow, LeadRow, NoteRow},
    },
};

/// Contrato do adaptador de leads. Uma implementação remota (Postgres) e
/// uma local (blob JSON), escolhidas uma vez na inicialização.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Leads do usuário com notas e follow-ups, do mais novo para o mais antigo.
    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Lead>, AppError>;

    async fn find(&self, user_id: Uuid, lead_id: Uuid) -> Result<Option<Lead>, AppError>;

    async fn create(&self, user_id: Uuid, draft: &LeadDraft) -> Result<Lead, AppError>;

    async fn update_status(&self, user_id: Uuid, lead_id: Uuid, status: LeadStatus) -> Result<(), AppError>;

    async fn delete(&self, user_id: Uuid, lead_id: Uuid) -> Result<(), AppError>;

    async fn add_note(&self, user_id: Uuid, lead_id: Uuid, text: &str) -> Result<Note, AppError>;

    /// Fecha (sem outcome) todo pendente do lead e insere o novo numa única operação.
    /// Falhou no meio, nada muda.
    async fn schedule_follow_up(
        &self,
        user_id: Uuid,
        lead_id: Uuid,
        draft: &FollowUpDraft,
    ) -> Result<FollowUp, AppError>;

    /// `outcome = None` não toca na coluna `outcome`.
    async fn mark_completed(
        &self,
        user_id: Uuid,
        follow_up_id: Uuid,
        outcome: Option<FollowUpOutcome>,
    ) -> Result<(), AppError>;
}

const LEAD_COLUMNS: &str = "id, user_id, name, phone, interest, budget, area, status, created_at";
const FOLLOW_UP_COLUMNS: &str = "id, lead_id, followup_at, method, note, completed, outcome, created_at";

// O repositório remoto, responsável pelas tabelas 'leads', 'notes' e 'followups'
#[derive(Clone)]
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Equivalente ao select `*, notes (*), followups (*)`: três consultas e montagem em memória.
    async fn load_with_children(&self, leads: Vec<LeadRow>) -> Result<Vec<Lead>, AppError> {
        if leads.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = leads.iter().map(|l| l.id).collect();

        let notes = sqlx::query_as::<_, NoteRow>(
            "SELECT id, lead_id, text, created_at FROM notes WHERE lead_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let follow_ups = sqlx::query_as::<_, FollowUpRow>(&format!(
            "SELECT {} FROM followups WHERE lead_id = ANY($1) ORDER BY created_at DESC",
            FOLLOW_UP_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut notes_by_lead: HashMap<Uuid, Vec<NoteRow>> = HashMap::new();
        for note in notes {
            notes_by_lead.entry(note.lead_id).or_default().push(note);
        }
        let mut follow_ups_by_lead: HashMap<Uuid, Vec<FollowUpRow>> = HashMap::new();
        for follow_up in follow_ups {
            follow_ups_by_lead.entry(follow_up.lead_id).or_default().push(follow_up);
        }

        leads
            .into_iter()
            .map(|row| {
                let notes = notes_by_lead.remove(&row.id).unwrap_or_default();
                let follow_ups = follow_ups_by_lead.remove(&row.id).unwrap_or_default();
                row.into_lead(notes, follow_ups)
            })
            .collect()
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE user_id = $1 ORDER BY created_at DESC",
            LEAD_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.load_with_children(rows).await
    }

    async fn find(&self, user_id: Uuid, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE id = $1 AND user_id = $2",
            LEAD_COLUMNS
        ))
        .bind(lead_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.load_with_children(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(&self, user_id: Uuid, draft: &LeadDraft) -> Result<Lead, AppError> {
        // Lead e nota inicial entram juntos ou nenhum entra
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r#"
            INSERT INTO leads (user_id, name, phone, interest, budget, area, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            LEAD_COLUMNS
        ))
        .bind(user_id)
        .bind(&draft.full_name)
        .bind(&draft.phone)
        .bind(draft.interest_type.as_str())
        .bind(draft.budget)
        .bind(&draft.area)
        .bind(draft.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let mut notes = Vec::new();
        if let Some(text) = draft.initial_note.as_deref() {
            let note = sqlx::query_as::<_, NoteRow>(
                "INSERT INTO notes (lead_id, text) VALUES ($1, $2) RETURNING id, lead_id, text, created_at",
            )
            .bind(row.id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
            notes.push(note);
        }

        tx.commit().await?;

        row.into_lead(notes, Vec::new())
    }

    async fn update_status(&self, user_id: Uuid, lead_id: Uuid, status: LeadStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE leads SET status = $1 WHERE id = $2 AND user_id = $3")
            .bind(status.as_str())
            .bind(lead_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::LeadNotFound(lead_id));
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, lead_id: Uuid) -> Result<(), AppError> {
        // notes e followups caem junto (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND user_id = $2")
            .bind(lead_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::LeadNotFound(lead_id));
        }
        Ok(())
    }

    async fn add_note(&self, user_id: Uuid, lead_id: Uuid, text: &str) -> Result<Note, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (lead_id, text)
            SELECT $1, $2
            WHERE EXISTS (SELECT 1 FROM leads WHERE id = $1 AND user_id = $3)
            RETURNING id, lead_id, text, created_at
            "#,
        )
        .bind(lead_id)
        .bind(text)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Note::from).ok_or(AppError::LeadNotFound(lead_id))
    }

    async fn schedule_follow_up(
        &self,
        user_id: Uuid,
        lead_id: Uuid,
        draft: &FollowUpDraft,
    ) -> Result<FollowUp, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava o lead: agendamentos concorrentes do mesmo lead entram em fila
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM leads WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(lead_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::LeadNotFound(lead_id));
        }

        sqlx::query("UPDATE followups SET completed = true WHERE lead_id = $1 AND completed IS NOT TRUE")
            .bind(lead_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, FollowUpRow>(&format!(
            r#"
            INSERT INTO followups (user_id, lead_id, followup_at, method, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            FOLLOW_UP_COLUMNS
        ))
        .bind(user_id)
        .bind(lead_id)
        .bind(draft.date)
        .bind(draft.kind.as_str())
        .bind(&draft.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        FollowUp::try_from(row)
    }

    async fn mark_completed(
        &self,
        user_id: Uuid,
        follow_up_id: Uuid,
        outcome: Option<FollowUpOutcome>,
    ) -> Result<(), AppError> {
        let query = match outcome {
            Some(outcome) => sqlx::query(
                "UPDATE followups SET completed = true, outcome = $3 WHERE id = $1 AND user_id = $2",
            )
            .bind(follow_up_id)
            .bind(user_id)
            .bind(outcome.as_str()),
            None => sqlx::query("UPDATE followups SET completed = true WHERE id = $1 AND user_id = $2")
                .bind(follow_up_id)
                .bind(user_id),
        };

        query.execute(&self.pool).await?;
        Ok(())
    }
}
