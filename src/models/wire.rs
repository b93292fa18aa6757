// src/models/wire.rs

//! Linhas como estão no banco e o único ponto de tradução para o domínio.
//! Renomeações: name→fullName, interest→interestType, followup_at→date,
//! method→type, note→notes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        account::{Profile, Subscription},
        lead::{FollowUp, FollowUpOutcome, Lead, Note},
    },
};

#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub interest: String,
    pub budget: Decimal,
    pub area: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FollowUpRow {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub followup_at: DateTime<Utc>,
    pub method: String,
    pub note: Option<String>,
    pub completed: Option<bool>,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub user_id: Uuid,
    pub is_active: Option<bool>,
    pub paid_until: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            lead_id: row.lead_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<FollowUpRow> for FollowUp {
    type Error = AppError;

    fn try_from(row: FollowUpRow) -> Result<Self, Self::Error> {
        Ok(FollowUp {
            id: row.id,
            lead_id: row.lead_id,
            date: row.followup_at,
            kind: row.method.parse()?,
            notes: row.note.unwrap_or_default(),
            completed: row.completed.unwrap_or(false),
            outcome: row
                .outcome
                .as_deref()
                .map(|s| s.parse::<FollowUpOutcome>())
                .transpose()?,
        })
    }
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            user_id: row.user_id,
            is_active: row.is_active.unwrap_or(false),
            paid_until: row.paid_until,
            updated_at: row.updated_at,
        }
    }
}

impl ProfileRow {
    pub fn into_profile(self, subscription: Option<Subscription>) -> Profile {
        Profile {
            id: self.id,
            full_name: self.full_name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            created_at: self.created_at,
            subscription,
        }
    }
}

impl LeadRow {
    /// Monta o agregado com os filhos já filtrados para este lead.
    /// Notas e follow-ups ficam do mais novo para o mais antigo independente da ordem do banco.
    pub fn into_lead(self, notes: Vec<NoteRow>, mut follow_ups: Vec<FollowUpRow>) -> Result<Lead, AppError> {
        let mut notes: Vec<Note> = notes.into_iter().map(Note::from).collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        follow_ups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let follow_ups = follow_ups
            .into_iter()
            .map(FollowUp::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Lead {
            id: self.id,
            user_id: self.user_id,
            full_name: self.name,
            phone: self.phone,
            interest_type: self.interest.parse()?,
            budget: self.budget,
            area: self.area,
            status: self.status.parse()?,
            notes,
            follow_ups,
            created_at: self.created_at,
            next_action_id: None,
        })
    }
}
