// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    error::AppError,
    time::QuickPreset,
    validation::{validate_not_blank, validate_not_negative},
};

// --- ENUMS ---
// Os textos são os mesmos gravados nas colunas TEXT do banco.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum InterestType {
    Buy,
    Rent,
    Sell,
}

impl InterestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestType::Buy => "Buy",
            InterestType::Rent => "Rent",
            InterestType::Sell => "Sell",
        }
    }
}

impl FromStr for InterestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(InterestType::Buy),
            "Rent" => Ok(InterestType::Rent),
            "Sell" => Ok(InterestType::Sell),
            other => Err(AppError::CorruptRow(format!("interest '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LeadStatus {
    New,
    Contacted,
    #[serde(rename = "Visit Scheduled")]
    VisitScheduled,
    Negotiation,
    Closed,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::VisitScheduled => "Visit Scheduled",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Closed => "Closed",
            LeadStatus::Lost => "Lost",
        }
    }

    /// Closed e Lost saem do pipeline ativo.
    pub fn is_active(&self) -> bool {
        !matches!(self, LeadStatus::Closed | LeadStatus::Lost)
    }
}

impl FromStr for LeadStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(LeadStatus::New),
            "Contacted" => Ok(LeadStatus::Contacted),
            "Visit Scheduled" => Ok(LeadStatus::VisitScheduled),
            "Negotiation" => Ok(LeadStatus::Negotiation),
            "Closed" => Ok(LeadStatus::Closed),
            "Lost" => Ok(LeadStatus::Lost),
            other => Err(AppError::CorruptRow(format!("status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FollowUpType {
    #[default]
    Call,
    Message,
    Visit,
    Email,
}

impl FollowUpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpType::Call => "Call",
            FollowUpType::Message => "Message",
            FollowUpType::Visit => "Visit",
            FollowUpType::Email => "Email",
        }
    }
}

impl FromStr for FollowUpType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Call" => Ok(FollowUpType::Call),
            "Message" => Ok(FollowUpType::Message),
            "Visit" => Ok(FollowUpType::Visit),
            "Email" => Ok(FollowUpType::Email),
            other => Err(AppError::CorruptRow(format!("method '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FollowUpOutcome {
    #[serde(rename = "Spoke - Interested")]
    Spoke,
    #[serde(rename = "No Answer")]
    NoAnswer,
    #[serde(rename = "Requested Reschedule")]
    Reschedule,
    #[serde(rename = "Not Interested")]
    NotInterested,
}

impl FollowUpOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpOutcome::Spoke => "Spoke - Interested",
            FollowUpOutcome::NoAnswer => "No Answer",
            FollowUpOutcome::Reschedule => "Requested Reschedule",
            FollowUpOutcome::NotInterested => "Not Interested",
        }
    }
}

impl FromStr for FollowUpOutcome {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spoke - Interested" => Ok(FollowUpOutcome::Spoke),
            "No Answer" => Ok(FollowUpOutcome::NoAnswer),
            "Requested Reschedule" => Ok(FollowUpOutcome::Reschedule),
            "Not Interested" => Ok(FollowUpOutcome::NotInterested),
            other => Err(AppError::CorruptRow(format!("outcome '{}'", other))),
        }
    }
}

// --- AGREGADO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: FollowUpType,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FollowUpOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub interest_type: InterestType,
    #[schema(value_type = f64, example = 7500000)]
    pub budget: Decimal,
    pub area: String,
    pub status: LeadStatus,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,
    pub created_at: DateTime<Utc>,

    // Follow-up pendente atual. Só `services::lifecycle` escreve aqui.
    #[serde(default)]
    pub next_action_id: Option<Uuid>,
}

impl Lead {
    pub fn next_action(&self) -> Option<&FollowUp> {
        let id = self.next_action_id?;
        self.follow_ups.iter().find(|f| f.id == id)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Estado derivado do follow-up de um lead. Nunca é persistido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FollowUpState {
    NoPlan,
    Upcoming,
    DueToday,
    Overdue,
}

// Resposta do detalhe do lead
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    pub lead: Lead,
    pub state: FollowUpState,
    pub next_action: Option<FollowUp>,
    // NoPlan abre o agendamento automaticamente
    pub prompt_schedule: bool,
    pub past_interactions: Vec<FollowUp>,
}

// --- RASCUNHOS (entrada dos repositórios) ---

#[derive(Debug, Clone)]
pub struct LeadDraft {
    pub full_name: String,
    pub phone: String,
    pub interest_type: InterestType,
    pub budget: Decimal,
    pub area: String,
    pub status: LeadStatus,
    pub initial_note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FollowUpDraft {
    pub date: DateTime<Utc>,
    pub kind: FollowUpType,
    pub notes: String,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(custom(function = "validate_not_blank", message = "Name is required."))]
    #[schema(example = "Rohan Mehta")]
    pub full_name: String,
    #[validate(custom(function = "validate_not_blank", message = "Phone is required."))]
    #[schema(example = "+91 98765 43210")]
    pub phone: String,
    pub interest_type: InterestType,
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative", message = "Budget cannot be negative."))]
    #[schema(value_type = f64, example = 7500000)]
    pub budget: Decimal,
    #[serde(default)]
    #[schema(example = "Bandra West")]
    pub area: String,
    #[serde(default = "default_status")]
    pub status: LeadStatus,
    // Vira a primeira nota do lead
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_status() -> LeadStatus {
    LeadStatus::New
}

impl CreateLeadPayload {
    pub fn into_draft(self) -> LeadDraft {
        LeadDraft {
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            interest_type: self.interest_type,
            budget: self.budget,
            area: self.area.trim().to_owned(),
            status: self.status,
            initial_note: self.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NotePayload {
    #[validate(custom(function = "validate_not_blank", message = "Note cannot be empty."))]
    pub text: String,
}

/// `date` explícita ou um dos atalhos; `date` tem prioridade.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub date: Option<DateTime<Utc>>,
    pub preset: Option<QuickPreset>,
    #[serde(default, rename = "type")]
    pub kind: FollowUpType,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompletePayload {
    pub outcome: FollowUpOutcome,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    /// Nome ou região (sem diferenciar maiúsculas) ou trecho do telefone.
    pub search: Option<String>,
    /// "All" ou um status.
    pub status: Option<String>,
}

impl LeadFilter {
    pub fn status(&self) -> Result<Option<LeadStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("All") => Ok(None),
            Some(other) => other
                .parse()
                .map(Some)
                .map_err(|_| AppError::InvalidInput(format!("Unknown status '{}'.", other))),
        }
    }

    pub fn matches(&self, lead: &Lead, status: Option<LeadStatus>) -> bool {
        let matches_status = status.is_none_or(|s| lead.status == s);
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let needle = term.to_lowercase();
                lead.full_name.to_lowercase().contains(&needle)
                    || lead.area.to_lowercase().contains(&needle)
                    || lead.phone.contains(term)
            }
        };
        matches_status && matches_search
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WhatsAppLink {
    #[schema(example = "https://wa.me/919876543210?text=Hi")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_searches_name_area_and_phone() {
        let mut lead = crate::services::lifecycle::tests::sample_lead();
        lead.status = LeadStatus::Negotiation;
        let by = |search: &str, status: Option<&str>| LeadFilter {
            search: Some(search.into()),
            status: status.map(Into::into),
        };

        for (search, status) in [("anita", None), ("POWAI", Some("All")), ("0012", Some("Negotiation"))] {
            let filter = by(search, status);
            assert!(filter.matches(&lead, filter.status().unwrap()), "{search}");
        }
        let wrong_status = by("", Some("Closed"));
        assert!(!wrong_status.matches(&lead, wrong_status.status().unwrap()));
        assert!(by("", Some("Pending")).status().is_err());
    }

    #[test]
    fn status_labels_match_storage_vocabulary() {
        let json = serde_json::to_string(&LeadStatus::VisitScheduled).unwrap();
        assert_eq!(json, "\"Visit Scheduled\"");
        assert_eq!("Visit Scheduled".parse::<LeadStatus>().unwrap(), LeadStatus::VisitScheduled);
        assert!("Pending".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn outcome_labels_round_trip_through_text() {
        for outcome in [
            FollowUpOutcome::Spoke,
            FollowUpOutcome::NoAnswer,
            FollowUpOutcome::Reschedule,
            FollowUpOutcome::NotInterested,
        ] {
            assert_eq!(outcome.as_str().parse::<FollowUpOutcome>().unwrap(), outcome);
        }
    }

    #[test]
    fn closed_and_lost_are_not_active() {
        assert!(LeadStatus::Negotiation.is_active());
        assert!(!LeadStatus::Closed.is_active());
        assert!(!LeadStatus::Lost.is_active());
    }
}
