// src/services/lifecycle.rs

//! Máquina de estados do follow-up de um lead.
//!
//! Invariante: no máximo um `FollowUp` com `completed = false` por lead.
//! `schedule` garante isso e `Lead::next_action_id` é recalculado só aqui.

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    models::lead::{FollowUp, FollowUpOutcome, FollowUpState, Lead, LeadDetail},
};

// Quantas interações passadas aparecem no detalhe
const PAST_INTERACTIONS: usize = 3;

/// Recalcula o pendente: o primeiro incompleto na ordem da lista.
pub fn reconcile(lead: &mut Lead) {
    lead.next_action_id = lead.follow_ups.iter().find(|f| !f.completed).map(|f| f.id);
}

pub fn state_of(lead: &Lead, now: DateTime<Utc>, tz: &FixedOffset) -> FollowUpState {
    match lead.next_action() {
        None => FollowUpState::NoPlan,
        Some(next) if time::is_overdue(next.date, now) => FollowUpState::Overdue,
        Some(next) if time::is_today(next.date, now, tz) => FollowUpState::DueToday,
        Some(_) => FollowUpState::Upcoming,
    }
}

/// Ids que um novo agendamento vai marcar como concluídos (sem outcome).
pub fn superseded_by_schedule(lead: &Lead) -> Vec<Uuid> {
    lead.follow_ups
        .iter()
        .filter(|f| !f.completed)
        .map(|f| f.id)
        .collect()
}

/// Transição `schedule`: fecha qualquer pendente e põe o novo na frente da lista.
/// Retorna os ids que foram fechados.
pub fn apply_schedule(lead: &mut Lead, mut follow_up: FollowUp) -> Vec<Uuid> {
    let superseded = superseded_by_schedule(lead);
    for f in lead.follow_ups.iter_mut().filter(|f| !f.completed) {
        f.completed = true;
    }

    follow_up.completed = false;
    follow_up.outcome = None;
    follow_up.lead_id = lead.id;
    lead.follow_ups.insert(0, follow_up);

    reconcile(lead);
    superseded
}

/// Alvo de `complete`: o pendente atual, se existir.
pub fn completion_target(lead: &Lead) -> Result<Uuid, AppError> {
    lead.next_action()
        .map(|f| f.id)
        .ok_or(AppError::NoPendingFollowUp)
}

/// Transição `complete`: marca o pendente como concluído com o outcome.
/// O lead volta para NoPlan.
pub fn apply_completion(lead: &mut Lead, outcome: FollowUpOutcome) -> Result<Uuid, AppError> {
    let target = completion_target(lead)?;
    if let Some(f) = lead.follow_ups.iter_mut().find(|f| f.id == target) {
        f.completed = true;
        f.outcome = Some(outcome);
    }
    reconcile(lead);
    Ok(target)
}

/// As últimas interações concluídas, mais recentes primeiro.
pub fn past_interactions(lead: &Lead, limit: usize) -> Vec<FollowUp> {
    let mut done: Vec<FollowUp> = lead.follow_ups.iter().filter(|f| f.completed).cloned().collect();
    done.sort_by(|a, b| b.date.cmp(&a.date));
    done.truncate(limit);
    done
}

pub fn detail(lead: Lead, now: DateTime<Utc>, tz: &FixedOffset) -> LeadDetail {
    let state = state_of(&lead, now, tz);
    LeadDetail {
        next_action: lead.next_action().cloned(),
        prompt_schedule: state == FollowUpState::NoPlan,
        past_interactions: past_interactions(&lead, PAST_INTERACTIONS),
        state,
        lead,
    }
}
