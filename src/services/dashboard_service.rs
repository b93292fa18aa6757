// src/services/dashboard_service.rs

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    models::{
        dashboard::{DashboardSummary, FocusItem},
        lead::Lead,
    },
    services::{access::AccessService, lead_service::LeadService},
};

/// Partição "Today's Focus" sobre os leads ativos.
/// Atrasados e de hoje são disjuntos: um follow-up atrasado de hoje cai só em `overdue`.
pub fn classify(leads: &[Lead], now: DateTime<Utc>, tz: &FixedOffset) -> (Vec<FocusItem>, Vec<FocusItem>) {
    let mut overdue = Vec::new();
    let mut due_today = Vec::new();

    for lead in leads.iter().filter(|l| l.is_active()) {
        let Some(next) = lead.next_action() else {
            continue;
        };
        let item = FocusItem {
            lead_id: lead.id,
            full_name: lead.full_name.clone(),
            phone: lead.phone.clone(),
            area: lead.area.clone(),
            status: lead.status,
            follow_up_id: next.id,
            follow_up_type: next.kind,
            due_at: next.date,
            due_label: time::format_date(next.date, tz),
        };
        if time::is_overdue(next.date, now) {
            overdue.push(item);
        } else if time::is_today(next.date, now, tz) {
            due_today.push(item);
        }
    }

    overdue.sort_by_key(|i| i.due_at);
    due_today.sort_by_key(|i| i.due_at);
    (overdue, due_today)
}

pub fn pipeline_value(leads: &[Lead]) -> Decimal {
    leads.iter().filter(|l| l.is_active()).map(|l| l.budget).sum()
}

#[derive(Clone)]
pub struct DashboardService {
    leads: LeadService,
    access: AccessService,
    tz: FixedOffset,
}

impl DashboardService {
    pub fn new(leads: LeadService, access: AccessService, tz: FixedOffset) -> Self {
        Self { leads, access, tz }
    }

    pub async fn summary(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DashboardSummary, AppError> {
        let leads = self.leads.fetch_all(user_id).await?;
        let banner = self.access.banner(user_id, now).await?;

        let (overdue, due_today) = classify(&leads, now, &self.tz);
        let pipeline_value = pipeline_value(&leads);

        Ok(DashboardSummary {
            tasks_to_clear: overdue.len() + due_today.len(),
            active_leads: leads.iter().filter(|l| l.is_active()).count(),
            pipeline_value_label: time::format_inr_compact(pipeline_value),
            pipeline_value,
            overdue,
            due_today,
            banner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::time::{business_offset, IST_OFFSET_MINUTES},
        models::lead::LeadStatus,
        services::lifecycle::{
            apply_schedule,
            tests::{follow_up_at, sample_lead},
        },
    };
    use chrono::{Duration, TimeZone};

    fn ist() -> FixedOffset {
        business_offset(IST_OFFSET_MINUTES)
    }

    fn lead_due(date: DateTime<Utc>, status: LeadStatus) -> Lead {
        let mut lead = sample_lead();
        lead.status = status;
        let f = follow_up_at(&lead, date);
        apply_schedule(&mut lead, f);
        lead
    }

    #[test]
    fn partitions_are_disjoint_and_cover_today_or_past() {
        // 23:00 IST de 18/10
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 17, 30, 0).unwrap();
        let leads = vec![
            lead_due(now - Duration::hours(3), LeadStatus::New),         // atrasado, hoje
            lead_due(now - Duration::days(2), LeadStatus::Contacted),    // atrasado, outro dia
            lead_due(now + Duration::minutes(30), LeadStatus::New),      // hoje (23:30 IST)
            lead_due(now + Duration::hours(1), LeadStatus::Negotiation), // amanhã em IST, hoje em UTC
            lead_due(now - Duration::hours(1), LeadStatus::Closed),      // inativo
            sample_lead(),                                               // sem plano
        ];

        let (overdue, due_today) = classify(&leads, now, &ist());

        assert_eq!(overdue.len(), 2);
        assert_eq!(due_today.len(), 1);
        assert_eq!(due_today[0].lead_id, leads[2].id);
        assert!(overdue.iter().all(|o| due_today.iter().all(|t| t.lead_id != o.lead_id)));
        // Mais antigo primeiro
        assert_eq!(overdue[0].lead_id, leads[1].id);
    }

    #[test]
    fn ist_midnight_boundary_is_not_utc() {
        // 00:10 IST de 19/10 = 18:40 UTC de 18/10
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 18, 40, 0).unwrap();
        let just_after_midnight = lead_due(now + Duration::minutes(5), LeadStatus::New);
        let (_, due_today) = classify(&[just_after_midnight], now, &ist());
        assert_eq!(due_today.len(), 1);

        let before_midnight_ist = Utc.with_ymd_and_hms(2026, 10, 18, 18, 20, 0).unwrap();
        let (_, due_today) = classify(
            &[lead_due(now + Duration::hours(2), LeadStatus::New)],
            before_midnight_ist,
            &ist(),
        );
        assert!(due_today.is_empty());
    }

    #[test]
    fn pipeline_counts_only_active_budgets() {
        let mut closed = sample_lead();
        closed.status = LeadStatus::Closed;
        let open = sample_lead();

        assert_eq!(pipeline_value(&[closed, open.clone()]), open.budget);
    }
}
