// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::lead::{FollowUpType, LeadStatus},
    services::access::TrialBanner,
};

// 1. Um lead com follow-up para hoje (ou atrasado)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FocusItem {
    pub lead_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub area: String,
    pub status: LeadStatus,
    pub follow_up_id: Uuid,
    pub follow_up_type: FollowUpType,
    pub due_at: DateTime<Utc>,
    // Já formatado em IST
    pub due_label: String,
}

// 2. O "Today's Focus" completo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub overdue: Vec<FocusItem>,
    pub due_today: Vec<FocusItem>,
    pub tasks_to_clear: usize,
    pub active_leads: usize,
    #[schema(value_type = f64)]
    pub pipeline_value: Decimal,
    pub pipeline_value_label: String,
    pub banner: TrialBanner,
}
