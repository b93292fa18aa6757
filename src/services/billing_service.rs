// src/services/billing_service.rs

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DataStore,
    models::account::Subscription,
    services::access::AccessService,
};

#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub razorpay_key: String,
    pub amount_paise: u32,
    pub period_days: i64,
}

// Opções entregues ao widget de checkout
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutOptions {
    pub key: String,
    #[schema(example = 49900)]
    pub amount: u32,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub prefill: CheckoutPrefill,
    pub notes: CheckoutNotes,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPrefill {
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutNotes {
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct BillingService {
    store: DataStore,
    access: AccessService,
    plan: PlanSettings,
}

impl BillingService {
    pub fn new(store: DataStore, access: AccessService, plan: PlanSettings) -> Self {
        Self { store, access, plan }
    }

    pub async fn checkout(&self, user_id: Uuid, email: Option<&str>) -> Result<CheckoutOptions, AppError> {
        let contact = self
            .access
            .account(user_id)
            .await?
            .map(|p| p.phone)
            .unwrap_or_default();

        Ok(CheckoutOptions {
            key: self.plan.razorpay_key.clone(),
            amount: self.plan.amount_paise,
            currency: "INR".into(),
            name: "SoloAgent Pro".into(),
            description: "Unlimited Pipeline Protection".into(),
            prefill: CheckoutPrefill {
                email: email.unwrap_or_default().to_owned(),
                contact,
            },
            notes: CheckoutNotes { user_id },
        })
    }

    /// Callback de sucesso do widget: estende `paid_until` por um período.
    /// Se a gravação falhar o acesso não é liberado e o erro carrega a referência
    /// do pagamento para conciliação manual.
    ///
    /// Não verifica a assinatura do gateway: o `payment_id` vem do cliente e é
    /// aceito como está. Isto não é uma fronteira de confiança.
    pub async fn payment_success(
        &self,
        user_id: Uuid,
        payment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Subscription, AppError> {
        let paid_until = now + Duration::days(self.plan.period_days);

        match self.store.accounts.upsert_subscription(user_id, paid_until).await {
            Ok(subscription) => {
                tracing::info!("💳 Pagamento {} confirmado; acesso até {}", payment_id, paid_until);
                Ok(subscription)
            }
            Err(e) => {
                tracing::error!("Pagamento {} de {} sem assinatura gravada: {}", payment_id, user_id, e);
                Err(AppError::PaymentReconciliation {
                    payment_id: payment_id.to_owned(),
                })
            }
        }
    }
}
