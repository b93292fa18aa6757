// src/services/access.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::DataStore,
    models::account::{Profile, Subscription},
    router::view::PaywallPresentation,
};

/// Qual coluna da assinatura decide o acesso pago.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionModel {
    /// `paid_until` no futuro.
    Expiring,
    /// `is_active`, mantendo `paid_until` no futuro como acesso pago.
    Legacy,
}

impl FromStr for SubscriptionModel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expiring" | "paid_until" => Ok(SubscriptionModel::Expiring),
            "legacy" | "is_active" => Ok(SubscriptionModel::Legacy),
            other => Err(anyhow::anyhow!("SUBSCRIPTION_MODEL desconhecido: {}", other)),
        }
    }
}

// Faixa exibida no dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrialBanner {
    pub paid_active: bool,
    pub trial_active: bool,
    pub trial_days_left: i64,
    // Escondida quando a assinatura está paga
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    model: SubscriptionModel,
    trial_days: i64,
}

impl AccessPolicy {
    pub fn new(model: SubscriptionModel, trial_days: i64) -> Self {
        Self { model, trial_days }
    }

    pub fn model(&self) -> SubscriptionModel {
        self.model
    }

    /// Sem `created_at` o trial é considerado inativo.
    pub fn trial_active(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        created_at
            .map(|c| now < time::trial_expiry(c, self.trial_days))
            .unwrap_or(false)
    }

    pub fn trial_days_left(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
        created_at
            .map(|c| time::days_left_until(time::trial_expiry(c, self.trial_days), now))
            .unwrap_or(0)
    }

    pub fn subscription_active(&self, subscription: Option<&Subscription>, now: DateTime<Utc>) -> bool {
        let Some(sub) = subscription else {
            return false;
        };
        let paid = sub.paid_until.is_some_and(|until| now < until);
        match self.model {
            SubscriptionModel::Expiring => paid,
            SubscriptionModel::Legacy => sub.is_active || paid,
        }
    }

    /// Perfil ausente (ainda carregando) libera o acesso.
    pub fn has_access(&self, profile: Option<&Profile>, now: DateTime<Utc>) -> bool {
        match profile {
            None => true,
            Some(p) => {
                self.subscription_active(p.subscription.as_ref(), now)
                    || self.trial_active(p.created_at, now)
            }
        }
    }

    pub fn banner(&self, profile: Option<&Profile>, now: DateTime<Utc>) -> TrialBanner {
        let created_at = profile.and_then(|p| p.created_at);
        let paid_active = self.subscription_active(profile.and_then(|p| p.subscription.as_ref()), now);
        TrialBanner {
            paid_active,
            trial_active: self.trial_active(created_at, now),
            trial_days_left: self.trial_days_left(created_at, now),
            visible: !paid_active,
        }
    }
}

/// Decide o acesso de um usuário a partir do que está gravado.
#[derive(Clone)]
pub struct AccessService {
    store: DataStore,
    policy: AccessPolicy,
}

impl AccessService {
    pub fn new(store: DataStore, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Perfil com a assinatura anexada. As duas leituras correm em paralelo.
    pub async fn account(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let (profile, subscription) = tokio::try_join!(
            self.store.accounts.find_profile(user_id),
            self.store.accounts.find_subscription(user_id),
        )?;
        Ok(profile.map(|p| Profile { subscription, ..p }))
    }

    /// Ações com paywall (agendar, novo lead, WhatsApp). No modo local nunca bloqueia.
    pub async fn ensure_access(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.store.is_local() {
            return Ok(());
        }
        let profile = self.account(user_id).await?;
        if self.policy.has_access(profile.as_ref(), now) {
            Ok(())
        } else {
            tracing::debug!("Acesso negado para {}", user_id);
            Err(AppError::PaymentRequired(PaywallPresentation::dismissible()))
        }
    }

    pub async fn banner(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TrialBanner, AppError> {
        if self.store.is_local() {
            return Ok(TrialBanner {
                paid_active: false,
                trial_active: false,
                trial_days_left: 0,
                visible: false,
            });
        }
        let profile = self.account(user_id).await?;
        Ok(self.policy.banner(profile.as_ref(), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn policy(model: SubscriptionModel) -> AccessPolicy {
        AccessPolicy::new(model, 7)
    }

    fn profile(created_at: Option<DateTime<Utc>>, subscription: Option<Subscription>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: "Priya".into(),
            phone: "98200".into(),
            created_at,
            subscription,
        }
    }

    fn subscription(is_active: bool, paid_until: Option<DateTime<Utc>>) -> Subscription {
        Subscription {
            user_id: Uuid::new_v4(),
            is_active,
            paid_until,
            updated_at: None,
        }
    }

    #[test]
    fn trial_expires_exactly_at_seven_days() {
        let p = policy(SubscriptionModel::Expiring);
        let created = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let boundary = created + Duration::days(7);

        assert!(p.trial_active(Some(created), boundary - Duration::milliseconds(1)));
        assert!(!p.trial_active(Some(created), boundary));
        assert_eq!(p.trial_days_left(Some(created), boundary), 0);
        assert_eq!(p.trial_days_left(Some(created), created + Duration::hours(12)), 7);
    }

    #[test]
    fn missing_created_at_is_not_an_infinite_trial() {
        let p = policy(SubscriptionModel::Expiring);
        let now = Utc::now();
        assert!(!p.trial_active(None, now));
        assert_eq!(p.trial_days_left(None, now), 0);
        assert!(!p.has_access(Some(&profile(None, None)), now));
    }

    #[test]
    fn absent_profile_fails_open() {
        assert!(policy(SubscriptionModel::Expiring).has_access(None, Utc::now()));
    }

    #[test]
    fn future_paid_until_grants_access_in_both_models() {
        let now = Utc::now();
        let expired_trial = Some(now - Duration::days(30));
        let paid = profile(expired_trial, Some(subscription(false, Some(now + Duration::days(3)))));

        assert!(policy(SubscriptionModel::Expiring).has_access(Some(&paid), now));
        assert!(policy(SubscriptionModel::Legacy).has_access(Some(&paid), now));
    }

    #[test]
    fn is_active_flag_only_counts_in_legacy_model() {
        let now = Utc::now();
        let expired_trial = Some(now - Duration::days(30));
        let flagged = profile(expired_trial, Some(subscription(true, None)));

        assert!(!policy(SubscriptionModel::Expiring).has_access(Some(&flagged), now));
        assert!(policy(SubscriptionModel::Legacy).has_access(Some(&flagged), now));
    }

    #[test]
    fn lapsed_subscription_falls_back_to_trial() {
        let now = Utc::now();
        let lapsed = Some(subscription(true, Some(now - Duration::days(1))));

        let p = policy(SubscriptionModel::Expiring);
        assert!(!p.has_access(Some(&profile(Some(now - Duration::days(8)), lapsed.clone())), now));
        assert!(p.has_access(Some(&profile(Some(now - Duration::days(2)), lapsed)), now));
    }

    #[test]
    fn banner_hides_when_paid() {
        let now = Utc::now();
        let p = policy(SubscriptionModel::Expiring);
        let paid = profile(Some(now), Some(subscription(true, Some(now + Duration::days(30)))));
        let trial = profile(Some(now - Duration::days(5)), None);

        assert!(!p.banner(Some(&paid), now).visible);
        let banner = p.banner(Some(&trial), now);
        assert!(banner.visible);
        assert!(banner.trial_active);
        assert_eq!(banner.trial_days_left, 2);
    }

    #[test]
    fn parses_model_names() {
        assert_eq!("legacy".parse::<SubscriptionModel>().unwrap(), SubscriptionModel::Legacy);
        assert_eq!("Expiring".parse::<SubscriptionModel>().unwrap(), SubscriptionModel::Expiring);
        assert!("lifetime".parse::<SubscriptionModel>().is_err());
    }
}
