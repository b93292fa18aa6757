// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::time::{business_offset, IST_OFFSET_MINUTES},
    db::DataStore,
    services::{
        AccessPolicy, AccessService, AuthService, BillingService, DashboardService, LeadService, PlanSettings,
        ProfileService, RetryPolicy, SessionService, SubscriptionModel,
    },
};

// Tudo o que vem do ambiente, lido uma única vez
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub require_database: bool,
    pub jwt_secret: Option<String>,
    pub local_data_path: PathBuf,
    pub subscription_model: SubscriptionModel,
    pub trial_days: i64,
    pub business_offset_minutes: i32,
    pub profile_fetch_retries: u32,
    pub profile_fetch_backoff: Duration,
    pub razorpay_key: String,
    pub plan_amount_paise: u32,
    pub plan_period_days: i64,
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Variáveis vazias contam como ausentes.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let business_offset_minutes = parse_or(
            var("BUSINESS_UTC_OFFSET_MINUTES"),
            "BUSINESS_UTC_OFFSET_MINUTES",
            IST_OFFSET_MINUTES,
        )?;
        // FixedOffset só aceita menos de 24h
        if business_offset_minutes.unsigned_abs() >= 24 * 60 {
            anyhow::bail!(
                "BUSINESS_UTC_OFFSET_MINUTES inválido ({}): precisa estar entre -1439 e 1439",
                business_offset_minutes
            );
        }

        Ok(Self {
            database_url: var("DATABASE_URL"),
            require_database: parse_or(var("REQUIRE_DATABASE"), "REQUIRE_DATABASE", false)?,
            jwt_secret: var("JWT_SECRET"),
            local_data_path: var("LOCAL_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/solo_agent_crm_data.json")),
            subscription_model: parse_or(var("SUBSCRIPTION_MODEL"), "SUBSCRIPTION_MODEL", SubscriptionModel::Expiring)?,
            trial_days: parse_or(var("TRIAL_DAYS"), "TRIAL_DAYS", 7)?,
            business_offset_minutes,
            profile_fetch_retries: parse_or(var("PROFILE_FETCH_RETRIES"), "PROFILE_FETCH_RETRIES", 3)?,
            profile_fetch_backoff: Duration::from_millis(parse_or(
                var("PROFILE_FETCH_BACKOFF_MS"),
                "PROFILE_FETCH_BACKOFF_MS",
                1000,
            )?),
            razorpay_key: var("RAZORPAY_KEY").unwrap_or_else(|| "rzp_test_YOUR_KEY_HERE".into()),
            plan_amount_paise: parse_or(var("PLAN_AMOUNT_PAISE"), "PLAN_AMOUNT_PAISE", 49900)?,
            plan_period_days: parse_or(var("PLAN_PERIOD_DAYS"), "PLAN_PERIOD_DAYS", 30)?,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
        })
    }

    pub fn business_offset(&self) -> FixedOffset {
        business_offset(self.business_offset_minutes)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválido ({}): {}", key, raw, e)),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub db_pool: Option<PgPool>,
    pub settings: Arc<Settings>,
    // Ausente no modo local
    pub auth_service: Option<AuthService>,
    pub access_service: AccessService,
    pub lead_service: LeadService,
    pub dashboard_service: DashboardService,
    pub session_service: SessionService,
    pub billing_service: BillingService,
    pub profile_service: ProfileService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;
        Self::from_settings(settings).await
    }

    /// Escolhe o modo de dados uma única vez e monta o grafo de serviços.
    pub async fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = connect(&settings).await?;

        let store = match &db_pool {
            Some(pool) => DataStore::remote(pool.clone()),
            None => {
                tracing::warn!(
                    "🗂️  Modo local: dados em {}",
                    settings.local_data_path.display()
                );
                DataStore::local(settings.local_data_path.clone())
                    .await
                    .with_context(|| format!("Falha ao abrir {}", settings.local_data_path.display()))?
            }
        };

        let auth_service = match (&db_pool, &store.users) {
            (Some(pool), Some(users)) => {
                let secret = settings
                    .jwt_secret
                    .clone()
                    .context("JWT_SECRET deve ser definido no modo remoto")?;
                Some(AuthService::new(users.clone(), secret, pool.clone()))
            }
            _ => None,
        };

        let tz = settings.business_offset();
        let policy = AccessPolicy::new(settings.subscription_model, settings.trial_days);
        let access_service = AccessService::new(store.clone(), policy);
        let lead_service = LeadService::new(store.clone(), access_service.clone(), tz);
        let dashboard_service = DashboardService::new(lead_service.clone(), access_service.clone(), tz);
        let session_service = SessionService::new(
            store.clone(),
            lead_service.clone(),
            access_service.clone(),
            RetryPolicy {
                retries: settings.profile_fetch_retries,
                backoff: settings.profile_fetch_backoff,
            },
            tz,
        );
        let billing_service = BillingService::new(
            store.clone(),
            access_service.clone(),
            PlanSettings {
                razorpay_key: settings.razorpay_key.clone(),
                amount_paise: settings.plan_amount_paise,
                period_days: settings.plan_period_days,
            },
        );
        let profile_service = ProfileService::new(store.clone(), access_service.clone());

        Ok(Self {
            store,
            db_pool,
            settings: Arc::new(settings),
            auth_service,
            access_service,
            lead_service,
            dashboard_service,
            session_service,
            billing_service,
            profile_service,
        })
    }
}

// Sem banco (ou banco fora do ar) cai para o modo local, a menos que REQUIRE_DATABASE exija o banco
async fn connect(settings: &Settings) -> anyhow::Result<Option<PgPool>> {
    let Some(database_url) = settings.database_url.as_deref() else {
        if settings.require_database {
            anyhow::bail!("REQUIRE_DATABASE está ativo mas DATABASE_URL não foi definida");
        }
        return Ok(None);
    };

    let connection = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await;

    match connection {
        Ok(pool) => {
            tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
            Ok(Some(pool))
        }
        Err(e) if settings.require_database => Err(e).context("Falha ao conectar ao banco de dados"),
        Err(e) => {
            tracing::error!("❌ Banco indisponível ({}); seguindo no modo local", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_indian_plan() {
        let s = settings(&[]).unwrap();

        assert!(s.database_url.is_none());
        assert!(!s.require_database);
        assert_eq!(s.subscription_model, SubscriptionModel::Expiring);
        assert_eq!(s.trial_days, 7);
        assert_eq!(s.business_offset_minutes, 330);
        assert_eq!(s.profile_fetch_retries, 3);
        assert_eq!(s.profile_fetch_backoff, Duration::from_millis(1000));
        assert_eq!(s.plan_amount_paise, 49900);
        assert_eq!(s.plan_period_days, 30);
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let s = settings(&[("DATABASE_URL", "  "), ("TRIAL_DAYS", "")]).unwrap();
        assert!(s.database_url.is_none());
        assert_eq!(s.trial_days, 7);
    }

    #[test]
    fn legacy_model_and_overrides_are_read() {
        let s = settings(&[
            ("SUBSCRIPTION_MODEL", "legacy"),
            ("REQUIRE_DATABASE", "true"),
            ("PLAN_PERIOD_DAYS", "365"),
        ])
        .unwrap();

        assert_eq!(s.subscription_model, SubscriptionModel::Legacy);
        assert!(s.require_database);
        assert_eq!(s.plan_period_days, 365);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = settings(&[("TRIAL_DAYS", "seven")]).unwrap_err();
        assert!(err.to_string().contains("TRIAL_DAYS"));
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let err = settings(&[("BUSINESS_UTC_OFFSET_MINUTES", "2147483647")]).unwrap_err();
        assert!(err.to_string().contains("BUSINESS_UTC_OFFSET_MINUTES"));

        let s = settings(&[("BUSINESS_UTC_OFFSET_MINUTES", "-300")]).unwrap();
        assert_eq!(s.business_offset().local_minus_utc(), -300 * 60);
    }

    #[tokio::test]
    async fn required_database_without_url_aborts_startup() {
        let s = settings(&[("REQUIRE_DATABASE", "true")]).unwrap();
        assert!(AppState::from_settings(s).await.is_err());
    }

    #[tokio::test]
    async fn missing_database_degrades_to_local_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.json");
        let s = settings(&[("LOCAL_DATA_PATH", path.to_str().unwrap())]).unwrap();

        let state = AppState::from_settings(s).await.unwrap();

        assert!(state.store.is_local());
        assert!(state.auth_service.is_none());
        assert!(state.db_pool.is_none());
    }
}
