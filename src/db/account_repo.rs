// src/db/account_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        account::{Profile, Subscription},
        wire::{ProfileRow, SubscriptionRow},
    },
};

/// Perfil, assinatura e feedback do usuário.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Só a linha de `profiles`; a assinatura vem de `find_subscription`.
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn find_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError>;

    /// Cria o perfil se não existir, senão sobrescreve nome e telefone.
    async fn upsert_profile(&self, user_id: Uuid, full_name: &str, phone: &str) -> Result<Profile, AppError>;

    async fn upsert_subscription(&self, user_id: Uuid, paid_until: DateTime<Utc>) -> Result<Subscription, AppError>;

    async fn insert_feedback(&self, user_id: Uuid, message: &str) -> Result<(), AppError>;
}

const SUBSCRIPTION_COLUMNS: &str = "user_id, is_active, paid_until, updated_at";

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, full_name, phone, created_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_profile(None)))
    }

    async fn find_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn upsert_profile(&self, user_id: Uuid, full_name: &str, phone: &str) -> Result<Profile, AppError> {
        // `created_at` só é definido na criação; o trial não reinicia.
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, full_name, phone)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
                SET full_name = EXCLUDED.full_name, phone = EXCLUDED.phone
            RETURNING id, full_name, phone, created_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_profile(None))
    }

    async fn upsert_subscription(&self, user_id: Uuid, paid_until: DateTime<Utc>) -> Result<Subscription, AppError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (user_id, is_active, paid_until, updated_at)
            VALUES ($1, true, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE
                SET is_active = true, paid_until = EXCLUDED.paid_until, updated_at = NOW()
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(paid_until)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn insert_feedback(&self, user_id: Uuid, message: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO feedback (user_id, message) VALUES ($1, $2)")
            .bind(user_id)
            .bind(message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
