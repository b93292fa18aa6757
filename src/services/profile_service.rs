// src/services/profile_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::DataStore,
    models::account::{FeedbackPayload, Profile, ProfilePayload},
    services::access::AccessService,
};

#[derive(Clone)]
pub struct ProfileService {
    store: DataStore,
    access: AccessService,
}

impl ProfileService {
    pub fn new(store: DataStore, access: AccessService) -> Self {
        Self { store, access }
    }

    /// Sem linha em `profiles` devolve um perfil vazio (que força o profile-setup).
    pub async fn get(&self, user_id: Uuid) -> Result<Profile, AppError> {
        match self.access.account(user_id).await? {
            Some(profile) => Ok(profile),
            None => Ok(Profile {
                id: user_id,
                full_name: String::new(),
                phone: String::new(),
                created_at: None,
                subscription: self.store.accounts.find_subscription(user_id).await?,
            }),
        }
    }

    pub async fn setup(&self, user_id: Uuid, payload: ProfilePayload) -> Result<Profile, AppError> {
        payload.validate()?;
        let profile = self
            .store
            .accounts
            .upsert_profile(user_id, payload.full_name.trim(), payload.phone.trim())
            .await?;
        tracing::info!("Perfil de {} configurado", user_id);
        self.with_subscription(profile).await
    }

    /// Edição a partir da tela de perfil. Exige que o perfil já exista.
    pub async fn update(&self, user_id: Uuid, payload: ProfilePayload) -> Result<Profile, AppError> {
        payload.validate()?;
        if self.store.accounts.find_profile(user_id).await?.is_none() {
            return Err(AppError::ProfileIncomplete);
        }
        let profile = self
            .store
            .accounts
            .upsert_profile(user_id, payload.full_name.trim(), payload.phone.trim())
            .await?;
        self.with_subscription(profile).await
    }

    pub async fn send_feedback(&self, user_id: Uuid, payload: FeedbackPayload) -> Result<(), AppError> {
        payload.validate()?;
        if self.store.is_local() {
            return Err(AppError::UnavailableInLocalMode);
        }
        self.store.accounts.insert_feedback(user_id, payload.message.trim()).await?;
        tracing::info!("Feedback recebido de {}", user_id);
        Ok(())
    }

    async fn with_subscription(&self, profile: Profile) -> Result<Profile, AppError> {
        let subscription = self.store.accounts.find_subscription(profile.id).await?;
        Ok(Profile { subscription, ..profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::LOCAL_USER_ID,
        services::access::{AccessPolicy, SubscriptionModel},
    };

    async fn service(dir: &tempfile::TempDir) -> ProfileService {
        let store = DataStore::local(dir.path().join("crm.json")).await.unwrap();
        let access = AccessService::new(store.clone(), AccessPolicy::new(SubscriptionModel::Expiring, 7));
        ProfileService::new(store, access)
    }

    fn payload(full_name: &str, phone: &str) -> ProfilePayload {
        ProfilePayload {
            full_name: full_name.into(),
            phone: phone.into(),
        }
    }

    #[tokio::test]
    async fn missing_profile_reads_as_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let profile = service(&dir).await.get(LOCAL_USER_ID).await.unwrap();
        assert!(!profile.is_complete());
    }

    #[tokio::test]
    async fn setup_requires_name_and_phone() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir).await;

        assert!(matches!(
            service.setup(LOCAL_USER_ID, payload("Asha", "")).await,
            Err(AppError::ValidationError(_))
        ));

        assert!(matches!(
            service.setup(LOCAL_USER_ID, payload("   ", "98200")).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(!service.get(LOCAL_USER_ID).await.unwrap().is_complete());

        let profile = service.setup(LOCAL_USER_ID, payload(" Asha ", "98200")).await.unwrap();
        assert_eq!(profile.full_name, "Asha");
        assert!(profile.is_complete());
    }

    #[tokio::test]
    async fn blank_feedback_is_rejected_before_sending() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir).await;
        let blank = FeedbackPayload { message: "  \n ".into() };

        assert!(matches!(
            service.send_feedback(LOCAL_USER_ID, blank).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_trial_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir).await;
        assert!(matches!(
            service.update(LOCAL_USER_ID, payload("Asha", "98")).await,
            Err(AppError::ProfileIncomplete)
        ));

        let created = service.setup(LOCAL_USER_ID, payload("Asha", "98")).await.unwrap();
        let updated = service.update(LOCAL_USER_ID, payload("Asha Rao", "99")).await.unwrap();

        assert_eq!(updated.full_name, "Asha Rao");
        assert_eq!(updated.created_at, created.created_at);
    }
}
