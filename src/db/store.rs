// src/db/store.rs

use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::{
        account_repo::{AccountRepository, PgAccountRepository},
        lead_repo::{LeadRepository, PgLeadRepository},
        local_store::{LocalAccountStore, LocalLeadStore},
        user_repo::UserRepository,
    },
};

/// Escolhido uma vez na inicialização; nunca muda com o processo rodando.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    Remote,
    Local,
}

// O conjunto de adaptadores que o resto da aplicação enxerga
#[derive(Clone)]
pub struct DataStore {
    pub mode: DataMode,
    pub leads: Arc<dyn LeadRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    // Só existe no modo remoto
    pub users: Option<UserRepository>,
}

impl DataStore {
    pub fn remote(pool: PgPool) -> Self {
        Self {
            mode: DataMode::Remote,
            leads: Arc::new(PgLeadRepository::new(pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(pool.clone())),
            users: Some(UserRepository::new(pool)),
        }
    }

    pub async fn local(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        Ok(Self {
            mode: DataMode::Local,
            leads: Arc::new(LocalLeadStore::open(path).await?),
            accounts: Arc::new(LocalAccountStore::new()),
            users: None,
        })
    }

    pub fn is_local(&self) -> bool {
        self.mode == DataMode::Local
    }
}
