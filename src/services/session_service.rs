// src/services/session_service.rs

//! Carga inicial da sessão: perfil (com novas tentativas), assinatura e leads,
//! aplicados ao `AppShell` pelas mesmas ações que a navegação usa.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DataStore,
    models::{account::Profile, lead::LeadDetail},
    router::{
        shell::{AppShell, ProfileResolution, RenderedShell, ShellAction},
        store::ShellStore,
        view::View,
    },
    services::{
        access::{AccessService, TrialBanner},
        lead_service::LeadService,
        lifecycle,
    },
};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NavigationQuery {
    pub view: Option<View>,
    pub lead_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub shell: RenderedShell,
    pub profile: Option<Profile>,
    pub banner: TrialBanner,
    pub lead_count: usize,
    // Só quando a tela é o detalhe de um lead existente
    pub selected_lead: Option<LeadDetail>,
}

#[derive(Clone)]
pub struct SessionService {
    store: DataStore,
    leads: LeadService,
    access: AccessService,
    retry: RetryPolicy,
    tz: FixedOffset,
}

impl SessionService {
    pub fn new(
        store: DataStore,
        leads: LeadService,
        access: AccessService,
        retry: RetryPolicy,
        tz: FixedOffset,
    ) -> Self {
        Self {
            store,
            leads,
            access,
            retry,
            tz,
        }
    }

    /// Nunca falha: erros de leitura são logados e a sessão segue com o que tiver.
    pub async fn bootstrap(&self, user_id: Uuid) -> ShellStore {
        if self.store.is_local() {
            return self.bootstrap_local(user_id).await;
        }

        let store = ShellStore::new(AppShell::remote());
        trace_transitions(&store, user_id);
        store.dispatch(ShellAction::SessionStarted(user_id));

        let resolution = self.resolve_profile(user_id).await;
        let complete = matches!(resolution, ProfileResolution::Complete(_));
        store.dispatch(ShellAction::ProfileResolved(resolution));

        if complete {
            match self.leads.fetch_all(user_id).await {
                Ok(leads) => store.dispatch(ShellAction::LeadsLoaded(leads)),
                Err(e) => {
                    tracing::error!("Falha ao sincronizar leads de {}: {}", user_id, e);
                    store.dispatch(ShellAction::LoadFailed);
                }
            }
        }
        store
    }

    async fn bootstrap_local(&self, user_id: Uuid) -> ShellStore {
        let leads = self.leads.fetch_all(user_id).await.unwrap_or_else(|e| {
            tracing::error!("Falha ao ler o armazenamento local: {}", e);
            Vec::new()
        });
        let store = ShellStore::new(AppShell::local(user_id, leads));
        trace_transitions(&store, user_id);
        if let Ok(Some(profile)) = self.access.account(user_id).await {
            store.dispatch(ShellAction::ProfileUpdated(profile));
        }
        store
    }

    /// A linha de `profiles` pode demorar a aparecer logo depois do cadastro.
    /// Depois de esgotar as tentativas o usuário vai para o profile-setup.
    pub async fn resolve_profile(&self, user_id: Uuid) -> ProfileResolution {
        let mut attempt = 0;
        loop {
            match self.access.account(user_id).await {
                Ok(Some(profile)) if profile.is_complete() => return ProfileResolution::Complete(profile),
                Ok(Some(profile)) => return ProfileResolution::Incomplete(profile),
                Ok(None) if attempt < self.retry.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Perfil de {} ainda não visível, tentativa {}/{}",
                        user_id,
                        attempt,
                        self.retry.retries
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Ok(None) => {
                    tracing::info!("Perfil de {} não encontrado; seguindo para o profile-setup", user_id);
                    let subscription = self
                        .store
                        .accounts
                        .find_subscription(user_id)
                        .await
                        .unwrap_or_else(|e| {
                            tracing::warn!("Falha ao ler assinatura de {}: {}", user_id, e);
                            None
                        });
                    return ProfileResolution::Incomplete(Profile {
                        id: user_id,
                        full_name: String::new(),
                        phone: String::new(),
                        created_at: None,
                        subscription,
                    });
                }
                Err(e) => {
                    tracing::error!("Falha ao sincronizar perfil de {}: {}", user_id, e);
                    return ProfileResolution::Failed;
                }
            }
        }
    }

    /// Carga + navegação pedida + renderização, como o cliente vê.
    pub async fn snapshot(
        &self,
        user_id: Uuid,
        navigation: &NavigationQuery,
        now: DateTime<Utc>,
    ) -> Result<SessionSnapshot, AppError> {
        let store = self.bootstrap(user_id).await;

        match (navigation.lead_id, navigation.view) {
            (Some(lead_id), _) => store.dispatch(ShellAction::OpenLead(lead_id)),
            (None, Some(view)) => store.dispatch(ShellAction::Navigate(view)),
            (None, None) => {}
        }

        let shell = store.snapshot();
        let rendered = shell.render(self.access.policy(), now);
        let selected_lead = match shell.current_view() {
            View::LeadDetail => shell
                .selected_lead()
                .cloned()
                .map(|lead| lifecycle::detail(lead, now, &self.tz)),
            _ => None,
        };
        let banner = if self.store.is_local() {
            self.access.banner(user_id, now).await?
        } else {
            self.access.policy().banner(shell.profile(), now)
        };

        Ok(SessionSnapshot {
            shell: rendered,
            profile: shell.profile().cloned(),
            banner,
            lead_count: shell.leads().len(),
            selected_lead,
        })
    }
}

// Observa o shell enquanto o store existir; termina quando ele é descartado
fn trace_transitions(store: &ShellStore, user_id: Uuid) {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let shell = rx.borrow_and_update();
            tracing::debug!(%user_id, view = ?shell.current_view(), loading = shell.is_loading(), "shell");
        }
    });
}
