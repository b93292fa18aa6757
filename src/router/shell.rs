// src/router/shell.rs

//! Estado explícito da aplicação e o redutor que o altera.
//! Nenhum campo muda fora de `AppShell::apply`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{account::Profile, lead::Lead},
    router::view::{AuthMode, PaywallPresentation, Screen, View},
    services::access::AccessPolicy,
};

/// Resultado da busca inicial do perfil.
#[derive(Debug, Clone)]
pub enum ProfileResolution {
    Complete(Profile),
    // Perfil sem nome ou telefone (ou ausente depois das tentativas)
    Incomplete(Profile),
    // Erro de busca engolido; segue com o estado anterior
    Failed,
}

#[derive(Debug, Clone)]
pub enum ShellAction {
    ShowAuth(AuthMode),
    BackToLanding,
    SessionStarted(Uuid),
    SessionEnded,
    ProfileResolved(ProfileResolution),
    LeadsLoaded(Vec<Lead>),
    LoadFailed,
    Navigate(View),
    OpenLead(Uuid),
    LeadAdded(Lead),
    LeadUpdated(Lead),
    LeadRemoved(Uuid),
    ProfileUpdated(Profile),
}

#[derive(Debug, Clone)]
pub struct AppShell {
    local_mode: bool,
    loading: bool,
    show_landing: bool,
    auth_mode: AuthMode,
    session: Option<Uuid>,
    profile: Option<Profile>,
    leads: Vec<Lead>,
    current_view: View,
    selected_lead_id: Option<Uuid>,
}

// Saída do `render`, serializada direto na resposta de /api/session
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedShell {
    #[serde(flatten)]
    pub screen: Screen,
    pub paywall: Option<PaywallPresentation>,
    pub has_access: bool,
    pub local_mode: bool,
}

impl AppShell {
    /// Modo remoto: começa carregando a sessão, atrás da landing page.
    pub fn remote() -> Self {
        Self {
            local_mode: false,
            loading: true,
            show_landing: true,
            auth_mode: AuthMode::Signup,
            session: None,
            profile: None,
            leads: Vec::new(),
            current_view: View::Dashboard,
            selected_lead_id: None,
        }
    }

    /// Modo local: não há login, o dono é fixo e os leads já estão em memória.
    pub fn local(owner: Uuid, leads: Vec<Lead>) -> Self {
        Self {
            local_mode: true,
            loading: false,
            show_landing: false,
            session: Some(owner),
            leads,
            ..Self::remote()
        }
    }

    pub fn apply(&mut self, action: ShellAction) {
        match action {
            ShellAction::ShowAuth(mode) => {
                self.auth_mode = mode;
                self.show_landing = false;
            }
            ShellAction::BackToLanding => self.show_landing = true,
            ShellAction::SessionStarted(user_id) => {
                self.session = Some(user_id);
                self.show_landing = false;
                self.loading = true;
            }
            ShellAction::SessionEnded => {
                self.session = None;
                self.profile = None;
                self.leads.clear();
                self.selected_lead_id = None;
                self.loading = false;
            }
            ShellAction::ProfileResolved(ProfileResolution::Complete(profile)) => {
                // Continua carregando até os leads chegarem
                self.profile = Some(profile);
            }
            ShellAction::ProfileResolved(ProfileResolution::Incomplete(profile)) => {
                self.profile = Some(profile);
                self.current_view = View::ProfileSetup;
                self.loading = false;
            }
            ShellAction::ProfileResolved(ProfileResolution::Failed) | ShellAction::LoadFailed => {
                self.loading = false;
            }
            ShellAction::LeadsLoaded(leads) => {
                self.leads = leads;
                if self.current_view == View::ProfileSetup {
                    self.current_view = View::Dashboard;
                }
                self.loading = false;
            }
            ShellAction::Navigate(view) => self.navigate(view),
            ShellAction::OpenLead(lead_id) => {
                self.selected_lead_id = Some(lead_id);
                self.navigate(View::LeadDetail);
            }
            ShellAction::LeadAdded(lead) => {
                self.selected_lead_id = Some(lead.id);
                self.leads.insert(0, lead);
                self.navigate(View::LeadDetail);
            }
            ShellAction::LeadUpdated(lead) => {
                if let Some(slot) = self.leads.iter_mut().find(|l| l.id == lead.id) {
                    *slot = lead;
                }
            }
            ShellAction::LeadRemoved(lead_id) => {
                self.leads.retain(|l| l.id != lead_id);
                if self.selected_lead_id == Some(lead_id) {
                    self.selected_lead_id = None;
                }
                self.navigate(View::Leads);
            }
            ShellAction::ProfileUpdated(profile) => self.profile = Some(profile),
        }
    }

    // Perfil incompleto prende o usuário no profile-setup
    fn navigate(&mut self, view: View) {
        self.current_view = if self.needs_profile_setup() {
            View::ProfileSetup
        } else {
            view
        };
    }

    pub fn needs_profile_setup(&self) -> bool {
        !self.local_mode && self.profile.as_ref().is_some_and(|p| !p.is_complete())
    }

    pub fn render(&self, policy: &AccessPolicy, now: DateTime<Utc>) -> RenderedShell {
        let has_access = self.local_mode || policy.has_access(self.profile.as_ref(), now);

        let screen = if self.loading {
            Screen::Loading
        } else if self.show_landing {
            Screen::Landing
        } else if self.session.is_none() {
            Screen::Auth { mode: self.auth_mode }
        } else {
            Screen::App {
                view: self.current_view,
                selected_lead_id: self.selected_lead_id,
            }
        };

        let paywall = match &screen {
            Screen::App { view, .. } if !has_access && !view.bypasses_hard_lock() => {
                Some(PaywallPresentation::hard_lock())
            }
            _ => None,
        };

        RenderedShell {
            screen,
            paywall,
            has_access,
            local_mode: self.local_mode,
        }
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn selected_lead(&self) -> Option<&Lead> {
        let id = self.selected_lead_id?;
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
