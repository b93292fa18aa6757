// src/router/view.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Telas dentro da aplicação autenticada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Dashboard,
    Leads,
    LeadDetail,
    AddLead,
    ProfileSetup,
    Profile,
    Feedback,
}

impl View {
    /// Telas que continuam acessíveis com o trial vencido.
    pub fn bypasses_hard_lock(&self) -> bool {
        matches!(self, View::Profile | View::Feedback | View::ProfileSetup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    #[default]
    Signup,
}

/// O que o cliente deve desenhar.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    Loading,
    Landing,
    Auth {
        mode: AuthMode,
    },
    #[serde(rename_all = "camelCase")]
    App {
        view: View,
        selected_lead_id: Option<Uuid>,
    },
}

/// Overlay de cobrança. `hard_lock` não tem botão de fechar.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaywallPresentation {
    pub hard_lock: bool,
    pub dismissible: bool,
    pub title: String,
    pub message: String,
}

impl PaywallPresentation {
    pub fn hard_lock() -> Self {
        Self {
            hard_lock: true,
            dismissible: false,
            title: "Trial Ended.".into(),
            message: Self::MESSAGE.into(),
        }
    }

    pub fn dismissible() -> Self {
        Self {
            hard_lock: false,
            dismissible: true,
            title: "Unlock Pro.".into(),
            message: Self::MESSAGE.into(),
        }
    }

    const MESSAGE: &'static str = "Your free trial has concluded. Upgrade to SoloAgent Pro to continue \
                                   managing your pipeline and follow-ups.";
}
