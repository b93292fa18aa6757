// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::router;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Session ---
        handlers::session::get_session,

        // --- Profile ---
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::setup_profile,
        handlers::profile::send_feedback,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_status,
        handlers::leads::delete_lead,
        handlers::leads::add_note,
        handlers::leads::schedule_follow_up,
        handlers::leads::complete_follow_up,
        handlers::leads::whatsapp_link,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Billing ---
        handlers::billing::checkout,
        handlers::billing::payment_success,
    ),
    components(
        schemas(
            // --- Auth ---
            models::account::RegisterUserPayload,
            models::account::LoginUserPayload,
            models::account::AuthResponse,
            crate::middleware::auth::AuthenticatedUser,

            // --- Perfil e assinatura ---
            models::account::Profile,
            models::account::Subscription,
            models::account::ProfilePayload,
            models::account::FeedbackPayload,

            // --- Leads ---
            models::lead::InterestType,
            models::lead::LeadStatus,
            models::lead::FollowUpType,
            models::lead::FollowUpOutcome,
            models::lead::FollowUpState,
            models::lead::Note,
            models::lead::FollowUp,
            models::lead::Lead,
            models::lead::LeadDetail,
            models::lead::CreateLeadPayload,
            models::lead::UpdateStatusPayload,
            models::lead::NotePayload,
            models::lead::SchedulePayload,
            models::lead::CompletePayload,
            models::lead::WhatsAppLink,
            crate::common::time::QuickPreset,

            // --- Dashboard ---
            models::dashboard::FocusItem,
            models::dashboard::DashboardSummary,
            services::access::TrialBanner,

            // --- Sessão e paywall ---
            router::view::View,
            router::view::AuthMode,
            router::view::Screen,
            router::view::PaywallPresentation,
            router::shell::RenderedShell,
            services::session_service::SessionSnapshot,
            crate::db::DataMode,

            // --- Billing ---
            services::billing_service::CheckoutOptions,
            services::billing_service::CheckoutPrefill,
            services::billing_service::CheckoutNotes,
            handlers::billing::PaymentSuccessPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Session", description = "Tela atual, paywall e banner do trial"),
        (name = "Profile", description = "Perfil do corretor e feedback"),
        (name = "Leads", description = "Cadastro e pipeline de leads"),
        (name = "Follow-ups", description = "Agendamento e conclusão de follow-ups"),
        (name = "Dashboard", description = "Foco do dia e valor do pipeline"),
        (name = "Billing", description = "Checkout e confirmação de pagamento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_lead_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/leads",
            "/api/leads/{id}",
            "/api/leads/{id}/follow-ups",
            "/api/leads/{id}/follow-ups/complete",
            "/api/dashboard",
            "/api/session",
            "/api/billing/payment-success",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltou {}", path);
        }
    }
}
