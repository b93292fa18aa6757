pub mod access;
pub mod auth;
pub mod billing_service;
pub mod dashboard_service;
pub mod lead_service;
pub mod lifecycle;
pub mod profile_service;
pub mod session_service;

pub use access::{AccessPolicy, AccessService, SubscriptionModel};
pub use auth::AuthService;
pub use billing_service::{BillingService, PlanSettings};
pub use dashboard_service::DashboardService;
pub use lead_service::LeadService;
pub use profile_service::ProfileService;
pub use session_service::{RetryPolicy, SessionService};
