pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod leads;
pub mod profile;
pub mod session;
