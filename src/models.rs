pub mod account;
pub mod dashboard;
pub mod lead;
pub mod wire;
