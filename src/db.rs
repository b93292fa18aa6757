pub mod account_repo;
pub mod lead_repo;
pub mod local_store;
pub mod store;
pub mod user_repo;

pub use account_repo::{AccountRepository, PgAccountRepository};
pub use lead_repo::{LeadRepository, PgLeadRepository};
pub use local_store::{LocalAccountStore, LocalLeadStore, LOCAL_USER_ID};
pub use store::{DataMode, DataStore};
pub use user_repo::UserRepository;
