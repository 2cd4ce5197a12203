pub mod config;
pub mod credentials;
pub mod error;
pub mod frontend;
pub mod models;
pub mod openapi;
pub mod policy;
pub mod routes;
pub mod security;
pub mod service;
pub mod store;

// Re-export commonly used items for tests / external users
pub use config::ServerConfig;
pub use routes::{config, AppState};
pub use security::SecurityHeaders;
pub use service::{AccountError, AccountService};
