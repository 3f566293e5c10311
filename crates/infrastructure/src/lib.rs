//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_email_service;
mod http_anvil_access_client;
mod in_memory_access_store;
mod postgres_access_store;
mod smtp_email_service;

pub use console_email_service::ConsoleEmailService;
pub use http_anvil_access_client::{AnvilApiEndpoints, HttpAnvilAccessClient};
pub use in_memory_access_store::InMemoryAccessStore;
pub use postgres_access_store::PostgresAccessStore;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
