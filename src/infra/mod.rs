//! Usage: Infrastructure adapters (settings persistence, HTTP client construction).

pub mod http_client;
pub mod settings;
