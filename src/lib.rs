//! Chronos desktop tracker authentication.
//!
//! Establishes a session against a Jira-style target server through one of four
//! strategies (broker basic auth, broker OAuth, broker-stored credentials, direct
//! cookie login) and normalizes failures into `shared::error::AppError` codes.

pub mod app;
pub mod auth;
pub mod infra;
pub mod shared;

pub use auth::authenticator::{Authenticator, LoginOutcome, LoginStrategy};
pub use auth::broker::{
    AuthRecord, BasicCredentials, BrokerClient, DelegatedTokenCredentials, HandshakeParams,
    HeaderSource, StaticHeaders,
};
pub use auth::direct_login::{DirectLoginRequest, DirectSessionLoginClient, SessionCookie};
pub use auth::error_code::AuthErrorCode;
pub use auth::net_error::{classify, NetErrorCode};
pub use auth::session::{
    authorize_session, PermissionQuery, SessionConfigurator, SessionContext, TargetApiClient,
};
pub use infra::settings::AuthSettings;
pub use shared::error::{AppError, AppResult};
