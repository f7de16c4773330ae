//! Usage: reqwest client construction for the backend broker and the target server.

use crate::infra::settings::AuthSettings;
use crate::shared::error::AppResult;
use std::time::Duration;

/// Client for broker calls (JSON in, JSON out).
pub fn broker_client(settings: &AuthSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent())
        .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds.into()))
        .timeout(Duration::from_secs(
            settings.broker_request_timeout_seconds.into(),
        ))
        .build()
        .map_err(|e| format!("SYSTEM_ERROR: broker client init failed: {e}").into())
}

/// Client for the direct login. Redirects are not followed: the login response's own
/// `Set-Cookie` and login-reason headers are the result.
pub fn direct_login_client(settings: &AuthSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent())
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds.into()))
        .timeout(Duration::from_secs(
            settings.direct_login_timeout_seconds.into(),
        ))
        .build()
        .map_err(|e| format!("SYSTEM_ERROR: direct login client init failed: {e}").into())
}

/// Client for calls made with an established session (cookies are sent explicitly).
pub fn session_client(settings: &AuthSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent())
        .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds.into()))
        .timeout(Duration::from_secs(
            settings.broker_request_timeout_seconds.into(),
        ))
        .build()
        .map_err(|e| format!("SYSTEM_ERROR: session client init failed: {e}").into())
}
