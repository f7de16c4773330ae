//! Usage: Direct login against the target server's gadget login endpoint, harvesting the
//! session cookies from the raw response headers.
//!
//! Success needs both a login-reason marker containing `OK` and at least one usable
//! `Set-Cookie` entry; HTTP status is ignored. A single request/response, no retries.

use crate::auth::error_code::{invalid_credentials, AuthErrorCode};
use crate::auth::net_error::classify_reqwest_error;
use crate::infra::{http_client, settings::AuthSettings};
use crate::shared::error::AppResult;
use crate::shared::security::{cookie_names, mask_token};
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const LOGIN_PATH: &str = "/jira/rest/gadget/1.0/login";
/// `X-Seraph-LoginReason`; header names are stored lowercase.
pub const LOGIN_REASON_HEADER: &str = "x-seraph-loginreason";
pub const LOGIN_OK_MARKER: &str = "OK";
/// Far-future expiry stamped on every harvested cookie.
pub const SESSION_COOKIE_EXPIRES: &str = "Fri, 31 Dec 9999 23:59:59 GMT";
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectLoginRequest {
    pub pathname: String,
    pub protocol: String,
    pub username: String,
    pub password: String,
    pub base_url: String,
}

#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    os_username: &'a str,
    os_password: &'a str,
    os_cookie: bool,
}

/// Maps one `Set-Cookie` value. Attributes after the first `;` are dropped; path and
/// http-only come from the login target, not from the cookie.
pub fn parse_set_cookie(raw: &str, pathname: &str, protocol: &str) -> Option<SessionCookie> {
    let (name, rest) = raw.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    let value = rest.split(';').next().unwrap_or_default();
    Some(SessionCookie {
        name: name.to_string(),
        value: value.to_string(),
        path: pathname.to_string(),
        http_only: protocol == "http",
        expires: SESSION_COOKIE_EXPIRES.to_string(),
    })
}

fn login_reason_ok(headers: &HeaderMap) -> bool {
    headers
        .get_all(LOGIN_REASON_HEADER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(LOGIN_OK_MARKER))
}

/// Decides the login outcome from response headers alone.
pub fn evaluate_login_response(
    headers: &HeaderMap,
    pathname: &str,
    protocol: &str,
) -> AppResult<Vec<SessionCookie>> {
    if !login_reason_ok(headers) {
        let reason = headers
            .get(LOGIN_REASON_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<missing>");
        tracing::info!(reason = %reason, "direct login rejected");
        return Err(invalid_credentials());
    }

    let mut cookies = Vec::new();
    for raw in headers.get_all(SET_COOKIE) {
        let Ok(raw) = raw.to_str() else {
            tracing::warn!("skipping non-utf8 set-cookie header");
            continue;
        };
        match parse_set_cookie(raw, pathname, protocol) {
            Some(cookie) => cookies.push(cookie),
            None => tracing::warn!("skipping malformed set-cookie header"),
        }
    }

    if cookies.is_empty() {
        tracing::warn!("direct login marked OK but returned no session cookies");
        return Err(invalid_credentials());
    }
    Ok(cookies)
}

#[derive(Debug, Clone)]
pub struct DirectSessionLoginClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl DirectSessionLoginClient {
    /// `client` must not follow redirects; see `http_client::direct_login_client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_settings(settings: &AuthSettings) -> AppResult<Self> {
        Ok(Self::new(http_client::direct_login_client(settings)?).with_timeout(
            Duration::from_secs(settings.direct_login_timeout_seconds.into()),
        ))
    }

    pub async fn login(&self, req: &DirectLoginRequest) -> AppResult<Vec<SessionCookie>> {
        let base_url = req.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(AuthErrorCode::InvalidInput.error("base url is required"));
        }
        let url = format!("{base_url}{LOGIN_PATH}");
        let form = LoginForm {
            os_username: &req.username,
            os_password: &req.password,
            os_cookie: true,
        };

        tracing::info!(
            url = %url,
            username = %mask_token(&req.username),
            "direct login request"
        );

        // `form` sets the urlencoded content type; the body is sent with an exact length.
        let response = self
            .client
            .post(&url)
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let code = classify_reqwest_error(&e);
                tracing::warn!(
                    error = %e,
                    code = code.as_str(),
                    "direct login transport failure"
                );
                code.to_error()
            })?;

        let status = response.status().as_u16();
        let cookies = evaluate_login_response(response.headers(), &req.pathname, &req.protocol)?;
        tracing::info!(
            status,
            cookies = %cookie_names(cookies.iter().map(|c| c.name.as_str())),
            "direct login succeeded"
        );
        Ok(cookies)
    }
}
