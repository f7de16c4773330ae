//! Usage: Backend broker calls (credential submission, stored-credential lookup, OAuth
//! handshake parameters, plan eligibility).
//!
//! Every call funnels through the same status policy: `<= 400` parses the JSON body and
//! hands it back untouched, `> 400` fails with a fixed, user-safe message. Broker error
//! bodies are never surfaced.

use crate::auth::error_code::{authentication_failed, automatic_login_failed, AuthErrorCode};
use crate::auth::net_error::transport_error;
use crate::infra::{http_client, settings::AuthSettings};
use crate::shared::error::{AppError, AppResult};
use crate::shared::security::mask_token;
use base64::Engine as _;
use reqwest::header::HeaderMap;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

const AUTHENTICATE_PATH: &str = "/desktop-tracker/authenticate";
const OAUTH_DATA_PATH: &str = "/desktop-tracker/getDataForOAuth";
const CHECK_USER_PLAN_PATH: &str = "/desktop-tracker/check-user-plan";
const MAX_SUCCESS_STATUS: u16 = 400;

/// Broker-owned authentication record; this layer does not interpret it.
pub type AuthRecord = Value;

/// Request token / authorization URL payload for the browser consent step.
pub type HandshakeParams = Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: String,
    pub protocol: String,
    pub path_prefix: String,
}

impl BasicCredentials {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            port: String::new(),
            protocol: "https".to_string(),
            path_prefix: "/".to_string(),
        }
    }

    /// base64(`username:password`), sent to the broker only.
    pub fn basic_token(&self) -> String {
        base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedTokenCredentials {
    pub base_url: String,
    pub token: String,
    pub token_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AuthRequestPayload {
    #[serde(rename = "basic_auth", rename_all = "camelCase")]
    BasicAuth {
        base_url: String,
        host: String,
        port: String,
        protocol: String,
        path_prefix: String,
        basic_token: String,
    },
    #[serde(rename = "OAuth")]
    OAuth {
        #[serde(rename = "baseUrl")]
        base_url: String,
        token: String,
        token_secret: String,
    },
}

impl From<&BasicCredentials> for AuthRequestPayload {
    fn from(creds: &BasicCredentials) -> Self {
        Self::BasicAuth {
            base_url: creds.host.clone(),
            host: creds.host.clone(),
            port: creds.port.clone(),
            protocol: creds.protocol.clone(),
            path_prefix: creds.path_prefix.clone(),
            basic_token: creds.basic_token(),
        }
    }
}

impl From<&DelegatedTokenCredentials> for AuthRequestPayload {
    fn from(creds: &DelegatedTokenCredentials) -> Self {
        Self::OAuth {
            base_url: creds.base_url.clone(),
            token: creds.token.clone(),
            token_secret: creds.token_secret.clone(),
        }
    }
}

/// Supplies the identity headers for the stored-credential lookup.
pub trait HeaderSource: Send + Sync {
    fn headers(&self) -> Pin<Box<dyn Future<Output = AppResult<HeaderMap>> + Send + '_>>;
}

/// Fixed header set, resolved immediately.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders(pub HeaderMap);

impl HeaderSource for StaticHeaders {
    fn headers(&self) -> Pin<Box<dyn Future<Output = AppResult<HeaderMap>> + Send + '_>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

#[derive(Debug, Clone)]
pub struct BrokerClient {
    client: reqwest::Client,
    api_url: String,
}

impl BrokerClient {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn from_settings(settings: &AuthSettings) -> AppResult<Self> {
        Ok(Self::new(
            http_client::broker_client(settings)?,
            settings.api_url.clone(),
        ))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    pub async fn submit_basic_auth(&self, creds: &BasicCredentials) -> AppResult<AuthRecord> {
        tracing::info!(
            host = %creds.host,
            username = %mask_token(&creds.username),
            "broker basic auth submit"
        );
        self.post_authenticate(&AuthRequestPayload::from(creds), authentication_failed)
            .await
    }

    pub async fn submit_delegated_auth(
        &self,
        creds: &DelegatedTokenCredentials,
    ) -> AppResult<AuthRecord> {
        tracing::info!(
            base_url = %creds.base_url,
            token = %mask_token(&creds.token),
            "broker oauth submit"
        );
        self.post_authenticate(&AuthRequestPayload::from(creds), authentication_failed)
            .await
    }

    async fn post_authenticate(
        &self,
        payload: &AuthRequestPayload,
        rejected: fn() -> AppError,
    ) -> AppResult<AuthRecord> {
        let response = self
            .client
            .post(self.endpoint(AUTHENTICATE_PATH))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "broker authenticate request failed");
                transport_error(&e)
            })?;
        read_broker_json(response, rejected).await
    }

    /// Asks the broker for credentials established in an earlier session.
    pub async fn fetch_stored_credentials(
        &self,
        header_source: &dyn HeaderSource,
    ) -> AppResult<AuthRecord> {
        let headers = header_source.headers().await?;
        tracing::debug!(header_count = headers.len(), "broker stored credential lookup");
        let response = self
            .client
            .get(self.endpoint(AUTHENTICATE_PATH))
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "broker stored credential request failed");
                transport_error(&e)
            })?;
        read_broker_json(response, automatic_login_failed).await
    }

    pub async fn initiate_oauth(&self, base_url: &str) -> AppResult<HandshakeParams> {
        let mut url = Url::parse(&self.endpoint(OAUTH_DATA_PATH))
            .map_err(|e| format!("SYSTEM_ERROR: invalid broker api url: {e}"))?;
        url.query_pairs_mut().append_pair("baseUrl", base_url);
        tracing::info!(base_url = %base_url, "broker oauth handshake request");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "broker oauth handshake request failed");
                transport_error(&e)
            })?;

        let status = response.status().as_u16();
        if status > MAX_SUCCESS_STATUS {
            tracing::warn!(status, "broker oauth handshake rejected");
            return Err(AuthErrorCode::Unknown.error(format!(
                "Unknown error (/getDataForOAuth returned {status})"
            )));
        }
        parse_json_body(response).await
    }

    /// Plan eligibility for a target host. Only a 200 with `success: true` is eligible.
    pub async fn check_user_plan(&self, host: &str) -> AppResult<bool> {
        let response = self
            .client
            .post(self.endpoint(CHECK_USER_PLAN_PATH))
            .json(&serde_json::json!({ "baseUrl": host }))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!(status = response.status().as_u16(), "user plan check not ok");
            return Ok(false);
        }
        let body = parse_json_body(response).await?;
        Ok(body.get("success").and_then(Value::as_bool).unwrap_or(false))
    }
}

async fn read_broker_json(
    response: reqwest::Response,
    rejected: fn() -> AppError,
) -> AppResult<Value> {
    let status = response.status().as_u16();
    if status > MAX_SUCCESS_STATUS {
        tracing::warn!(status, "broker rejected authentication");
        return Err(rejected());
    }
    parse_json_body(response).await
}

async fn parse_json_body(response: reqwest::Response) -> AppResult<Value> {
    let body = response.text().await.map_err(|e| transport_error(&e))?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(error = %e, "broker response json invalid");
        AuthErrorCode::Unknown.error("Unknown error (invalid response body)")
    })
}
