//! Usage: Single entry point that runs exactly one login strategy per attempt.

use crate::auth::broker::{
    AuthRecord, BasicCredentials, BrokerClient, DelegatedTokenCredentials, HandshakeParams,
    HeaderSource,
};
use crate::auth::direct_login::{DirectLoginRequest, DirectSessionLoginClient, SessionCookie};
use crate::infra::settings::AuthSettings;
use crate::shared::error::AppResult;
use std::sync::Arc;

pub enum LoginStrategy {
    Basic(BasicCredentials),
    Delegated(DelegatedTokenCredentials),
    Stored(Arc<dyn HeaderSource>),
    Direct(DirectLoginRequest),
}

impl LoginStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::Delegated(_) => "delegated",
            Self::Stored(_) => "stored",
            Self::Direct(_) => "direct",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Broker-owned record from the basic, delegated or stored strategy.
    BrokerRecord(AuthRecord),
    /// Session cookies from the direct login, in response order.
    Cookies(Vec<SessionCookie>),
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    broker: BrokerClient,
    direct: DirectSessionLoginClient,
}

impl Authenticator {
    pub fn new(broker: BrokerClient, direct: DirectSessionLoginClient) -> Self {
        Self { broker, direct }
    }

    pub fn from_settings(settings: &AuthSettings) -> AppResult<Self> {
        Ok(Self::new(
            BrokerClient::from_settings(settings)?,
            DirectSessionLoginClient::from_settings(settings)?,
        ))
    }

    pub fn broker(&self) -> &BrokerClient {
        &self.broker
    }

    pub async fn login(&self, strategy: LoginStrategy) -> AppResult<LoginOutcome> {
        let label = strategy.label();
        let result = match strategy {
            LoginStrategy::Basic(creds) => self
                .broker
                .submit_basic_auth(&creds)
                .await
                .map(LoginOutcome::BrokerRecord),
            LoginStrategy::Delegated(creds) => self
                .broker
                .submit_delegated_auth(&creds)
                .await
                .map(LoginOutcome::BrokerRecord),
            LoginStrategy::Stored(headers) => self
                .broker
                .fetch_stored_credentials(headers.as_ref())
                .await
                .map(LoginOutcome::BrokerRecord),
            LoginStrategy::Direct(req) => {
                self.direct.login(&req).await.map(LoginOutcome::Cookies)
            }
        };

        match &result {
            Ok(_) => tracing::info!(strategy = label, "login attempt succeeded"),
            Err(err) => tracing::info!(strategy = label, code = err.code(), "login attempt failed"),
        }
        result
    }

    /// First half of the delegated flow; the caller drives browser consent afterwards.
    pub async fn begin_oauth(&self, base_url: &str) -> AppResult<HandshakeParams> {
        self.broker.initiate_oauth(base_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::broker::StaticHeaders;

    #[test]
    fn strategy_labels() {
        let basic = LoginStrategy::Basic(BasicCredentials::new("h", "u", "p"));
        let stored = LoginStrategy::Stored(Arc::new(StaticHeaders::default()));
        assert_eq!(basic.label(), "basic");
        assert_eq!(stored.label(), "stored");
    }

    #[test]
    fn builds_from_default_settings() {
        let auth = Authenticator::from_settings(&AuthSettings::default()).expect("authenticator");
        assert_eq!(auth.broker().api_url(), crate::infra::settings::DEFAULT_API_URL);
    }
}
