//! Usage: Immutable session context handed to the downstream API client, plus the
//! minimal target-server calls that verify a session (`myself`, `mypermissions`).

use crate::auth::direct_login::SessionCookie;
use crate::auth::error_code::{authentication_failed, AuthErrorCode};
use crate::auth::net_error::transport_error;
use crate::infra::{http_client, settings::AuthSettings};
use crate::shared::error::AppResult;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

const MYSELF_PATH: &str = "/rest/api/2/myself";
const MY_PERMISSIONS_PATH: &str = "/rest/api/2/mypermissions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub pathname: String,
    pub cookies: Vec<SessionCookie>,
}

impl SessionContext {
    pub fn from_base_url(base_url: &str, cookies: Vec<SessionCookie>) -> AppResult<Self> {
        let url = Url::parse(base_url.trim())
            .map_err(|e| format!("SEC_INVALID_INPUT: invalid base url: {e}"))?;
        let hostname = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| "SEC_INVALID_INPUT: base url has no host".to_string())?
            .to_string();
        let pathname = match url.path().trim_end_matches('/') {
            "" => "/".to_string(),
            path => path.to_string(),
        };
        Ok(Self {
            protocol: url.scheme().to_string(),
            hostname,
            port: url.port(),
            pathname,
            cookies,
        })
    }

    pub fn origin(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{port}", self.protocol, self.hostname),
            None => format!("{}://{}", self.protocol, self.hostname),
        }
    }

    /// `rest_path` is joined under the context pathname.
    pub fn api_url(&self, rest_path: &str) -> String {
        let prefix = self.pathname.trim_end_matches('/');
        format!("{}{prefix}{rest_path}", self.origin())
    }

    /// `Cookie` request header value; `None` when no cookies were harvested.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Receives the established session and reconfigures whatever issues later calls.
pub trait SessionConfigurator: Send + Sync {
    fn configure(&self, ctx: SessionContext);
}

impl<F> SessionConfigurator for F
where
    F: Fn(SessionContext) + Send + Sync,
{
    fn configure(&self, ctx: SessionContext) {
        self(ctx)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionQuery {
    pub issue_id: Option<String>,
    pub project_id: Option<String>,
    pub issue_key: Option<String>,
    pub project_key: Option<String>,
}

impl PermissionQuery {
    fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("issueId", self.issue_id.as_deref()),
            ("projectId", self.project_id.as_deref()),
            ("issueKey", self.issue_key.as_deref()),
            ("projectKey", self.project_key.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TargetApiClient {
    client: reqwest::Client,
}

impl TargetApiClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &AuthSettings) -> AppResult<Self> {
        Ok(Self::new(http_client::session_client(settings)?))
    }

    pub async fn get_myself(&self, ctx: &SessionContext) -> AppResult<Value> {
        self.get_json(ctx, MYSELF_PATH, &[]).await
    }

    pub async fn get_my_permissions(
        &self,
        ctx: &SessionContext,
        query: &PermissionQuery,
    ) -> AppResult<Value> {
        self.get_json(ctx, MY_PERMISSIONS_PATH, &query.pairs()).await
    }

    async fn get_json(
        &self,
        ctx: &SessionContext,
        rest_path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Value> {
        let mut request = self
            .client
            .get(ctx.api_url(rest_path))
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(cookie) = ctx.cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, path = rest_path, "target api request failed");
            transport_error(&e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            tracing::info!(status = status.as_u16(), path = rest_path, "session not accepted");
            return Err(authentication_failed());
        }
        if !status.is_success() {
            return Err(AuthErrorCode::Unknown.error(format!(
                "Unknown error ({rest_path} returned {})",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(|e| transport_error(&e))?;
        serde_json::from_str(&body)
            .map_err(|_| AuthErrorCode::Unknown.error("Unknown error (invalid response body)"))
    }
}

/// Hands the session to `configurator`, then verifies it by fetching the profile.
pub async fn authorize_session(
    configurator: &dyn SessionConfigurator,
    api: &TargetApiClient,
    ctx: SessionContext,
) -> AppResult<Value> {
    tracing::info!(
        origin = %ctx.origin(),
        pathname = %ctx.pathname,
        cookie_count = ctx.cookies.len(),
        "configuring target session"
    );
    configurator.configure(ctx.clone());
    api.get_myself(&ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::direct_login::parse_set_cookie;

    fn cookies() -> Vec<SessionCookie> {
        vec![
            parse_set_cookie("JSESSIONID=abc", "/", "https").expect("cookie"),
            parse_set_cookie("xsrf=def; Path=/", "/", "https").expect("cookie"),
        ]
    }

    #[test]
    fn from_base_url_extracts_origin_parts() {
        let ctx = SessionContext::from_base_url("https://team.example.com:8443/jira/", vec![])
            .expect("ctx");
        assert_eq!(ctx.protocol, "https");
        assert_eq!(ctx.hostname, "team.example.com");
        assert_eq!(ctx.port, Some(8443));
        assert_eq!(ctx.pathname, "/jira");
        assert_eq!(
            ctx.api_url(MYSELF_PATH),
            "https://team.example.com:8443/jira/rest/api/2/myself"
        );
    }

    #[test]
    fn from_base_url_defaults_root_path_and_drops_default_port() {
        let ctx =
            SessionContext::from_base_url("https://team.example.com:443", vec![]).expect("ctx");
        assert_eq!(ctx.port, None);
        assert_eq!(ctx.pathname, "/");
        assert_eq!(
            ctx.api_url(MYSELF_PATH),
            "https://team.example.com/rest/api/2/myself"
        );
    }

    #[test]
    fn from_base_url_rejects_garbage() {
        let err = SessionContext::from_base_url("not a url", vec![]).expect_err("invalid");
        assert_eq!(err.code(), "SEC_INVALID_INPUT");
    }

    #[test]
    fn cookie_header_joins_name_value_pairs() {
        let ctx =
            SessionContext::from_base_url("https://team.example.com", cookies()).expect("ctx");
        assert_eq!(ctx.cookie_header().as_deref(), Some("JSESSIONID=abc; xsrf=def"));

        let empty = SessionContext::from_base_url("https://team.example.com", vec![]).expect("ctx");
        assert_eq!(empty.cookie_header(), None);
    }

    #[test]
    fn permission_query_only_includes_provided_keys() {
        let query = PermissionQuery {
            issue_key: Some("ABC-1".to_string()),
            project_id: Some("10000".to_string()),
            ..PermissionQuery::default()
        };
        assert_eq!(
            query.pairs(),
            vec![("projectId", "10000"), ("issueKey", "ABC-1")]
        );
    }

    #[test]
    fn closures_act_as_configurators() {
        let seen = std::sync::Mutex::new(None);
        let configurator = |ctx: SessionContext| {
            if let Ok(mut guard) = seen.lock() {
                *guard = Some(ctx.hostname);
            }
        };
        let ctx = SessionContext::from_base_url("http://jira.local", vec![]).expect("ctx");
        configurator.configure(ctx);
        assert_eq!(
            seen.lock().expect("lock").as_deref(),
            Some("jira.local")
        );
    }
}
