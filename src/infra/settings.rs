//! Usage: Persisted authentication settings (schema + read/write helpers).

use crate::shared::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 2;
const SCHEMA_VERSION_ADD_BROKER_REQUEST_TIMEOUT: u32 = 2;
pub const DEFAULT_API_URL: &str = "https://api.chronos.atlas-apps.com";
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u32 = 10;
pub const DEFAULT_DIRECT_LOGIN_TIMEOUT_SECONDS: u32 = 30;
pub const DEFAULT_BROKER_REQUEST_TIMEOUT_SECONDS: u32 = 30;
const MAX_CONNECT_TIMEOUT_SECONDS: u32 = 5 * 60;
const MAX_DIRECT_LOGIN_TIMEOUT_SECONDS: u32 = 10 * 60;
const MAX_BROKER_REQUEST_TIMEOUT_SECONDS: u32 = 10 * 60;
pub const API_URL_ENV: &str = "CHRONOS_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub schema_version: u32,
    // Backend broker base URL (no trailing slash).
    pub api_url: String,
    pub connect_timeout_seconds: u32,
    // Whole-request bound for the direct login against the target server.
    pub direct_login_timeout_seconds: u32,
    pub broker_request_timeout_seconds: u32,
    // Appended to the default user agent when non-empty.
    pub user_agent_suffix: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            connect_timeout_seconds: DEFAULT_CONNECT_TIMEOUT_SECONDS,
            direct_login_timeout_seconds: DEFAULT_DIRECT_LOGIN_TIMEOUT_SECONDS,
            broker_request_timeout_seconds: DEFAULT_BROKER_REQUEST_TIMEOUT_SECONDS,
            user_agent_suffix: String::new(),
        }
    }
}

impl AuthSettings {
    pub fn user_agent(&self) -> String {
        let base = format!("chronos-auth/{}", env!("CARGO_PKG_VERSION"));
        let suffix = self.user_agent_suffix.trim();
        if suffix.is_empty() {
            base
        } else {
            format!("{base} {suffix}")
        }
    }
}

fn clamp_timeout(value: &mut u32, default: u32, max: u32) -> bool {
    let next = if *value == 0 { default } else { (*value).min(max) };
    if next == *value {
        return false;
    }
    *value = next;
    true
}

fn sanitize_timeouts(settings: &mut AuthSettings) -> bool {
    let mut changed = false;
    changed |= clamp_timeout(
        &mut settings.connect_timeout_seconds,
        DEFAULT_CONNECT_TIMEOUT_SECONDS,
        MAX_CONNECT_TIMEOUT_SECONDS,
    );
    changed |= clamp_timeout(
        &mut settings.direct_login_timeout_seconds,
        DEFAULT_DIRECT_LOGIN_TIMEOUT_SECONDS,
        MAX_DIRECT_LOGIN_TIMEOUT_SECONDS,
    );
    changed |= clamp_timeout(
        &mut settings.broker_request_timeout_seconds,
        DEFAULT_BROKER_REQUEST_TIMEOUT_SECONDS,
        MAX_BROKER_REQUEST_TIMEOUT_SECONDS,
    );
    changed
}

fn sanitize_api_url(settings: &mut AuthSettings) -> bool {
    let trimmed = settings.api_url.trim().trim_end_matches('/');
    let next = if trimmed.is_empty() {
        DEFAULT_API_URL
    } else {
        trimmed
    };
    if next == settings.api_url {
        return false;
    }
    settings.api_url = next.to_string();
    true
}

fn migrate_add_broker_request_timeout(settings: &mut AuthSettings) -> bool {
    if settings.schema_version >= SCHEMA_VERSION_ADD_BROKER_REQUEST_TIMEOUT {
        return false;
    }
    // v1 files shared the direct-login timeout for broker calls.
    settings.broker_request_timeout_seconds = settings.direct_login_timeout_seconds;
    settings.schema_version = SCHEMA_VERSION_ADD_BROKER_REQUEST_TIMEOUT;
    true
}

pub(crate) fn sanitize(settings: &mut AuthSettings) -> bool {
    let mut changed = migrate_add_broker_request_timeout(settings);
    changed |= sanitize_api_url(settings);
    changed |= sanitize_timeouts(settings);
    changed
}

fn parse_settings_json(content: &str) -> AppResult<(AuthSettings, bool)> {
    let mut settings: AuthSettings = serde_json::from_str(content)
        .map_err(|e| format!("SEC_INVALID_INPUT: invalid settings json: {e}"))?;
    let changed = sanitize(&mut settings);
    Ok((settings, changed))
}

fn apply_env_overrides(settings: &mut AuthSettings) {
    let Ok(raw) = std::env::var(API_URL_ENV) else {
        return;
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return;
    }
    tracing::debug!(api_url = %trimmed, "api url overridden from {API_URL_ENV}");
    settings.api_url = trimmed.to_string();
}

/// Reads settings from `path`; a missing file yields defaults.
pub fn read(path: &Path) -> AppResult<AuthSettings> {
    let mut settings = match std::fs::read_to_string(path) {
        Ok(content) => {
            let (settings, changed) = parse_settings_json(&content)?;
            if changed {
                tracing::info!(path = %path.display(), "settings sanitized on read");
            }
            settings
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AuthSettings::default(),
        Err(err) => {
            return Err(AppError::new(
                "SYSTEM_ERROR",
                format!("failed to read settings {}", path.display()),
            )
            .with_source(err))
        }
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Persists sanitized settings atomically (temp file + rename) and returns what was written.
pub fn write(path: &Path, settings: &AuthSettings) -> AppResult<AuthSettings> {
    let mut next = settings.clone();
    next.schema_version = SCHEMA_VERSION;
    sanitize(&mut next);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new("SYSTEM_ERROR", "failed to create settings dir").with_source(e)
        })?;
    }

    let content = serde_json::to_string_pretty(&next)
        .map_err(|e| format!("SYSTEM_ERROR: failed to serialize settings: {e}"))?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| AppError::new("SYSTEM_ERROR", "failed to write settings").with_source(e))?;
    if let Err(err) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(AppError::new("SYSTEM_ERROR", "failed to replace settings").with_source(err));
    }

    Ok(next)
}
