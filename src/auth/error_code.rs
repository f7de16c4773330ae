//! Usage: Centralized auth error-code enum for stable classification/mapping.

use crate::shared::error::AppError;

pub const AUTHENTICATION_FAILED_MESSAGE: &str =
    "Cannot authorize to JIRA. Check your credentials and try again";
pub const AUTOMATIC_LOGIN_FAILED_MESSAGE: &str =
    "Automatic login failed, please enter your credentials again";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect email address and / or password.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    AuthenticationFailed,
    AutomaticLoginFailed,
    InvalidCredentials,
    Unknown,
    InvalidInput,
    SystemError,
}

impl AuthErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::AutomaticLoginFailed => "AUTOMATIC_LOGIN_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unknown => "UNKNOWN",
            Self::InvalidInput => "SEC_INVALID_INPUT",
            Self::SystemError => "SYSTEM_ERROR",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Some(match value {
            "AUTHENTICATION_FAILED" => Self::AuthenticationFailed,
            "AUTOMATIC_LOGIN_FAILED" => Self::AutomaticLoginFailed,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "UNKNOWN" => Self::Unknown,
            "SEC_INVALID_INPUT" => Self::InvalidInput,
            "SYSTEM_ERROR" => Self::SystemError,
            _ => return None,
        })
    }

    /// Failures the user fixes by re-entering credentials rather than retrying.
    pub const fn needs_manual_entry(self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::AutomaticLoginFailed | Self::InvalidCredentials
        )
    }

    pub fn error(self, message: impl Into<String>) -> AppError {
        AppError::new(self.as_str(), message)
    }
}

pub(crate) fn authentication_failed() -> AppError {
    AuthErrorCode::AuthenticationFailed.error(AUTHENTICATION_FAILED_MESSAGE)
}

pub(crate) fn automatic_login_failed() -> AppError {
    AuthErrorCode::AutomaticLoginFailed.error(AUTOMATIC_LOGIN_FAILED_MESSAGE)
}

pub(crate) fn invalid_credentials() -> AppError {
    AuthErrorCode::InvalidCredentials.error(INVALID_CREDENTIALS_MESSAGE)
}
