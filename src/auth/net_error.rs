//! Usage: Transport failure classification into a stable, user-facing vocabulary.
//!
//! Structured signals (reqwest flags, `io::ErrorKind`) are consulted first; the
//! Chromium-style `net::ERR_*` identifiers are still accepted for callers that only
//! have a formatted string.

use crate::shared::error::AppError;
use std::error::Error as StdError;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetErrorCode {
    InternetDisconnected,
    ProxyConnectionFailed,
    ConnectionReset,
    ConnectionClose,
    NameNotResolved,
    ConnectionTimedOut,
    Unknown,
}

impl NetErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InternetDisconnected => "NET_INTERNET_DISCONNECTED",
            Self::ProxyConnectionFailed => "NET_PROXY_CONNECTION_FAILED",
            Self::ConnectionReset => "NET_CONNECTION_RESET",
            Self::ConnectionClose => "NET_CONNECTION_CLOSE",
            Self::NameNotResolved => "NET_NAME_NOT_RESOLVED",
            Self::ConnectionTimedOut => "NET_CONNECTION_TIMED_OUT",
            Self::Unknown => "NET_UNKNOWN",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::InternetDisconnected => "Internet disconnected",
            Self::ProxyConnectionFailed => "Proxy connection failed",
            Self::ConnectionReset => "Connection reset",
            Self::ConnectionClose => "Connection close",
            Self::NameNotResolved => "Page unavailable",
            Self::ConnectionTimedOut => "Connection timed out",
            Self::Unknown => "Unknown Error",
        }
    }

    /// Exact match on the `net::ERR_*` identifier; an `Error: ` prefix is tolerated.
    pub fn from_identifier(raw: &str) -> Self {
        let id = raw.strip_prefix("Error: ").unwrap_or(raw);
        match id {
            "net::ERR_INTERNET_DISCONNECTED" => Self::InternetDisconnected,
            "net::ERR_PROXY_CONNECTION_FAILED" => Self::ProxyConnectionFailed,
            "net::ERR_CONNECTION_RESET" => Self::ConnectionReset,
            "net::ERR_CONNECTION_CLOSE" => Self::ConnectionClose,
            "net::ERR_NAME_NOT_RESOLVED" => Self::NameNotResolved,
            "net::ERR_CONNECTION_TIMED_OUT" => Self::ConnectionTimedOut,
            _ => Self::Unknown,
        }
    }

    pub fn to_error(self) -> AppError {
        AppError::new(self.as_str(), self.message())
    }
}

/// Human message for a raw transport identifier. Pure; unmatched input is "Unknown Error".
pub fn classify(raw: &str) -> &'static str {
    NetErrorCode::from_identifier(raw).message()
}

fn from_io_kind(kind: io::ErrorKind) -> Option<NetErrorCode> {
    match kind {
        io::ErrorKind::ConnectionReset => Some(NetErrorCode::ConnectionReset),
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => Some(NetErrorCode::ConnectionClose),
        io::ErrorKind::TimedOut => Some(NetErrorCode::ConnectionTimedOut),
        io::ErrorKind::NotConnected => Some(NetErrorCode::InternetDisconnected),
        _ => None,
    }
}

fn from_message(message: &str) -> Option<NetErrorCode> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("dns error") || lower.contains("failed to lookup address") {
        return Some(NetErrorCode::NameNotResolved);
    }
    if lower.contains("connection closed before message completed") {
        return Some(NetErrorCode::ConnectionClose);
    }
    if let Some(idx) = message.find("net::ERR_") {
        let id = message[idx..]
            .split(|c: char| c.is_whitespace() || c == ')' || c == ',')
            .next()
            .unwrap_or_default();
        let code = NetErrorCode::from_identifier(id);
        if code != NetErrorCode::Unknown {
            return Some(code);
        }
    }
    None
}

/// Walks an error's source chain looking for an `io::Error` kind, then for known messages.
pub fn classify_error_chain(err: &(dyn StdError + 'static)) -> NetErrorCode {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    let mut fallback = None;
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if let Some(code) = from_io_kind(io_err.kind()) {
                return code;
            }
        }
        if fallback.is_none() {
            fallback = from_message(&e.to_string());
        }
        current = e.source();
    }
    fallback.unwrap_or(NetErrorCode::Unknown)
}

pub fn classify_reqwest_error(err: &reqwest::Error) -> NetErrorCode {
    if err.is_timeout() {
        return NetErrorCode::ConnectionTimedOut;
    }
    let code = classify_error_chain(err);
    if code == NetErrorCode::Unknown && err.is_connect() && is_proxy_connect(err) {
        return NetErrorCode::ProxyConnectionFailed;
    }
    code
}

fn is_proxy_connect(err: &reqwest::Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if e.to_string().to_ascii_lowercase().contains("proxy") {
            return true;
        }
        current = e.source();
    }
    false
}

/// Classified error for a failed transport call.
pub fn transport_error(err: &reqwest::Error) -> AppError {
    classify_reqwest_error(err).to_error()
}
