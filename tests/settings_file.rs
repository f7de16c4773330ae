mod support;

use chronos_auth::infra::settings::{self, API_URL_ENV, DEFAULT_DIRECT_LOGIN_TIMEOUT_SECONDS};
use chronos_auth::{AuthSettings, Authenticator};
use support::{env_lock, EnvRestore};

#[test]
fn missing_file_reads_defaults() {
    let _lock = env_lock();
    let mut env = EnvRestore::default();
    env.remove_var(API_URL_ENV);
    let dir = tempfile::tempdir().expect("tempdir");

    let read = settings::read(&dir.path().join("auth.json")).expect("read");
    assert_eq!(read, AuthSettings::default());
    assert_eq!(
        read.direct_login_timeout_seconds,
        DEFAULT_DIRECT_LOGIN_TIMEOUT_SECONDS
    );
}

#[test]
fn write_then_read_round_trips_sanitized_values() {
    let _lock = env_lock();
    let mut env = EnvRestore::default();
    env.remove_var(API_URL_ENV);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("auth.json");

    let written = settings::write(
        &path,
        &AuthSettings {
            api_url: "https://broker.example.com/".to_string(),
            direct_login_timeout_seconds: 0,
            user_agent_suffix: "desktop/3.1".to_string(),
            ..AuthSettings::default()
        },
    )
    .expect("write");
    assert_eq!(written.api_url, "https://broker.example.com");
    assert_eq!(
        written.direct_login_timeout_seconds,
        DEFAULT_DIRECT_LOGIN_TIMEOUT_SECONDS
    );

    let read = settings::read(&path).expect("read");
    assert_eq!(read, written);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn env_override_wins_over_file() {
    let _lock = env_lock();
    let mut env = EnvRestore::default();
    env.set_var(API_URL_ENV, "http://127.0.0.1:9999/");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("auth.json");
    std::fs::write(&path, r#"{"api_url":"https://broker.example.com"}"#).expect("seed");

    let read = settings::read(&path).expect("read");
    assert_eq!(read.api_url, "http://127.0.0.1:9999");

    let auth = Authenticator::from_settings(&read).expect("authenticator");
    assert_eq!(auth.broker().api_url(), "http://127.0.0.1:9999");
}

#[test]
fn malformed_file_is_invalid_input() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("auth.json");
    std::fs::write(&path, "{ nope").expect("seed");

    let err = settings::read(&path).expect_err("malformed");
    assert_eq!(err.code(), "SEC_INVALID_INPUT");
}

#[test]
fn failed_replace_removes_temp_file_and_keeps_io_cause() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("auth.json");
    std::fs::create_dir(&path).expect("dir in place of file");
    std::fs::write(path.join("keep"), "x").expect("occupy dir");

    let err = settings::write(&path, &AuthSettings::default()).expect_err("rename onto dir");
    assert_eq!(err.code(), "SYSTEM_ERROR");
    assert_eq!(err.message(), "failed to replace settings");
    assert!(std::error::Error::source(&err).is_some());
    assert!(!path.with_extension("json.tmp").exists());

    let err = settings::read(&path).expect_err("directory is not a settings file");
    assert_eq!(err.code(), "SYSTEM_ERROR");
    assert!(std::error::Error::source(&err).is_some());
}
