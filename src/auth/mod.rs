//! Usage: Authentication / session establishment against the target issue tracker.
//!
//! Broker strategies (`broker`) and the direct login (`direct_login`) are alternative
//! paths; whichever succeeds feeds a `session::SessionContext`.

pub mod authenticator;
pub mod broker;
pub mod direct_login;
pub mod error_code;
pub mod net_error;
pub mod session;
