pub mod error;
pub(crate) mod security;
