pub mod auth;

pub use auth::{is_protected, require_token, TOKEN_COOKIE};
