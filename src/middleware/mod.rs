pub mod auth;

pub use auth::{RequireAdmin, RequireSession, extract_token};
